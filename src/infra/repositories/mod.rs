pub mod fixture_event_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_communication_repo;
pub mod sqlite_customer_repo;
pub mod sqlite_event_repo;
pub mod sqlite_voucher_repo;
