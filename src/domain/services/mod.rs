pub mod booking_service;
pub mod codes;
pub mod communication_service;
pub mod confirmation;
pub mod defaults;
pub mod ics;
pub mod notifications;
pub mod voucher_service;
