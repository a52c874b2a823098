pub mod booking;
pub mod communication;
pub mod customer;
pub mod event;
pub mod voucher;
