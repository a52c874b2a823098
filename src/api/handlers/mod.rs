pub mod booking;
pub mod cron;
pub mod customer;
pub mod event;
pub mod health;
pub mod template;
pub mod voucher;
