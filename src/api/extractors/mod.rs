pub mod admin;
pub mod cron;
