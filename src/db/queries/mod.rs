pub mod activity;
pub mod catalog;
pub mod messaging;
pub mod stock_requests;
