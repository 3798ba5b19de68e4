pub mod approval;
pub mod audit_log;
pub mod catalog;
pub mod notification;
pub mod profile;
pub mod stock_request;
