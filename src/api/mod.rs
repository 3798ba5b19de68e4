pub mod activity;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod messaging;
pub mod requests;
