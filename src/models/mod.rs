//! Data models

pub mod account;
pub mod user;
