//! Request payloads

pub mod customer;

pub use customer::{BatchPayload, CustomerPayload};
