//! Domain layer

pub mod mail;
pub mod transactions;
