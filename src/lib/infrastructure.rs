//! Infrastructure layer

pub mod config;
pub mod http;
pub mod postmark;
