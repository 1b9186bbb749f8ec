#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Transactional email delivery for axum applications, backed by Postmark.
//!
//! Handlers extract [`Mail`](infrastructure::http::extract::Mail) to compose messages and
//! send them immediately, after the request's unit of work commits, or on a background
//! task.

pub mod domain;
pub mod infrastructure;
