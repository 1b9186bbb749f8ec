//! axum integration
//!
//! Add [`transaction_manager`](transaction::transaction_manager) as a layer so each request
//! runs in its own unit of work, make [`MailState`](state::MailState) reachable from the
//! router state, and take [`Mail`](extract::Mail) in handlers.

pub mod errors;
pub mod extract;
pub mod state;
pub mod transaction;
