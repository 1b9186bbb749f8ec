//! Per-request units of work

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::debug;

use crate::domain::transactions::UnitOfWork;

/// Runs each request in its own [`UnitOfWork`].
///
/// The unit of work is committed once the handler produced a response that is neither
/// a client nor a server error, and aborted otherwise, so mail joined to it is only
/// sent for requests that succeeded.
///
/// ```ignore
/// Router::new()
///     .route("/signup", post(signup))
///     .layer(axum::middleware::from_fn(transaction_manager))
/// ```
pub async fn transaction_manager(mut request: Request, next: Next) -> Response {
    let unit_of_work = UnitOfWork::new();
    request.extensions_mut().insert(unit_of_work.clone());

    let response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        debug!(%status, "request failed");
        unit_of_work.abort();
    } else {
        unit_of_work.commit().await;
    }

    response
}
