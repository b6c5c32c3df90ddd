//! axum integration.
//!
//! Handlers can return an [`HtmlRender`] (or `Result<HtmlRender, Error>`)
//! directly:
//!
//! ```ignore
//! async fn home(State(views): State<Arc<dyn Renderer>>) -> Result<HtmlRender, Error> {
//!     views.instance("home", Context::new())
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::core::{Error, templates::HtmlRender};

impl IntoResponse for HtmlRender {
    fn into_response(self) -> Response {
        match self.render() {
            Ok(body) => Html(body).into_response(),
            Err(err) => {
                error!(
                    "Failed to render template '{}': {}",
                    self.template().name(),
                    err
                );
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
            }
        }
    }
}

/// Body sent with every 500 response; the detail only goes to the log
const INTERNAL_ERROR_BODY: &str = "internal server error";

/// Status and client-facing body for `err`
fn status_and_body(err: &Error) -> (StatusCode, String) {
    match err {
        Error::TemplateNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_ERROR_BODY.to_string(),
        ),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = status_and_body(&self);
        if status.is_server_error() {
            error!("Template error: {}", self);
        }
        (status, body).into_response()
    }
}
