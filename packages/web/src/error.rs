use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use thiserror::Error;

use crate::views::message_page;

/// Error returned by request handlers. Each kind becomes a message page or a redirect.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] store::Error),
    /// A store error whose message page links back to `back` instead of the default.
    #[error("{source}")]
    OnPage { source: store::Error, back: String },
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    pub fn on_page(source: store::Error, back: impl Into<String>) -> Self {
        AppError::OnPage {
            source,
            back: back.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (err, page) = match self {
            AppError::Store(err) => (err, None),
            AppError::OnPage { source, back } => (source, Some(back)),
            AppError::Session(err) => {
                tracing::error!("session layer failed: {}", err);
                return internal_error();
            }
        };

        let (status, title, back) = match &err {
            store::Error::Unauthenticated => return Redirect::to("/login").into_response(),
            store::Error::DuplicateEmail => (StatusCode::CONFLICT, "Registration failed", "/register"),
            store::Error::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Login failed", "/login"),
            store::Error::EmptyContent => (StatusCode::UNPROCESSABLE_ENTITY, "Comment not posted", "/"),
            store::Error::UnknownTrail(_) => (StatusCode::NOT_FOUND, "Not found", "/"),
            store::Error::StorageFailure(msg) => {
                tracing::error!("storage failure: {}", msg);
                return internal_error();
            }
        };
        let back = page.as_deref().unwrap_or(back);

        (status, Html(message_page(title, &err.to_string(), back))).into_response()
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(message_page("Error", "Something went wrong, please try again.", "/")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_empty_comment_links_back_to_its_page() {
        let (status, body) = render(AppError::on_page(store::Error::EmptyContent, "/Xinaliq")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Comment must not be empty"));
        assert!(body.contains("href=\"/Xinaliq\""));

        let (status, body) = render(store::Error::EmptyContent.into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("href=\"/\""));
    }

    #[tokio::test]
    async fn test_storage_failure_hides_details() {
        let (status, body) = render(store::Error::storage("connection refused").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("connection refused"));
    }
}
