//! AIxStartup is a small business-accounting service.
//!
//! This library provides a JSON REST API for recording revenue and expense
//! transactions with partners, querying them with composable filters and
//! sort orders, and summarising them on a dashboard.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod dashboard;
mod db;
mod endpoints;
mod format;
mod logging;
mod partner;
mod response;
mod routing;
mod settings;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword};
pub use dashboard::{
    DashboardSummary, MonthlySummary, PartnerTotal, aggregate, monthly_breakdown, net_profit,
    profit_margin, top_partners, total_expense, total_revenue,
};
pub use db::{initialize as initialize_db, seed_demo_data};
pub use format::{format_currency, format_date};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use partner::{PartnerId, PartnerKind, PartnerStatus};
pub use response::ApiResponse;
pub use routing::build_router;
pub use transaction::{
    Category, KnownCategory, MAX_AMOUNT, PartnerClassification, PartnerReference, SortDirection,
    SortField, SortSpec, Transaction, TransactionBuilder, TransactionFilter, TransactionId,
    TransactionStatus, TransactionType, filter_and_sort,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a valid session cookie.
    #[error("authentication is required")]
    Unauthorized,

    /// The session cookie could not be created or read.
    ///
    /// Callers should pass in the original error as a string.
    #[error("could not handle the session cookie: {0}")]
    CookieError(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address is already registered to another user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// A required field was missing or empty.
    #[error("the field \"{0}\" is required")]
    MissingField(&'static str),

    /// A transaction amount was zero, negative or too large.
    #[error("{0} is not a valid amount, amounts must be between 1 and 1,000,000,000,000,000")]
    InvalidAmount(i64),

    /// A transaction was created with an empty description.
    #[error("the description cannot be empty")]
    EmptyDescription,

    /// A transaction or partner was created with an empty company name.
    #[error("the partner name cannot be empty")]
    EmptyPartnerName,

    /// The category "other" was chosen without a custom category name.
    #[error("a custom category name is required when the category is \"other\"")]
    MissingCustomCategory,

    /// A query string contained a value that is not a valid filter or sort option.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The partner ID used to create a transaction did not match a partner of the user.
    #[error("the partner ID does not refer to a valid partner")]
    InvalidPartner(Option<PartnerId>),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::TooWeak(_)
            | Error::DuplicateEmail
            | Error::MissingField(_)
            | Error::InvalidAmount(_)
            | Error::EmptyDescription
            | Error::EmptyPartnerName
            | Error::MissingCustomCategory
            | Error::InvalidQuery(_)
            | Error::InvalidPartner(_) => StatusCode::BAD_REQUEST,
            Error::NotFound | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            Error::CookieError(_)
            | Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, axum::Json(ApiResponse::<()>::error(&message))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn validation_errors_are_bad_requests() {
        let response = Error::InvalidAmount(0).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_rows_map_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn lock_errors_are_internal_errors() {
        let response = Error::DatabaseLockError.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
