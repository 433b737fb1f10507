//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use time::Date;

use crate::{
    alert::Alert, html::error_view, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token could not be serialized or the expiry date time could
    /// not be computed.
    #[error("could not create auth token: {0}")]
    TokenError(String),

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

    /// An empty string was used as a username.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// The username is already taken by another user.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A transaction, recurring rule or savings goal was given an amount that
    /// is zero, negative or not a number.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    InvalidAmount(f64),

    /// An income entry was submitted without a source.
    #[error("income source cannot be empty")]
    EmptySource,

    /// The text does not name one of the expense categories.
    #[error("\"{0}\" is not a valid expense category")]
    InvalidCategory(String),

    /// A stored date could not be parsed as a calendar date.
    ///
    /// Holds the offending text.
    #[error("could not parse \"{0}\" as a date")]
    MalformedDate(String),

    /// A stored recurrence frequency is not one of daily, weekly or monthly.
    #[error("\"{0}\" is not a valid frequency")]
    InvalidFrequency(String),

    /// A stored transaction kind is not one of income or expense.
    #[error("\"{0}\" is not a valid transaction kind")]
    InvalidKind(String),

    /// The CSV export could not be written.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            Error::MalformedDate(text) | Error::InvalidCategory(text) => (
                StatusCode::BAD_REQUEST,
                Html(
                    error_view(
                        "Bad Request",
                        "400",
                        "That doesn't look right.",
                        &format!(
                            "\"{text}\" is not a valid filter value, check the address and try again."
                        ),
                    )
                    .into_string(),
                ),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::FutureDate(date) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid transaction date".to_owned(),
                    details: format!(
                        "{date} is a date in the future, which is not allowed. \
                        Change the date to today or earlier."
                    ),
                },
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!("{amount} is not allowed, enter an amount greater than zero."),
                },
            ),
            Error::EmptySource => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Missing income source".to_owned(),
                    details: "Enter where the income came from, e.g. \"Salary\".".to_owned(),
                },
            ),
            Error::InvalidCategory(category) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid category".to_owned(),
                    details: format!("\"{category}\" is not one of the expense categories."),
                },
            ),
            Error::MalformedDate(text) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid date".to_owned(),
                    details: format!("\"{text}\" is not a date, use the format YYYY-MM-DD."),
                },
            ),
            Error::InvalidFrequency(frequency) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid frequency".to_owned(),
                    details: format!("\"{frequency}\" is not one of daily, weekly or monthly."),
                },
            ),
            Error::InvalidKind(kind) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid type".to_owned(),
                    details: format!("\"{kind}\" is not income or expense."),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The requested item could not be found.".to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
