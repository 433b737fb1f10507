//! Alert messages shown to the user after an HTMX request.
//!
//! Alerts are swapped out-of-band into the `#alert-container` element that
//! [crate::html::base] places at the bottom of every page.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A success or error message for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra details.
    Success { message: String, details: String },
    /// A success message on its own.
    SuccessSimple { message: String },
    /// An error message with details on how to fix it.
    Error { message: String, details: String },
    /// An error message on its own.
    ErrorSimple { message: String },
}

impl Alert {
    /// Render the alert as an out-of-band swap for the alert container.
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::Success { message, details } => (false, message, details),
            Alert::SuccessSimple { message } => (false, message, String::new()),
            Alert::Error { message, details } => (true, message, details),
            Alert::ErrorSimple { message } => (true, message, String::new()),
        };

        let style = if is_error {
            "p-4 mb-4 text-sm rounded-lg text-red-800 bg-red-50 \
            dark:bg-gray-800 dark:text-red-400 border border-red-300 dark:border-red-800"
        } else {
            "p-4 mb-4 text-sm rounded-lg text-green-800 bg-green-50 \
            dark:bg-gray-800 dark:text-green-400 border border-green-300 dark:border-green-800"
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    class=(style)
                    role="alert"
                    data-alert-kind=(if is_error { "error" } else { "success" })
                {
                    div class="flex justify-between items-start gap-4"
                    {
                        div
                        {
                            span class="font-medium" { (message) }

                            @if !details.is_empty() {
                                p class="mt-1" { (details) }
                            }
                        }

                        button
                            type="button"
                            aria-label="Dismiss"
                            onclick="this.closest('#alert-container').classList.add('hidden')"
                        {
                            "✕"
                        }
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}
