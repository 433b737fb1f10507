//! The page explaining how to reset a forgotten password.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{base, link, log_in_register},
};

fn forgot_password_template() -> Markup {
    let instructions = html! {
        p class="text-justify text-gray-900 dark:text-white"
        {
            "Passwords can only be reset by whoever runs this server. Ask them to run "
            code { "reset_password --db-path <database file> --username <your username>" }
            " from the directory the server runs in, then log in with the new password."
        }

        p class="text-sm font-light text-gray-500 dark:text-gray-400"
        {
            "Remembered it? "
            (link(endpoints::LOG_IN_VIEW, "Back to log in"))
        }
    };

    base(
        "Forgot Password",
        &[],
        &log_in_register("Forgot your password?", &instructions),
    )
}

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    forgot_password_template().into_response()
}
