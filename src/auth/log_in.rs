//! This file defines the routes for displaying the log-in page and handling log-in requests.
//!
//! A successful log-in starts a session, which is when the user's due
//! recurring rules are materialized.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        User, get_user_by_username, invalidate_auth_cookie, normalize_redirect_url,
        set_auth_cookie,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, base, link, loading_spinner, log_in_register, password_input,
        username_input,
    },
    recurring::apply_due_rules,
    timezone::today_in,
};

fn log_in_form(
    username: &str,
    error_message: Option<&str>,
    redirect_url: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (username_input(username, None))
            (password_input("", 0, error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Forgot your password? "
                (link(endpoints::FORGOT_PASSWORD_VIEW, "Reset it here"))
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account? "
                (link(endpoints::REGISTER_VIEW, "Register here"))
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let redirect_url = raw_url.and_then(normalize_redirect_url);

    if redirect_url.is_none()
        && let Some(raw_url) = raw_url
    {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = log_in_register("Log in to your account", &log_in_form);
    base("Log In", &[], &content).into_response()
}

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// The raw data entered by the user in the log-in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    pub username: String,

    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or
    /// is not set. `Some` means "remember me" regardless of the value.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the user's due recurring rules are
/// materialized, the auth cookie is set and the client is redirected to the
/// dashboard page (or the page they originally requested).
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let render_error =
        |message: &str| log_in_form(&user_data.username, Some(message), redirect_url).into_response();

    let user: User = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return render_error(INTERNAL_ERROR_MSG);
            }
        };

        match get_user_by_username(&user_data.username, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return render_error(INVALID_CREDENTIALS_ERROR_MSG),
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                return render_error(INTERNAL_ERROR_MSG);
            }
        }
    };

    match user.password_hash.verify(&user_data.password) {
        Ok(true) => {}
        Ok(false) => return render_error(INVALID_CREDENTIALS_ERROR_MSG),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return render_error(INTERNAL_ERROR_MSG);
        }
    }

    let today = match today_in(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    match state.db_connection.lock() {
        Ok(connection) => {
            if let Err(error) = apply_due_rules(&connection, user.id, today) {
                tracing::error!("Could not apply recurring rules for user {}: {error}", user.id);
            }
        }
        Err(error) => tracing::error!("could not acquire database lock: {error}"),
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    match set_auth_cookie(jar.clone(), user.id, cookie_duration) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(redirect_url.to_owned()),
            updated_jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}


#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form, Router,
        body::Body,
        extract::State,
        http::{Response, StatusCode},
        routing::post,
    };
    use axum_extra::extract::PrivateCookieJar;
    use axum_htmx::HX_REDIRECT;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, PasswordHash, ValidatedPassword, create_user},
        db::initialize,
        endpoints,
        test_utils::{parse_html_fragment, seed_weekly_income_rule},
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LogInData, LoginState, REMEMBER_ME_COOKIE_DURATION,
        post_log_in,
    };

    fn get_test_state(with_user: bool) -> LoginState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not create tables");

        if with_user {
            let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked("test"), 4)
                .expect("Could not hash password");
            create_user("alice", password_hash, &connection).expect("Could not create test user");
        }

        LoginState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn log_in_data(username: &str, password: &str) -> LogInData {
        LogInData {
            username: username.to_owned(),
            password: password.to_owned(),
            remember_me: None,
            redirect_url: None,
        }
    }

    async fn new_log_in_request(state: LoginState, log_in_form: LogInData) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(State(state), jar, Form(log_in_form)).await
    }

    #[track_caller]
    fn assert_hx_redirect(response: &Response<Body>, want_location: &str) {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(HX_REDIRECT).unwrap(), want_location);
    }

    async fn assert_error_message(response: Response<Body>, message: &str) {
        let fragment = parse_html_fragment(response).await;
        let error_selector = scraper::Selector::parse("p.text-red-500.text-base").unwrap();
        let error = fragment
            .select(&error_selector)
            .next()
            .expect("expected error message paragraph");

        assert_eq!(error.text().collect::<String>().trim(), message);
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_state(true);

        let response = new_log_in_request(state, log_in_data("alice", "test")).await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn log_in_redirects_to_requested_url() {
        let state = get_test_state(true);
        let redirect_url = "/transactions?category=Food";

        let response = new_log_in_request(
            state,
            LogInData {
                redirect_url: Some(redirect_url.to_owned()),
                ..log_in_data("alice", "test")
            },
        )
        .await;

        assert_hx_redirect(&response, redirect_url);
    }

    #[tokio::test]
    async fn log_in_falls_back_on_invalid_redirect_url() {
        let state = get_test_state(true);

        let response = new_log_in_request(
            state,
            LogInData {
                redirect_url: Some("https://example.com".to_owned()),
                ..log_in_data("alice", "test")
            },
        )
        .await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_password() {
        let state = get_test_state(true);

        let response = new_log_in_request(state, log_in_data("alice", "wrongpassword")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_error_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_username() {
        let state = get_test_state(true);

        let response = new_log_in_request(state, log_in_data("mallory", "test")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_error_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn log_in_materializes_due_recurring_rules() {
        let state = get_test_state(true);
        {
            let connection = state.db_connection.lock().unwrap();
            seed_weekly_income_rule(&connection, 1, "2000-01-01");
        }
        let db_connection = state.db_connection.clone();

        let response = new_log_in_request(state, log_in_data("alice", "test")).await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let connection = db_connection.lock().unwrap();
        let income_count: i64 = connection
            .query_row("SELECT COUNT(*) FROM income WHERE owner_id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(income_count, 1);
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_fields() {
        let state = get_test_state(false);
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .post(endpoints::LOG_IN_API)
            .content_type("application/x-www-form-urlencoded")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn remember_me_extends_auth_cookie_through_form() {
        let state = get_test_state(true);
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let form = [
            ("username", "alice"),
            ("password", "test"),
            ("remember_me", "on"),
        ];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        let token_cookie = response.cookie(COOKIE_TOKEN);
        let expires = token_cookie.expires_datetime().unwrap();
        assert!(
            (expires - (OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION)).abs()
                < Duration::seconds(2)
        );
    }
}
