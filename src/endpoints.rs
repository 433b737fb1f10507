//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/recurring/{rule_id}', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying and filtering a user's income and expenses.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for recording income.
pub const NEW_INCOME_VIEW: &str = "/transactions/income/new";
/// The page for recording an expense.
pub const NEW_EXPENSE_VIEW: &str = "/transactions/expenses/new";
/// Download the filtered income records as CSV.
pub const EXPORT_INCOME: &str = "/transactions/export/income";
/// Download the filtered expense records as CSV.
pub const EXPORT_EXPENSES: &str = "/transactions/export/expenses";
/// The page for listing recurring income and expenses.
pub const RECURRING_VIEW: &str = "/recurring";
/// The page for creating a recurring rule.
pub const NEW_RECURRING_VIEW: &str = "/recurring/new";
/// The printable monthly report.
pub const REPORT_VIEW: &str = "/report";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for instructions for resetting the user's password.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to record income.
pub const INCOME_API: &str = "/api/income";
/// The route to record expenses.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to create recurring rules.
pub const RECURRING_API: &str = "/api/recurring";
/// The route to delete a recurring rule.
pub const DELETE_RECURRING: &str = "/api/recurring/{rule_id}";
/// The route to set the savings goal.
pub const GOAL_API: &str = "/api/goal";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let end = endpoint_path[start..]
        .find('}')
        .map(|offset| start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!("{}{}{}", &endpoint_path[..start], id, &endpoint_path[end..])
}

#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    #[track_caller]
    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_INCOME_VIEW,
            endpoints::NEW_EXPENSE_VIEW,
            endpoints::EXPORT_INCOME,
            endpoints::EXPORT_EXPENSES,
            endpoints::RECURRING_VIEW,
            endpoints::NEW_RECURRING_VIEW,
            endpoints::REPORT_VIEW,
            endpoints::REGISTER_VIEW,
            endpoints::LOG_IN_VIEW,
            endpoints::FORGOT_PASSWORD_VIEW,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::STATIC,
            endpoints::LOG_IN_API,
            endpoints::LOG_OUT,
            endpoints::USERS,
            endpoints::INCOME_API,
            endpoints::EXPENSES_API,
            endpoints::RECURRING_API,
            endpoints::GOAL_API,
        ] {
            assert_endpoint_is_valid_uri(endpoint);
        }

        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::DELETE_RECURRING, 1));
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
    }
}
