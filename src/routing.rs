//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_forgot_password_page, get_log_in_page, get_log_out,
        get_register_page, post_log_in, register_user,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    recurring::{
        create_recurring_endpoint, delete_recurring_endpoint, get_new_recurring_page,
        get_recurring_page,
    },
    summary::{get_dashboard_page, get_report_page, set_goal_endpoint},
    transaction::{
        create_expense_endpoint, create_income_endpoint, export_expenses, export_income,
        get_new_expense_page, get_new_income_page, get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::NEW_INCOME_VIEW, get(get_new_income_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::EXPORT_INCOME, get(export_income))
        .route(endpoints::EXPORT_EXPENSES, get(export_expenses))
        .route(endpoints::RECURRING_VIEW, get(get_recurring_page))
        .route(endpoints::NEW_RECURRING_VIEW, get(get_new_recurring_page))
        .route(endpoints::REPORT_VIEW, get(get_report_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // HTMX requests need the HX-REDIRECT header for auth redirects to work.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::INCOME_API, post(create_income_endpoint))
            .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
            .route(endpoints::RECURRING_API, post(create_recurring_endpoint))
            .route(
                endpoints::DELETE_RECURRING,
                delete(delete_recurring_endpoint),
            )
            .route(endpoints::GOAL_API, post(set_goal_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
