//! The endpoint for setting the savings goal.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error, auth::UserID, endpoints, summary::set_savings_goal};

/// The state needed to set the savings goal.
#[derive(Debug, Clone)]
pub struct SetGoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SetGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GoalForm {
    pub amount: f64,
}

/// A route handler for setting the savings goal, redirects to the dashboard on success.
pub async fn set_goal_endpoint(
    State(state): State<SetGoalState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<GoalForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_savings_goal(user_id, form.amount, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::debug!("could not set savings goal for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;

    use crate::{
        endpoints,
        summary::get_savings_goal,
        test_utils::{assert_hx_redirect, get_test_connection_with_user},
    };

    use super::{GoalForm, SetGoalState, set_goal_endpoint};

    #[tokio::test]
    async fn sets_goal_and_redirects_to_dashboard() {
        let (connection, owner) = get_test_connection_with_user();
        let state = SetGoalState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = set_goal_endpoint(
            State(state.clone()),
            Extension(owner),
            Form(GoalForm { amount: 320.5 }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_savings_goal(owner, &connection), Ok(Some(320.5)));
    }

    #[tokio::test]
    async fn negative_goal_is_bad_request() {
        let (connection, owner) = get_test_connection_with_user();
        let state = SetGoalState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = set_goal_endpoint(
            State(state.clone()),
            Extension(owner),
            Form(GoalForm { amount: -5.0 }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_savings_goal(owner, &connection), Ok(None));
    }
}
