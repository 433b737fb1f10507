//! Defines the endpoints for recording income and expenses.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    timezone::today_in,
    transaction::{Descriptor, ExpenseCategory, NewTransaction, create_transaction},
};

/// The state needed to record a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for recording income.
#[derive(Debug, Deserialize)]
pub struct IncomeForm {
    /// The value of the income in dollars.
    pub amount: f64,
    /// When the income was earned.
    pub date: Date,
    /// Where the income came from.
    pub source: String,
}

/// The form data for recording an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseForm {
    /// The value of the expense in dollars.
    pub amount: f64,
    /// When the money was spent.
    pub date: Date,
    /// The name of an [ExpenseCategory].
    pub category: String,
    /// Optional details.
    #[serde(default)]
    pub note: Option<String>,
}

/// A route handler for recording income, redirects to the transactions view on success.
pub async fn create_income_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<IncomeForm>,
) -> Response {
    let descriptor = Descriptor::Income {
        source: form.source,
    };

    save_transaction(&state, user_id, form.amount, descriptor, form.date)
}

/// A route handler for recording an expense, redirects to the transactions view on success.
pub async fn create_expense_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let category = match form.category.parse::<ExpenseCategory>() {
        Ok(category) => category,
        Err(error) => return error.into_alert_response(),
    };
    let descriptor = Descriptor::Expense {
        category,
        note: form.note.unwrap_or_default(),
    };

    save_transaction(&state, user_id, form.amount, descriptor, form.date)
}

fn save_transaction(
    state: &CreateTransactionState,
    owner: UserID,
    amount: f64,
    descriptor: Descriptor,
    date: Date,
) -> Response {
    let today = match today_in(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let transaction = match NewTransaction::new(owner, amount, descriptor, date, today) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::debug!("rejected new transaction: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_transaction(&transaction, &connection) {
        tracing::error!("could not create {}: {error}", transaction.descriptor.kind());

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
