//! The endpoint for creating a recurring rule.

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
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    recurring::{Frequency, NewRecurringRule, create_recurring_rule},
    transaction::{Descriptor, ExpenseCategory, TransactionKind},
};

/// The state needed to create a recurring rule.
#[derive(Debug, Clone)]
pub struct CreateRecurringState {
    /// The database connection for managing recurring rules.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateRecurringState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for a recurring rule.
///
/// `source` is only used for income rules, `category` and `note` only for
/// expense rules.
#[derive(Debug, Deserialize)]
pub struct RecurringForm {
    /// "income" or "expense".
    pub kind: String,
    /// The amount of each transaction in dollars.
    pub amount: f64,
    /// The date the rule counts from.
    pub date: Date,
    /// "daily", "weekly" or "monthly".
    pub frequency: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

fn parse_form(form: RecurringForm, owner: UserID) -> Result<NewRecurringRule, Error> {
    let kind = form.kind.parse::<TransactionKind>()?;
    let frequency = form.frequency.parse::<Frequency>()?;

    let descriptor = match kind {
        TransactionKind::Income => Descriptor::Income {
            source: form.source.unwrap_or_default(),
        },
        TransactionKind::Expense => Descriptor::Expense {
            category: form.category.unwrap_or_default().parse::<ExpenseCategory>()?,
            note: form.note.unwrap_or_default(),
        },
    };

    NewRecurringRule::new(owner, form.amount, descriptor, frequency, form.date)
}

/// A route handler for creating a recurring rule, redirects to the recurring rules page on success.
pub async fn create_recurring_endpoint(
    State(state): State<CreateRecurringState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<RecurringForm>,
) -> Response {
    let rule = match parse_form(form, user_id) {
        Ok(rule) => rule,
        Err(error) => {
            tracing::debug!("rejected recurring rule: {error}");
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

    match create_recurring_rule(&rule, &connection) {
        Ok(rule_id) => {
            tracing::info!(
                "Created {} {} rule {rule_id} for user {user_id}",
                rule.frequency,
                rule.descriptor.kind()
            );

            (
                HxRedirect(endpoints::RECURRING_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create recurring rule: {error}");
            error.into_alert_response()
        }
    }
}
