//! The page listing a user's recurring rules and the endpoint for deleting them.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    database_id::DatabaseId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    recurring::{
        StoredRule,
        core::{delete_recurring_rule, get_recurring_rules},
    },
    transaction::{Descriptor, TransactionKind},
};

/// The state needed for the recurring rules page and deleting rules.
#[derive(Debug, Clone)]
pub struct RecurringViewState {
    /// The database connection for managing recurring rules.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RecurringViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn rule_row(rule: &StoredRule) -> Markup {
    let (kind, details) = match &rule.descriptor {
        Descriptor::Income { source } => ("Income", source.clone()),
        Descriptor::Expense { category, note } if note.is_empty() => {
            ("Expense", category.to_string())
        }
        Descriptor::Expense { category, note } => ("Expense", format!("{category}: {note}")),
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-rule-id=(rule.id)
        {
            td class=(TABLE_CELL_STYLE) { (kind) }
            td class=(TABLE_CELL_STYLE) { (format_currency(rule.amount)) }
            td class=(TABLE_CELL_STYLE) { (details) }
            td class=(TABLE_CELL_STYLE) { (rule.frequency) }
            td class=(TABLE_CELL_STYLE) { (rule.start_date) }
            td class=(TABLE_CELL_STYLE) { (rule.last_applied.as_deref().unwrap_or("Never")) }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    hx-delete=(format_endpoint(endpoints::DELETE_RECURRING, rule.id))
                    hx-confirm="Delete this recurring transaction? Transactions it already created are kept."
                    hx-target="closest tr"
                    hx-target-error="#alert-container"
                    hx-swap="delete"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

fn recurring_view(rules: &[StoredRule]) -> Markup {
    let nav_bar = NavBar::new(endpoints::RECURRING_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-4"
            {
                div class="flex justify-between items-end"
                {
                    h1 class="text-2xl font-bold" { "Recurring Transactions" }
                    (link(endpoints::NEW_RECURRING_VIEW, "Add recurring transaction"))
                }

                section class=(CARD_STYLE)
                {
                    @if rules.is_empty() {
                        p
                        {
                            "Nothing recurs yet. Add your salary, rent or subscriptions "
                            "and they will be recorded automatically."
                        }
                    } @else {
                        div class="overflow-x-auto"
                        {
                            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                            {
                                thead class=(TABLE_HEADER_STYLE)
                                {
                                    tr
                                    {
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Details" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Repeats" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Starts" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Last applied" }
                                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                    }
                                }

                                tbody
                                {
                                    @for rule in rules {
                                        (rule_row(rule))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Recurring Transactions", &[], &content)
}

/// Render the recurring rules of the logged in user.
pub async fn get_recurring_page(
    State(state): State<RecurringViewState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let rules = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let mut rules = get_recurring_rules(user_id, TransactionKind::Income, &connection)?;
        rules.extend(get_recurring_rules(
            user_id,
            TransactionKind::Expense,
            &connection,
        )?);
        rules
    };

    Ok(recurring_view(&rules).into_response())
}

/// A route handler for deleting a recurring rule, responds with an alert.
pub async fn delete_recurring_endpoint(
    State(state): State<RecurringViewState>,
    Extension(user_id): Extension<UserID>,
    Path(rule_id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_recurring_rule(rule_id, user_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => Alert::SuccessSimple {
            message: "Recurring transaction deleted".to_owned(),
        }
        .into_response(),
        Err(Error::NotFound) => Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete recurring rule {rule_id}: {error}");
            error.into_alert_response()
        }
    }
}
