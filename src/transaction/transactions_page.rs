//! The page listing a user's income and expenses with a filter form.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency, link,
    },
    navigation::NavBar,
    recurring::apply_due_rules,
    timezone::today_in,
    transaction::{
        Expense, FilterQuery, Income, create_page::category_select, get_expenses, get_income,
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the income and expenses of the logged in user that match the filter in the query string.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, Error> {
    let filter = query.to_filter()?;
    let today = today_in(&state.local_timezone)?;

    let (income, expenses) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        if let Err(error) = apply_due_rules(&connection, user_id, today) {
            tracing::error!("Could not apply recurring rules for user {user_id}: {error}");
        }

        (
            get_income(user_id, &filter, &connection)?,
            get_expenses(user_id, &filter, &connection)?,
        )
    };

    Ok(transactions_view(&query, &income, &expenses).into_response())
}

fn filter_form(query: &FilterQuery) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="w-full grid grid-cols-1 md:grid-cols-4 gap-4 items-end no-print"
        {
            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    name="from"
                    id="from"
                    type="date"
                    value=[query.from.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    name="to"
                    id="to"
                    type="date"
                    value=[query.to.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Expense category" }
                (category_select("category", true, query.category.as_deref()))
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
        }
    }
}

fn income_table(income: &[Income]) -> Markup {
    html! {
        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Source" }
                }
            }

            tbody
            {
                @for row in income {
                    tr class=(TABLE_ROW_STYLE) data-income-id=(row.id)
                    {
                        td class=(TABLE_CELL_STYLE) { (row.date) }
                        td class=(TABLE_CELL_STYLE) { (format_currency(row.amount)) }
                        td class=(TABLE_CELL_STYLE) { (row.source) }
                    }
                }

                @if income.is_empty() {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td colspan="3" class=(TABLE_CELL_STYLE) { "No income matches the filter." }
                    }
                }
            }
        }
    }
}

fn expense_table(expenses: &[Expense]) -> Markup {
    html! {
        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                }
            }

            tbody
            {
                @for row in expenses {
                    tr class=(TABLE_ROW_STYLE) data-expense-id=(row.id)
                    {
                        td class=(TABLE_CELL_STYLE) { (row.date) }
                        td class=(TABLE_CELL_STYLE) { (format_currency(row.amount)) }
                        td class=(TABLE_CELL_STYLE) { (row.category) }
                        td class=(TABLE_CELL_STYLE) { (row.note) }
                    }
                }

                @if expenses.is_empty() {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td colspan="4" class=(TABLE_CELL_STYLE) { "No expenses match the filter." }
                    }
                }
            }
        }
    }
}

fn transactions_view(query: &FilterQuery, income: &[Income], expenses: &[Expense]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                div class="flex justify-between items-center no-print"
                {
                    h1 class="text-2xl font-bold" { "Transactions" }

                    div class="flex gap-4"
                    {
                        (link(endpoints::NEW_INCOME_VIEW, "Add income"))
                        (link(endpoints::NEW_EXPENSE_VIEW, "Add expense"))
                    }
                }

                section class=(CARD_STYLE) { (filter_form(query)) }

                section id="income" class=(CARD_STYLE)
                {
                    div class="flex justify-between items-center mb-2"
                    {
                        h2 class="text-xl font-semibold" { "Income" }
                        a
                            href=(query.to_url(endpoints::EXPORT_INCOME))
                            class=(LINK_STYLE)
                            download
                        {
                            "Export CSV"
                        }
                    }

                    div class="overflow-x-auto" { (income_table(income)) }
                }

                section id="expenses" class=(CARD_STYLE)
                {
                    div class="flex justify-between items-center mb-2"
                    {
                        h2 class="text-xl font-semibold" { "Expenses" }
                        a
                            href=(query.to_url(endpoints::EXPORT_EXPENSES))
                            class=(LINK_STYLE)
                            download
                        {
                            "Export CSV"
                        }
                    }

                    div class="overflow-x-auto" { (expense_table(expenses)) }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        endpoints,
        test_utils::{
            assert_valid_html, get_test_connection_with_user, parse_html_document,
            seed_weekly_income_rule,
        },
        transaction::{
            Descriptor, ExpenseCategory, FilterQuery, NewTransaction, create_transaction,
        },
    };

    use super::{TransactionsViewState, get_transactions_page};

    fn get_test_state() -> (TransactionsViewState, UserID) {
        let (connection, owner) = get_test_connection_with_user();
        let transactions = [
            Descriptor::Income {
                source: "Salary".to_owned(),
            },
            Descriptor::Expense {
                category: ExpenseCategory::Food,
                note: "Groceries".to_owned(),
            },
            Descriptor::Expense {
                category: ExpenseCategory::Rent,
                note: String::new(),
            },
        ];
        for descriptor in transactions {
            let transaction = NewTransaction {
                owner,
                amount: 100.0,
                descriptor,
                date: date!(2024 - 05 - 01),
            };
            create_transaction(&transaction, &connection).unwrap();
        }

        let state = TransactionsViewState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        (state, owner)
    }

    fn count_rows(document: &Html, selector: &str) -> usize {
        document.select(&Selector::parse(selector).unwrap()).count()
    }

    #[tokio::test]
    async fn lists_income_and_expenses() {
        let (state, owner) = get_test_state();

        let response =
            get_transactions_page(State(state), Extension(owner), Query(FilterQuery::default()))
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(count_rows(&document, "tr[data-income-id]"), 1);
        assert_eq!(count_rows(&document, "tr[data-expense-id]"), 2);
    }

    #[tokio::test]
    async fn applies_category_filter_and_keeps_it_in_export_links() {
        let (state, owner) = get_test_state();
        let query = FilterQuery {
            category: Some("Rent".to_owned()),
            ..Default::default()
        };

        let response = get_transactions_page(State(state), Extension(owner), Query(query))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        assert_eq!(count_rows(&document, "tr[data-expense-id]"), 1);
        let export_link = format!("{}?category=Rent", endpoints::EXPORT_EXPENSES);
        assert_eq!(
            count_rows(&document, &format!("a[href=\"{export_link}\"]")),
            1,
            "want export link {export_link}"
        );
    }

    #[tokio::test]
    async fn excludes_transactions_outside_date_range() {
        let (state, owner) = get_test_state();
        let query = FilterQuery {
            from: Some("2024-06-01".to_owned()),
            ..Default::default()
        };

        let response = get_transactions_page(State(state), Extension(owner), Query(query))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        assert_eq!(count_rows(&document, "tr[data-income-id]"), 0);
        assert_eq!(count_rows(&document, "tr[data-expense-id]"), 0);
    }

    #[tokio::test]
    async fn lists_income_from_due_recurring_rules() {
        let (state, owner) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            seed_weekly_income_rule(&connection, owner.as_i64(), "2000-01-01");
        }

        let response = get_transactions_page(
            State(state.clone()),
            Extension(owner),
            Query(FilterQuery::default()),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        assert_eq!(count_rows(&document, "tr[data-income-id]"), 2);

        // Reloading the page does not apply the rule again.
        let response =
            get_transactions_page(State(state), Extension(owner), Query(FilterQuery::default()))
                .await
                .unwrap();

        let document = parse_html_document(response).await;
        assert_eq!(count_rows(&document, "tr[data-income-id]"), 2);
    }

    #[tokio::test]
    async fn malformed_filter_is_an_error() {
        let (state, owner) = get_test_state();
        let query = FilterQuery {
            to: Some("last week".to_owned()),
            ..Default::default()
        };

        let result = get_transactions_page(State(state), Extension(owner), Query(query)).await;

        assert_eq!(
            result.err(),
            Some(Error::MalformedDate("last week".to_owned()))
        );
    }
}
