//! The printable monthly report.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, util::days_in_year_month};

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
    recurring::apply_due_rules,
    summary::Summary,
    timezone::{parse_date, today_in},
    transaction::{Expense, Income, TransactionFilter, get_expenses, get_income},
};

/// The state needed for the monthly report.
#[derive(Debug, Clone)]
pub struct ReportState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The month to report on as `YYYY-MM`, the current month if absent.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub month: Option<String>,
}

/// The first and last day of the month `text` names, e.g. "2024-02".
fn parse_month(text: &str) -> Result<(Date, Date), Error> {
    let first_day = parse_date(&format!("{}-01", text.trim()))
        .map_err(|_| Error::MalformedDate(text.to_owned()))?;
    let last_day = first_day
        .replace_day(days_in_year_month(first_day.year(), first_day.month()))
        .map_err(|_| Error::MalformedDate(text.to_owned()))?;

    Ok((first_day, last_day))
}

struct MonthlyReport {
    username: String,
    first_day: Date,
    summary: Summary,
    income: Vec<Income>,
    expenses: Vec<Expense>,
}

/// Display the income and expenses of one calendar month, ready to print.
pub async fn get_report_page(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let today = today_in(&state.local_timezone)?;
    let (first_day, last_day) = match query.month.as_deref().filter(|month| !month.is_empty()) {
        Some(month) => parse_month(month)?,
        None => parse_month(&format!("{:04}-{:02}", today.year(), u8::from(today.month())))?,
    };

    let filter = TransactionFilter {
        from: Some(first_day),
        to: Some(last_day),
        category: None,
    };

    let report = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        if let Err(error) = apply_due_rules(&connection, user_id, today) {
            tracing::error!("Could not apply recurring rules for user {user_id}: {error}");
        }

        let user = get_user_by_id(user_id, &connection)?;
        let income = get_income(user_id, &filter, &connection)?;
        let expenses = get_expenses(user_id, &filter, &connection)?;

        MonthlyReport {
            username: user.username,
            first_day,
            summary: Summary::from_transactions(&income, &expenses),
            income,
            expenses,
        }
    };

    Ok(report_view(&report).into_response())
}

fn print_styles() -> HeadElement {
    HeadElement::Style(PreEscaped(
        "@media print { .no-print { display: none !important; } }".to_owned(),
    ))
}

fn report_view(report: &MonthlyReport) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORT_VIEW).into_html();
    let month_value = format!(
        "{:04}-{:02}",
        report.first_day.year(),
        u8::from(report.first_day.month())
    );
    let title = format!(
        "BudgetMate Monthly Report - {} {}",
        report.first_day.month(),
        report.first_day.year()
    );

    let content = html! {
        div class="no-print" { (nav_bar) }

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl space-y-4"
            {
                form
                    method="get"
                    action=(endpoints::REPORT_VIEW)
                    class="no-print flex flex-col md:flex-row gap-4 items-end"
                {
                    div class="w-full"
                    {
                        label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                        input
                            type="month"
                            name="month"
                            id="month"
                            value=(month_value)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Show" }
                    button
                        type="button"
                        id="print-report"
                        onclick="window.print()"
                        class=(BUTTON_PRIMARY_STYLE)
                    {
                        "Print"
                    }
                }

                section id="report" class=(CARD_STYLE)
                {
                    h1 class="text-2xl font-bold" { (title) }
                    p id="report-user" { "User: " (report.username) }

                    dl class="grid grid-cols-2 gap-2 my-4"
                    {
                        dt { "Total income" }
                        dd data-total="income" { (format_currency(report.summary.total_income)) }
                        dt { "Total expenses" }
                        dd data-total="expense" { (format_currency(report.summary.total_expense)) }
                        dt { "Balance" }
                        dd data-total="balance" { (format_currency(report.summary.balance)) }
                    }

                    h2 class="text-xl font-semibold mt-4" { "Income" }
                    @if report.income.is_empty() {
                        p { "No income this month." }
                    } @else {
                        table id="report-income" class="w-full text-sm text-left"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Source" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                }
                            }
                            tbody
                            {
                                @for row in &report.income {
                                    tr class=(TABLE_ROW_STYLE)
                                    {
                                        td class=(TABLE_CELL_STYLE) { (row.date) }
                                        td class=(TABLE_CELL_STYLE) { (row.source) }
                                        td class=(TABLE_CELL_STYLE) { (format_currency(row.amount)) }
                                    }
                                }
                            }
                        }
                    }

                    h2 class="text-xl font-semibold mt-4" { "Expenses" }
                    @if report.expenses.is_empty() {
                        p { "No expenses this month." }
                    } @else {
                        table id="report-expenses" class="w-full text-sm text-left"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                }
                            }
                            tbody
                            {
                                @for row in &report.expenses {
                                    tr class=(TABLE_ROW_STYLE)
                                    {
                                        td class=(TABLE_CELL_STYLE) { (row.date) }
                                        td class=(TABLE_CELL_STYLE) { (row.category) }
                                        td class=(TABLE_CELL_STYLE) { (row.note) }
                                        td class=(TABLE_CELL_STYLE) { (format_currency(row.amount)) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Monthly Report", &[print_styles()], &content)
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
    use time::{Date, macros::date};

    use crate::{
        Error,
        auth::UserID,
        test_utils::{
            assert_valid_html, get_test_connection_with_user, parse_html_document,
            seed_weekly_income_rule,
        },
        transaction::{Descriptor, ExpenseCategory, NewTransaction, create_transaction},
    };

    use super::{ReportQuery, ReportState, get_report_page, parse_month};

    fn insert(
        connection: &rusqlite::Connection,
        owner: UserID,
        amount: f64,
        date: Date,
        income: bool,
    ) {
        let descriptor = if income {
            Descriptor::Income {
                source: "Salary".to_owned(),
            }
        } else {
            Descriptor::Expense {
                category: ExpenseCategory::Food,
                note: "Lunch".to_owned(),
            }
        };

        create_transaction(
            &NewTransaction {
                owner,
                amount,
                descriptor,
                date,
            },
            connection,
        )
        .unwrap();
    }

    fn text_of(document: &Html, selector: &str) -> String {
        document
            .select(&Selector::parse(selector).unwrap())
            .next()
            .unwrap_or_else(|| panic!("no element matches {selector}"))
            .text()
            .collect()
    }

    #[test]
    fn month_bounds_handle_leap_years() {
        assert_eq!(
            parse_month("2024-02"),
            Ok((date!(2024 - 02 - 01), date!(2024 - 02 - 29)))
        );
        assert_eq!(
            parse_month("2023-12"),
            Ok((date!(2023 - 12 - 01), date!(2023 - 12 - 31)))
        );
        assert_eq!(
            parse_month("2023-13"),
            Err(Error::MalformedDate("2023-13".to_owned()))
        );
    }

    #[tokio::test]
    async fn report_only_includes_selected_month() {
        let (connection, owner) = get_test_connection_with_user();
        insert(&connection, owner, 2000.0, date!(2024 - 06 - 01), true);
        insert(&connection, owner, 45.5, date!(2024 - 06 - 30), false);
        insert(&connection, owner, 999.0, date!(2024 - 07 - 01), true);
        let state = ReportState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_report_page(
            State(state),
            Extension(owner),
            Query(ReportQuery {
                month: Some("2024-06".to_owned()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(
            text_of(&document, "#report h1"),
            "BudgetMate Monthly Report - June 2024"
        );
        assert_eq!(text_of(&document, "#report-user"), "User: alice");
        assert_eq!(text_of(&document, "[data-total=expense]"), "$45.50");
        assert_eq!(
            document
                .select(&Selector::parse("#report-income tbody tr").unwrap())
                .count(),
            1
        );
        assert!(text_of(&document, "#report-expenses").contains("Lunch"));
        assert!(
            document
                .select(&Selector::parse(".no-print #print-report").unwrap())
                .next()
                .is_some()
        );
    }

    #[tokio::test]
    async fn defaults_to_current_month() {
        let (connection, owner) = get_test_connection_with_user();
        let state = ReportState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_report_page(
            State(state),
            Extension(owner),
            Query(ReportQuery::default()),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        let today = time::OffsetDateTime::now_utc().date();
        let want_month = format!("{} {}", today.month(), today.year());
        assert!(text_of(&document, "#report h1").ends_with(&want_month));
        assert!(text_of(&document, "#report").contains("No income this month."));
    }

    #[tokio::test]
    async fn includes_transactions_from_due_recurring_rules() {
        let (connection, owner) = get_test_connection_with_user();
        seed_weekly_income_rule(&connection, owner.as_i64(), "2000-01-01");
        let state = ReportState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_report_page(
            State(state),
            Extension(owner),
            Query(ReportQuery::default()),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        assert_eq!(
            document
                .select(&Selector::parse("#report-income tbody tr").unwrap())
                .count(),
            1
        );
        assert_eq!(text_of(&document, "[data-total=income]"), "$100.00");
    }

    #[tokio::test]
    async fn malformed_month_is_an_error() {
        let (connection, owner) = get_test_connection_with_user();
        let state = ReportState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let result = get_report_page(
            State(state),
            Extension(owner),
            Query(ReportQuery {
                month: Some("June".to_owned()),
            }),
        )
        .await;

        assert_eq!(result.err(), Some(Error::MalformedDate("June".to_owned())));
    }
}
