//! The dashboard: totals, savings goal, expense chart, tips and recent transactions.
//!
//! Loading the dashboard first applies the user's due recurring rules so the
//! totals include anything that recurred since the last visit.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        dollar_input_styles, format_currency, link,
    },
    navigation::NavBar,
    recurring::{apply_due_rules, count_recurring_rules},
    summary::{
        CategoryTotal, GoalProgress, Summary, Tip, budget_tips,
        charts::{chart_container, chart_script, expense_by_category_chart},
        get_expense_by_category, get_savings_goal, get_summary, goal_progress,
    },
    timezone::today_in,
    transaction::{Expense, Income, TransactionFilter, get_expenses, get_income},
};

/// How many of the latest income and expense rows are shown.
const RECENT_TRANSACTION_COUNT: usize = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

struct DashboardData {
    summary: Summary,
    goal: Option<f64>,
    category_totals: Vec<CategoryTotal>,
    tips: Vec<Tip>,
    recent_income: Vec<Income>,
    recent_expenses: Vec<Expense>,
}

fn load_dashboard(
    user_id: UserID,
    today: time::Date,
    connection: &Connection,
) -> Result<DashboardData, Error> {
    if let Err(error) = apply_due_rules(connection, user_id, today) {
        tracing::error!("Could not apply recurring rules for user {user_id}: {error}");
    }

    let summary = get_summary(user_id, connection)?;
    let goal = get_savings_goal(user_id, connection)?;
    let category_totals = get_expense_by_category(user_id, connection)?;
    let recurring_rule_count = count_recurring_rules(user_id, connection)?;
    let tips = budget_tips(
        &summary,
        goal,
        category_totals.first(),
        recurring_rule_count,
    );

    let mut recent_income = get_income(user_id, &TransactionFilter::default(), connection)?;
    recent_income.truncate(RECENT_TRANSACTION_COUNT);
    let mut recent_expenses = get_expenses(user_id, &TransactionFilter::default(), connection)?;
    recent_expenses.truncate(RECENT_TRANSACTION_COUNT);

    Ok(DashboardData {
        summary,
        goal,
        category_totals,
        tips,
        recent_income,
        recent_expenses,
    })
}

/// Display the dashboard of the logged in user.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = today_in(&state.local_timezone)?;

    let data = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        load_dashboard(user_id, today, &connection)?
    };

    Ok(dashboard_view(&data).into_response())
}

fn summary_cards(summary: &Summary) -> Markup {
    let cards = [
        ("Total income", summary.total_income),
        ("Total expenses", summary.total_expense),
        ("Balance", summary.balance),
    ];

    html! {
        section id="summary" class="grid grid-cols-1 md:grid-cols-3 gap-4 w-full"
        {
            @for (label, amount) in cards {
                div class=(CARD_STYLE)
                {
                    p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                    p class="text-2xl font-bold" data-amount=(label) { (format_currency(amount)) }
                }
            }
        }
    }
}

fn goal_section(balance: f64, goal: Option<f64>) -> Markup {
    let progress = goal_progress(balance, goal);
    let goal_value = goal.map(|goal| format!("{goal:.2}"));

    html! {
        section id="goal" class=(CARD_STYLE)
        {
            h2 class="text-xl font-semibold mb-2" { "Monthly savings goal" }

            @if let (Some(progress), Some(goal)) = (progress, goal) {
                @match progress {
                    GoalProgress::Overspent => {
                        p class="text-red-600 dark:text-red-400"
                        {
                            "Overspent! " (format_currency(balance.abs())) " over the goal of "
                            (format_currency(goal)) "."
                        }
                    }
                    GoalProgress::Reached => {
                        p class="text-green-600 dark:text-green-400"
                        {
                            "Goal reached! Saved " (format_currency(balance)) " of "
                            (format_currency(goal)) "."
                        }
                    }
                    GoalProgress::InProgress(fraction) => {
                        p { "Progress: " (format_currency(balance)) " / " (format_currency(goal)) }
                        progress class="w-full" max="1" value=(fraction) {}
                    }
                }
            }

            form
                hx-post=(endpoints::GOAL_API)
                hx-target-error="#alert-container"
                class="mt-4 flex flex-col md:flex-row gap-4 items-end no-print"
            {
                div class="w-full"
                {
                    label for="goal-amount" class=(FORM_LABEL_STYLE) { "Goal" }

                    div class="input-wrapper w-full"
                    {
                        input
                            name="amount"
                            id="goal-amount"
                            type="number"
                            step="0.01"
                            min="0"
                            placeholder="0.00"
                            value=[goal_value]
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save goal" }
            }
        }
    }
}

fn tips_section(tips: &[Tip]) -> Markup {
    html! {
        section id="tips" class=(CARD_STYLE)
        {
            h2 class="text-xl font-semibold mb-2" { "Tips" }

            @if tips.is_empty() {
                p { "You're doing great! No suggestions right now." }
            } @else {
                ul class="list-disc list-inside space-y-1"
                {
                    @for tip in tips {
                        li { (tip.message()) }
                    }
                }
            }
        }
    }
}

fn recent_transactions(income: &[Income], expenses: &[Expense]) -> Markup {
    html! {
        section id="recent" class=(CARD_STYLE)
        {
            div class="flex justify-between items-center mb-2"
            {
                h2 class="text-xl font-semibold" { "Recent transactions" }
                (link(endpoints::TRANSACTIONS_VIEW, "See all"))
            }

            div class="overflow-x-auto"
            {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Details" }
                        }
                    }

                    tbody
                    {
                        @for row in income {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (row.date) }
                                td class={(TABLE_CELL_STYLE) " text-green-600"} { (format_currency(row.amount)) }
                                td class=(TABLE_CELL_STYLE) { (row.source) }
                            }
                        }

                        @for row in expenses {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (row.date) }
                                td class={(TABLE_CELL_STYLE) " text-red-600"} { (format_currency(-row.amount)) }
                                td class=(TABLE_CELL_STYLE) { (row.category) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let has_expenses = !data.category_totals.is_empty();

    let mut head_elements = vec![dollar_input_styles()];
    if has_expenses {
        let chart = expense_by_category_chart(&data.category_totals);
        head_elements.push(HeadElement::ScriptLink(
            "/static/echarts.6.0.0.min.js".to_owned(),
        ));
        head_elements.push(chart_script(&chart));
    }

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-4"
            {
                div class="flex justify-between items-center"
                {
                    h1 class="text-2xl font-bold" { "Dashboard" }

                    div class="flex gap-4 no-print"
                    {
                        (link(endpoints::NEW_INCOME_VIEW, "Add income"))
                        (link(endpoints::NEW_EXPENSE_VIEW, "Add expense"))
                    }
                }

                (summary_cards(&data.summary))
                (goal_section(data.summary.balance, data.goal))

                section id="chart" class=(CARD_STYLE)
                {
                    @if has_expenses {
                        (chart_container())
                    } @else {
                        p { "No expense data to show a chart." }
                    }
                }

                (tips_section(&data.tips))
                (recent_transactions(&data.recent_income, &data.recent_expenses))
            }
        }
    };

    base("Dashboard", &head_elements, &content)
}
