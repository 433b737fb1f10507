//! Defines the route handlers for the pages for recording income and expenses.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    timezone::today_in,
    transaction::{ExpenseCategory, TransactionKind},
};

/// The state needed for the new income and new expense pages.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The amount and date inputs shared by income, expense and recurring rule forms.
pub(crate) fn amount_and_date_inputs(max_date: Option<Date>, date_value: Date) -> Markup {
    html! {
        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                max=[max_date]
                required
                value=(date_value)
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// A select input listing every expense category.
pub(crate) fn category_select(name: &str, include_all: bool, selected: Option<&str>) -> Markup {
    html! {
        select name=(name) id=(name) class=(FORM_TEXT_INPUT_STYLE)
        {
            @if include_all {
                option value="All" selected[selected.is_none_or(|value| value == "All")] { "All" }
            }

            @for category in ExpenseCategory::ALL {
                option
                    value=(category)
                    selected[selected == Some(category.as_str())]
                {
                    (category)
                }
            }
        }
    }
}

fn create_transaction_view(kind: TransactionKind, max_date: Date) -> Markup {
    let (active_endpoint, api_route, title) = match kind {
        TransactionKind::Income => (endpoints::NEW_INCOME_VIEW, endpoints::INCOME_API, "New Income"),
        TransactionKind::Expense => (
            endpoints::NEW_EXPENSE_VIEW,
            endpoints::EXPENSES_API,
            "New Expense",
        ),
    };
    let nav_bar = NavBar::new(active_endpoint).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(api_route)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { (title) }

                (amount_and_date_inputs(Some(max_date), max_date))

                @match kind {
                    TransactionKind::Income => {
                        div
                        {
                            label for="source" class=(FORM_LABEL_STYLE) { "Source" }

                            input
                                name="source"
                                id="source"
                                type="text"
                                placeholder="Salary"
                                required
                                class=(FORM_TEXT_INPUT_STYLE);
                        }
                    }
                    TransactionKind::Expense => {
                        div
                        {
                            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                            (category_select("category", false, None))
                        }

                        div
                        {
                            label for="note" class=(FORM_LABEL_STYLE) { "Note" }

                            input
                                name="note"
                                id="note"
                                type="text"
                                placeholder="Optional"
                                class=(FORM_TEXT_INPUT_STYLE);
                        }
                    }
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                    " Save"
                }
            }
        }
    };

    base(title, &[dollar_input_styles()], &content)
}

/// Renders the page for recording income.
pub async fn get_new_income_page(
    State(state): State<CreateTransactionPageState>,
) -> Result<Response, Error> {
    let today = today_in(&state.local_timezone)?;

    Ok(create_transaction_view(TransactionKind::Income, today).into_response())
}

/// Renders the page for recording an expense.
pub async fn get_new_expense_page(
    State(state): State<CreateTransactionPageState>,
) -> Result<Response, Error> {
    let today = today_in(&state.local_timezone)?;

    Ok(create_transaction_view(TransactionKind::Expense, today).into_response())
}

#[cfg(test)]
mod view_tests {
    use axum::{extract::State, http::StatusCode};
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
        transaction::ExpenseCategory,
    };

    use super::{CreateTransactionPageState, get_new_expense_page, get_new_income_page};

    fn state() -> CreateTransactionPageState {
        CreateTransactionPageState {
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn income_page_has_source_input() {
        let response = get_new_income_page(State(state())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::INCOME_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "date", "date");
        assert_form_input(&form, "source", "text");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn expense_page_lists_categories() {
        let response = get_new_expense_page(State(state())).await.unwrap();

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::EXPENSES_API, "hx-post");
        let options = form
            .select(&Selector::parse("select[name=category] option").unwrap())
            .filter_map(|option| option.value().attr("value"))
            .collect::<Vec<_>>();
        let want = ExpenseCategory::ALL.map(|category| category.as_str());
        assert_eq!(options, want);
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let state = CreateTransactionPageState {
            local_timezone: "Not/A_Timezone".to_owned(),
        };

        let result = get_new_income_page(State(state)).await;

        assert!(result.is_err());
    }
}
