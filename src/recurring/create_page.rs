//! The page for creating a recurring rule.

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
    recurring::Frequency,
    timezone::today_in,
    transaction::{TransactionKind, amount_and_date_inputs, category_select},
};

/// The state needed for the new recurring rule page.
#[derive(Debug, Clone)]
pub struct CreateRecurringPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateRecurringPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn create_recurring_view(today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::RECURRING_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::RECURRING_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Recurring Transaction" }

                div
                {
                    label for="kind" class=(FORM_LABEL_STYLE) { "Type" }

                    select name="kind" id="kind" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value=(TransactionKind::Income) { "Income" }
                        option value=(TransactionKind::Expense) selected { "Expense" }
                    }
                }

                (amount_and_date_inputs(None, today))

                div
                {
                    label for="frequency" class=(FORM_LABEL_STYLE) { "Repeats" }

                    select name="frequency" id="frequency" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for frequency in Frequency::ALL {
                            option value=(frequency) selected[frequency == Frequency::Monthly]
                            {
                                (frequency)
                            }
                        }
                    }
                }

                div
                {
                    label for="source" class=(FORM_LABEL_STYLE) { "Income source" }

                    input
                        name="source"
                        id="source"
                        type="text"
                        placeholder="Only needed for income"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Expense category" }

                    (category_select("category", false, None))
                }

                div
                {
                    label for="note" class=(FORM_LABEL_STYLE) { "Expense note" }

                    input
                        name="note"
                        id="note"
                        type="text"
                        placeholder="Optional"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                    " Save"
                }
            }
        }
    };

    base("New Recurring Transaction", &[dollar_input_styles()], &content)
}

/// Renders the page for creating a recurring rule.
pub async fn get_new_recurring_page(
    State(state): State<CreateRecurringPageState>,
) -> Result<Response, Error> {
    let today = today_in(&state.local_timezone)?;

    Ok(create_recurring_view(today).into_response())
}

#[cfg(test)]
mod tests {
    use axum::extract::State;
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::{CreateRecurringPageState, get_new_recurring_page};

    #[tokio::test]
    async fn page_has_rule_form() {
        let state = CreateRecurringPageState {
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_new_recurring_page(State(state)).await.unwrap();

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::RECURRING_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "date", "date");
        assert_form_submit_button(&form);

        let frequencies = form
            .select(&Selector::parse("select[name=frequency] option").unwrap())
            .filter_map(|option| option.value().attr("value"))
            .collect::<Vec<_>>();
        assert_eq!(frequencies, ["daily", "weekly", "monthly"]);
    }
}
