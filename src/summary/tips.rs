//! Rule based budgeting tips.

use crate::{
    html::format_currency,
    summary::{CategoryTotal, Summary},
};

/// The share of total expenses above which a single category gets a tip.
const TOP_CATEGORY_SHARE: f64 = 0.4;

/// A suggestion shown on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Tip {
    /// Total expenses exceed total income.
    SpendingMoreThanEarning,
    /// The balance is less than half of the savings goal.
    BelowHalfOfGoal,
    /// No savings goal has been set.
    NoGoal,
    /// One category takes more than 40% of all expenses.
    HighCategorySpending(CategoryTotal),
    /// The user has no recurring rules.
    NoRecurringRules,
}

impl Tip {
    /// The text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Tip::SpendingMoreThanEarning => {
                "You're spending more than you earn! Consider reducing expenses.".to_owned()
            }
            Tip::BelowHalfOfGoal => {
                "You're below 50% of your savings goal. Try saving more this month.".to_owned()
            }
            Tip::NoGoal => "Set a savings goal to track your monthly progress!".to_owned(),
            Tip::HighCategorySpending(top) => format!(
                "You are spending a lot on {} ({}). Try to optimize it.",
                top.category,
                format_currency(top.total)
            ),
            Tip::NoRecurringRules => "You haven't set up any recurring income or expenses. \
                Use them to automate tracking."
                .to_owned(),
        }
    }
}

/// Work out which tips apply, in the order they should be shown.
///
/// `top_category` is the category with the largest total, if there are any expenses.
pub fn budget_tips(
    summary: &Summary,
    goal: Option<f64>,
    top_category: Option<&CategoryTotal>,
    recurring_rule_count: i64,
) -> Vec<Tip> {
    let mut tips = Vec::new();

    if summary.total_expense > summary.total_income {
        tips.push(Tip::SpendingMoreThanEarning);
    }

    match goal {
        Some(goal) if goal != 0.0 && summary.balance < goal * 0.5 => {
            tips.push(Tip::BelowHalfOfGoal)
        }
        Some(_) => {}
        None => tips.push(Tip::NoGoal),
    }

    if let Some(top) = top_category
        && top.total > summary.total_expense * TOP_CATEGORY_SHARE
    {
        tips.push(Tip::HighCategorySpending(*top));
    }

    if recurring_rule_count == 0 {
        tips.push(Tip::NoRecurringRules);
    }

    tips
}

#[cfg(test)]
mod tests {
    use crate::{
        summary::{CategoryTotal, Summary},
        transaction::ExpenseCategory,
    };

    use super::{Tip, budget_tips};

    fn summary(total_income: f64, total_expense: f64) -> Summary {
        Summary {
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }

    #[test]
    fn no_tips_when_everything_is_fine() {
        let top = CategoryTotal {
            category: ExpenseCategory::Food,
            total: 30.0,
        };

        let tips = budget_tips(&summary(1000.0, 80.0), Some(500.0), Some(&top), 2);

        assert!(tips.is_empty(), "want no tips, got {tips:?}");
    }

    #[test]
    fn all_tips_in_order() {
        let top = CategoryTotal {
            category: ExpenseCategory::Rent,
            total: 900.0,
        };

        let tips = budget_tips(&summary(500.0, 1000.0), None, Some(&top), 0);

        assert_eq!(
            tips,
            [
                Tip::SpendingMoreThanEarning,
                Tip::NoGoal,
                Tip::HighCategorySpending(top),
                Tip::NoRecurringRules,
            ]
        );
    }

    #[test]
    fn below_half_of_goal() {
        let tips = budget_tips(&summary(400.0, 0.0), Some(1000.0), None, 1);

        assert_eq!(tips, [Tip::BelowHalfOfGoal]);
    }

    #[test]
    fn zero_goal_counts_as_set() {
        let tips = budget_tips(&summary(0.0, 0.0), Some(0.0), None, 1);

        assert!(tips.is_empty(), "want no tips, got {tips:?}");
    }

    #[test]
    fn top_category_at_exactly_forty_percent_is_fine() {
        let top = CategoryTotal {
            category: ExpenseCategory::Shopping,
            total: 40.0,
        };

        let tips = budget_tips(&summary(1000.0, 100.0), Some(10.0), Some(&top), 1);

        assert!(tips.is_empty(), "want no tips, got {tips:?}");
    }

    #[test]
    fn category_tip_mentions_category_and_total() {
        let tip = Tip::HighCategorySpending(CategoryTotal {
            category: ExpenseCategory::Transport,
            total: 120.5,
        });

        assert_eq!(
            tip.message(),
            "You are spending a lot on Transport ($120.50). Try to optimize it."
        );
    }
}
