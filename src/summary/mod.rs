//! Totals, the savings goal, budgeting tips and the pages that show them.

mod aggregation;
mod charts;
mod dashboard;
mod goal;
mod goal_endpoint;
mod report;
mod tips;

pub use aggregation::{CategoryTotal, Summary, get_expense_by_category, get_summary};
pub use dashboard::get_dashboard_page;
pub use goal::{
    GoalProgress, create_savings_goal_table, get_savings_goal, goal_progress, set_savings_goal,
};
pub use goal_endpoint::set_goal_endpoint;
pub use report::get_report_page;
pub use tips::{Tip, budget_tips};
