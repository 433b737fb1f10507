//! Recurring income and expenses.
//!
//! A recurring rule is a template that the materializer turns into a concrete
//! transaction whenever the rule is due.

mod core;
mod create_endpoint;
mod create_page;
mod due;
mod list_page;
mod materializer;

pub use core::{
    Frequency, NewRecurringRule, RuleFailure, StoredRule, count_recurring_rules,
    create_recurring_rule, create_recurring_rule_table,
};
pub use create_endpoint::create_recurring_endpoint;
pub use create_page::get_new_recurring_page;
pub use due::is_due;
pub use list_page::{delete_recurring_endpoint, get_recurring_page};
pub use materializer::{
    MaterializeReport, RecurringStore, SqliteRecurringStore, apply_due_rules, materialize_due,
};
