//! Totals over a user's income and expenses.

use rusqlite::Connection;

use crate::{
    Error,
    auth::UserID,
    transaction::{Expense, ExpenseCategory, Income},
};

/// Total income, total expenses and what is left over.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expense: f64,
    /// Income minus expenses.
    pub balance: f64,
}

impl Summary {
    fn new(total_income: f64, total_expense: f64) -> Self {
        Self {
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }

    /// Summarise already loaded transactions, e.g. one month's worth for a report.
    pub fn from_transactions(income: &[Income], expenses: &[Expense]) -> Self {
        Self::new(
            income.iter().map(|row| row.amount).sum(),
            expenses.iter().map(|row| row.amount).sum(),
        )
    }
}

/// The total spent in one expense category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTotal {
    /// The expense category being totalled.
    pub category: ExpenseCategory,
    /// The sum of the expenses in `category`.
    pub total: f64,
}

/// Get the all time totals of `owner`.
///
/// # Errors
/// Returns [Error::SqlError] if the query failed.
pub fn get_summary(owner: UserID, connection: &Connection) -> Result<Summary, Error> {
    let (total_income, total_expense): (f64, f64) = connection.query_row(
        "SELECT
            (SELECT COALESCE(SUM(amount), 0.0) FROM income WHERE owner_id = ?1),
            (SELECT COALESCE(SUM(amount), 0.0) FROM expense WHERE owner_id = ?1)",
        [owner.as_i64()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(Summary::new(total_income, total_expense))
}

/// Get how much `owner` has spent per category, largest total first.
///
/// Categories without expenses are left out.
///
/// # Errors
/// Returns [Error::SqlError] if the query failed.
pub fn get_expense_by_category(
    owner: UserID,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(
            "SELECT category, SUM(amount) AS total FROM expense
             WHERE owner_id = ?1
             GROUP BY category
             ORDER BY total DESC, category ASC",
        )?
        .query_map([owner.as_i64()], |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}
