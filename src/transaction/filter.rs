//! Filtering income and expenses by date range and category.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    timezone::parse_date,
    transaction::core::{Expense, ExpenseCategory, Income, map_expense_row, map_income_row},
};

/// The value of the category select that means "every category".
pub const ALL_CATEGORIES: &str = "All";

/// Which transactions to list.
///
/// Date bounds are inclusive. The category only applies to expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransactionFilter {
    /// The earliest date to include.
    pub from: Option<Date>,
    /// The latest date to include.
    pub to: Option<Date>,
    /// Only include expenses in this category.
    pub category: Option<ExpenseCategory>,
}

/// The filter as it appears in the query string of the transactions page and
/// the export links.
///
/// Empty values mean "no filter", so a submitted filter form with blank
/// fields lists everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterQuery {
    /// The earliest date as `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// The latest date as `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// A category name or "All".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl FilterQuery {
    /// Parse the query into a [TransactionFilter].
    ///
    /// # Errors
    /// Returns [Error::MalformedDate] for an unparsable date or
    /// [Error::InvalidCategory] for an unknown category.
    pub fn to_filter(&self) -> Result<TransactionFilter, Error> {
        let from = non_empty(&self.from).map(parse_date).transpose()?;
        let to = non_empty(&self.to).map(parse_date).transpose()?;
        let category = match non_empty(&self.category) {
            None | Some(ALL_CATEGORIES) => None,
            Some(category) => Some(category.parse()?),
        };

        Ok(TransactionFilter { from, to, category })
    }

    /// The query string for this filter, without the leading '?'.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_else(|error| {
            tracing::warn!("could not encode filter query {self:?}: {error}");
            String::new()
        })
    }

    /// Append this filter's query string to `route`.
    pub fn to_url(&self, route: &str) -> String {
        let query_string = self.to_query_string();

        if query_string.is_empty() {
            route.to_owned()
        } else {
            format!("{route}?{query_string}")
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Get the income of `owner` matching `filter`, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if the query failed.
pub fn get_income(
    owner: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Income>, Error> {
    connection
        .prepare(
            "SELECT id, amount, source, date FROM income
             WHERE owner_id = ?1
                AND (?2 IS NULL OR date >= ?2)
                AND (?3 IS NULL OR date <= ?3)
             ORDER BY date DESC, id DESC",
        )?
        .query_map((owner.as_i64(), filter.from, filter.to), map_income_row)?
        .map(|maybe_income| maybe_income.map_err(Error::from))
        .collect()
}

/// Get the expenses of `owner` matching `filter`, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if the query failed.
pub fn get_expenses(
    owner: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, amount, category, note, date FROM expense
             WHERE owner_id = ?1
                AND (?2 IS NULL OR date >= ?2)
                AND (?3 IS NULL OR date <= ?3)
                AND (?4 IS NULL OR category = ?4)
             ORDER BY date DESC, id DESC",
        )?
        .query_map(
            (owner.as_i64(), filter.from, filter.to, filter.category),
            map_expense_row,
        )?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod query_tests {
    use time::macros::date;

    use crate::{Error, transaction::ExpenseCategory};

    use super::{FilterQuery, TransactionFilter};

    fn query(from: &str, to: &str, category: &str) -> FilterQuery {
        FilterQuery {
            from: Some(from.to_owned()),
            to: Some(to.to_owned()),
            category: Some(category.to_owned()),
        }
    }

    #[test]
    fn empty_values_mean_no_filter() {
        let filter = query("", "", "").to_filter().unwrap();

        assert_eq!(filter, TransactionFilter::default());
    }

    #[test]
    fn all_means_no_category_filter() {
        let filter = query("2024-01-01", "2024-01-31", "All").to_filter().unwrap();

        assert_eq!(
            filter,
            TransactionFilter {
                from: Some(date!(2024 - 01 - 01)),
                to: Some(date!(2024 - 01 - 31)),
                category: None,
            }
        );
    }

    #[test]
    fn parses_category() {
        let filter = query("", "", "Rent").to_filter().unwrap();

        assert_eq!(filter.category, Some(ExpenseCategory::Rent));
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            query("soon", "", "").to_filter(),
            Err(Error::MalformedDate("soon".to_owned()))
        );
        assert_eq!(
            query("", "", "Fun").to_filter(),
            Err(Error::InvalidCategory("Fun".to_owned()))
        );
    }

    #[test]
    fn url_omits_missing_values() {
        let query = FilterQuery {
            from: Some("2024-01-01".to_owned()),
            to: None,
            category: Some("Food".to_owned()),
        };

        assert_eq!(
            query.to_url("/transactions"),
            "/transactions?from=2024-01-01&category=Food"
        );
        assert_eq!(FilterQuery::default().to_url("/transactions"), "/transactions");
    }
}
