//! Defines the core data models and database queries for income and expenses.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserID, database_id::DatabaseId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The lowercase name used in the database and in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidKind(other.to_owned())),
        }
    }
}

/// The fixed set of categories an expense can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    /// Groceries, eating out, etc.
    Food,
    /// Fuel, public transport, etc.
    Transport,
    /// Rent or mortgage payments.
    Rent,
    /// Clothes, gadgets, etc.
    Shopping,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// Every category, in the order they are shown to the user.
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Food,
        ExpenseCategory::Transport,
        ExpenseCategory::Rent,
        ExpenseCategory::Shopping,
        ExpenseCategory::Other,
    ];

    /// The category's display name, which is also how it is stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Transport => "Transport",
            ExpenseCategory::Rent => "Rent",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Other => "Other",
        }
    }
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpenseCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::InvalidCategory(s.to_owned()))
    }
}

impl ToSql for ExpenseCategory {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ExpenseCategory {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// What a transaction was for.
///
/// Income records where the money came from, expenses record a category and
/// an optional free text note.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    /// Money earned from `source`, e.g. "Salary".
    Income {
        /// Where the money came from.
        source: String,
    },
    /// Money spent.
    Expense {
        /// The category the expense is filed under.
        category: ExpenseCategory,
        /// Extra details, may be empty.
        note: String,
    },
}

impl Descriptor {
    /// Whether this describes income or an expense.
    pub fn kind(&self) -> TransactionKind {
        match self {
            Descriptor::Income { .. } => TransactionKind::Income,
            Descriptor::Expense { .. } => TransactionKind::Expense,
        }
    }
}

/// A validated income or expense that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The user the transaction belongs to.
    pub owner: UserID,
    /// How much money was earned or spent, always positive.
    pub amount: f64,
    /// What the transaction was for.
    pub descriptor: Descriptor,
    /// When the transaction happened.
    pub date: Date,
}

impl NewTransaction {
    /// Validate the fields of a transaction entered by a user.
    ///
    /// The income source is trimmed of surrounding whitespace.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::InvalidAmount] if `amount` is not a finite number greater than zero,
    /// - [Error::FutureDate] if `date` is after `today`,
    /// - [Error::EmptySource] if an income source is blank.
    pub fn new(
        owner: UserID,
        amount: f64,
        descriptor: Descriptor,
        date: Date,
        today: Date,
    ) -> Result<Self, Error> {
        validate_amount(amount)?;

        if date > today {
            return Err(Error::FutureDate(date));
        }

        let descriptor = match descriptor {
            Descriptor::Income { source } => {
                let source = source.trim();

                if source.is_empty() {
                    return Err(Error::EmptySource);
                }

                Descriptor::Income {
                    source: source.to_owned(),
                }
            }
            Descriptor::Expense { category, note } => Descriptor::Expense {
                category,
                note: note.trim().to_owned(),
            },
        };

        Ok(Self {
            owner,
            amount,
            descriptor,
            date,
        })
    }
}

/// Check that `amount` is a finite number greater than zero.
///
/// # Errors
/// Returns [Error::InvalidAmount] otherwise.
pub fn validate_amount(amount: f64) -> Result<(), Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidAmount(amount))
    }
}

/// A saved income entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Income {
    /// The ID of the income entry.
    pub id: DatabaseId,
    /// How much was earned.
    pub amount: f64,
    /// Where the money came from.
    pub source: String,
    /// When the money was earned.
    pub date: Date,
}

/// A saved expense.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// The ID of the expense.
    pub id: DatabaseId,
    /// How much was spent.
    pub amount: f64,
    /// The category the expense is filed under.
    pub category: ExpenseCategory,
    /// Extra details, may be empty.
    pub note: String,
    /// When the money was spent.
    pub date: Date,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the income and expense tables.
///
/// # Errors
/// Returns an error if the SQL queries failed.
pub fn create_transaction_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS income (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                source TEXT NOT NULL,
                date TEXT NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
            );
        CREATE INDEX IF NOT EXISTS idx_income_owner_date ON income(owner_id, date);

        CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
            );
        CREATE INDEX IF NOT EXISTS idx_expense_owner_date ON expense(owner_id, date);",
    )
}

/// Save a new income entry or expense, depending on its descriptor.
///
/// Returns the ID of the new row.
///
/// # Errors
/// Returns:
/// - [Error::NotFound] if the owner does not refer to a registered user,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<DatabaseId, Error> {
    let owner_id = transaction.owner.as_i64();

    let result = match &transaction.descriptor {
        Descriptor::Income { source } => connection.query_row(
            "INSERT INTO income (owner_id, amount, source, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
            (owner_id, transaction.amount, source, transaction.date),
            |row| row.get(0),
        ),
        Descriptor::Expense { category, note } => connection.query_row(
            "INSERT INTO expense (owner_id, amount, category, note, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
            (owner_id, transaction.amount, category, note, transaction.date),
            |row| row.get(0),
        ),
    };

    result.map_err(|error| match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::NotFound,
        error => error.into(),
    })
}

pub(crate) fn map_income_row(row: &Row) -> Result<Income, rusqlite::Error> {
    Ok(Income {
        id: row.get(0)?,
        amount: row.get(1)?,
        source: row.get(2)?,
        date: row.get(3)?,
    })
}

pub(crate) fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        category: row.get(2)?,
        note: row.get(3)?,
        date: row.get(4)?,
    })
}

#[cfg(test)]
mod model_tests {
    use time::macros::date;

    use crate::{Error, auth::UserID};

    use super::{Descriptor, ExpenseCategory, NewTransaction, TransactionKind};

    const TODAY: time::Date = date!(2024 - 06 - 08);

    fn salary() -> Descriptor {
        Descriptor::Income {
            source: "Salary".to_owned(),
        }
    }

    #[test]
    fn new_transaction_accepts_valid_income() {
        let transaction = NewTransaction::new(UserID::new(1), 100.0, salary(), TODAY, TODAY);

        assert!(transaction.is_ok());
    }

    #[test]
    fn new_transaction_rejects_non_positive_amounts() {
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = NewTransaction::new(UserID::new(1), amount, salary(), TODAY, TODAY);

            assert!(
                matches!(result, Err(Error::InvalidAmount(_))),
                "want InvalidAmount for {amount}, got {result:?}"
            );
        }
    }

    #[test]
    fn new_transaction_rejects_future_date() {
        let tomorrow = date!(2024 - 06 - 09);

        let result = NewTransaction::new(UserID::new(1), 1.0, salary(), tomorrow, TODAY);

        assert_eq!(result, Err(Error::FutureDate(tomorrow)));
    }

    #[test]
    fn new_transaction_rejects_blank_source() {
        let descriptor = Descriptor::Income {
            source: "   ".to_owned(),
        };

        let result = NewTransaction::new(UserID::new(1), 1.0, descriptor, TODAY, TODAY);

        assert_eq!(result, Err(Error::EmptySource));
    }

    #[test]
    fn expense_note_may_be_empty() {
        let descriptor = Descriptor::Expense {
            category: ExpenseCategory::Food,
            note: String::new(),
        };

        let transaction =
            NewTransaction::new(UserID::new(1), 12.5, descriptor, TODAY, TODAY).unwrap();

        assert_eq!(transaction.descriptor.kind(), TransactionKind::Expense);
    }

    #[test]
    fn parses_categories_by_name() {
        for category in ExpenseCategory::ALL {
            assert_eq!(category.as_str().parse(), Ok(category));
        }

        assert_eq!(
            "Fun".parse::<ExpenseCategory>(),
            Err(Error::InvalidCategory("Fun".to_owned()))
        );
    }

    #[test]
    fn parses_transaction_kinds() {
        assert_eq!("income".parse(), Ok(TransactionKind::Income));
        assert_eq!("expense".parse(), Ok(TransactionKind::Expense));
        assert_eq!(
            "transfer".parse::<TransactionKind>(),
            Err(Error::InvalidKind("transfer".to_owned()))
        );
    }
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, auth::UserID, test_utils::get_test_connection_with_user};

    use super::{Descriptor, ExpenseCategory, NewTransaction, create_transaction};

    #[test]
    fn create_income_returns_new_id() {
        let (connection, owner) = get_test_connection_with_user();
        let income = NewTransaction {
            owner,
            amount: 1500.0,
            descriptor: Descriptor::Income {
                source: "Salary".to_owned(),
            },
            date: date!(2024 - 06 - 01),
        };

        let first_id = create_transaction(&income, &connection).unwrap();
        let second_id = create_transaction(&income, &connection).unwrap();

        assert_eq!(first_id, 1);
        assert_eq!(second_id, 2);
        assert_eq!(count_rows(&connection, "income"), 2);
        assert_eq!(count_rows(&connection, "expense"), 0);
    }

    #[test]
    fn create_expense_stores_category_and_note() {
        let (connection, owner) = get_test_connection_with_user();
        let expense = NewTransaction {
            owner,
            amount: 42.0,
            descriptor: Descriptor::Expense {
                category: ExpenseCategory::Transport,
                note: "Bus pass".to_owned(),
            },
            date: date!(2024 - 06 - 01),
        };

        create_transaction(&expense, &connection).unwrap();

        let (category, note, date): (String, String, String) = connection
            .query_row("SELECT category, note, date FROM expense", [], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .unwrap();
        assert_eq!(category, "Transport");
        assert_eq!(note, "Bus pass");
        assert_eq!(date, "2024-06-01");
    }

    #[test]
    fn create_transaction_fails_for_unknown_owner() {
        let (connection, _) = get_test_connection_with_user();
        let income = NewTransaction {
            owner: UserID::new(999),
            amount: 1.0,
            descriptor: Descriptor::Income {
                source: "Gift".to_owned(),
            },
            date: date!(2024 - 06 - 01),
        };

        let result = create_transaction(&income, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    fn count_rows(connection: &Connection, table: &str) -> i64 {
        connection
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .unwrap()
    }
}
