//! The recurring rule model and its database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, types::ToSql, types::ToSqlOutput};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::DatabaseId,
    transaction::{Descriptor, ExpenseCategory, TransactionKind, validate_amount},
};

/// How often a recurring rule produces a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Once per calendar day.
    Daily,
    /// Once every seven days.
    Weekly,
    /// Once per calendar month.
    Monthly,
}

impl Frequency {
    /// Every frequency, in the order they are shown to the user.
    pub const ALL: [Frequency; 3] = [Frequency::Daily, Frequency::Weekly, Frequency::Monthly];

    /// The lowercase name used in the database and in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::ALL
            .into_iter()
            .find(|frequency| frequency.as_str() == s)
            .ok_or_else(|| Error::InvalidFrequency(s.to_owned()))
    }
}

impl ToSql for Frequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// A recurring rule as it is stored.
///
/// The frequency and dates are kept as the raw stored text, they are only
/// interpreted when the rule is checked for being due.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRule {
    /// The ID of the rule.
    pub id: DatabaseId,
    /// The user the rule belongs to.
    pub owner: UserID,
    /// The amount of each generated transaction.
    pub amount: f64,
    /// What each generated transaction is for.
    pub descriptor: Descriptor,
    /// One of "daily", "weekly" or "monthly".
    pub frequency: String,
    /// The first date the rule applies from, as `YYYY-MM-DD`.
    pub start_date: String,
    /// When the rule last produced a transaction, as `YYYY-MM-DD`.
    pub last_applied: Option<String>,
}

/// A rule that could not be read, checked or applied.
#[derive(Debug, PartialEq)]
pub struct RuleFailure {
    /// The ID of the rule.
    pub rule_id: DatabaseId,
    /// What went wrong.
    pub error: Error,
}

/// A validated recurring rule that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurringRule {
    /// The user the rule belongs to.
    pub owner: UserID,
    /// The amount of each generated transaction.
    pub amount: f64,
    /// What each generated transaction is for.
    pub descriptor: Descriptor,
    /// How often the rule produces a transaction.
    pub frequency: Frequency,
    /// The date the rule counts from.
    pub start_date: Date,
}

impl NewRecurringRule {
    /// Validate the fields of a recurring rule entered by a user.
    ///
    /// Unlike transactions, the start date may be in the future.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `amount` is not greater than zero or
    /// [Error::EmptySource] if an income source is blank.
    pub fn new(
        owner: UserID,
        amount: f64,
        descriptor: Descriptor,
        frequency: Frequency,
        start_date: Date,
    ) -> Result<Self, Error> {
        validate_amount(amount)?;

        let descriptor = match descriptor {
            Descriptor::Income { source } if source.trim().is_empty() => {
                return Err(Error::EmptySource);
            }
            Descriptor::Income { source } => Descriptor::Income {
                source: source.trim().to_owned(),
            },
            Descriptor::Expense { category, note } => Descriptor::Expense {
                category,
                note: note.trim().to_owned(),
            },
        };

        Ok(Self {
            owner,
            amount,
            descriptor,
            frequency,
            start_date,
        })
    }
}

/// Create the recurring rule table.
///
/// Income rules must have a source and expense rules must have a category.
///
/// # Errors
/// Returns an error if the SQL query failed.
pub fn create_recurring_rule_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS recurring_rule (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                amount REAL NOT NULL,
                source TEXT,
                category TEXT,
                note TEXT,
                frequency TEXT NOT NULL,
                start_date TEXT NOT NULL,
                last_applied TEXT,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                CHECK (
                    (kind = 'income' AND source IS NOT NULL)
                    OR (kind = 'expense' AND category IS NOT NULL)
                )
            );
        CREATE INDEX IF NOT EXISTS idx_recurring_rule_owner_kind ON recurring_rule(owner_id, kind);",
    )
}

/// Save a new recurring rule and return its ID.
///
/// # Errors
/// Returns [Error::NotFound] if the owner is not a registered user or
/// [Error::SqlError] for any other SQL error.
pub fn create_recurring_rule(
    rule: &NewRecurringRule,
    connection: &Connection,
) -> Result<DatabaseId, Error> {
    let (source, category, note) = match &rule.descriptor {
        Descriptor::Income { source } => (Some(source.as_str()), None, None),
        Descriptor::Expense { category, note } => (None, Some(*category), Some(note.as_str())),
    };

    connection
        .query_row(
            "INSERT INTO recurring_rule
                (owner_id, kind, amount, source, category, note, frequency, start_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id",
            (
                rule.owner.as_i64(),
                rule.descriptor.kind().as_str(),
                rule.amount,
                source,
                category,
                note,
                rule.frequency,
                rule.start_date,
            ),
            |row| row.get(0),
        )
        .map_err(|error| match error {
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

/// Get the recurring rules of `owner` that produce `kind` transactions, oldest first.
///
/// Each row is decoded on its own, a row with an unknown category or a bad
/// amount becomes a [RuleFailure] and the other rows are still returned.
///
/// # Errors
/// Returns [Error::SqlError] if the query failed.
pub fn get_recurring_rule_rows(
    owner: UserID,
    kind: TransactionKind,
    connection: &Connection,
) -> Result<Vec<Result<StoredRule, RuleFailure>>, Error> {
    connection
        .prepare(
            "SELECT id, owner_id, kind, amount, source, category, note, frequency, start_date,
                last_applied
             FROM recurring_rule
             WHERE owner_id = ?1 AND kind = ?2
             ORDER BY id ASC",
        )?
        .query_map((owner.as_i64(), kind.as_str()), |row| {
            let rule_id = row.get(0)?;

            Ok(map_rule_row(row).map_err(|error| RuleFailure {
                rule_id,
                error: decode_error(error),
            }))
        })?
        .map(|maybe_rule| maybe_rule.map_err(Error::from))
        .collect()
}

/// Get the readable recurring rules of `owner` that produce `kind` transactions, oldest first.
///
/// Rows that cannot be decoded are logged and left out.
///
/// # Errors
/// Returns [Error::SqlError] if the query failed.
pub fn get_recurring_rules(
    owner: UserID,
    kind: TransactionKind,
    connection: &Connection,
) -> Result<Vec<StoredRule>, Error> {
    let rules = get_recurring_rule_rows(owner, kind, connection)?
        .into_iter()
        .filter_map(|maybe_rule| {
            maybe_rule
                .inspect_err(|failure| {
                    tracing::warn!(
                        "Could not read recurring rule {}: {}",
                        failure.rule_id,
                        failure.error
                    )
                })
                .ok()
        })
        .collect();

    Ok(rules)
}

/// Set the date a rule last produced a transaction.
///
/// # Errors
/// Returns [Error::NotFound] if there is no rule with `rule_id`.
pub fn set_last_applied(
    rule_id: DatabaseId,
    date: Date,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE recurring_rule SET last_applied = ?1 WHERE id = ?2",
        (date, rule_id),
    )?;

    if rows_affected == 1 {
        Ok(())
    } else {
        Err(Error::NotFound)
    }
}

/// Delete the rule `rule_id` owned by `owner`.
///
/// Transactions the rule already produced are kept.
///
/// # Errors
/// Returns [Error::NotFound] if `owner` has no rule with `rule_id`.
pub fn delete_recurring_rule(
    rule_id: DatabaseId,
    owner: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM recurring_rule WHERE id = ?1 AND owner_id = ?2",
        (rule_id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Count the recurring rules of `owner`.
pub fn count_recurring_rules(owner: UserID, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(*) FROM recurring_rule WHERE owner_id = ?1",
            [owner.as_i64()],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Unwrap app errors, such as an unknown category, raised while decoding a column.
fn decode_error(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::FromSqlConversionFailure(column, value_type, cause) => {
            match cause.downcast::<Error>() {
                Ok(error) => *error,
                Err(cause) => {
                    rusqlite::Error::FromSqlConversionFailure(column, value_type, cause).into()
                }
            }
        }
        error => error.into(),
    }
}

fn map_rule_row(row: &Row) -> Result<StoredRule, rusqlite::Error> {
    let kind: String = row.get(2)?;
    let descriptor = if kind == TransactionKind::Income.as_str() {
        Descriptor::Income {
            source: row.get(4)?,
        }
    } else {
        Descriptor::Expense {
            category: row.get::<_, ExpenseCategory>(5)?,
            note: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        }
    };

    Ok(StoredRule {
        id: row.get(0)?,
        owner: UserID::new(row.get(1)?),
        amount: row.get(3)?,
        descriptor,
        frequency: row.get(7)?,
        start_date: row.get(8)?,
        last_applied: row.get(9)?,
    })
}
