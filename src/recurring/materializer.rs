//! Materializes due recurring rules into concrete income and expense transactions.
//!
//! Each rule is checked against its reference date, the date it last applied
//! or its start date if it has never applied. A due rule produces exactly one
//! transaction dated today and its `last_applied` date is moved to today, so
//! running the materializer again on the same day does nothing. Missed
//! periods are not backfilled.
//!
//! Rules are processed independently: a rule with unreadable stored values or
//! a failed write is logged and reported, and the remaining rules are still
//! applied.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::DatabaseId,
    recurring::{
        RuleFailure, StoredRule,
        core::{get_recurring_rule_rows, set_last_applied},
        due::rule_is_due,
    },
    transaction::{NewTransaction, TransactionKind, create_transaction},
};

/// Storage for recurring rules and the transactions they produce.
pub trait RecurringStore {
    /// Get the rules of `owner` that produce `kind` transactions.
    ///
    /// A rule whose stored values cannot be read is returned as a [RuleFailure]
    /// in its place, so the others can still be applied.
    fn list_recurring_rules(
        &mut self,
        owner: UserID,
        kind: TransactionKind,
    ) -> Result<Vec<Result<StoredRule, RuleFailure>>, Error>;

    /// Save a transaction.
    fn insert_transaction(&mut self, transaction: &NewTransaction) -> Result<(), Error>;

    /// Move the `last_applied` date of the rule `rule_id` to `date`.
    fn update_rule_last_applied(&mut self, rule_id: DatabaseId, date: Date) -> Result<(), Error>;

    /// Save the transaction `rule` produces on `today` and mark the rule as applied on `today`.
    ///
    /// Stores that support transactions should override this so that either
    /// both writes happen or neither does.
    fn apply_occurrence(&mut self, rule: &StoredRule, today: Date) -> Result<(), Error> {
        self.insert_transaction(&occurrence(rule, today))?;
        self.update_rule_last_applied(rule.id, today)
    }
}

/// The transaction a rule produces on `date`.
pub fn occurrence(rule: &StoredRule, date: Date) -> NewTransaction {
    NewTransaction {
        owner: rule.owner,
        amount: rule.amount,
        descriptor: rule.descriptor.clone(),
        date,
    }
}

/// The outcome of one materializer run.
#[derive(Debug, Default, PartialEq)]
pub struct MaterializeReport {
    /// The IDs of the rules that produced a transaction.
    pub applied: Vec<DatabaseId>,
    /// The rules that were skipped because of an error.
    pub failed: Vec<RuleFailure>,
}

/// Apply every recurring rule of `owner` that is due on `today`.
///
/// Income rules are processed before expense rules.
///
/// # Errors
/// Returns an error only if the rules could not be listed. Errors for
/// individual rules are collected in [MaterializeReport::failed].
pub fn materialize_due<S>(
    store: &mut S,
    owner: UserID,
    today: Date,
) -> Result<MaterializeReport, Error>
where
    S: RecurringStore + ?Sized,
{
    let mut report = MaterializeReport::default();

    for kind in [TransactionKind::Income, TransactionKind::Expense] {
        for maybe_rule in store.list_recurring_rules(owner, kind)? {
            let rule = match maybe_rule {
                Ok(rule) => rule,
                Err(failure) => {
                    tracing::warn!(
                        "Skipping unreadable recurring rule {}: {}",
                        failure.rule_id,
                        failure.error
                    );
                    report.failed.push(failure);
                    continue;
                }
            };

            match rule_is_due(&rule, today) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    tracing::warn!("Skipping recurring rule {}: {error}", rule.id);
                    report.failed.push(RuleFailure {
                        rule_id: rule.id,
                        error,
                    });
                    continue;
                }
            }

            match store.apply_occurrence(&rule, today) {
                Ok(()) => {
                    tracing::debug!("Applied {kind} rule {} for {today}", rule.id);
                    report.applied.push(rule.id);
                }
                Err(error) => {
                    tracing::error!("Could not apply recurring rule {}: {error}", rule.id);
                    report.failed.push(RuleFailure {
                        rule_id: rule.id,
                        error,
                    });
                }
            }
        }
    }

    Ok(report)
}

/// A [RecurringStore] backed by the application's SQLite database.
pub struct SqliteRecurringStore<'a> {
    connection: &'a Connection,
}

impl<'a> SqliteRecurringStore<'a> {
    /// Create a store that reads and writes through `connection`.
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }
}

impl RecurringStore for SqliteRecurringStore<'_> {
    fn list_recurring_rules(
        &mut self,
        owner: UserID,
        kind: TransactionKind,
    ) -> Result<Vec<Result<StoredRule, RuleFailure>>, Error> {
        get_recurring_rule_rows(owner, kind, self.connection)
    }

    fn insert_transaction(&mut self, transaction: &NewTransaction) -> Result<(), Error> {
        create_transaction(transaction, self.connection).map(|_| ())
    }

    fn update_rule_last_applied(&mut self, rule_id: DatabaseId, date: Date) -> Result<(), Error> {
        set_last_applied(rule_id, date, self.connection)
    }

    fn apply_occurrence(&mut self, rule: &StoredRule, today: Date) -> Result<(), Error> {
        // Rolled back on drop if either write fails.
        let transaction = self.connection.unchecked_transaction()?;

        create_transaction(&occurrence(rule, today), &transaction)?;
        set_last_applied(rule.id, today, &transaction)?;

        transaction.commit()?;

        Ok(())
    }
}

/// Apply the due recurring rules of `owner` stored in `connection`.
///
/// The caller holds the database lock for the whole run, so concurrent
/// sessions of the same user cannot apply a rule twice.
///
/// # Errors
/// Returns an error if the rules could not be listed.
pub fn apply_due_rules(
    connection: &Connection,
    owner: UserID,
    today: Date,
) -> Result<MaterializeReport, Error> {
    let report = materialize_due(&mut SqliteRecurringStore::new(connection), owner, today)?;

    if !report.applied.is_empty() || !report.failed.is_empty() {
        tracing::info!(
            "Recurring rules for user {owner} on {today}: {} applied, {} failed",
            report.applied.len(),
            report.failed.len()
        );
    }

    Ok(report)
}
