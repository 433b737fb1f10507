//! Creates the application's tables.

use rusqlite::Connection;

use crate::{
    Error, auth::create_user_table, recurring::create_recurring_rule_table,
    summary::create_savings_goal_table, transaction::create_transaction_tables,
};

/// Create all the tables needed by the application if they do not exist yet.
///
/// The tables are created inside a single transaction, so either all of them
/// exist afterwards or none of the new ones do.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_transaction_tables(&transaction)?;
    create_recurring_rule_table(&transaction)?;
    create_savings_goal_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
