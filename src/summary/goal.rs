//! The savings goal: storage and progress towards it.

use rusqlite::{Connection, OptionalExtension};

use crate::{Error, auth::UserID};

/// Create the savings goal table, one goal per user.
///
/// # Errors
/// Returns an error if the SQL query failed.
pub fn create_savings_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS savings_goal (
                owner_id INTEGER PRIMARY KEY,
                amount REAL NOT NULL,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
            )",
        (),
    )?;

    Ok(())
}

/// Get the savings goal of `owner`, `None` if they have not set one.
///
/// # Errors
/// Returns [Error::SqlError] if the query failed.
pub fn get_savings_goal(owner: UserID, connection: &Connection) -> Result<Option<f64>, Error> {
    connection
        .query_row(
            "SELECT amount FROM savings_goal WHERE owner_id = ?1",
            [owner.as_i64()],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
}

/// Set the savings goal of `owner`, replacing any previous goal.
///
/// A goal of zero is allowed and hides the goal progress.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `amount` is negative or not a number,
/// [Error::NotFound] if `owner` is not a registered user, or
/// [Error::SqlError] for other SQL errors.
pub fn set_savings_goal(owner: UserID, amount: f64, connection: &Connection) -> Result<(), Error> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount(amount));
    }

    connection
        .execute(
            "INSERT INTO savings_goal (owner_id, amount) VALUES (?1, ?2)
             ON CONFLICT(owner_id) DO UPDATE SET amount = excluded.amount",
            (owner.as_i64(), amount),
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
        })?;

    Ok(())
}

/// How the balance compares to the savings goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GoalProgress {
    /// The balance is negative.
    Overspent,
    /// The balance is at least the goal.
    Reached,
    /// The fraction of the goal saved so far, in `[0, 1)`.
    InProgress(f64),
}

/// Compare `balance` to `goal`.
///
/// Returns `None` when there is no goal to compare to, i.e. the goal is unset or zero.
pub fn goal_progress(balance: f64, goal: Option<f64>) -> Option<GoalProgress> {
    let goal = goal.filter(|goal| *goal != 0.0)?;
    let progress = balance / goal;

    let progress = if progress < 0.0 {
        GoalProgress::Overspent
    } else if progress >= 1.0 {
        GoalProgress::Reached
    } else {
        GoalProgress::InProgress(progress)
    };

    Some(progress)
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        auth::UserID,
        test_utils::{create_test_user, get_test_connection_with_user},
    };

    use super::{GoalProgress, get_savings_goal, goal_progress, set_savings_goal};

    #[test]
    fn goal_is_unset_by_default() {
        let (connection, owner) = get_test_connection_with_user();

        assert_eq!(get_savings_goal(owner, &connection), Ok(None));
    }

    #[test]
    fn set_goal_replaces_previous_goal() {
        let (connection, owner) = get_test_connection_with_user();
        let other = create_test_user(&connection, "other");

        set_savings_goal(owner, 500.0, &connection).unwrap();
        set_savings_goal(owner, 750.0, &connection).unwrap();
        set_savings_goal(other, 10.0, &connection).unwrap();

        assert_eq!(get_savings_goal(owner, &connection), Ok(Some(750.0)));
    }

    #[test]
    fn set_goal_rejects_negative_amount() {
        let (connection, owner) = get_test_connection_with_user();

        assert_eq!(
            set_savings_goal(owner, -1.0, &connection),
            Err(Error::InvalidAmount(-1.0))
        );
    }

    #[test]
    fn set_goal_fails_for_unknown_user() {
        let (connection, _) = get_test_connection_with_user();

        assert_eq!(
            set_savings_goal(UserID::new(404), 1.0, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn progress_against_goal() {
        assert_eq!(goal_progress(100.0, None), None);
        assert_eq!(goal_progress(100.0, Some(0.0)), None);
        assert_eq!(
            goal_progress(-1.0, Some(100.0)),
            Some(GoalProgress::Overspent)
        );
        assert_eq!(
            goal_progress(100.0, Some(100.0)),
            Some(GoalProgress::Reached)
        );
        assert_eq!(
            goal_progress(25.0, Some(100.0)),
            Some(GoalProgress::InProgress(0.25))
        );
    }
}
