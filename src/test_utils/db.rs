use rusqlite::Connection;

use crate::{
    auth::{PasswordHash, UserID, create_user},
    db::initialize,
};

/// An in-memory database with every table created and one user, "alice".
pub(crate) fn get_test_connection_with_user() -> (Connection, UserID) {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");
    let user_id = create_test_user(&connection, "alice");

    (connection, user_id)
}

#[track_caller]
pub(crate) fn create_test_user(connection: &Connection, username: &str) -> UserID {
    create_user(username, PasswordHash::new_unchecked("hunter2"), connection)
        .expect("Could not create test user")
        .id
}

/// Insert a weekly $100 "Salary" rule for `owner_id` that has never been applied.
#[track_caller]
pub(crate) fn seed_weekly_income_rule(connection: &Connection, owner_id: i64, start_date: &str) {
    connection
        .execute(
            "INSERT INTO recurring_rule (owner_id, kind, amount, source, frequency, start_date)
             VALUES (?1, 'income', 100.0, 'Salary', 'weekly', ?2)",
            (owner_id, start_date),
        )
        .expect("Could not insert recurring rule");
}
