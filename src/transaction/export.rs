//! Downloads of filtered income and expenses as CSV files.

use axum::{
    Extension,
    extract::{Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::UserID,
    recurring::apply_due_rules,
    timezone::today_in,
    transaction::{
        Expense, FilterQuery, Income, get_expenses, get_income,
        transactions_page::TransactionsViewState,
    },
};

fn write_income_csv(income: &[Income]) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["date", "amount", "source"]).map_err(csv_error)?;

    for row in income {
        writer
            .write_record([
                row.date.to_string(),
                format!("{:.2}", row.amount),
                row.source.clone(),
            ])
            .map_err(csv_error)?;
    }

    into_string(writer)
}

fn write_expense_csv(expenses: &[Expense]) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["date", "amount", "category", "note"])
        .map_err(csv_error)?;

    for row in expenses {
        writer
            .write_record([
                row.date.to_string(),
                format!("{:.2}", row.amount),
                row.category.to_string(),
                row.note.clone(),
            ])
            .map_err(csv_error)?;
    }

    into_string(writer)
}

fn into_string(writer: csv::Writer<Vec<u8>>) -> Result<String, Error> {
    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}

fn csv_error(error: csv::Error) -> Error {
    Error::CsvError(error.to_string())
}

fn csv_attachment(file_name: &str, body: String) -> Response {
    (
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// Download the income matching the filter in the query string as `income.csv`.
pub async fn export_income(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, Error> {
    let filter = query.to_filter()?;
    let today = today_in(&state.local_timezone)?;
    let income = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        if let Err(error) = apply_due_rules(&connection, user_id, today) {
            tracing::error!("Could not apply recurring rules for user {user_id}: {error}");
        }

        get_income(user_id, &filter, &connection)?
    };

    tracing::debug!("exporting {} income rows for user {user_id}", income.len());

    Ok(csv_attachment("income.csv", write_income_csv(&income)?))
}

/// Download the expenses matching the filter in the query string as `expenses.csv`.
pub async fn export_expenses(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, Error> {
    let filter = query.to_filter()?;
    let today = today_in(&state.local_timezone)?;
    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        if let Err(error) = apply_due_rules(&connection, user_id, today) {
            tracing::error!("Could not apply recurring rules for user {user_id}: {error}");
        }

        get_expenses(user_id, &filter, &connection)?
    };

    tracing::debug!("exporting {} expenses for user {user_id}", expenses.len());

    Ok(csv_attachment("expenses.csv", write_expense_csv(&expenses)?))
}
