//! Income and expenses: the model, storage, entry forms, the filtered listing and CSV export.

mod core;
mod create_endpoint;
mod create_page;
mod export;
mod filter;
mod transactions_page;

pub use core::{
    Descriptor, Expense, ExpenseCategory, Income, NewTransaction, TransactionKind,
    create_transaction, create_transaction_tables, validate_amount,
};
pub(crate) use create_page::{amount_and_date_inputs, category_select};
pub use create_endpoint::{create_expense_endpoint, create_income_endpoint};
pub use create_page::{get_new_expense_page, get_new_income_page};
pub use export::{export_expenses, export_income};
pub use filter::{ALL_CATEGORIES, FilterQuery, TransactionFilter, get_expenses, get_income};
pub use transactions_page::get_transactions_page;
