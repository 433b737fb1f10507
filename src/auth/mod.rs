//! User accounts, password handling and cookie based authentication.

mod cookie;
mod forgot_password;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register_user;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use forgot_password::get_forgot_password_page;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::{get_register_page, register_user};
pub use user::{
    User, UserID, create_user, create_user_table, get_user_by_id, get_user_by_username,
    update_password,
};

use redirect::{build_log_in_redirect_url, normalize_redirect_url};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
