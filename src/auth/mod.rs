//! Users, passwords and cookie based sessions.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod profile;
mod register;
mod token;
mod user;

pub use cookie::DEFAULT_COOKIE_DURATION;
#[cfg(test)]
pub use cookie::{COOKIE_TOKEN, set_auth_cookie};
pub use log_in::{post_log_in, post_refresh_token};
pub use log_out::post_log_out;
pub use middleware::auth_guard;
#[cfg(test)]
pub use middleware::AuthState;
pub use password::{PasswordHash, ValidatedPassword};
pub(crate) use password::PASSWORD_COST;
pub use profile::{get_profile, put_profile};
pub use register::register_user;
pub use user::{NewUser, User, UserID, create_user_table};
#[cfg(test)]
pub use user::create_user;
pub(crate) use user::insert_user;
