//! Route handlers for logging in and refreshing a session.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, ApiResponse, Error,
    auth::{
        User,
        cookie::{REMEMBER_ME_COOKIE_DURATION, get_token_from_cookies, set_auth_cookie},
        user::{get_user_by_email, get_user_by_id, record_log_in},
    },
};

/// The state needed to log in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session lasts unless the user asks to be remembered.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent by the log-in form.
///
/// The password is a plain string. There is no need for validation here since
/// it is only compared against the stored hash.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInData {
    /// The email address the user registered with.
    pub email: String,
    /// The user's password.
    pub password: String,
    /// Whether the session should last a week instead of a few minutes.
    #[serde(default)]
    pub remember_me: bool,
}

/// The user and when their session ends.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The logged in user.
    pub user: User,
    /// When the session cookie expires unless it is extended.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

fn start_session(
    jar: PrivateCookieJar,
    user: User,
    duration: Duration,
) -> Result<(PrivateCookieJar, Session), Error> {
    let jar = set_auth_cookie(jar, user.id, duration)?;
    let expires_at = get_token_from_cookies(&jar)?.expires_at;

    Ok((jar, Session { user, expires_at }))
}

/// Handler for log-in requests.
///
/// On success the session cookie is set and the user is returned.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if no user has the email address or the
/// password is wrong. Unknown emails and wrong passwords are indistinguishable
/// to the client.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Json(credentials): Json<LogInData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let mut user = match get_user_by_email(&credentials.email, &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    if !user.password_hash.verify(&credentials.password)? {
        return Err(Error::InvalidCredentials);
    }

    let logged_in_at = OffsetDateTime::now_utc();
    record_log_in(user.id, logged_in_at, &connection)?;
    user.last_login_at = Some(logged_in_at);

    let cookie_duration = if credentials.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    tracing::info!("user {} logged in", user.id);
    let (jar, session) = start_session(jar, user, cookie_duration)?;

    Ok((jar, ApiResponse::ok(session).with_message("Logged in.")).into_response())
}

/// Handler for issuing a fresh session cookie to a logged in user.
///
/// # Errors
///
/// Returns [Error::Unauthorized] if the current session is missing or expired,
/// or if its user no longer exists.
pub async fn post_refresh_token(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let token = get_token_from_cookies(&jar)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_id(token.user_id, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::Unauthorized),
            Err(error) => return Err(error),
        }
    };

    let (jar, session) = start_session(jar, user, state.cookie_duration)?;

    Ok((jar, ApiResponse::ok(session)).into_response())
}
