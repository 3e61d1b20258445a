//! Route handler for registering new users.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, ApiResponse, Error, PasswordHash, ValidatedPassword,
    auth::{
        password::PASSWORD_COST,
        user::{NewUser, create_user},
    },
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The details sent by the registration form.
#[derive(Clone, Deserialize)]
pub struct RegisterForm {
    /// The user's display name.
    #[serde(default)]
    pub name: String,
    /// The email address the user will log in with.
    #[serde(default)]
    pub email: String,
    /// The user's chosen password.
    pub password: String,
    /// The user's phone number.
    pub phone: Option<String>,
    /// The user's postal address.
    pub address: Option<String>,
}

/// Handler for registering a new user.
///
/// Responds with 201 and the new user. Registering does not log the user in.
///
/// # Errors
///
/// This function will return a:
/// - [Error::MissingField] if the name or email is blank,
/// - [Error::TooWeak] if the password is too easy to guess,
/// - [Error::DuplicateEmail] if the email is already registered.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Json(form): Json<RegisterForm>,
) -> Result<Response, Error> {
    if form.name.trim().is_empty() {
        return Err(Error::MissingField("name"));
    }

    if form.email.trim().is_empty() {
        return Err(Error::MissingField("email"));
    }

    let password = ValidatedPassword::new(&form.password)?;
    let password_hash = PasswordHash::new(password, PASSWORD_COST)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(
            NewUser {
                name: form.name,
                email: form.email,
                password_hash,
                phone: form.phone,
                address: form.address,
            },
            &connection,
        )?
    };

    tracing::info!("registered user {}", user.id);

    Ok(ApiResponse::ok(user)
        .with_message("Your account was created.")
        .into_response_with_status(StatusCode::CREATED))
}
