//! Route handlers for reading and updating the logged in user's profile.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, ApiResponse, Error,
    auth::{
        UserID,
        user::{ProfileUpdate, get_user_by_id, update_profile},
    },
};

/// The state needed for the profile handlers.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The database connection for reading and updating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for the logged in user's profile.
pub async fn get_profile(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;

    Ok(ApiResponse::ok(user).into_response())
}

/// A route handler for updating the logged in user's profile.
///
/// Only fields that are present and not blank are changed.
pub async fn put_profile(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = update_profile(user_id, &update, &connection)?;

    Ok(ApiResponse::ok(user)
        .with_message("Your profile was updated.")
        .into_response())
}

#[cfg(test)]
mod profile_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::State,
        http::StatusCode,
    };

    use crate::{
        Error,
        auth::{
            UserID,
            profile::{ProfileState, get_profile, put_profile},
            user::ProfileUpdate,
        },
        test_utils::{get_test_connection_with_user, parse_json_body},
    };

    fn get_state() -> (ProfileState, UserID) {
        let (conn, user_id) = get_test_connection_with_user();

        (
            ProfileState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user_id,
        )
    }

    #[tokio::test]
    async fn get_profile_returns_user() {
        let (state, user_id) = get_state();

        let response = get_profile(State(state), Extension(user_id)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_json_body(response).await;
        assert_eq!(body["data"]["email"], "test@example.com");
        assert_eq!(body["data"]["id"], user_id.as_i64());
    }

    #[tokio::test]
    async fn get_profile_of_deleted_user_is_not_found() {
        let (state, user_id) = get_state();

        let result = get_profile(State(state), Extension(UserID::new(user_id.as_i64() + 1))).await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }

    #[tokio::test]
    async fn put_profile_updates_given_fields() {
        let (state, user_id) = get_state();

        let response = put_profile(
            State(state.clone()),
            Extension(user_id),
            Json(ProfileUpdate {
                phone: Some("010-1111-2222".to_owned()),
                name: Some("  ".to_owned()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        let body = parse_json_body(response).await;
        assert_eq!(body["data"]["phone"], "010-1111-2222");
        assert_eq!(body["data"]["name"], "Test User");
        assert_eq!(body["message"], "Your profile was updated.");
    }
}
