//! Route handlers for listing, adding and viewing partners.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, ApiResponse, Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    partner::{
        NewPartner, PartnerId, PartnerQuery,
        db::{create_partner, get_partner, get_partner_summaries},
    },
};

/// The state needed for the partner routes.
#[derive(Debug, Clone)]
pub struct PartnerState {
    /// The database connection for managing partners.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PartnerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing the user's partners that match the query string.
pub async fn list_partners_endpoint(
    State(state): State<PartnerState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PartnerQuery>,
) -> Result<Response, Error> {
    let filter = query.parse()?;

    let summaries = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        get_partner_summaries(user_id, &connection)?
    };

    let partners: Vec<_> = summaries
        .into_iter()
        .filter(|summary| filter.matches(&summary.partner))
        .collect();

    Ok(ApiResponse::ok(partners).into_response())
}

/// A route handler for adding a partner, responds with the new partner.
pub async fn create_partner_endpoint(
    State(state): State<PartnerState>,
    Extension(user_id): Extension<UserID>,
    Json(new_partner): Json<NewPartner>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let partner = create_partner(user_id, new_partner, &connection)?;
    let location = format_endpoint(endpoints::PARTNER, partner.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        ApiResponse::ok(partner).with_message("The partner was added."),
    )
        .into_response())
}

/// A route handler for getting one of the user's partners.
pub async fn get_partner_endpoint(
    State(state): State<PartnerState>,
    Extension(user_id): Extension<UserID>,
    Path(partner_id): Path<PartnerId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let partner = get_partner(partner_id, user_id, &connection)?;

    Ok(ApiResponse::ok(partner).into_response())
}
