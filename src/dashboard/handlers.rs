//! Dashboard HTTP handler.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, ApiResponse, Error,
    auth::UserID,
    dashboard::aggregation::{DashboardSummary, aggregate},
    format::format_currency,
    timezone::get_local_offset,
    transaction::{SortSpec, Transaction, TransactionFilter, filter_and_sort, get_transactions},
};

/// The number of transactions listed under "recent transactions".
const RECENT_TRANSACTION_COUNT: usize = 5;

/// The state needed for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string for the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The year of the monthly breakdown, defaults to the current year.
    pub year: Option<i32>,
}

/// The dashboard totals as Korean Won.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormattedTotals {
    total_revenue: String,
    total_expense: String,
    net_profit: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Dashboard {
    #[serde(flatten)]
    summary: DashboardSummary,
    formatted: FormattedTotals,
    recent_transactions: Vec<Transaction>,
}

/// A route handler for the figures shown on the user's dashboard.
pub async fn get_dashboard_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let year = match query.year {
        Some(year) => year,
        None => {
            let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
                Error::InvalidTimezoneError(state.local_timezone.clone())
            })?;
            OffsetDateTime::now_utc().to_offset(local_offset).year()
        }
    };

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;
        get_transactions(user_id, &connection)?
    };

    let summary = aggregate(&transactions, year);
    let formatted = FormattedTotals {
        total_revenue: format_currency(summary.total_revenue),
        total_expense: format_currency(summary.total_expense),
        net_profit: format_currency(summary.net_profit),
    };

    let mut recent_transactions =
        filter_and_sort(&transactions, &TransactionFilter::default(), SortSpec::default());
    recent_transactions.truncate(RECENT_TRANSACTION_COUNT);

    Ok(ApiResponse::ok(Dashboard {
        summary,
        formatted,
        recent_transactions,
    })
    .into_response())
}
