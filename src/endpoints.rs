//! The REST API routes.
//!
//! For routes that take a parameter, e.g. '/api/partners/{partner_id}', use [format_endpoint].

/// Liveness probe.
pub const HEALTH: &str = "/health";
/// Reports that the API is reachable.
pub const API_TEST: &str = "/api/test";

/// The route for registering a new user.
pub const REGISTER: &str = "/api/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/auth/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/auth/logout";
/// The route for extending the current session.
pub const REFRESH_TOKEN: &str = "/api/auth/refresh-token";
/// The logged in user's profile.
pub const PROFILE: &str = "/api/user/profile";

/// The membership levels and what they include.
pub const MEMBERSHIP_LEVELS: &str = "/api/membership/levels";
/// Client settings.
pub const SETTINGS: &str = "/api/settings";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The dashboard figures.
pub const DASHBOARD: &str = "/api/dashboard";
/// The route to list and create partners.
pub const PARTNERS: &str = "/api/partners";
/// The route to access a single partner.
pub const PARTNER: &str = "/api/partners/{partner_id}";

/// Replace the first parameter in `endpoint_path` with `id`.
///
/// A parameter starts with '{' and ends with the next '}', e.g. '{partner_id}'
/// in '/api/partners/{partner_id}'. A path without a parameter is returned
/// unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{id}{}",
        &endpoint_path[..param_start],
        &endpoint_path[param_end..]
    )
}
