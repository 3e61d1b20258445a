//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    AppState, ApiResponse,
    auth::{
        auth_guard, get_profile, post_log_in, post_log_out, post_refresh_token, put_profile,
        register_user,
    },
    dashboard::get_dashboard_endpoint,
    endpoints,
    logging::logging_middleware,
    partner::{create_partner_endpoint, get_partner_endpoint, list_partners_endpoint},
    settings::{get_membership_levels, get_settings},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::API_TEST, get(get_api_test))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out))
        .route(endpoints::MEMBERSHIP_LEVELS, get(get_membership_levels))
        .route(endpoints::SETTINGS, get(get_settings));

    let protected_routes = Router::new()
        .route(endpoints::REFRESH_TOKEN, post(post_refresh_token))
        .route(endpoints::PROFILE, get(get_profile).put(put_profile))
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard_endpoint))
        .route(
            endpoints::PARTNERS,
            get(list_partners_endpoint).post(create_partner_endpoint),
        )
        .route(endpoints::PARTNER, get(get_partner_endpoint))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

async fn get_health() -> Response {
    ApiResponse::ok(Health {
        status: "OK",
        timestamp: OffsetDateTime::now_utc(),
    })
    .into_response()
}

async fn get_api_test() -> Response {
    ApiResponse::ok(())
        .with_message("The API is working.")
        .into_response()
}

async fn get_404_not_found() -> Response {
    ApiResponse::error("The requested route does not exist.")
        .into_response_with_status(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        AppState, build_router,
        endpoints::{self, format_endpoint},
        test_utils::assert_error_envelope,
    };

    const PASSWORD: &str = "correct horse battery staple";

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "a router test secret",
            "Asia/Seoul",
        )
        .unwrap();

        let mut server =
            TestServer::try_new(build_router(state)).expect("Could not create test server.");
        server.save_cookies();
        server
    }

    async fn register_and_log_in(server: &TestServer) {
        server
            .post(endpoints::REGISTER)
            .json(&json!({"name": "Kim Cheolsu", "email": "kim@example.com", "password": PASSWORD}))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post(endpoints::LOG_IN)
            .json(&json!({"email": "kim@example.com", "password": PASSWORD}))
            .await
            .assert_status_ok();
    }

    fn transaction(company: &str, transaction_type: &str, amount: i64, date: &str) -> Value {
        json!({
            "partnerCompany": company,
            "type": transaction_type,
            "category": "service",
            "amount": amount,
            "description": "Monthly retainer",
            "date": date,
            "status": "completed"
        })
    }

    #[tokio::test]
    async fn health_check_responds() {
        let server = get_test_server();

        let response = server.get(endpoints::HEALTH).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "OK");
        assert!(body["data"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server();

        let response = server.get("/api/does-not-exist").await;

        response.assert_status_not_found();
        assert_error_envelope(&response.json());
    }

    #[tokio::test]
    async fn protected_routes_require_session() {
        let server = get_test_server();

        for route in [endpoints::TRANSACTIONS, endpoints::DASHBOARD, endpoints::PROFILE] {
            let response = server.get(route).await;

            response.assert_status_unauthorized();
            assert_error_envelope(&response.json());
        }
    }

    #[tokio::test]
    async fn transactions_round_trip_through_api() {
        let server = get_test_server();
        register_and_log_in(&server).await;

        server
            .post(endpoints::TRANSACTIONS)
            .json(&transaction("ABC Tech", "revenue", 500_000, "2024-01-15"))
            .await
            .assert_status(StatusCode::CREATED);
        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&transaction("XYZ Solutions", "expense", 150_000, "2024-01-10"))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        let expense_id = created["data"]["id"].as_i64().unwrap();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("type", "revenue")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["transactions"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["summary"]["netProfit"], 350_000);

        let response = server.get(endpoints::DASHBOARD).add_query_param("year", 2024).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["formatted"]["netProfit"], "₩350,000");
        assert_eq!(body["data"]["monthlyBreakdown"][0]["expense"], 150_000);

        server
            .delete(&format_endpoint(endpoints::TRANSACTION, expense_id))
            .await
            .assert_status_ok();
        server
            .get(&format_endpoint(endpoints::TRANSACTION, expense_id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn invalid_query_is_bad_request() {
        let server = get_test_server();
        register_and_log_in(&server).await;

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("sortBy", "colour")
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn log_out_ends_session() {
        let server = get_test_server();
        register_and_log_in(&server).await;
        server.get(endpoints::PROFILE).await.assert_status_ok();

        server.post(endpoints::LOG_OUT).await.assert_status_ok();

        server
            .get(endpoints::PROFILE)
            .await
            .assert_status_unauthorized();
    }
}
