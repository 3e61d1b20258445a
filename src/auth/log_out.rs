//! Log-out route handler.

use axum::response::{IntoResponse, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{ApiResponse, auth::cookie::invalidate_auth_cookie};

/// Invalidate the session cookie.
///
/// Succeeds whether or not the client had a session.
pub async fn post_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, ApiResponse::ok(()).with_message("Logged out.")).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::http::{StatusCode, header::SET_COOKIE};
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, UserID, log_out::post_log_out, set_auth_cookie},
        test_utils::parse_json_body,
    };

    #[tokio::test]
    async fn log_out_expires_session_cookie() {
        let jar = PrivateCookieJar::new(Key::from(&Sha512::digest("42")));
        let jar = set_auth_cookie(jar, UserID::new(123), DEFAULT_COOKIE_DURATION).unwrap();

        let response = post_log_out(jar).await;

        assert_eq!(response.status(), StatusCode::OK);
        let token_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|header| Cookie::parse(header.to_str().ok()?.to_owned()).ok())
            .find(|cookie| cookie.name() == COOKIE_TOKEN)
            .expect("log out should set the token cookie");
        assert_eq!(
            token_cookie.expires_datetime(),
            Some(OffsetDateTime::UNIX_EPOCH)
        );
        assert_eq!(token_cookie.max_age(), Some(Duration::ZERO));

        let body = parse_json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Logged out.");
    }
}
