use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;
use crate::{auth, comments};

pub fn build_app(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config.cors_origin)?;

    Ok(Router::new()
        .merge(auth::router())
        .merge(comments::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(preflight_no_content))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        ))
}

/// Only `origin` may call the API, with credentials (the session cookie).
fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("invalid CORS origin {origin:?}"))?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

/// Every OPTIONS request is answered `204 No Content`, keeping whatever CORS
/// headers the inner layer attached.
async fn preflight_no_content(req: Request, next: Next) -> Response {
    if req.method() != Method::OPTIONS {
        return next.run(req).await;
    }
    let (mut parts, _) = next.run(req).await.into_parts();
    parts.status = StatusCode::NO_CONTENT;
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);
    Response::from_parts(parts, Body::empty())
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {host}:{port}"))?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{issue_token, JwtKeys};
    use axum::extract::FromRef;
    use axum::http::Request;
    use serde_json::Value;
    use std::time::Duration;
    use time::OffsetDateTime;
    use tower::ServiceExt;

    const ORIGIN: &str = "https://app.example";

    fn app() -> (Router, JwtKeys) {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        (build_app(state).expect("app builds"), keys)
    }

    async fn send(app: Router, req: Request<Body>) -> Response {
        app.oneshot(req).await.expect("infallible")
    }

    async fn json_body(res: Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn session_with_cookie(token: &str) -> Request<Body> {
        Request::builder()
            .uri("/session")
            .header(header::COOKIE, format!("jwt={token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app();
        let res = send(app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn preflight_answers_no_content_for_configured_origin() {
        let (app, _) = app();
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/login")
            .header(header::ORIGIN, ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let res = send(app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let headers = res.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    }

    #[tokio::test]
    async fn bare_options_is_no_content_too() {
        let (app, _) = app();
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/comments")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(app, req).await.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn foreign_origin_gets_no_allow_origin() {
        let (app, _) = app();
        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let res = send(app, req).await;
        assert!(!res.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn session_without_cookie_is_unauthenticated() {
        let (app, _) = app();
        let res = send(app, Request::get("/session").body(Body::empty()).unwrap()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(res).await["message"], "Not authenticated");
    }

    #[tokio::test]
    async fn session_with_valid_token_returns_claims() {
        let (app, keys) = app();
        let token = keys.sign("alice").unwrap();
        let res = send(app, session_with_cookie(&token)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["message"], "Session active");
        assert_eq!(body["user"]["user"], "alice");
        assert!(body["user"]["exp"].as_i64().unwrap() > body["user"]["iat"].as_i64().unwrap());
    }

    #[tokio::test]
    async fn session_with_tampered_token_is_forbidden() {
        let (app, keys) = app();
        let mut token = keys.sign("alice").unwrap();
        let last = if token.ends_with('x') { "y" } else { "x" };
        token.truncate(token.len() - 4);
        token.push_str(last);
        let res = send(app, session_with_cookie(&token)).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn session_with_expired_token_is_forbidden() {
        let (app, keys) = app();
        let issued = OffsetDateTime::now_utc() - time::Duration::hours(2);
        let token = issue_token("alice", &keys.encoding, issued, Duration::from_secs(60)).unwrap();
        let res = send(app, session_with_cookie(&token)).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn logout_always_clears_cookie() {
        let (app, _) = app();
        let res = send(app, post_json("/logout", "")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap().to_owned();
        assert!(cookie.starts_with("jwt=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(json_body(res).await["message"], "Logged out successfully");
    }

    #[tokio::test]
    async fn register_with_missing_fields_is_bad_request() {
        let (app, _) = app();
        let res = send(app, post_json("/register", r#"{"name":"alice","password":"pw"}"#)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(res).await["message"],
            "Name, email, and password are required"
        );
    }

    #[tokio::test]
    async fn register_without_json_body_is_bad_request() {
        let (app, _) = app();
        let req = Request::post("/register").body(Body::empty()).unwrap();
        assert_eq!(send(app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_with_missing_fields_is_bad_request() {
        let (app, _) = app();
        let res = send(app, post_json("/login", r#"{"name":"alice"}"#)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(!res.headers().contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn comment_with_missing_fields_is_bad_request() {
        let (app, _) = app();
        let res = send(app, post_json("/comments", r#"{"user":"alice"}"#)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_origin_is_rejected() {
        assert!(cors_layer("bad\norigin").is_err());
    }
}
