use crate::{
    auth::tokens::{SessionClaims, TokenService},
    error::{ErrorCode, ServerError},
};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub username: String,
}

pub async fn require_bearer_auth(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
    {
        Some(token) => token,
        None => return unauthorized_response("missing bearer token"),
    };

    let SessionClaims { user_id, email, username, .. } = match tokens.verify_session(token) {
        Ok(claims) => claims,
        Err(reason) => {
            tracing::debug!(%reason, "rejected bearer token");
            return unauthorized_response("invalid bearer token");
        }
    };

    request.extensions_mut().insert(AuthenticatedUser { user_id, email, username });

    next.run(request).await
}

fn extract_bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    Some(token)
}

fn unauthorized_response(message: &'static str) -> Response {
    ServerError::new(ErrorCode::AuthInvalidToken, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::{require_bearer_auth, AuthenticatedUser};
    use crate::auth::{clock::ManualClock, tokens::TokenService};
    use axum::{
        body::Body,
        extract::Extension,
        http::{header::AUTHORIZATION, Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use chrono::Duration;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    const TEST_SECRET: &str = "noteforge_test_secret_that_is_definitely_long_enough";

    fn protected_app(tokens: Arc<TokenService>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(|Extension(user): Extension<AuthenticatedUser>| async move {
                    format!("{}:{}", user.user_id, user.username)
                }),
            )
            .layer(middleware::from_fn_with_state(tokens, require_bearer_auth))
    }

    fn get_protected(authorization: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).expect("request should build")
    }

    #[tokio::test]
    async fn rejects_requests_without_bearer_token() {
        let tokens = Arc::new(
            TokenService::new(TEST_SECRET, Arc::new(ManualClock::default()))
                .expect("service should initialize"),
        );

        let response = protected_app(tokens)
            .oneshot(get_protected(None))
            .await
            .expect("request should return a response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_reset_tokens_used_as_bearer() {
        let tokens = Arc::new(
            TokenService::new(TEST_SECRET, Arc::new(ManualClock::default()))
                .expect("service should initialize"),
        );
        let reset = tokens.issue_reset_token(Uuid::new_v4()).expect("token should be issued");

        let response = protected_app(tokens)
            .oneshot(get_protected(Some(format!("Bearer {reset}"))))
            .await
            .expect("request should return a response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_expired_session_tokens() {
        let clock = ManualClock::default();
        let tokens = Arc::new(
            TokenService::new(TEST_SECRET, Arc::new(clock.clone()))
                .expect("service should initialize"),
        );
        let token = tokens
            .issue_session_token(Uuid::new_v4(), "ada@example.com", "ada")
            .expect("token should be issued");
        clock.advance(Duration::days(8));

        let response = protected_app(tokens)
            .oneshot(get_protected(Some(format!("Bearer {token}"))))
            .await
            .expect("request should return a response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn injects_authenticated_user_for_valid_bearer_token() {
        let tokens = Arc::new(
            TokenService::new(TEST_SECRET, Arc::new(ManualClock::default()))
                .expect("service should initialize"),
        );
        let token = tokens
            .issue_session_token(Uuid::new_v4(), "ada@example.com", "ada")
            .expect("token should be issued");

        let response = protected_app(tokens)
            .oneshot(get_protected(Some(format!("bearer {token}"))))
            .await
            .expect("request should return a response");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
