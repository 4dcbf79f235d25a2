// Boundary validation.
//
// - `ValidatedJson<T>` extractor: serde + structured VALIDATION_FAILED errors.
// - `ValidatedQuery<T>` extractor: the same for query strings.
// - Field validators shared by services, run before any store access.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, ErrorCode, ServerError};

/// Maximum REST request body in bytes (1 MiB).
pub const MAX_REST_BODY_BYTES: usize = 1024 * 1024;

pub const WORKSPACE_NAME_CHARS: (usize, usize) = (3, 100);
pub const USERNAME_CHARS: (usize, usize) = (3, 30);
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const NOTE_TITLE_CHARS: (usize, usize) = (1, 200);
pub const MAX_NOTE_CONTENT_CHARS: usize = 100_000;
pub const MAX_NOTE_SUMMARY_CHARS: usize = 5_000;
pub const MAX_NOTE_SEARCH_CHARS: usize = 200;
const EMAIL_CHARS: (usize, usize) = (5, 254);

// ── ValidatedJson extractor ────────────────────────────────────────

/// A JSON body extractor that returns a structured `ServerError` on failure.
///
/// Use this instead of `axum::Json<T>` in handlers to get consistent
/// VALIDATION_FAILED error responses instead of plain-text Axum rejections.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => {
                let (message, details) = classify_json_rejection(&rejection);
                Err(ServerError::new(ErrorCode::ValidationFailed, message)
                    .with_details(details)
                    .into_response())
            }
        }
    }
}

fn classify_json_rejection(rejection: &JsonRejection) -> (String, serde_json::Value) {
    match rejection {
        JsonRejection::JsonDataError(e) => {
            (format!("invalid JSON payload: {e}"), serde_json::json!({ "kind": "data_error" }))
        }
        JsonRejection::JsonSyntaxError(e) => {
            (format!("malformed JSON: {e}"), serde_json::json!({ "kind": "syntax_error" }))
        }
        JsonRejection::MissingJsonContentType(_) => (
            "expected Content-Type: application/json".to_string(),
            serde_json::json!({ "kind": "missing_content_type" }),
        ),
        JsonRejection::BytesRejection(e) => {
            (format!("request body error: {e}"), serde_json::json!({ "kind": "body_error" }))
        }
        other => {
            (format!("request body error: {other}"), serde_json::json!({ "kind": "unknown" }))
        }
    }
}

/// Query-string counterpart of [`ValidatedJson`].
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ValidatedQuery(value)),
            Err(rejection) => Err(query_rejection_response(&rejection)),
        }
    }
}

fn query_rejection_response(rejection: &QueryRejection) -> Response {
    ServerError::new(
        ErrorCode::ValidationFailed,
        format!("invalid query string: {}", rejection.body_text()),
    )
    .with_details(serde_json::json!({ "kind": "query_error" }))
    .into_response()
}

// ── Field validators ───────────────────────────────────────────────

fn check_char_range(field: &str, value: &str, (min, max): (usize, usize)) -> Result<(), AppError> {
    let length = value.chars().count();
    if length < min || length > max {
        return Err(AppError::validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

fn check_max_chars(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::validation(format!("{field} must be at most {max} characters")));
    }
    Ok(())
}

/// Returns the trimmed name.
pub fn workspace_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    check_char_range("workspace name", name, WORKSPACE_NAME_CHARS)?;
    Ok(name.to_owned())
}

/// Returns the address trimmed and lower-cased.
pub fn email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let (min, max) = EMAIL_CHARS;
    let length = email.chars().count();
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if length < min || length > max || !well_formed || email.chars().any(char::is_whitespace) {
        return Err(AppError::validation("email must be a valid address"));
    }
    Ok(email)
}

pub fn username(username: &str) -> Result<String, AppError> {
    let username = username.trim();
    check_char_range("username", username, USERNAME_CHARS)?;
    if !username.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return Err(AppError::validation(
            "username may only contain letters, digits, '_', '-' and '.'",
        ));
    }
    Ok(username.to_owned())
}

pub fn password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn profile_picture(value: &str) -> Result<String, AppError> {
    let parsed = Url::parse(value.trim())
        .map_err(|_| AppError::validation("profile picture must be a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::validation("profile picture must be an http(s) URL"));
    }
    Ok(parsed.to_string())
}

pub fn note_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    check_char_range("title", title, NOTE_TITLE_CHARS)?;
    Ok(title.to_owned())
}

pub fn note_content(content: &str) -> Result<(), AppError> {
    check_max_chars("content", content, MAX_NOTE_CONTENT_CHARS)
}

pub fn note_summary(summary: &str) -> Result<(), AppError> {
    check_max_chars("summary", summary, MAX_NOTE_SUMMARY_CHARS)
}

/// Returns the trimmed term, or `None` when nothing is left to search for.
pub fn note_search(search: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(search) = search.map(str::trim).filter(|search| !search.is_empty()) else {
        return Ok(None);
    };
    check_max_chars("search", search, MAX_NOTE_SEARCH_CHARS)?;
    Ok(Some(search.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Payload {
        name: String,
    }

    async fn echo(ValidatedJson(payload): ValidatedJson<Payload>) -> String {
        payload.name
    }

    #[derive(Deserialize)]
    struct Paging {
        page: Option<u32>,
    }

    async fn page_of(ValidatedQuery(paging): ValidatedQuery<Paging>) -> String {
        paging.page.unwrap_or(1).to_string()
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/echo")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request should build")
    }

    #[tokio::test]
    async fn validated_json_accepts_well_formed_body() {
        let app = Router::new().route("/echo", post(echo));
        let response =
            app.oneshot(json_request(r#"{"name":"Team X"}"#)).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn validated_json_rejects_malformed_body_with_envelope() {
        let app = Router::new().route("/echo", post(echo));
        let response = app.oneshot(json_request(r#"{"name":"#)).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let parsed: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(parsed["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(parsed["error"]["details"]["kind"], "syntax_error");
    }

    #[tokio::test]
    async fn validated_json_rejects_missing_fields() {
        let app = Router::new().route("/echo", post(echo));
        let response = app.oneshot(json_request(r#"{"title":"x"}"#)).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn validated_query_rejects_bad_values_with_envelope() {
        let app = Router::new().route("/page", get(page_of));
        let ok = app
            .clone()
            .oneshot(Request::get("/page?page=3").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(ok.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/page?page=third").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let parsed: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(parsed["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(parsed["error"]["details"]["kind"], "query_error");
    }

    #[test]
    fn workspace_name_bounds_are_inclusive() {
        assert!(workspace_name("ab").is_err());
        assert_eq!(workspace_name("  abc  ").expect("three chars"), "abc");
        assert!(workspace_name(&"x".repeat(100)).is_ok());
        assert!(workspace_name(&"x".repeat(101)).is_err());
        assert!(workspace_name("    ").is_err());
    }

    #[test]
    fn emails_are_normalized_and_checked() {
        assert_eq!(email(" Ada@Example.COM ").expect("valid"), "ada@example.com");
        for bad in ["", "a@b", "no-at-sign.com", "two@@example.com", "a b@example.com", "@x.io"] {
            assert!(email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn usernames_have_length_and_charset_rules() {
        assert!(username("ab").is_err());
        assert!(username("ada_lovelace-1.0").is_ok());
        assert!(username("ada lovelace").is_err());
        assert!(username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn passwords_need_eight_characters() {
        assert!(password("short").is_err());
        assert!(password("password").is_ok());
    }

    #[test]
    fn profile_pictures_must_be_http_urls() {
        assert!(profile_picture("https://cdn.example.com/a.png").is_ok());
        assert!(profile_picture("ftp://example.com/a.png").is_err());
        assert!(profile_picture("javascript:alert(1)").is_err());
        assert!(profile_picture("not a url").is_err());
    }

    #[test]
    fn note_limits() {
        assert!(note_title("").is_err());
        assert!(note_title(&"t".repeat(200)).is_ok());
        assert!(note_title(&"t".repeat(201)).is_err());
        assert!(note_content(&"c".repeat(MAX_NOTE_CONTENT_CHARS)).is_ok());
        assert!(note_content(&"c".repeat(MAX_NOTE_CONTENT_CHARS + 1)).is_err());
        assert!(note_summary(&"s".repeat(MAX_NOTE_SUMMARY_CHARS + 1)).is_err());
        assert_eq!(note_search(Some("  roadmap ")).expect("valid"), Some("roadmap".to_owned()));
        assert_eq!(note_search(Some("   ")).expect("blank"), None);
        assert!(note_search(Some(&"s".repeat(MAX_NOTE_SEARCH_CHARS + 1))).is_err());
    }
}
