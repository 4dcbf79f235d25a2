mod auth;
mod members;
mod notes;
mod workspaces;

use std::{collections::HashMap, sync::Arc, time::Instant};

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Extension, FromRequestParts, Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Router,
};
use uuid::Uuid;

use crate::{
    auth::middleware::{require_bearer_auth, AuthenticatedUser},
    authz::{self, RoleSet},
    error::{
        attach_request_id_header, request_id_from_headers_or_generate, with_request_id_scope,
        AppError, ErrorCode, ServerError,
    },
    service::Services,
    validation::MAX_REST_BODY_BYTES,
};

#[derive(Clone)]
pub(crate) struct ApiState {
    services: Services,
}

/// Full application router: public and bearer-protected routes, health
/// check, body limit, request context and panic containment.
pub fn build_app(services: Services) -> Router {
    apply_middleware(build_router(services))
}

fn build_router(services: Services) -> Router {
    let tokens = Arc::clone(&services.tokens);
    let state = ApiState { services };
    let viewer_layer =
        || middleware::from_fn_with_state(state.clone(), require_workspace_viewer_role);

    let public = Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/auth/register", post(auth::register))
        .route("/v1/auth/login", post(auth::login))
        .route("/v1/auth/password-reset", post(auth::request_password_reset))
        .route("/v1/auth/password-reset/{token}", post(auth::reset_password));

    let protected = Router::new()
        .route("/v1/auth/me", get(auth::me).patch(auth::update_me))
        .route("/v1/users", get(auth::list_users))
        .route(
            "/v1/workspaces",
            post(workspaces::create_workspace).get(workspaces::list_workspaces),
        )
        .route("/v1/workspaces/join/{secret}", post(workspaces::join_workspace))
        .route(
            "/v1/workspaces/{workspace_id}",
            get(workspaces::get_workspace).route_layer(viewer_layer()),
        )
        .route(
            "/v1/workspaces/{workspace_id}",
            patch(workspaces::update_workspace).delete(workspaces::delete_workspace),
        )
        .route(
            "/v1/workspaces/{workspace_id}/invite-link",
            post(workspaces::regenerate_invite_link),
        )
        .route(
            "/v1/workspaces/{workspace_id}/members",
            get(members::list_members).route_layer(viewer_layer()),
        )
        .route("/v1/workspaces/{workspace_id}/members", post(members::add_member))
        .route(
            "/v1/workspaces/{workspace_id}/members/{user_id}",
            patch(members::update_member).delete(members::remove_member),
        )
        .route(
            "/v1/workspaces/{workspace_id}/access-requests",
            get(members::list_access_requests).post(members::request_edit_access),
        )
        .route(
            "/v1/workspaces/{workspace_id}/access-requests/{request_id}/approve",
            post(members::approve_access_request),
        )
        .route(
            "/v1/workspaces/{workspace_id}/access-requests/{request_id}/deny",
            post(members::deny_access_request),
        )
        .route(
            "/v1/workspaces/{workspace_id}/notes",
            get(notes::list_notes).route_layer(viewer_layer()),
        )
        .route("/v1/workspaces/{workspace_id}/notes", post(notes::create_note))
        .route(
            "/v1/notes/{note_id}",
            get(notes::get_note).patch(notes::update_note).delete(notes::delete_note),
        )
        .route("/v1/notes/{note_id}/summary", put(notes::set_note_summary))
        .route_layer(middleware::from_fn_with_state(tokens, require_bearer_auth));

    public.merge(protected).with_state(state)
}

fn apply_middleware(router: Router) -> Router {
    router
        .layer(DefaultBodyLimit::max(MAX_REST_BODY_BYTES))
        .layer(middleware::from_fn(request_context_middleware))
        .layer(middleware::from_fn(panic_handler))
}

async fn healthz(State(state): State<ApiState>) -> Response {
    match state.services.store.check_health().await {
        Ok(()) => (StatusCode::OK, "ok").into_response(),
        Err(error) => {
            tracing::warn!(error = ?error, "health check failed");
            ServerError::from_code(ErrorCode::InternalError).into_response()
        }
    }
}

async fn panic_handler(request: Request<Body>, next: Next) -> Response {
    match tokio::spawn(async move { next.run(request).await }).await {
        Ok(response) => response,
        Err(join_error) => {
            tracing::error!(?join_error, "request handling panicked");
            ServerError::from_code(ErrorCode::InternalError).into_response()
        }
    }
}

async fn request_context_middleware(request: Request<Body>, next: Next) -> Response {
    let request_id = request_id_from_headers_or_generate(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started_at = Instant::now();

    let mut response = with_request_id_scope(request_id.clone(), next.run(request)).await;
    attach_request_id_header(&mut response, &request_id);

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started_at.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}

/// Gates a workspace-scoped read route on ViewerOrAbove and hands the
/// resulting [`authz::Authorized`] to the handler as an extension.
async fn require_workspace_viewer_role(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Response {
    require_workspace_role(state, user, request, next, RoleSet::VIEWER_OR_ABOVE).await
}

async fn require_workspace_role(
    state: ApiState,
    user: AuthenticatedUser,
    request: Request,
    next: Next,
    required: RoleSet,
) -> Response {
    let (mut request, workspace_id) = match extract_workspace_id(request).await {
        Ok(result) => result,
        Err(error) => return error.into_response(),
    };

    let authorized =
        match authz::authorize(&state.services.store, required, workspace_id, user.user_id).await {
            Ok(authorized) => authorized,
            Err(error) => return error.into_response(),
        };

    request.extensions_mut().insert(authorized);
    next.run(request).await
}

async fn extract_workspace_id(request: Request) -> Result<(Request, Uuid), AppError> {
    let (mut parts, body) = request.into_parts();
    let Path(path_params) = Path::<HashMap<String, String>>::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| AppError::validation("invalid path parameters"))?;
    let workspace_id = path_params
        .get("workspace_id")
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| AppError::validation("workspace_id must be a UUID"))?;

    Ok((Request::from_parts(parts, body), workspace_id))
}
