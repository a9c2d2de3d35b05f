//! Points d'entrée privilégiés d'administration. Contrairement aux
//! routes de l'espace admin, ils s'authentifient par jeton porteur et
//! répondent toujours en JSON, sans redirection.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::backend::middlewares::bearer_token;
use crate::backend::models::{DeleteUserRequest, SetupAdminRequest};
use crate::backend::{persist, AppState};
use crate::models::UserId;
use crate::service::{self, DeleteOutcome, ServiceError};
use crate::utils::error_messages;

/// Échelle de refus commune aux trois points d'entrée: 401 sans jeton
/// valide, 403 pour un appelant non admin.
fn function_error(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        ServiceError::AccessDenied(_) => StatusCode::FORBIDDEN,
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

/// POST /functions/setup-admin — provisionne ou répare le compte admin.
pub async fn setup_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SetupAdminRequest>,
) -> Response {
    let mut db = state.db.write().await;
    if let Err(e) = service::authorize_function_caller(&db, bearer_token(&headers).as_deref()) {
        return function_error(e);
    }

    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": error_messages::EMAIL_PASSWORD_REQUIRED })),
        )
            .into_response();
    };

    let result = service::setup_admin(&mut db, &email, &password, payload.full_name.as_deref());
    drop(db);

    match result {
        Ok(outcome) => {
            persist(&state.db).await;
            Json(json!({
                "success": true,
                "message": error_messages::ADMIN_CONFIGURED,
                "userId": outcome.user_id,
                "created": outcome.created,
            }))
            .into_response()
        }
        Err(e) => function_error(e),
    }
}

/// POST /functions/delete-user — supprime un compte et ses lignes. Les
/// lignes orphelines d'une identité déjà absente comptent comme un
/// succès.
pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DeleteUserRequest>,
) -> Response {
    let mut db = state.db.write().await;
    if let Err(e) = service::authorize_function_caller(&db, bearer_token(&headers).as_deref()) {
        return function_error(e);
    }

    let Some(target) = payload.user_id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": error_messages::USER_ID_REQUIRED })),
        )
            .into_response();
    };

    let result = service::delete_user(&mut db, UserId::from(target));
    drop(db);

    match result {
        Ok(outcome) => {
            persist(&state.db).await;
            let message = match outcome {
                DeleteOutcome::Deleted => error_messages::USER_DELETED,
                DeleteOutcome::OrphansRemoved => error_messages::ORPHANS_DELETED,
            };
            Json(json!({ "success": true, "message": message })).into_response()
        }
        // L'appelant a déjà passé l'échelle: un refus ici vise la cible.
        Err(ServiceError::AccessDenied(_)) => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": error_messages::CANNOT_DELETE_ADMIN })),
        )
            .into_response(),
        Err(e) => function_error(e),
    }
}

/// POST /functions/cleanup-duplicate-users — répare un double
/// provisionnement du compte admin en gardant l'identité la plus
/// récente.
pub async fn cleanup_duplicate_users(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut db = state.db.write().await;
    if let Err(e) = service::authorize_function_caller(&db, bearer_token(&headers).as_deref()) {
        return function_error(e);
    }

    let outcome = service::cleanup_duplicate_users(&mut db, &state.config.admin_email);
    drop(db);
    persist(&state.db).await;

    match outcome.kept {
        Some(kept) => Json(json!({
            "success": true,
            "message": format!(
                "Limpeza concluída: {} duplicados removidos",
                outcome.deleted
            ),
            "keptUserId": kept,
            "deletedCount": outcome.deleted,
        }))
        .into_response(),
        None => Json(json!({
            "success": true,
            "message": "Nenhum usuário encontrado para limpeza",
            "deletedCount": 0,
        }))
        .into_response(),
    }
}
