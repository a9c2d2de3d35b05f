//! Gestionnaires accessibles sans authentification: inscription,
//! connexion, déconnexion et sonde de session.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Result;
use axum::Json;
use serde_json::{json, Value};
use tower_sessions::Session;

use crate::backend::middlewares::{bearer_token, resolve_session};
use crate::backend::models::{LoginRequest, RegisterRequest};
use crate::backend::{persist, AppState};
use crate::consts;
use crate::models::Role;
use crate::service;
use crate::utils::error_messages;

/// POST /auth/register — l'inscription publique crée toujours un patient.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    let mut db = state.db.write().await;
    let user_id = service::create_account(
        &mut db,
        &payload.email,
        &payload.password,
        &payload.full_name,
        Role::Patient,
    )?;
    drop(db);
    persist(&state.db).await;

    Ok(Json(json!({ "success": true, "userId": user_id })))
}

/// POST /auth/login — vérifie les identifiants, ouvre la session côté
/// cookie et délivre le jeton porteur pour les points d'entrée
/// privilégiés.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let mut db = state.db.write().await;
    let signed = service::sign_in(&mut db, &payload.email, &payload.password)?;
    drop(db);

    session
        .insert(consts::SESSION_USER_KEY, signed.user_id)
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, error_messages::SERVER_ERROR))?;

    Ok(Json(json!({
        "success": true,
        "user": { "id": signed.user_id, "email": signed.email },
        "is_admin": signed.flags.is_admin,
        "is_patient": signed.flags.is_patient,
        "access_token": signed.access_token,
    })))
}

/// POST /auth/logout — révoque le jeton porteur s'il est présent, puis
/// vide la session dans tous les cas, même si la révocation n'a rien
/// trouvé.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Json<Value> {
    let token = bearer_token(&headers);
    let mut db = state.db.write().await;
    service::sign_out(&mut db, token.as_deref());
    drop(db);

    session.clear();

    Json(json!({ "success": true, "message": error_messages::LOGOUT_OK }))
}

/// GET /auth/session — sonde de l'état d'authentification. La réponse
/// a la même forme qu'il y ait une session valide ou non.
pub async fn session_info(State(state): State<AppState>, session: Session) -> Json<Value> {
    match resolve_session(&state, &session).await {
        Some(context) => Json(json!({
            "user": { "id": context.user_id, "email": context.email },
            "is_admin": context.flags.is_admin,
            "is_patient": context.flags.is_patient,
        })),
        None => Json(json!({
            "user": null,
            "is_admin": false,
            "is_patient": false,
        })),
    }
}
