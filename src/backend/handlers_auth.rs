//! Gestionnaires des routes authentifiées: l'espace patient et
//! l'espace d'administration.

use axum::extract::{Path, Query, State};
use axum::response::Result;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::backend::middlewares::{AdminContext, AuthContext};
use crate::backend::models::{CreateUserRequest, PeriodQuery};
use crate::backend::{persist, AppState};
use crate::models::{filter_by_period, ReportId, Role};
use crate::service::{self, FieldErrors, ReportForm, ServiceError};
use crate::utils::error_messages;

// --- Espace patient ---

/// GET /api/patient/reports — les rapports du patient connecté,
/// éventuellement restreints à une fenêtre glissante.
pub async fn my_reports(
    context: AuthContext,
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Json<Value> {
    let db = state.db.read().await;
    let reports = service::reports_for_patient(&db, context.user_id);
    drop(db);

    let today = Utc::now().date_naive();
    let reports = filter_by_period(reports, query.period, today);

    Json(json!({ "reports": reports }))
}

// --- Espace d'administration: rapports ---

/// GET /api/admin/reports — tous les rapports, joints au nom du patient.
pub async fn list_reports(_: AdminContext, State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    Json(json!({ "reports": service::all_reports(&db) }))
}

/// POST /api/admin/reports
pub async fn create_report(
    context: AdminContext,
    State(state): State<AppState>,
    Json(form): Json<ReportForm>,
) -> Result<Json<Value>> {
    let mut db = state.db.write().await;
    let report_id = service::create_report(&mut db, context.0.user_id, &form)?;
    drop(db);
    persist(&state.db).await;

    Ok(Json(json!({
        "success": true,
        "message": error_messages::REPORT_CREATED,
        "reportId": report_id,
    })))
}

/// PUT /api/admin/reports/:id
pub async fn update_report(
    _: AdminContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<ReportForm>,
) -> Result<Json<Value>> {
    let mut db = state.db.write().await;
    service::update_report(&mut db, ReportId::from(id), &form)?;
    drop(db);
    persist(&state.db).await;

    Ok(Json(json!({ "success": true, "message": error_messages::REPORT_UPDATED })))
}

/// DELETE /api/admin/reports/:id
pub async fn delete_report(
    _: AdminContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let mut db = state.db.write().await;
    service::delete_report(&mut db, ReportId::from(id))?;
    drop(db);
    persist(&state.db).await;

    Ok(Json(json!({ "success": true, "message": error_messages::REPORT_DELETED })))
}

// --- Espace d'administration: utilisateurs ---

/// GET /api/admin/users — profils joints à leur rôle.
pub async fn list_users(_: AdminContext, State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    Json(json!({ "users": service::list_users(&db) }))
}

/// POST /api/admin/users — création d'un compte avec rôle au choix.
pub async fn create_user(
    _: AdminContext,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<Value>> {
    let role: Role = payload.role.parse().map_err(|_| {
        let mut errors = FieldErrors::new();
        errors.insert("role", "Selecione uma função".to_owned());
        ServiceError::Validation(errors)
    })?;

    let mut db = state.db.write().await;
    let user_id = service::create_account(
        &mut db,
        &payload.email,
        &payload.password,
        &payload.full_name,
        role,
    )?;
    drop(db);
    persist(&state.db).await;

    Ok(Json(json!({ "success": true, "userId": user_id })))
}

/// POST /api/admin/users/delete-patients — suppression séquentielle de
/// tous les comptes patients, au mieux.
pub async fn delete_patients(_: AdminContext, State(state): State<AppState>) -> Json<Value> {
    let mut db = state.db.write().await;
    let outcome = service::delete_all_patients(&mut db);
    drop(db);
    persist(&state.db).await;

    Json(json!({
        "success": true,
        "deleted": outcome.deleted,
        "failed": outcome.failed,
    }))
}
