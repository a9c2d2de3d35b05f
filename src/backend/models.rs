//! Modèles de l'API HTTP: corps de requêtes et conversion des erreurs
//! de service en réponses JSON.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::database::DbError;
use crate::service::{LoginError, ServiceError};
use crate::utils::error_messages;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Création d'un compte par un administrateur. Le rôle arrive comme
/// chaîne et se valide comme les autres champs du formulaire.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    #[serde(default)]
    pub period: crate::models::PeriodFilter,
}

/// Corps du point d'entrée privilégié `setup-admin`. Les champs sont
/// optionnels pour pouvoir répondre avec un message dédié plutôt
/// qu'une erreur de désérialisation.
#[derive(Debug, Deserialize)]
pub struct SetupAdminRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error_messages::VALIDATION_ERROR, "fields": fields })),
            )
                .into_response(),
            ServiceError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error_messages::NOT_AUTHORIZED })),
            )
                .into_response(),
            ServiceError::AccessDenied(_) => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": error_messages::ADMINS_ONLY })),
            )
                .into_response(),
            ServiceError::Db(DbError::EmailTaken) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error_messages::EMAIL_TAKEN })),
            )
                .into_response(),
            ServiceError::Db(DbError::InvalidUserId(_)) | ServiceError::Db(DbError::InvalidReportId(_)) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": error_messages::NOT_FOUND })),
            )
                .into_response(),
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": error_messages::LOGIN_ERROR })),
        )
            .into_response()
    }
}
