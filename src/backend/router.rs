//! Configuration des routes pour l'application.
//! Définit les routes accessibles avec ou sans authentification et configure les middlewares.

use axum::error_handling::HandleErrorLayer;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::{BoxError, Router};
use http::StatusCode;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::backend::handlers_auth::{
    create_report, create_user, delete_patients, delete_report, list_reports, list_users,
    my_reports, update_report,
};
use crate::backend::handlers_functions;
use crate::backend::handlers_unauth::{login, logout, register, session_info};
use crate::backend::middlewares::AdminContext;
use crate::backend::AppState;

/// Initialisation du routeur principal et des middlewares
pub fn get_router(state: AppState) -> Router {
    // L'origine autorisée est fixe: le portail n'est servi qu'au site
    // de la clinique.
    let origin = state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .expect("Invalid allowed origin");
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    // Configuration des sessions en mémoire
    let store = MemoryStore::default();
    let session_manager = SessionManagerLayer::new(store).with_http_only(true);

    let service = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|_e: BoxError| async move {
            StatusCode::BAD_REQUEST
        }))
        .layer(session_manager);

    Router::new()
        .merge(unauth_routes())
        .merge(patient_routes())
        .merge(admin_routes(state.clone()))
        .merge(function_routes())
        .layer(service)
        .layer(cors)
        .with_state(state)
}

/// Routes accessibles sans authentification
fn unauth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register)) // Inscription publique (toujours patient)
        .route("/auth/login", post(login)) // Connexion
        .route("/auth/logout", post(logout)) // Déconnexion
        .route("/auth/session", get(session_info)) // Sonde de session
}

/// Routes de l'espace patient, gardées par le contexte d'authentification
fn patient_routes() -> Router<AppState> {
    Router::new().route("/api/patient/reports", get(my_reports))
}

/// Routes de l'espace d'administration, réservées aux admins
fn admin_routes(state: AppState) -> Router<AppState> {
    let routes = Router::new()
        .route("/reports", get(list_reports).post(create_report))
        .route("/reports/:id", put(update_report).delete(delete_report))
        .route("/users", get(list_users).post(create_user))
        .route("/users/delete-patients", post(delete_patients))
        .layer(axum::middleware::from_extractor_with_state::<AdminContext, AppState>(state)); // Garde admin

    Router::new().nest("/api/admin", routes)
}

/// Points d'entrée privilégiés, authentifiés par jeton porteur
fn function_routes() -> Router<AppState> {
    Router::new()
        .route("/functions/setup-admin", post(handlers_functions::setup_admin))
        .route(
            "/functions/delete-user",
            post(handlers_functions::delete_user),
        )
        .route(
            "/functions/cleanup-duplicate-users",
            post(handlers_functions::cleanup_duplicate_users),
        )
}
