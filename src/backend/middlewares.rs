//! Middleware de garde des routes. Le contexte d'authentification est
//! reconstruit à chaque requête depuis la session, jamais mis en cache
//! entre les requêtes.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::Redirect;
use log::warn;
use tokio::time::timeout;
use tower_sessions::Session;

use crate::authorization::{resolve_flags, GuardDecision, RoleFlags};
use crate::backend::AppState;
use crate::consts;
use crate::models::UserId;

/// Contexte d'authentification lié à la requête courante.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    pub email: String,
    pub flags: RoleFlags,
}

/// Extrait le jeton porteur de l'en-tête `Authorization`.
/// Le nom du schéma est insensible à la casse (RFC 7235).
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

/// Résolution unique du contexte: session, puis identité, puis rôle.
/// Une session qui pointe vers un utilisateur supprimé vaut absence
/// de session.
pub async fn resolve_session(state: &AppState, session: &Session) -> Option<AuthContext> {
    let user_id: UserId = session.get(consts::SESSION_USER_KEY).ok().flatten()?;
    load_context(state, user_id).await
}

/// Charge identité et rôle depuis le stockage. C'est la partie de la
/// résolution qui peut bloquer (verrou d'écriture tenu ailleurs).
async fn load_context(state: &AppState, user_id: UserId) -> Option<AuthContext> {
    let db = state.db.read().await;
    let user = db.get_user(user_id).ok()?;
    Some(AuthContext {
        user_id,
        email: user.email.clone(),
        flags: resolve_flags(&db, user_id),
    })
}

/// Évalue la garde pour un utilisateur de session déjà extrait. Une
/// résolution qui dépasse le délai maximal est traitée comme une
/// absence d'authentification.
async fn guard_user(
    state: &AppState,
    user_id: Option<UserId>,
    require_admin: bool,
) -> Result<AuthContext, Redirect> {
    let context = match user_id {
        Some(user_id) => {
            match timeout(state.config.guard_timeout, load_context(state, user_id)).await {
                Ok(context) => context,
                Err(_) => {
                    warn!("Verificação de sessão excedeu o tempo limite");
                    None
                }
            }
        }
        None => None,
    };

    match GuardDecision::evaluate(context.as_ref().map(|c| c.flags), require_admin) {
        GuardDecision::Allowed => context.ok_or_else(|| Redirect::to("/auth")),
        GuardDecision::RedirectAuth => Err(Redirect::to("/auth")),
        GuardDecision::RedirectPatient => Err(Redirect::to("/patient")),
    }
}

fn session_user(parts: &Parts) -> Option<UserId> {
    let session = parts.extensions.get::<Session>()?;
    session.get(consts::SESSION_USER_KEY).ok().flatten()
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        guard_user(state, session_user(parts), false).await
    }
}

/// Contexte réservé aux administrateurs. Un patient authentifié est
/// renvoyé vers son espace plutôt que vers la page de connexion.
#[derive(Debug, Clone)]
pub struct AdminContext(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for AdminContext {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        guard_user(state, session_user(parts), true).await.map(AdminContext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::database::Database;
    use crate::models::Role;
    use crate::service;
    use axum::http::header::LOCATION;
    use axum::http::HeaderValue;
    use axum::response::IntoResponse;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::RwLock;

    fn test_state(db: Database, guard_timeout: Duration) -> AppState {
        AppState {
            db: Arc::new(RwLock::new(db)),
            config: Arc::new(Config {
                http_port: 0,
                db_path: PathBuf::new(),
                admin_email: "admin@clinica.com".to_string(),
                admin_password: None,
                allowed_origin: "https://startfisio.com.br".to_string(),
                guard_timeout,
            }),
        }
    }

    fn redirect_target(redirect: Redirect) -> String {
        redirect
            .into_response()
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn bearer_token_requires_the_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc-123"));
        assert_eq!(bearer_token(&headers), Some("abc-123".to_owned()));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc-123"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        for value in ["bearer abc-123", "BEARER abc-123", "BeArEr abc-123"] {
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
            assert_eq!(bearer_token(&headers), Some("abc-123".to_owned()), "{value}");
        }
    }

    #[test]
    fn bearer_token_is_absent_for_missing_or_empty_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn guard_allows_a_known_patient() {
        let mut db = Database::default();
        let patient =
            service::create_account(&mut db, "p@clinica.com", "senha123", "Paciente", Role::Patient)
                .unwrap();
        let state = test_state(db, Duration::from_secs(1));

        let context = guard_user(&state, Some(patient), false).await.unwrap();
        assert_eq!(context.user_id, patient);
        assert!(context.flags.is_patient);
    }

    #[tokio::test]
    async fn guard_bounces_patients_off_admin_routes() {
        let mut db = Database::default();
        let patient =
            service::create_account(&mut db, "p@clinica.com", "senha123", "Paciente", Role::Patient)
                .unwrap();
        let state = test_state(db, Duration::from_secs(1));

        let redirect = guard_user(&state, Some(patient), true).await.unwrap_err();
        assert_eq!(redirect_target(redirect), "/patient");
    }

    #[tokio::test]
    async fn guard_redirects_without_a_session_user() {
        let state = test_state(Database::default(), Duration::from_secs(1));
        let redirect = guard_user(&state, None, false).await.unwrap_err();
        assert_eq!(redirect_target(redirect), "/auth");
    }

    #[tokio::test]
    async fn stalled_store_degrades_to_not_authenticated() {
        let mut db = Database::default();
        let patient =
            service::create_account(&mut db, "p@clinica.com", "senha123", "Paciente", Role::Patient)
                .unwrap();
        let state = test_state(db, Duration::from_millis(20));

        // Un écrivain qui garde le verrou bloque toute résolution.
        let _writer = state.db.write().await;
        let redirect = guard_user(&state, Some(patient), false).await.unwrap_err();
        assert_eq!(redirect_target(redirect), "/auth");
    }
}
