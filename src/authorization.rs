//! Résolution du rôle et garde de routes.
//!
//! Le rôle est une énumération fermée, interprétée ici de manière
//! exhaustive; la garde est une petite machine à états pure, appliquée
//! par les extracteurs de `backend::middlewares`.

use thiserror::Error;

use crate::database::Database;
use crate::models::{Role, UserId};

/// Une erreur sans détails en cas d'accès refusé.
#[derive(Debug, Error)]
#[error("Acesso negado")]
pub struct AccessDenied;

/// Drapeaux dérivés de l'assignation de rôle. Mutuellement exclusifs
/// par construction: un seul rôle par utilisateur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleFlags {
    pub is_admin: bool,
    pub is_patient: bool,
}

impl From<Option<Role>> for RoleFlags {
    fn from(role: Option<Role>) -> Self {
        match role {
            Some(Role::Admin) => RoleFlags {
                is_admin: true,
                is_patient: false,
            },
            Some(Role::Patient) => RoleFlags {
                is_admin: false,
                is_patient: true,
            },
            None => RoleFlags::default(),
        }
    }
}

/// Cherche l'assignation de rôle d'un utilisateur.
///
/// Politique documentée: toute absence (pas de ligne) équivaut à
/// "aucun privilège". La fonction ne retourne jamais d'erreur.
pub fn resolve_role(db: &Database, user: UserId) -> Option<Role> {
    db.get_role(user)
}

pub fn resolve_flags(db: &Database, user: UserId) -> RoleFlags {
    RoleFlags::from(resolve_role(db, user))
}

/// Issue de la garde pour une vue protégée.
/// L'état CHECKING est la résolution en cours du contexte; il est borné
/// par `consts::GUARD_TIMEOUT` dans l'extracteur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    RedirectAuth,
    RedirectPatient,
}

impl GuardDecision {
    /// Règle de transition: pas d'utilisateur → RedirectAuth;
    /// utilisateur présent mais admin requis sans rôle admin →
    /// RedirectPatient; sinon Allowed.
    pub fn evaluate(subject: Option<RoleFlags>, require_admin: bool) -> Self {
        match subject {
            None => GuardDecision::RedirectAuth,
            Some(flags) if require_admin && !flags.is_admin => GuardDecision::RedirectPatient,
            Some(_) => GuardDecision::Allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::password::hash;

    fn db_with_user(role: Option<Role>) -> (Database, UserId) {
        let mut db = Database::default();
        let id = db.create_user("user@example.com", hash("senha123")).unwrap();
        if let Some(role) = role {
            db.assign_role(id, role);
        }
        (db, id)
    }

    #[test]
    fn missing_assignment_yields_no_privilege() {
        let (db, id) = db_with_user(None);
        let flags = resolve_flags(&db, id);
        assert!(!flags.is_admin);
        assert!(!flags.is_patient);
    }

    #[test]
    fn unknown_user_yields_no_privilege() {
        let (db, _) = db_with_user(Some(Role::Admin));
        let flags = resolve_flags(&db, UserId::new());
        assert_eq!(flags, RoleFlags::default());
    }

    #[test]
    fn flags_are_mutually_exclusive() {
        let (db, id) = db_with_user(Some(Role::Admin));
        let flags = resolve_flags(&db, id);
        assert!(flags.is_admin && !flags.is_patient);

        let (db, id) = db_with_user(Some(Role::Patient));
        let flags = resolve_flags(&db, id);
        assert!(flags.is_patient && !flags.is_admin);
    }

    #[test]
    fn guard_redirects_anonymous_users_to_auth() {
        assert_eq!(
            GuardDecision::evaluate(None, false),
            GuardDecision::RedirectAuth
        );
        assert_eq!(
            GuardDecision::evaluate(None, true),
            GuardDecision::RedirectAuth
        );
    }

    #[test]
    fn guard_redirects_patients_away_from_admin_routes() {
        let patient = RoleFlags {
            is_admin: false,
            is_patient: true,
        };
        assert_eq!(
            GuardDecision::evaluate(Some(patient), true),
            GuardDecision::RedirectPatient
        );
        assert_eq!(
            GuardDecision::evaluate(Some(patient), false),
            GuardDecision::Allowed
        );
    }

    #[test]
    fn guard_allows_admins_everywhere() {
        let admin = RoleFlags {
            is_admin: true,
            is_patient: false,
        };
        assert_eq!(
            GuardDecision::evaluate(Some(admin), true),
            GuardDecision::Allowed
        );
        assert_eq!(
            GuardDecision::evaluate(Some(admin), false),
            GuardDecision::Allowed
        );
    }

    #[test]
    fn guard_allows_roleless_users_on_plain_routes() {
        // A signed-in user whose role row vanished still reaches
        // non-admin views; admin views bounce them to /patient.
        let none = RoleFlags::default();
        assert_eq!(
            GuardDecision::evaluate(Some(none), false),
            GuardDecision::Allowed
        );
        assert_eq!(
            GuardDecision::evaluate(Some(none), true),
            GuardDecision::RedirectPatient
        );
    }
}
