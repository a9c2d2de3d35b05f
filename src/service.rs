//! Opérations du portail: comptes, sessions, rapports et fonctions
//! privilégiées de gestion des utilisateurs. Point d'entrée unique pour
//! le contrôle d'accès côté données.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::authorization::{resolve_flags, resolve_role, AccessDenied, RoleFlags};
use crate::database::{Database, DbError};
use crate::models::{PatientReport, Profile, ReportFormat, ReportId, Role, User, UserId};
use crate::utils::error_messages;
use crate::utils::password::{hash, verify};
use crate::utils::validation::{
    validate_password, EmailInput, FullNameInput, ReportContent, ReportTitle,
};

/// Erreurs de validation par champ, dans un ordre stable.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{}", error_messages::VALIDATION_ERROR)]
    Validation(FieldErrors),

    #[error("{}", error_messages::NOT_AUTHORIZED)]
    Unauthorized,

    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error(transparent)]
    Db(#[from] DbError),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("{}", error_messages::LOGIN_ERROR)]
    InvalidCredentials,
}

// --- Comptes et sessions ---

/// Résultat d'une connexion réussie.
pub struct SignedIn {
    pub user_id: UserId,
    pub email: String,
    pub flags: RoleFlags,
    pub access_token: String,
}

/// Crée un compte complet: identité, profil, assignation de rôle.
/// L'inscription publique passe toujours par `Role::Patient`; la vue
/// admin peut choisir le rôle.
pub fn create_account(
    db: &mut Database,
    email_raw: &str,
    password_raw: &str,
    full_name_raw: &str,
    role: Role,
) -> Result<UserId, ServiceError> {
    let mut errors = FieldErrors::new();

    let email = match EmailInput::new(email_raw) {
        Ok(email) => Some(email),
        Err(e) => {
            errors.insert("email", e.to_string());
            None
        }
    };
    if let Err(e) = validate_password(password_raw) {
        errors.insert("password", e.to_string());
    }
    let full_name = match FullNameInput::new(full_name_raw) {
        Ok(name) => Some(name),
        Err(e) => {
            errors.insert("full_name", e.to_string());
            None
        }
    };

    let (email, full_name) = match (email, full_name) {
        (Some(email), Some(full_name)) if errors.is_empty() => (email, full_name),
        _ => return Err(ServiceError::Validation(errors)),
    };

    let user_id = db
        .create_user(email.as_str(), hash(password_raw))
        .map_err(|e| match e {
            DbError::EmailTaken => {
                let mut errors = FieldErrors::new();
                errors.insert("email", error_messages::EMAIL_TAKEN.to_string());
                ServiceError::Validation(errors)
            }
            other => ServiceError::Db(other),
        })?;

    db.upsert_profile(Profile {
        id: user_id,
        full_name: full_name.to_string(),
    });
    db.assign_role(user_id, role);

    info!("Conta criada: {} ({})", email, role);
    Ok(user_id)
}

/// Vérifie les identifiants et, en cas de succès, émet un jeton d'accès.
pub fn sign_in(db: &mut Database, email: &str, password: &str) -> Result<SignedIn, LoginError> {
    let email = email.trim().to_lowercase();

    let (user_id, stored_email) = match db.lookup_email(&email) {
        Some(user) => {
            if !verify(password, Some(&user.password)) {
                return Err(LoginError::InvalidCredentials);
            }
            (user.id, user.email.clone())
        }
        None => {
            // Même coût qu'une vérification réelle, cf. utils::password.
            verify(password, None);
            return Err(LoginError::InvalidCredentials);
        }
    };

    let flags = resolve_flags(db, user_id);
    let access_token = db.issue_token(user_id);

    info!("Login de {}", stored_email);
    Ok(SignedIn {
        user_id,
        email: stored_email,
        flags,
        access_token,
    })
}

/// Révoque le jeton s'il est fourni. L'état local de l'appelant est
/// toujours nettoyé, quel que soit le résultat.
pub fn sign_out(db: &mut Database, token: Option<&str>) {
    if let Some(token) = token {
        if !db.revoke_token(token) {
            warn!("Logout com token desconhecido");
        }
    }
}

// --- Rapports ---

/// Formulaire brut d'un rapport, tel que soumis par la vue admin.
#[derive(Debug, Deserialize)]
pub struct ReportForm {
    pub patient_id: String,
    pub title: String,
    pub content: String,
    pub report_date: NaiveDate,
    pub report_format: String,
}

struct ValidReport {
    patient_id: UserId,
    title: ReportTitle,
    content: ReportContent,
    report_date: NaiveDate,
    report_format: ReportFormat,
}

/// Valide tous les champs avant toute écriture; en cas d'échec, aucune
/// persistance partielle, seulement la carte champ → message.
fn validate_report(db: &Database, form: &ReportForm) -> Result<ValidReport, FieldErrors> {
    let mut errors = FieldErrors::new();

    let title = match ReportTitle::new(&form.title) {
        Ok(title) => Some(title),
        Err(e) => {
            errors.insert("title", e.to_string());
            None
        }
    };

    let content = match ReportContent::new(&form.content) {
        Ok(content) => Some(content),
        Err(e) => {
            errors.insert("content", e.to_string());
            None
        }
    };

    // L'identifiant doit être un UUID référant un profil existant.
    let patient_id = Uuid::parse_str(form.patient_id.trim())
        .ok()
        .map(UserId::from)
        .filter(|id| db.get_profile(*id).is_some());
    if patient_id.is_none() {
        errors.insert("patient_id", "Selecione um paciente".to_string());
    }

    let report_format = ReportFormat::from_str(&form.report_format).ok();
    if report_format.is_none() {
        errors.insert("report_format", "Selecione um formato".to_string());
    }

    match (title, content, patient_id, report_format) {
        (Some(title), Some(content), Some(patient_id), Some(report_format))
            if errors.is_empty() =>
        {
            Ok(ValidReport {
                patient_id,
                title,
                content,
                report_date: form.report_date,
                report_format,
            })
        }
        _ => Err(errors),
    }
}

pub fn create_report(
    db: &mut Database,
    author: UserId,
    form: &ReportForm,
) -> Result<ReportId, ServiceError> {
    let valid = validate_report(db, form).map_err(ServiceError::Validation)?;

    let report = PatientReport {
        id: ReportId::new(),
        patient_id: valid.patient_id,
        title: valid.title.to_string(),
        content: valid.content.to_string(),
        report_date: valid.report_date,
        report_format: valid.report_format,
        created_by: author,
        created_at: Utc::now(),
    };
    let id = report.id;

    db.store_report(report);
    info!("Relatório {} criado para paciente {}", id, valid.patient_id);
    Ok(id)
}

pub fn update_report(
    db: &mut Database,
    id: ReportId,
    form: &ReportForm,
) -> Result<(), ServiceError> {
    db.get_report(id)?;
    let valid = validate_report(db, form).map_err(ServiceError::Validation)?;

    let report = db.get_report_mut(id)?;
    report.patient_id = valid.patient_id;
    report.title = valid.title.to_string();
    report.content = valid.content.to_string();
    report.report_date = valid.report_date;
    report.report_format = valid.report_format;
    // created_by et created_at restent ceux de la création.

    info!("Relatório {id} atualizado");
    Ok(())
}

pub fn delete_report(db: &mut Database, id: ReportId) -> Result<(), ServiceError> {
    db.remove_report(id)?;
    info!("Relatório {id} excluído");
    Ok(())
}

/// Rapports d'un patient, du plus récent au plus ancien.
pub fn reports_for_patient(db: &Database, patient: UserId) -> Vec<PatientReport> {
    let mut reports: Vec<PatientReport> = db
        .list_reports()
        .filter(|r| r.patient_id == patient)
        .cloned()
        .collect();
    reports.sort_by(|a, b| {
        b.report_date
            .cmp(&a.report_date)
            .then(b.created_at.cmp(&a.created_at))
    });
    reports
}

/// Un rapport accompagné du nom du patient, pour la vue admin.
#[derive(Debug, Serialize)]
pub struct ReportWithOwner {
    #[serde(flatten)]
    pub report: PatientReport,
    pub patient_name: String,
}

/// Tous les rapports avec le nom du patient, du plus récent au plus ancien.
pub fn all_reports(db: &Database) -> Vec<ReportWithOwner> {
    let mut reports: Vec<ReportWithOwner> = db
        .list_reports()
        .cloned()
        .map(|report| {
            let patient_name = db
                .get_profile(report.patient_id)
                .map(|p| p.full_name.clone())
                .unwrap_or_default();
            ReportWithOwner {
                report,
                patient_name,
            }
        })
        .collect();
    reports.sort_by(|a, b| {
        b.report
            .report_date
            .cmp(&a.report.report_date)
            .then(b.report.created_at.cmp(&a.report.created_at))
    });
    reports
}

// --- Utilisateurs (vue admin) ---

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub full_name: String,
    pub role: Option<Role>,
}

/// Profils joints à leur rôle, triés par nom complet.
pub fn list_users(db: &Database) -> Vec<UserSummary> {
    let mut users: Vec<UserSummary> = db
        .list_profiles()
        .map(|profile| UserSummary {
            id: profile.id,
            full_name: profile.full_name.clone(),
            role: resolve_role(db, profile.id),
        })
        .collect();
    users.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    users
}

// --- Fonctions privilégiées ---

/// Machine d'autorisation commune aux trois fonctions:
/// pas de jeton → Unauthorized (401); jeton sans rôle admin →
/// AccessDenied (403); sinon l'appelant est résolu.
pub fn authorize_function_caller(
    db: &Database,
    token: Option<&str>,
) -> Result<UserId, ServiceError> {
    let token = token.ok_or(ServiceError::Unauthorized)?;
    let caller = db.token_user(token).ok_or(ServiceError::Unauthorized)?;

    match resolve_role(db, caller) {
        Some(Role::Admin) => Ok(caller),
        _ => Err(AccessDenied.into()),
    }
}

#[derive(Debug)]
pub struct SetupAdminOutcome {
    pub user_id: UserId,
    pub created: bool,
}

/// Upsert idempotent du compte admin: trouve ou crée l'identité, fixe le
/// mot de passe, garantit le profil et l'assignation admin. Sans danger
/// en cas d'invocations répétées.
pub fn setup_admin(
    db: &mut Database,
    email_raw: &str,
    password_raw: &str,
    full_name: Option<&str>,
) -> Result<SetupAdminOutcome, ServiceError> {
    let mut errors = FieldErrors::new();
    let email = match EmailInput::new(email_raw) {
        Ok(email) => Some(email),
        Err(e) => {
            errors.insert("email", e.to_string());
            None
        }
    };
    if let Err(e) = validate_password(password_raw) {
        errors.insert("password", e.to_string());
    }
    let email = match email {
        Some(email) if errors.is_empty() => email,
        _ => return Err(ServiceError::Validation(errors)),
    };

    let (user_id, created) = match db.lookup_email(email.as_str()) {
        Some(user) => {
            let id = user.id;
            db.update_password(id, hash(password_raw))?;
            info!("Admin existente, senha redefinida: {email}");
            (id, false)
        }
        None => {
            let id = db.create_user(email.as_str(), hash(password_raw))?;
            info!("Admin criado: {email}");
            (id, true)
        }
    };

    if db.get_profile(user_id).is_none() {
        let full_name = full_name
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| {
                email
                    .as_str()
                    .split('@')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            });
        db.upsert_profile(Profile {
            id: user_id,
            full_name,
        });
    }

    db.assign_role(user_id, Role::Admin);
    Ok(SetupAdminOutcome { user_id, created })
}

#[derive(Debug)]
pub enum DeleteOutcome {
    /// L'identité et ses lignes associées ont été supprimées.
    Deleted,
    /// L'identité n'existait plus; seules des lignes orphelines ont été
    /// nettoyées. Rapporté comme un succès (nettoyage idempotent).
    OrphansRemoved,
}

/// Supprime un utilisateur. Les admins ne sont jamais supprimables par
/// ce chemin.
pub fn delete_user(db: &mut Database, target: UserId) -> Result<DeleteOutcome, ServiceError> {
    if resolve_role(db, target) == Some(Role::Admin) {
        return Err(AccessDenied.into());
    }

    if db.remove_user(target) {
        db.remove_role(target);
        db.remove_profile(target);
        let reports = db.remove_reports_of(target);
        info!("Usuário {target} deletado ({reports} relatórios)");
        Ok(DeleteOutcome::Deleted)
    } else {
        let role = db.remove_role(target);
        let profile = db.remove_profile(target);
        info!(
            "Usuário {target} ausente; órfãos removidos (role: {role}, profile: {profile})"
        );
        Ok(DeleteOutcome::OrphansRemoved)
    }
}

pub struct CleanupOutcome {
    pub kept: Option<UserId>,
    pub deleted: usize,
}

/// Répare la condition de double bootstrap: parmi les identités
/// partageant l'email admin, garde la plus récente, supprime les autres
/// avec leurs lignes, et garantit le rôle admin de la survivante.
pub fn cleanup_duplicate_users(db: &mut Database, admin_email: &str) -> CleanupOutcome {
    let mut duplicates = db.users_by_email(admin_email);
    if duplicates.is_empty() {
        info!("Nenhum usuário {admin_email} encontrado");
        return CleanupOutcome {
            kept: None,
            deleted: 0,
        };
    }

    // La plus récente d'abord.
    duplicates.sort_by(|a, b| b.1.cmp(&a.1));
    let kept = duplicates[0].0;

    let mut deleted = 0;
    for (id, _) in duplicates.into_iter().skip(1) {
        db.remove_role(id);
        db.remove_profile(id);
        db.remove_user(id);
        deleted += 1;
    }

    db.assign_role(kept, Role::Admin);
    info!("Limpeza concluída: mantido {kept}, deletados {deleted}");
    CleanupOutcome {
        kept: Some(kept),
        deleted,
    }
}

pub struct BulkDeleteOutcome {
    pub deleted: usize,
    pub failed: usize,
}

/// Suppression de tous les comptes patients: boucle séquentielle de
/// suppressions indépendantes, au mieux. Les échecs sont comptés et
/// journalisés, jamais annulés.
pub fn delete_all_patients(db: &mut Database) -> BulkDeleteOutcome {
    let targets: Vec<UserId> = db
        .list_users()
        .map(|user| user.id)
        .filter(|id| resolve_role(db, *id) == Some(Role::Patient))
        .collect();

    let mut outcome = BulkDeleteOutcome {
        deleted: 0,
        failed: 0,
    };
    for target in targets {
        match delete_user(db, target) {
            Ok(_) => outcome.deleted += 1,
            Err(e) => {
                error!("Erro ao deletar {target}: {e}");
                outcome.failed += 1;
            }
        }
    }

    info!(
        "Exclusão em massa: {} deletados, {} falhas",
        outcome.deleted, outcome.failed
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn new_db() -> Database {
        Database::default()
    }

    fn patient_with_profile(db: &mut Database, email: &str, name: &str) -> UserId {
        create_account(db, email, "senha123", name, Role::Patient).unwrap()
    }

    fn admin_account(db: &mut Database) -> UserId {
        create_account(db, "admin@clinica.com", "senha123", "Fisioterapia", Role::Admin).unwrap()
    }

    fn valid_form(patient: UserId) -> ReportForm {
        ReportForm {
            patient_id: patient.to_string(),
            title: "Avaliação".to_string(),
            content: "Paciente evoluiu bem na sessão".to_string(),
            report_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            report_format: "text".to_string(),
        }
    }

    #[test]
    fn short_title_is_rejected_without_persisting() {
        let mut db = new_db();
        let admin = admin_account(&mut db);
        let patient = patient_with_profile(&mut db, "p@clinica.com", "Paciente Um");

        let mut form = valid_form(patient);
        form.title = "Av".to_string();

        let err = create_report(&mut db, admin, &form).unwrap_err();
        match err {
            ServiceError::Validation(fields) => {
                assert!(fields["title"].contains("mínimo 3 caracteres"));
            }
            other => panic!("expected validation error, got {other}"),
        }
        assert_eq!(db.list_reports().count(), 0);
    }

    #[test]
    fn valid_report_inserts_exactly_one_row() {
        let mut db = new_db();
        let admin = admin_account(&mut db);
        let patient = patient_with_profile(&mut db, "p@clinica.com", "Paciente Um");

        let id = create_report(&mut db, admin, &valid_form(patient)).unwrap();

        assert_eq!(db.list_reports().count(), 1);
        let stored = db.get_report(id).unwrap();
        assert_eq!(stored.title, "Avaliação");
        assert_eq!(stored.report_format, ReportFormat::Text);
        assert_eq!(stored.created_by, admin);
        assert_eq!(stored.patient_id, patient);
    }

    #[test]
    fn unknown_patient_and_bad_format_are_field_errors() {
        let mut db = new_db();
        let admin = admin_account(&mut db);

        let mut form = valid_form(UserId::new()); // no such profile
        form.report_format = "docx".to_string();

        let err = create_report(&mut db, admin, &form).unwrap_err();
        match err {
            ServiceError::Validation(fields) => {
                assert_eq!(fields["patient_id"], "Selecione um paciente");
                assert_eq!(fields["report_format"], "Selecione um formato");
            }
            other => panic!("expected validation error, got {other}"),
        }
        assert_eq!(db.list_reports().count(), 0);
    }

    #[test]
    fn update_keeps_author_and_creation_time() {
        let mut db = new_db();
        let admin = admin_account(&mut db);
        let patient = patient_with_profile(&mut db, "p@clinica.com", "Paciente Um");

        let id = create_report(&mut db, admin, &valid_form(patient)).unwrap();
        let created_at = db.get_report(id).unwrap().created_at;

        let mut form = valid_form(patient);
        form.title = "Avaliação revisada".to_string();
        update_report(&mut db, id, &form).unwrap();

        let stored = db.get_report(id).unwrap();
        assert_eq!(stored.title, "Avaliação revisada");
        assert_eq!(stored.created_by, admin);
        assert_eq!(stored.created_at, created_at);
    }

    #[test]
    fn patient_reports_are_sorted_most_recent_first() {
        let mut db = new_db();
        let admin = admin_account(&mut db);
        let patient = patient_with_profile(&mut db, "p@clinica.com", "Paciente Um");
        let other = patient_with_profile(&mut db, "q@clinica.com", "Paciente Dois");

        for (date, target) in [
            ("2025-01-10", patient),
            ("2025-03-05", patient),
            ("2025-02-20", other),
        ] {
            let mut form = valid_form(target);
            form.report_date = date.parse().unwrap();
            create_report(&mut db, admin, &form).unwrap();
        }

        let reports = reports_for_patient(&db, patient);
        let dates: Vec<String> = reports.iter().map(|r| r.report_date.to_string()).collect();
        assert_eq!(dates, vec!["2025-03-05", "2025-01-10"]);
    }

    #[test]
    fn all_reports_carry_the_owner_name() {
        let mut db = new_db();
        let admin = admin_account(&mut db);
        let patient = patient_with_profile(&mut db, "p@clinica.com", "Paciente Um");
        create_report(&mut db, admin, &valid_form(patient)).unwrap();

        let reports = all_reports(&db);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].patient_name, "Paciente Um");
    }

    #[test]
    fn duplicate_email_is_a_field_error() {
        let mut db = new_db();
        patient_with_profile(&mut db, "p@clinica.com", "Paciente Um");

        let err = create_account(&mut db, "p@clinica.com", "senha123", "Outro", Role::Patient)
            .unwrap_err();
        match err {
            ServiceError::Validation(fields) => {
                assert_eq!(fields["email"], error_messages::EMAIL_TAKEN);
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn sign_in_rejects_wrong_password_and_unknown_email() {
        let mut db = new_db();
        patient_with_profile(&mut db, "p@clinica.com", "Paciente Um");

        assert!(sign_in(&mut db, "p@clinica.com", "errada").is_err());
        assert!(sign_in(&mut db, "ninguem@clinica.com", "senha123").is_err());

        let signed = sign_in(&mut db, "  P@CLINICA.COM ", "senha123").unwrap();
        assert!(signed.flags.is_patient);
        assert_eq!(db.token_user(&signed.access_token), Some(signed.user_id));
    }

    #[test]
    fn function_caller_authorization_ladder() {
        let mut db = new_db();
        let admin = admin_account(&mut db);
        let patient = patient_with_profile(&mut db, "p@clinica.com", "Paciente Um");

        let admin_token = db.issue_token(admin);
        let patient_token = db.issue_token(patient);

        assert!(matches!(
            authorize_function_caller(&db, None),
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            authorize_function_caller(&db, Some("jeton-inconnu")),
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            authorize_function_caller(&db, Some(patient_token.as_str())),
            Err(ServiceError::AccessDenied(_))
        ));
        assert_eq!(
            authorize_function_caller(&db, Some(admin_token.as_str())).unwrap(),
            admin
        );
    }

    #[test]
    fn admins_are_never_deletable() {
        let mut db = new_db();
        let admin = admin_account(&mut db);

        let err = delete_user(&mut db, admin).unwrap_err();
        assert!(matches!(err, ServiceError::AccessDenied(_)));
        assert!(db.get_user(admin).is_ok());
        assert_eq!(db.get_role(admin), Some(Role::Admin));
    }

    #[test]
    fn deleting_a_patient_removes_all_their_rows() {
        let mut db = new_db();
        let admin = admin_account(&mut db);
        let patient = patient_with_profile(&mut db, "p@clinica.com", "Paciente Um");
        create_report(&mut db, admin, &valid_form(patient)).unwrap();

        assert!(matches!(
            delete_user(&mut db, patient),
            Ok(DeleteOutcome::Deleted)
        ));
        assert!(db.get_user(patient).is_err());
        assert!(db.get_profile(patient).is_none());
        assert_eq!(db.get_role(patient), None);
        assert_eq!(db.list_reports().count(), 0);
    }

    #[test]
    fn orphaned_rows_are_cleaned_up_idempotently() {
        let mut db = new_db();
        let ghost = UserId::new();
        db.upsert_profile(Profile {
            id: ghost,
            full_name: "Fantasma".to_string(),
        });
        db.assign_role(ghost, Role::Patient);

        assert!(matches!(
            delete_user(&mut db, ghost),
            Ok(DeleteOutcome::OrphansRemoved)
        ));
        assert!(db.get_profile(ghost).is_none());
        assert_eq!(db.get_role(ghost), None);

        // Une seconde invocation reste un succès.
        assert!(matches!(
            delete_user(&mut db, ghost),
            Ok(DeleteOutcome::OrphansRemoved)
        ));
    }

    #[test]
    fn setup_admin_is_an_idempotent_upsert() {
        let mut db = new_db();

        let first = setup_admin(&mut db, "admin@clinica.com", "senha-um", Some("Fisio")).unwrap();
        assert!(first.created);
        assert_eq!(db.get_role(first.user_id), Some(Role::Admin));
        assert_eq!(db.get_profile(first.user_id).unwrap().full_name, "Fisio");

        let second = setup_admin(&mut db, "admin@clinica.com", "senha-dois", None).unwrap();
        assert!(!second.created);
        assert_eq!(second.user_id, first.user_id);
        assert_eq!(db.list_users().count(), 1);

        // Le mot de passe a bien été remplacé.
        assert!(sign_in(&mut db, "admin@clinica.com", "senha-dois").is_ok());
        assert!(sign_in(&mut db, "admin@clinica.com", "senha-um").is_err());
    }

    #[test]
    fn setup_admin_requires_email_and_password() {
        let mut db = new_db();
        let err = setup_admin(&mut db, "", "", None).unwrap_err();
        match err {
            ServiceError::Validation(fields) => {
                assert!(fields.contains_key("email"));
                assert!(fields.contains_key("password"));
            }
            other => panic!("expected validation error, got {other}"),
        }
        assert_eq!(db.list_users().count(), 0);
    }

    #[test]
    fn cleanup_keeps_only_the_most_recent_duplicate() {
        let mut db = new_db();
        let base = chrono::Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

        let mut ids = Vec::new();
        for i in 0..3 {
            let user = User {
                id: UserId::new(),
                email: "admin@clinica.com".to_string(),
                password: hash("senha123"),
                created_at: base + Duration::days(i),
            };
            let id = user.id;
            db.store_user(user);
            db.upsert_profile(Profile {
                id,
                full_name: "Fisio".to_string(),
            });
            db.assign_role(id, Role::Admin);
            ids.push(id);
        }
        let newest = ids[2];

        let outcome = cleanup_duplicate_users(&mut db, "admin@clinica.com");
        assert_eq!(outcome.kept, Some(newest));
        assert_eq!(outcome.deleted, 2);

        assert!(db.get_user(newest).is_ok());
        assert_eq!(db.get_role(newest), Some(Role::Admin));
        for id in &ids[..2] {
            assert!(db.get_user(*id).is_err());
            assert!(db.get_profile(*id).is_none());
            assert_eq!(db.get_role(*id), None);
        }
    }

    #[test]
    fn cleanup_with_no_match_reports_nothing_kept() {
        let mut db = new_db();
        let outcome = cleanup_duplicate_users(&mut db, "admin@clinica.com");
        assert_eq!(outcome.kept, None);
        assert_eq!(outcome.deleted, 0);
    }

    #[test]
    fn bulk_delete_spares_admins_and_counts_outcomes() {
        let mut db = new_db();
        admin_account(&mut db);
        patient_with_profile(&mut db, "p1@clinica.com", "Paciente Um");
        patient_with_profile(&mut db, "p2@clinica.com", "Paciente Dois");

        let outcome = delete_all_patients(&mut db);
        assert_eq!(outcome.deleted, 2);
        assert_eq!(outcome.failed, 0);
        assert_eq!(db.list_users().count(), 1);
        assert_eq!(list_users(&db).len(), 1);
    }
}
