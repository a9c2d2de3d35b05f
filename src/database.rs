//! Stockage des tables en mémoire, avec sauvegarde en JSON.
//!
//! Tient lieu de backend managé: identités, profils, assignations de
//! rôle, rapports, plus une table volatile de jetons d'accès (jamais
//! persistée).

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs::{create_dir_all, File},
    io::{self, ErrorKind::NotFound},
    path::PathBuf,
};
use thiserror::Error;

use crate::models::{PatientReport, Profile, ReportId, Role, User, UserId};
use crate::utils::password::PwHash;

#[derive(Serialize, Deserialize, Default)]
pub struct Database {
    #[serde(skip)]
    path: Option<PathBuf>,
    /// Jetons d'accès porteurs, valables pour la durée du processus.
    #[serde(skip)]
    tokens: HashMap<String, UserId>,
    users: HashMap<UserId, User>,
    profiles: HashMap<UserId, Profile>,
    roles: HashMap<UserId, Role>,
    reports: HashMap<ReportId, PatientReport>,
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Usuário inexistente: {0}")]
    InvalidUserId(UserId),
    #[error("Este email já está cadastrado")]
    EmailTaken,
    #[error("Relatório inexistente: {0}")]
    InvalidReportId(ReportId),
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self, io::Error> {
        match File::open(&path) {
            Ok(f) => {
                let mut db: Self = serde_json::from_reader(f)?;
                db.path = Some(path);
                Ok(db)
            }

            // Fichier non existant, on le crée
            Err(not_found) if not_found.kind() == NotFound => {
                info!("DB file not found, creating new empty DB");
                let mut new_db = Database::default();
                new_db.path = Some(path);

                // On sauvegarde immédiatement pour détecter tôt un chemin invalide
                new_db.save()?;
                Ok(new_db)
            }

            Err(other) => Err(other),
        }
    }

    pub fn save(&self) -> Result<(), io::Error> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    create_dir_all(parent)?;
                }
            }
            let file = File::create(path)?;
            serde_json::to_writer_pretty(file, self)?;
        }
        Ok(())
    }

    // --- Identités ---

    /// Crée une identité en garantissant l'unicité de l'email.
    pub fn create_user(&mut self, email: &str, password: PwHash) -> Result<UserId, DbError> {
        if self.lookup_email(email).is_some() {
            return Err(DbError::EmailTaken);
        }

        let user = User {
            id: UserId::new(),
            email: email.to_string(),
            password,
            created_at: Utc::now(),
        };
        let id = user.id;
        self.store_user(user);
        Ok(id)
    }

    /// Insertion brute, sans contrôle d'unicité. Sert au nettoyage des
    /// comptes dupliqués hérités du double bootstrap (et aux tests).
    pub fn store_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn get_user(&self, user: UserId) -> Result<&User, DbError> {
        self.users.get(&user).ok_or(DbError::InvalidUserId(user))
    }

    pub fn lookup_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|user| user.email == email)
    }

    /// Toutes les identités partageant un email. Plusieurs résultats ne
    /// peuvent venir que d'un état dupliqué à réparer.
    pub fn users_by_email(&self, email: &str) -> Vec<(UserId, DateTime<Utc>)> {
        self.users
            .values()
            .filter(|user| user.email == email)
            .map(|user| (user.id, user.created_at))
            .collect()
    }

    pub fn update_password(&mut self, user: UserId, password: PwHash) -> Result<(), DbError> {
        let user = self
            .users
            .get_mut(&user)
            .ok_or(DbError::InvalidUserId(user))?;
        user.password = password;
        Ok(())
    }

    pub fn remove_user(&mut self, user: UserId) -> bool {
        self.tokens.retain(|_, holder| *holder != user);
        self.users.remove(&user).is_some()
    }

    pub fn list_users(&self) -> impl Iterator<Item = &User> + '_ {
        self.users.values()
    }

    // --- Profils ---

    pub fn upsert_profile(&mut self, profile: Profile) {
        self.profiles.insert(profile.id, profile);
    }

    pub fn get_profile(&self, user: UserId) -> Option<&Profile> {
        self.profiles.get(&user)
    }

    pub fn remove_profile(&mut self, user: UserId) -> bool {
        self.profiles.remove(&user).is_some()
    }

    pub fn list_profiles(&self) -> impl Iterator<Item = &Profile> + '_ {
        self.profiles.values()
    }

    // --- Assignations de rôle ---

    /// Upsert: la table est indexée par user_id, il y a donc au plus
    /// une assignation par utilisateur.
    pub fn assign_role(&mut self, user: UserId, role: Role) {
        self.roles.insert(user, role);
    }

    pub fn get_role(&self, user: UserId) -> Option<Role> {
        self.roles.get(&user).copied()
    }

    pub fn remove_role(&mut self, user: UserId) -> bool {
        self.roles.remove(&user).is_some()
    }

    // --- Rapports ---

    pub fn store_report(&mut self, report: PatientReport) {
        self.reports.insert(report.id, report);
    }

    pub fn get_report(&self, report: ReportId) -> Result<&PatientReport, DbError> {
        self.reports
            .get(&report)
            .ok_or(DbError::InvalidReportId(report))
    }

    pub fn get_report_mut(&mut self, report: ReportId) -> Result<&mut PatientReport, DbError> {
        self.reports
            .get_mut(&report)
            .ok_or(DbError::InvalidReportId(report))
    }

    pub fn remove_report(&mut self, report: ReportId) -> Result<(), DbError> {
        self.reports
            .remove(&report)
            .map(|_| ())
            .ok_or(DbError::InvalidReportId(report))
    }

    /// Supprime tous les rapports d'un patient; retourne le nombre effacé.
    pub fn remove_reports_of(&mut self, patient: UserId) -> usize {
        let before = self.reports.len();
        self.reports.retain(|_, report| report.patient_id != patient);
        before - self.reports.len()
    }

    pub fn list_reports(&self) -> impl Iterator<Item = &PatientReport> + '_ {
        self.reports.values()
    }

    // --- Jetons d'accès ---

    pub fn issue_token(&mut self, user: UserId) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), user);
        token
    }

    pub fn token_user(&self, token: &str) -> Option<UserId> {
        self.tokens.get(token).copied()
    }

    pub fn revoke_token(&mut self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }
}
