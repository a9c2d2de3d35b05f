//! Modèle de données du portail.

use chrono::{DateTime, Months, NaiveDate, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::password::PwHash;

/// Role d'un utilisateur: Admin ou Patient.
///
/// Un utilisateur a au plus un rôle; l'absence d'assignation
/// équivaut à "aucun privilège".
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Patient,
}

/// Format d'un rapport remis au patient.
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Pdf,
}

/// Un identifiant unique d'utilisateur.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display,
)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Un identifiant unique de rapport.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display,
)]
pub struct ReportId(Uuid);

impl ReportId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for ReportId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Enregistrement d'identité, propriété du sous-système d'authentification.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password: PwHash,
    pub created_at: DateTime<Utc>,
}

/// Profil 1:1 avec l'utilisateur, créé et détruit avec lui.
#[derive(Debug, Serialize, Deserialize, Clone, Display)]
#[display("{full_name}")]
pub struct Profile {
    pub id: UserId,
    pub full_name: String,
}

/// Un rapport rédigé par un admin pour un patient.
#[derive(Debug, Serialize, Deserialize, Clone, Display)]
#[display("{title}")]
pub struct PatientReport {
    pub id: ReportId,
    pub patient_id: UserId,
    pub title: String,
    pub content: String,
    pub report_date: NaiveDate,
    pub report_format: ReportFormat,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Filtre de période appliqué côté affichage sur une liste déjà chargée.
/// Ce n'est jamais un paramètre de requête du stockage.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodFilter {
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "all")]
    #[default]
    All,
}

impl PeriodFilter {
    /// Date la plus ancienne incluse, relative à `today`. `None` = pas de filtre.
    fn cutoff(self, today: NaiveDate) -> Option<NaiveDate> {
        let months = match self {
            PeriodFilter::Month => 1,
            PeriodFilter::ThreeMonths => 3,
            PeriodFilter::SixMonths => 6,
            PeriodFilter::Year => 12,
            PeriodFilter::All => return None,
        };
        today.checked_sub_months(Months::new(months))
    }
}

/// Restreint `reports` aux rapports datés dans la fenêtre du filtre.
pub fn filter_by_period(
    reports: Vec<PatientReport>,
    filter: PeriodFilter,
    today: NaiveDate,
) -> Vec<PatientReport> {
    match filter.cutoff(today) {
        Some(cutoff) => reports
            .into_iter()
            .filter(|r| r.report_date >= cutoff)
            .collect(),
        None => reports,
    }
}
