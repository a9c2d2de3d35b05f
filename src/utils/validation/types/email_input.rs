//! Adresse email validée.
//!
//! Le type ne peut être construit qu'à travers la validation: toute
//! instance respecte le format HTML5 vérifié par le crate validator.

use anyhow::{bail, Result};
use std::fmt;
use validator::ValidateEmail;

use crate::utils::validation::EMAIL_MAX_LENGTH;

/// Une adresse email validée et normalisée en minuscules.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmailInput {
    email: String,
}

impl EmailInput {
    pub fn new(email: &str) -> Result<Self> {
        let trimmed = email.trim();

        if trimmed.is_empty() {
            bail!("Email é obrigatório");
        }

        if trimmed.len() > EMAIL_MAX_LENGTH {
            bail!("Email muito longo");
        }

        if !trimmed.validate_email() {
            bail!("Email inválido");
        }

        Ok(Self {
            email: trimmed.to_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.email
    }
}

impl fmt::Display for EmailInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.email)
    }
}

impl AsRef<str> for EmailInput {
    fn as_ref(&self) -> &str {
        &self.email
    }
}
