//! Root module for the validation system.
//! Exposes the public API for input validation.

mod constants;
mod types;

use anyhow::{bail, Result};

pub use constants::*;
pub use types::{EmailInput, FullNameInput, ReportContent, ReportTitle};

/// Vérifie les bornes de longueur d'un mot de passe en clair:
/// 6 à 72 caractères, comptés comme les autres champs textuels.
pub fn validate_password(raw: &str) -> Result<()> {
    let length = raw.chars().count();
    if length < PASSWORD_MIN_LENGTH {
        bail!("Senha deve ter no mínimo 6 caracteres");
    }
    if length > PASSWORD_MAX_LENGTH {
        bail!("Senha muito longa");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_length_boundaries() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password(&"a".repeat(72)).is_ok());
        assert!(validate_password(&"a".repeat(73)).is_err());
    }

    #[test]
    fn password_bounds_count_characters_not_bytes() {
        // 5 caractères sur 10 octets: toujours trop court.
        assert!(validate_password("ééééé").is_err());
        assert!(validate_password("éééééé").is_ok());
        // 72 caractères multioctets restent acceptés.
        assert!(validate_password(&"é".repeat(72)).is_ok());
        assert!(validate_password(&"é".repeat(73)).is_err());
    }
}
