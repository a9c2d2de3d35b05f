//! Champs textuels validés des formulaires du portail.
//!
//! Chaque type ne peut être construit qu'à travers la validation:
//! contraintes de longueur, refus des caractères de contrôle et du HTML,
//! normalisation Unicode (NFKC) et des espaces de bord.

use ammonia::is_html;
use anyhow::{bail, Result};
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use validator::ValidateNonControlCharacter;

use crate::utils::validation::{
    CONTENT_MAX_LENGTH, CONTENT_MIN_LENGTH, NAME_MAX_LENGTH, NAME_MIN_LENGTH, TITLE_MAX_LENGTH,
    TITLE_MIN_LENGTH,
};

/// Validation partagée par tous les champs textuels.
/// Les bornes se mesurent sur le texte après trim, en caractères.
fn validated_text(
    raw: &str,
    min: usize,
    max: usize,
    too_short: &'static str,
    too_long: &'static str,
) -> Result<String> {
    let trimmed = raw.trim();
    let length = trimmed.chars().count();

    if length < min {
        bail!("{too_short}");
    }

    if length > max {
        bail!("{too_long}");
    }

    if !trimmed.validate_non_control_character() {
        bail!("O texto contém caracteres inválidos");
    }

    if is_html(trimmed) {
        bail!("O texto não pode conter HTML");
    }

    Ok(trimmed.nfkc().collect())
}

macro_rules! text_field {
    ($name:ident) => {
        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Titre d'un rapport: 3 à 200 caractères.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportTitle(String);

impl ReportTitle {
    pub fn new(raw: &str) -> Result<Self> {
        validated_text(
            raw,
            TITLE_MIN_LENGTH,
            TITLE_MAX_LENGTH,
            "Título deve ter no mínimo 3 caracteres",
            "Título muito longo",
        )
        .map(Self)
    }
}

text_field!(ReportTitle);

/// Contenu d'un rapport: 10 à 5000 caractères.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportContent(String);

impl ReportContent {
    pub fn new(raw: &str) -> Result<Self> {
        validated_text(
            raw,
            CONTENT_MIN_LENGTH,
            CONTENT_MAX_LENGTH,
            "Conteúdo deve ter no mínimo 10 caracteres",
            "Conteúdo muito longo",
        )
        .map(Self)
    }
}

text_field!(ReportContent);

/// Nom complet d'un utilisateur: 2 à 100 caractères.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullNameInput(String);

impl FullNameInput {
    pub fn new(raw: &str) -> Result<Self> {
        validated_text(
            raw,
            NAME_MIN_LENGTH,
            NAME_MAX_LENGTH,
            "Nome deve ter no mínimo 2 caracteres",
            "Nome muito longo",
        )
        .map(Self)
    }
}

text_field!(FullNameInput);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_minimum_is_three_characters() {
        let err = ReportTitle::new("Av").unwrap_err();
        assert!(err.to_string().contains("mínimo 3 caracteres"));
        assert!(ReportTitle::new("Ava").is_ok());
    }

    #[test]
    fn title_maximum_is_two_hundred_characters() {
        assert!(ReportTitle::new(&"a".repeat(TITLE_MAX_LENGTH)).is_ok());
        let err = ReportTitle::new(&"a".repeat(TITLE_MAX_LENGTH + 1)).unwrap_err();
        assert!(err.to_string().contains("muito longo"));
    }

    #[test]
    fn content_minimum_is_ten_characters() {
        let err = ReportContent::new("curto").unwrap_err();
        assert!(err.to_string().contains("mínimo 10 caracteres"));
        assert!(ReportContent::new("conteúdo ok").is_ok());
    }

    #[test]
    fn bounds_apply_after_trimming() {
        // 2 characters once trimmed, below the title minimum.
        assert!(ReportTitle::new("  Av  ").is_err());
        let title = ReportTitle::new("  Avaliação postural  ").unwrap();
        assert_eq!(title.as_str(), "Avaliação postural");
    }

    #[test]
    fn bounds_count_characters_not_bytes() {
        // 3 characters, 9 bytes: valid as a title.
        assert!(ReportTitle::new("ééé").is_ok());
    }

    #[test]
    fn control_characters_and_html_are_rejected() {
        assert!(ReportContent::new("conteúdo com nulo\0aqui").is_err());
        assert!(ReportContent::new("<script>alert(1)</script>").is_err());
    }

    #[test]
    fn full_name_bounds() {
        assert!(FullNameInput::new("A").is_err());
        assert!(FullNameInput::new("Ana Souza").is_ok());
        assert!(FullNameInput::new(&"a".repeat(NAME_MAX_LENGTH + 1)).is_err());
    }
}
