//! Hachage et vérification des mots de passe.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHashString, PasswordVerifier, SaltString},
    Argon2, PasswordHasher,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

static DEFAULT_HASHER: Lazy<Argon2<'static>> = Lazy::new(Argon2::default);

/// Le hash d'un mot de passe vide, utilisé quand l'utilisateur n'existe pas
/// pour éviter une attaque par canal auxiliaire.
static EMPTY_HASH: Lazy<PwHash> = Lazy::new(|| hash(""));

/// Un mot de passe haché (chaîne PHC).
#[derive(Clone, Debug)]
pub struct PwHash(PasswordHashString);

impl Serialize for PwHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PwHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let hash = PasswordHashString::from_str(&s)
            .map_err(|_| <D::Error as serde::de::Error>::custom("Invalid PHC string"))?;
        Ok(PwHash(hash))
    }
}

/// Calcule un haché à partir d'un mot de passe en clair, avec un sel aléatoire.
pub fn hash(password: &str) -> PwHash {
    let salt = SaltString::generate(&mut OsRng);

    // hash_password ne peut échouer qu'avec des paramètres invalides,
    // et les paramètres par défaut sont valides.
    let hash = DEFAULT_HASHER
        .hash_password(password.as_bytes(), &salt)
        .expect("argon2 default parameters are valid")
        .serialize();

    PwHash(hash)
}

/// Vérifie si le mot de passe correspond au hash stocké.
///
/// Si aucun hash n'est fourni, on teste quand même le mot de passe
/// contre un faux hash pour éviter une timing attack.
pub fn verify(password: &str, maybe_hash: Option<&PwHash>) -> bool {
    let stored = maybe_hash.unwrap_or(&EMPTY_HASH);

    DEFAULT_HASHER
        .verify_password(password.as_bytes(), &stored.0.password_hash())
        .is_ok()
        && maybe_hash.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let stored = hash("correct horse battery staple");
        assert!(verify("correct horse battery staple", Some(&stored)));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let stored = hash("correct horse battery staple");
        assert!(!verify("tr0ub4dor&3", Some(&stored)));
    }

    #[test]
    fn unknown_user_is_rejected_even_with_empty_password() {
        assert!(!verify("", None));
        assert!(!verify("anything", None));
    }

    #[test]
    fn hash_survives_serde_round_trip() {
        let stored = hash("segredo123");
        let json = serde_json::to_string(&stored).unwrap();
        let back: PwHash = serde_json::from_str(&json).unwrap();
        assert!(verify("segredo123", Some(&back)));
    }
}
