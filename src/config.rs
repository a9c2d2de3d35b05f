//! Configuration de l'application, lue depuis l'environnement
//! (fichier `.env` via dotenv) avec des valeurs par défaut dans `consts`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::consts;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub db_path: PathBuf,
    /// Email fixe du compte admin, utilisé par setup-admin et
    /// cleanup-duplicate-users.
    pub admin_email: String,
    /// Mot de passe initial de l'admin; si absent, aucun compte
    /// n'est provisionné au démarrage.
    pub admin_password: Option<String>,
    pub allowed_origin: String,
    /// Délai de sécurité du garde de routes: au-delà, une résolution
    /// de session bloquée vaut "non authentifié".
    pub guard_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let http_port = env::var("HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(consts::HTTP_PORT);

        let db_path = env::var("DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(consts::DB_PATH));

        Config {
            http_port,
            db_path,
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| consts::DEFAULT_ADMIN_EMAIL.to_string()),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| consts::DEFAULT_ALLOWED_ORIGIN.to_string()),
            guard_timeout: env::var("GUARD_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(consts::GUARD_TIMEOUT),
        }
    }
}
