//! Définition des constantes globales pour l'application.

use std::time::Duration;

pub const HTTP_PORT: u16 = 8080; // Port par défaut pour le serveur HTTP.
pub const DB_PATH: &str = "./data/portal.json"; // Chemin de la base de données.

/// Email fixe du compte administrateur de la clinique.
pub const DEFAULT_ADMIN_EMAIL: &str = "fisioterapia@startfisio.com.br";

/// Origine autorisée par la politique CORS des fonctions privilégiées.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://startfisio.com.br";

/// Délai de sécurité du garde de routes: au-delà, une vérification
/// d'authentification bloquée est traitée comme "non authentifié".
pub const GUARD_TIMEOUT: Duration = Duration::from_secs(5);

/// Clé de session contenant l'identifiant de l'utilisateur connecté.
pub const SESSION_USER_KEY: &str = "user_id";
