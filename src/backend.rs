//! Module principal pour le backend de l'application.
//! Contient les gestionnaires pour les routes, les modèles d'API,
//! le routeur, et les middlewares de garde.

use std::sync::Arc;

use log::error;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::database::Database;

pub mod handlers_auth;
pub mod handlers_functions;
pub mod handlers_unauth;
mod middlewares;
pub mod models;
pub mod router;

pub use middlewares::{bearer_token, AdminContext, AuthContext};

/// État partagé du serveur: le stockage et la configuration.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<Database>>,
    pub config: Arc<Config>,
}

/// Sauvegarde au mieux après une mutation. L'écriture disque part sur
/// un thread bloquant, une fois le verrou d'écriture relâché par
/// l'appelant; un échec est journalisé, jamais remonté à la vue.
pub(crate) async fn persist(db: &Arc<RwLock<Database>>) {
    let db = Arc::clone(db);
    match tokio::task::spawn_blocking(move || db.blocking_read().save()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Falha ao salvar a base de dados: {e}"),
        Err(e) => error!("Falha na tarefa de salvamento: {e}"),
    }
}
