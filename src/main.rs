//! Point d'entrée principal de l'application.
//! Charge la configuration, ouvre le stockage, provisionne le compte
//! admin si demandé, et démarre le serveur web avec Axum.

mod authorization;
mod backend;
mod config;
mod consts;
mod database;
mod models;
mod service;
mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use log::{error, info};
use tokio::sync::RwLock;

use crate::backend::AppState;
use crate::config::Config;
use crate::database::Database;

#[tokio::main]
async fn main() {
    // Charger les variables d'environnement
    dotenv().ok();
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = Config::from_env();
    let db = Database::open(config.db_path.clone()).expect("Failed to open database");

    let state = AppState {
        db: Arc::new(RwLock::new(db)),
        config: Arc::new(config),
    };

    // Provisionner le compte admin au démarrage si un mot de passe
    // initial est fourni. Les points d'entrée privilégiés exigent un
    // appelant admin; il en faut donc un premier.
    if let Some(password) = state.config.admin_password.clone() {
        let mut db = state.db.write().await;
        match service::setup_admin(&mut db, &state.config.admin_email, &password, None) {
            Ok(outcome) if outcome.created => {
                info!("Compte admin provisionné: {}", state.config.admin_email);
            }
            Ok(_) => info!("Compte admin déjà présent"),
            Err(e) => error!("Échec du provisionnement admin: {e}"),
        }
        drop(db);
        backend::persist(&state.db).await;
    }

    // Sauvegarder le stockage à l'arrêt du serveur
    tokio::spawn({
        let db = state.db.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                if let Err(e) = db.read().await.save() {
                    eprintln!("Erreur lors de la sauvegarde: {}", e);
                }
            }
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.http_port));
    let app = backend::router::get_router(state);

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to open web server listener");

    axum::serve(listener, app)
        .await
        .expect("Failed to bind Axum to listener");
}
