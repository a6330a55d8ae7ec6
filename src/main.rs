// Módulos de la aplicación
mod api;
mod app_state;
mod config;
mod docentes_service;
mod formulario;
mod models;
mod reportes_service;

use crate::app_state::AppState;
use crate::formulario::FormularioReportes;
use crate::reportes_service::ClienteReportes;
use anyhow::Context;
use axum::Router;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 2. Cargar configuración
    let cfg = config::AppConfig::from_env().context("Error al cargar la configuración")?;
    info!(
        "Servicio de reportes: {} | reportes en {}",
        cfg.api_base_url,
        cfg.reportes_dir.display()
    );

    // 3. Cliente HTTP compartido por docentes y reportes
    let http = reqwest::Client::builder()
        .timeout(cfg.http_timeout)
        .build()
        .context("Error construyendo el cliente HTTP")?;
    let cliente_reportes = ClienteReportes::from_config(&cfg, http.clone());

    // Crear canal para la señal de apagado.
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    // 4. Crear estado compartido de la aplicación
    let app_state = AppState {
        config: cfg.clone(),
        cliente_reportes,
        formulario: Arc::new(Mutex::new(FormularioReportes::new())),
        shutdown_sender: Arc::new(Mutex::new(Some(shutdown_tx))),
    };

    // 5. Montar el formulario: el listado de docentes se pide una sola vez.
    let form = app_state.formulario.clone();
    let docentes_url = cfg.docentes_url.clone();
    tokio::spawn(async move {
        formulario::montar(&form, &http, &docentes_url).await;
    });

    // 6. Configurar el router de la API
    let app = Router::new()
        .merge(api::create_router(app_state.clone()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // 7. Iniciar el servidor
    let server_addr = &app_state.config.server_addr;
    let listener = tokio::net::TcpListener::bind(server_addr)
        .await
        .with_context(|| format!("No se pudo escuchar en {server_addr}"))?;
    info!("🚀 Servidor escuchando en http://{}", server_addr);

    // Configurar el apagado ordenado.
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            info!("Señal de apagado recibida, iniciando cierre del servidor.");
        })
        .await
        .context("Error en el servidor HTTP")?;

    info!("✅ Servidor cerrado correctamente.");
    Ok(())
}
