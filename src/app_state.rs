use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use crate::{config::AppConfig, formulario::FormularioReportes, reportes_service::ClienteReportes};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub cliente_reportes: ClienteReportes,
    pub formulario: Arc<Mutex<FormularioReportes>>,
    pub shutdown_sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}
