use std::path::PathBuf;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::spawn;
use tracing::info;

use crate::{
    app_state::AppState,
    formulario::{self, EnvioRechazado, FormularioReportes, Mensaje},
    models::{CampoFiltro, Docente, FiltrosReporte, TIPOS_REPORTE},
};

// --- Payloads y Respuestas de la API ---

#[derive(Deserialize)]
pub struct CampoPayload {
    campo: CampoFiltro,
    #[serde(default)]
    valor: String,
}

/// Lo que necesita una vista para pintar el formulario.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadoFormulario {
    filtros: FiltrosReporte,
    cargando: bool,
    mensaje: Option<Mensaje>,
    puede_enviar: bool,
    opciones_docente: Vec<OpcionDocente>,
    reportes_dir: PathBuf,
}

/// Opción del selector de docentes.
#[derive(Serialize)]
pub struct OpcionDocente {
    valor: String,
    etiqueta: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TipoReporteInfo {
    valor: &'static str,
    etiqueta: &'static str,
    descripcion: &'static str,
    nombre_archivo: &'static str,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/formulario", get(formulario_handler))
        .route("/api/formulario/campo", post(campo_handler))
        .route("/api/formulario/limpiar", post(limpiar_handler))
        .route("/api/formulario/enviar", post(enviar_handler))
        .route("/api/docentes", get(docentes_handler))
        .route("/api/tipos-reporte", get(tipos_reporte_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .with_state(app_state)
}

fn snapshot(state: &AppState, formulario: &FormularioReportes) -> EstadoFormulario {
    EstadoFormulario {
        filtros: formulario.filtros.clone(),
        cargando: formulario.cargando,
        mensaje: formulario.mensaje.clone(),
        puede_enviar: formulario.puede_enviar(),
        opciones_docente: formulario
            .docentes
            .iter()
            .map(|d| OpcionDocente {
                valor: d.id.clone(),
                etiqueta: d.etiqueta(),
            })
            .collect(),
        reportes_dir: state.config.reportes_dir.clone(),
    }
}

// --- Handlers ---

#[axum::debug_handler]
async fn formulario_handler(State(state): State<AppState>) -> Json<EstadoFormulario> {
    let formulario = state.formulario.lock().unwrap();
    Json(snapshot(&state, &formulario))
}

#[axum::debug_handler]
async fn campo_handler(
    State(state): State<AppState>,
    Json(payload): Json<CampoPayload>,
) -> Json<EstadoFormulario> {
    let mut formulario = state.formulario.lock().unwrap();
    formulario.actualizar(payload.campo, payload.valor);
    Json(snapshot(&state, &formulario))
}

#[axum::debug_handler]
async fn limpiar_handler(State(state): State<AppState>) -> Json<EstadoFormulario> {
    let mut formulario = state.formulario.lock().unwrap();
    formulario.limpiar();
    Json(snapshot(&state, &formulario))
}

#[axum::debug_handler]
async fn enviar_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let filtros = state
        .formulario
        .lock()
        .unwrap()
        .iniciar_envio()
        .map_err(|rechazo| {
            let status = match rechazo {
                EnvioRechazado::Ocupado => StatusCode::CONFLICT,
                EnvioRechazado::SinTipo => StatusCode::BAD_REQUEST,
            };
            (status, Json(json!({ "error": rechazo.to_string() })))
        })?;

    spawn(async move {
        formulario::completar_envio(&state.formulario, &state.cliente_reportes, filtros).await;
    });

    Ok(StatusCode::ACCEPTED)
}

#[axum::debug_handler]
async fn docentes_handler(State(state): State<AppState>) -> Json<Vec<Docente>> {
    Json(state.formulario.lock().unwrap().docentes.clone())
}

#[axum::debug_handler]
async fn tipos_reporte_handler() -> Json<Vec<TipoReporteInfo>> {
    Json(
        TIPOS_REPORTE
            .iter()
            .map(|tipo| TipoReporteInfo {
                valor: tipo.valor,
                etiqueta: tipo.etiqueta,
                descripcion: tipo.descripcion,
                nombre_archivo: tipo.nombre_archivo,
            })
            .collect(),
    )
}

// --- Handler de Apagado ---

#[axum::debug_handler]
async fn shutdown_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!("Petición de apagado recibida.");
    if let Some(sender) = state.shutdown_sender.lock().unwrap().take() {
        let _ = sender.send(());
    }
    StatusCode::OK
}
