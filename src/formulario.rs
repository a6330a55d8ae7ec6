//! Estado del formulario de reportes: filtros, indicador de carga y mensaje.
//!
//! Ciclo de envío: `Idle --iniciar_envio--> Enviando --finalizar_envio--> Idle`.
//! El cerrojo sólo se mantiene en las transiciones, nunca durante la descarga.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::docentes_service;
use crate::models::{parse_fecha, CampoFiltro, Docente, FiltrosReporte};
use crate::reportes_service::{ClienteReportes, ReporteError};

pub const MENSAJE_EXITO: &str = "✅ Reporte generado y descargado correctamente";
pub const MENSAJE_ERROR: &str = "❌ Error al generar el reporte. Verifique los datos.";

/// Línea de estado visible para el usuario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tipo", content = "texto", rename_all = "camelCase")]
pub enum Mensaje {
    Exito(String),
    Error(String),
}

/// Motivo por el que no se pudo iniciar un envío.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EnvioRechazado {
    #[error("Ya hay un reporte generándose.")]
    Ocupado,
    #[error("Debe seleccionar un tipo de reporte.")]
    SinTipo,
}

#[derive(Debug, Clone, Default)]
pub struct FormularioReportes {
    pub filtros: FiltrosReporte,
    pub cargando: bool,
    pub mensaje: Option<Mensaje>,
    pub docentes: Vec<Docente>,
}

impl FormularioReportes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actualiza un campo de los filtros. No cambia el estado del envío.
    pub fn actualizar(&mut self, campo: CampoFiltro, valor: impl Into<String>) {
        let valor = valor.into();
        if matches!(campo, CampoFiltro::FechaInicio | CampoFiltro::FechaFin)
            && !valor.is_empty()
            && parse_fecha(&valor).is_none()
        {
            warn!("Fecha con formato distinto de YYYY-MM-DD en {campo:?}: '{valor}'");
        }
        self.filtros.set(campo, valor);
        if self.filtros.rango_invertido() {
            warn!(
                "La fecha de inicio {} es posterior a la de fin {}",
                self.filtros.fecha_inicio, self.filtros.fecha_fin
            );
        }
    }

    /// El botón de envío sólo está habilitado si hay tipo y no se está enviando.
    pub fn puede_enviar(&self) -> bool {
        !self.cargando && !self.filtros.tipo_reporte.is_empty()
    }

    /// Vacía los cinco filtros y el mensaje. No toca `cargando`.
    pub fn limpiar(&mut self) {
        self.filtros = FiltrosReporte::default();
        self.mensaje = None;
    }

    /// Pasa a `Enviando` y devuelve una copia de los filtros a enviar.
    pub fn iniciar_envio(&mut self) -> Result<FiltrosReporte, EnvioRechazado> {
        if self.cargando {
            return Err(EnvioRechazado::Ocupado);
        }
        if self.filtros.tipo_reporte.is_empty() {
            return Err(EnvioRechazado::SinTipo);
        }
        self.cargando = true;
        self.mensaje = None;
        Ok(self.filtros.clone())
    }

    /// Vuelve a `Idle` con el mensaje correspondiente al resultado.
    pub fn finalizar_envio(&mut self, resultado: &Result<PathBuf, ReporteError>) {
        self.cargando = false;
        self.mensaje = Some(match resultado {
            Ok(_) => Mensaje::Exito(MENSAJE_EXITO.to_string()),
            Err(_) => Mensaje::Error(MENSAJE_ERROR.to_string()),
        });
    }

    pub fn cargar_docentes(&mut self, docentes: Vec<Docente>) {
        self.docentes = docentes;
    }
}

/// Segunda mitad del envío, tras `iniciar_envio`: descarga el reporte y
/// deja el formulario de nuevo en `Idle` sea cual sea el resultado, que queda
/// en `mensaje`.
pub async fn completar_envio(
    formulario: &Mutex<FormularioReportes>,
    cliente: &ClienteReportes,
    filtros: FiltrosReporte,
) {
    let mut guarda = GuardaEnvio {
        formulario,
        pendiente: true,
    };
    info!("Generando reporte '{}'", filtros.tipo_reporte);

    let resultado = cliente.generar_reporte(&filtros).await;

    guarda.pendiente = false;
    bloquear(formulario).finalizar_envio(&resultado);
}

/// Libera `cargando` aunque la descarga termine en pánico o se cancele la tarea.
struct GuardaEnvio<'a> {
    formulario: &'a Mutex<FormularioReportes>,
    pendiente: bool,
}

impl Drop for GuardaEnvio<'_> {
    fn drop(&mut self) {
        if self.pendiente {
            warn!("Envío interrumpido; se libera el formulario");
            bloquear(self.formulario).finalizar_envio(&Err(ReporteError::NoGenerado));
        }
    }
}

// Un pánico con el cerrojo tomado no debe dejar el formulario inutilizable.
fn bloquear(formulario: &Mutex<FormularioReportes>) -> MutexGuard<'_, FormularioReportes> {
    formulario.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Carga inicial del formulario: consulta los docentes una sola vez.
pub async fn montar(formulario: &Mutex<FormularioReportes>, http: &Client, docentes_url: &Url) {
    let docentes = docentes_service::obtener_docentes(http, docentes_url).await;
    bloquear(formulario).cargar_docentes(docentes);
}
