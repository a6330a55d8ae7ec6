//! Cliente del servicio de reportes: construye la petición a partir de los
//! filtros, descarga el Excel y lo entrega al destino de guardado.
//!
//! API pública:
//!   - `ClienteReportes::generar_reporte(&FiltrosReporte)`
//!   - `construir_url(&Url, &FiltrosReporte)`
//!   - trait `GuardarArchivo` y su implementación en disco `GuardadoLocal`.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use reqwest::{header, Client};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::config::AppConfig;
use crate::models::{nombre_archivo, FiltrosReporte, MIME_XLSX};

/// Único fallo que ve quien llama; el detalle queda en el log.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReporteError {
    #[error("No se pudo generar el reporte. Verifique la conexión.")]
    NoGenerado,
}

/// Punto de integración con el entorno para guardar el archivo descargado.
pub trait GuardarArchivo: Send + Sync {
    /// Guarda `contenido` con el nombre indicado y devuelve la ruta final.
    fn guardar(&self, nombre: &str, contenido: &[u8]) -> Result<PathBuf>;
}

/// Guarda los reportes en un directorio del sistema de archivos.
#[derive(Debug, Clone)]
pub struct GuardadoLocal {
    directorio: PathBuf,
}

impl GuardadoLocal {
    pub fn new(directorio: impl Into<PathBuf>) -> Self {
        Self {
            directorio: directorio.into(),
        }
    }
}

impl GuardarArchivo for GuardadoLocal {
    fn guardar(&self, nombre: &str, contenido: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.directorio).with_context(|| {
            format!("No se pudo crear el directorio {}", self.directorio.display())
        })?;

        // Nunca se sobrescribe un reporte previo: `nombre (1).xlsx`, `nombre (2).xlsx`...
        for intento in 0..MAX_NOMBRES_ALTERNATIVOS {
            let ruta = self.directorio.join(nombre_con_sufijo(nombre, intento));
            let mut archivo = match OpenOptions::new().write(true).create_new(true).open(&ruta) {
                Ok(archivo) => archivo,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("No se pudo crear {}", ruta.display()))
                }
            };
            archivo
                .write_all(contenido)
                .with_context(|| format!("No se pudo escribir {}", ruta.display()))?;
            return Ok(ruta);
        }
        Err(anyhow!(
            "No hay nombre libre para {nombre} en {}",
            self.directorio.display()
        ))
    }
}

const MAX_NOMBRES_ALTERNATIVOS: u32 = 1000;

/// `reporte.xlsx` con intento 2 da `reporte (2).xlsx`; el intento 0 deja el nombre igual.
fn nombre_con_sufijo(nombre: &str, intento: u32) -> String {
    if intento == 0 {
        return nombre.to_string();
    }
    let ruta = Path::new(nombre);
    match (ruta.file_stem(), ruta.extension()) {
        (Some(base), Some(ext)) => format!(
            "{} ({intento}).{}",
            base.to_string_lossy(),
            ext.to_string_lossy()
        ),
        _ => format!("{nombre} ({intento})"),
    }
}

/// Construye `{base}/reportes/{tipo}?{query}` con sólo los filtros no vacíos.
pub fn construir_url(base: &Url, filtros: &FiltrosReporte) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("La URL base no admite rutas: {base}"))?
        .pop_if_empty()
        .push("reportes")
        .push(&filtros.tipo_reporte);

    // Sin filtros opcionales la URL termina en `?`, como espera el servicio.
    url.query_pairs_mut()
        .clear()
        .extend_pairs(filtros.parametros_query());
    Ok(url)
}

/// Cliente HTTP hacia el servicio que genera los reportes.
#[derive(Clone)]
pub struct ClienteReportes {
    http: Client,
    base_url: Url,
    destino: Arc<dyn GuardarArchivo>,
}

impl ClienteReportes {
    pub fn new(http: Client, base_url: Url, destino: Arc<dyn GuardarArchivo>) -> Self {
        Self {
            http,
            base_url,
            destino,
        }
    }

    /// Construye el cliente a partir de la configuración, guardando en `REPORTES_DIR`.
    pub fn from_config(cfg: &AppConfig, http: Client) -> Self {
        Self::new(
            http,
            cfg.api_base_url.clone(),
            Arc::new(GuardadoLocal::new(cfg.reportes_dir.clone())),
        )
    }

    /// Solicita el reporte y lo guarda. `tipo_reporte` debe venir informado;
    /// aquí no se valida.
    pub async fn generar_reporte(
        &self,
        filtros: &FiltrosReporte,
    ) -> std::result::Result<PathBuf, ReporteError> {
        self.descargar_y_guardar(filtros).await.map_err(|e| {
            error!("Error descargando reporte '{}': {e:#}", filtros.tipo_reporte);
            ReporteError::NoGenerado
        })
    }

    async fn descargar_y_guardar(&self, filtros: &FiltrosReporte) -> Result<PathBuf> {
        let url = construir_url(&self.base_url, filtros)?;
        info!("Solicitando reporte: {url}");

        let bytes = self
            .http
            .get(url)
            .header(header::ACCEPT, MIME_XLSX)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let nombre = nombre_archivo(&filtros.tipo_reporte);
        let ruta = self.destino.guardar(nombre, &bytes)?;
        info!("Reporte guardado en {} ({} bytes)", ruta.display(), bytes.len());
        Ok(ruta)
    }
}
