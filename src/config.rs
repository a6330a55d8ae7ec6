//! Carga y gestión de configuración de la aplicación (servicio de reportes + servidor local).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use url::Url;

const API_BASE_URL_POR_DEFECTO: &str = "http://localhost:3000";
const SERVER_ADDR_POR_DEFECTO: &str = "127.0.0.1:3322";
const TIMEOUT_POR_DEFECTO_SECS: u64 = 30;

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub docentes_url: Url,
    pub server_addr: String,
    pub reportes_dir: PathBuf,
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|clave| env::var(clave).ok())
    }

    /// Igual que `from_env`, pero leyendo de una función arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_str =
            lookup("API_BASE_URL").unwrap_or_else(|| API_BASE_URL_POR_DEFECTO.to_string());
        let api_base_url = parse_http_url("API_BASE_URL", &base_str)?;

        let docentes_url = match lookup("DOCENTES_URL") {
            Some(valor) => parse_http_url("DOCENTES_URL", &valor)?,
            None => {
                let mut url = api_base_url.clone();
                url.path_segments_mut()
                    .map_err(|_| anyhow!("No se pudo derivar DOCENTES_URL de {api_base_url}"))?
                    .pop_if_empty()
                    .push("api")
                    .push("docentes");
                url
            }
        };

        let server_addr =
            lookup("SERVER_ADDR").unwrap_or_else(|| SERVER_ADDR_POR_DEFECTO.to_string());

        let reportes_dir = lookup("REPORTES_DIR")
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("reportes"));

        let http_timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(valor) => match valor.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(anyhow!(
                        "HTTP_TIMEOUT_SECS debe ser un entero positivo, recibido: {valor}"
                    ))
                }
            },
            None => Duration::from_secs(TIMEOUT_POR_DEFECTO_SECS),
        };

        Ok(Self {
            api_base_url,
            docentes_url,
            server_addr,
            reportes_dir,
            http_timeout,
        })
    }
}

fn parse_http_url(nombre: &str, valor: &str) -> Result<Url> {
    let url = Url::parse(valor).map_err(|e| anyhow!("{nombre} no es una URL válida ({valor}): {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        otro => Err(anyhow!("{nombre} debe usar http o https, no {otro}")),
    }
}
