//! Consulta del listado de docentes para poblar el selector del formulario.
//!
//! Cualquier fallo (red, estado HTTP, forma inesperada del JSON) se traduce en
//! una lista vacía: el formulario debe seguir funcionando sin docentes.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use crate::models::Docente;

/// Formas aceptadas para la respuesta del endpoint de docentes.
#[derive(Deserialize)]
#[serde(untagged)]
enum RespuestaDocentes {
    Lista(Vec<Docente>),
    Envuelta { docentes: Vec<Docente> },
}

/// Decodifica la respuesta en un único paso: lista directa, lista envuelta en
/// `{ "docentes": [...] }`, o lista vacía para cualquier otra cosa.
pub fn decodificar_docentes(valor: Value) -> Vec<Docente> {
    match serde_json::from_value::<RespuestaDocentes>(valor) {
        Ok(RespuestaDocentes::Lista(docentes)) => docentes,
        Ok(RespuestaDocentes::Envuelta { docentes }) => docentes,
        Err(e) => {
            warn!("Respuesta de docentes con forma inesperada: {e}");
            Vec::new()
        }
    }
}

/// Obtiene los docentes del servicio externo. Nunca devuelve error.
pub async fn obtener_docentes(client: &Client, url: &Url) -> Vec<Docente> {
    let respuesta = match client.get(url.clone()).send().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!("No se pudo consultar docentes en {url}: {e}");
            return Vec::new();
        }
    };

    let respuesta = match respuesta.error_for_status() {
        Ok(resp) => resp,
        Err(e) => {
            warn!("El servicio de docentes respondió con error: {e}");
            return Vec::new();
        }
    };

    match respuesta.json::<Value>().await {
        Ok(valor) => {
            let docentes = decodificar_docentes(valor);
            info!("Docentes cargados: {}", docentes.len());
            docentes
        }
        Err(e) => {
            warn!("La respuesta de docentes no es JSON válido: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    async fn servidor_de_prueba(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/api/docentes")).unwrap()
    }

    #[test]
    fn decodifica_lista_directa() {
        let docentes = decodificar_docentes(json!([
            {"_id": "a1", "nombre": "Ana", "apellido": "Pérez"},
            {"_id": "b2", "nombre": "Luis", "apellido": "Gómez"}
        ]));
        assert_eq!(docentes.len(), 2);
        assert_eq!(docentes[1].id, "b2");
    }

    #[test]
    fn decodifica_lista_envuelta() {
        let docentes = decodificar_docentes(json!({
            "docentes": [{"_id": "a1", "nombre": "Ana", "apellido": "Pérez"}]
        }));
        assert_eq!(docentes.len(), 1);
        assert_eq!(docentes[0].etiqueta(), "Ana Pérez");
    }

    #[test]
    fn otras_formas_dan_lista_vacia() {
        assert!(decodificar_docentes(json!({})).is_empty());
        assert!(decodificar_docentes(json!({"data": []})).is_empty());
        assert!(decodificar_docentes(json!("docentes")).is_empty());
        assert!(decodificar_docentes(Value::Null).is_empty());
    }

    #[tokio::test]
    async fn obtiene_docentes_envueltos_del_servidor() {
        let router = Router::new().route(
            "/api/docentes",
            get(|| async {
                Json(json!({"docentes": [{"_id": "x", "nombre": "Eva", "apellido": "Ruiz"}]}))
            }),
        );
        let url = servidor_de_prueba(router).await;

        let docentes = obtener_docentes(&Client::new(), &url).await;
        assert_eq!(docentes.len(), 1);
        assert_eq!(docentes[0].nombre, "Eva");
    }

    #[tokio::test]
    async fn objeto_vacio_da_lista_vacia() {
        let router = Router::new().route("/api/docentes", get(|| async { Json(json!({})) }));
        let url = servidor_de_prueba(router).await;

        assert!(obtener_docentes(&Client::new(), &url).await.is_empty());
    }

    #[tokio::test]
    async fn error_http_da_lista_vacia() {
        let router = Router::new().route(
            "/api/docentes",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let url = servidor_de_prueba(router).await;

        assert!(obtener_docentes(&Client::new(), &url).await.is_empty());
    }

    #[tokio::test]
    async fn error_de_red_da_lista_vacia() {
        // Puerto libre en el momento de la prueba: nadie escucha.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = Url::parse(&format!("http://{addr}/api/docentes")).unwrap();

        assert!(obtener_docentes(&Client::new(), &url).await.is_empty());
    }
}
