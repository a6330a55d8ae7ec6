//! Modelos de dominio (filtros del reporte, docentes y tipos de reporte).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tipo MIME de los reportes generados (Excel .xlsx).
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Nombre de archivo para tipos de reporte no reconocidos.
pub const NOMBRE_ARCHIVO_GENERICO: &str = "reporte.xlsx";

/// Tipo de reporte reconocido por el servicio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipoReporte {
    pub valor: &'static str,
    pub etiqueta: &'static str,
    pub descripcion: &'static str,
    pub nombre_archivo: &'static str,
}

pub const TIPOS_REPORTE: [TipoReporte; 5] = [
    TipoReporte {
        valor: "asistencias",
        etiqueta: "Reporte de Asistencias",
        descripcion: "Listado detallado de todas las asistencias",
        nombre_archivo: "reporte_asistencias.xlsx",
    },
    TipoReporte {
        valor: "horas-docentes",
        etiqueta: "Horas por Docente",
        descripcion: "Total de horas dictadas por cada docente",
        nombre_archivo: "reporte_horas_docentes.xlsx",
    },
    TipoReporte {
        valor: "horas-cursos",
        etiqueta: "Horas por Curso",
        descripcion: "Total de horas impartidas por curso",
        nombre_archivo: "reporte_horas_cursos.xlsx",
    },
    TipoReporte {
        valor: "incidencias",
        etiqueta: "Reporte de Incidencias",
        descripcion: "Faltas, retardos y observaciones",
        nombre_archivo: "reporte_incidencias.xlsx",
    },
    TipoReporte {
        valor: "general",
        etiqueta: "Reporte General",
        descripcion: "Reporte completo con 3 hojas Excel",
        nombre_archivo: "reporte_general.xlsx",
    },
];

/// Nombre del archivo descargado para un tipo de reporte.
pub fn nombre_archivo(tipo_reporte: &str) -> &'static str {
    TIPOS_REPORTE
        .iter()
        .find(|tipo| tipo.valor == tipo_reporte)
        .map(|tipo| tipo.nombre_archivo)
        .unwrap_or(NOMBRE_ARCHIVO_GENERICO)
}

/// Criterios con los que se solicita un reporte.
///
/// Todos los campos son cadenas; la cadena vacía significa "sin valor".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FiltrosReporte {
    pub tipo_reporte: String,
    pub fecha_inicio: String,
    pub fecha_fin: String,
    pub docente_id: String,
    pub curso_id: String,
}

/// Nombre de uno de los cinco campos de `FiltrosReporte`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CampoFiltro {
    TipoReporte,
    FechaInicio,
    FechaFin,
    DocenteId,
    CursoId,
}

impl FiltrosReporte {
    /// Sustituye un único campo, dejando el resto intacto.
    pub fn set(&mut self, campo: CampoFiltro, valor: impl Into<String>) {
        let destino = match campo {
            CampoFiltro::TipoReporte => &mut self.tipo_reporte,
            CampoFiltro::FechaInicio => &mut self.fecha_inicio,
            CampoFiltro::FechaFin => &mut self.fecha_fin,
            CampoFiltro::DocenteId => &mut self.docente_id,
            CampoFiltro::CursoId => &mut self.curso_id,
        };
        *destino = valor.into();
    }

    /// Pares (parámetro, valor) de los filtros opcionales con contenido,
    /// en el orden en que viajan en la query.
    pub fn parametros_query(&self) -> Vec<(&'static str, &str)> {
        [
            ("fechaInicio", self.fecha_inicio.as_str()),
            ("fechaFin", self.fecha_fin.as_str()),
            ("docenteId", self.docente_id.as_str()),
            ("cursoId", self.curso_id.as_str()),
        ]
        .into_iter()
        .filter(|(_, valor)| !valor.is_empty())
        .collect()
    }

    /// `true` cuando ambas fechas son válidas y el inicio es posterior al fin.
    /// No se impide enviar el reporte; sólo sirve para avisar en el log.
    pub fn rango_invertido(&self) -> bool {
        match (parse_fecha(&self.fecha_inicio), parse_fecha(&self.fecha_fin)) {
            (Some(inicio), Some(fin)) => inicio > fin,
            _ => false,
        }
    }
}

/// Interpreta una fecha ISO `YYYY-MM-DD`; `None` si está vacía o mal formada.
pub fn parse_fecha(valor: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(valor, "%Y-%m-%d").ok()
}

/// Docente tal y como lo devuelve el servicio externo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Docente {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellido: String,
}

impl Docente {
    /// Texto que se muestra en el selector de docentes.
    pub fn etiqueta(&self) -> String {
        format!("{} {}", self.nombre, self.apellido).trim().to_string()
    }
}
