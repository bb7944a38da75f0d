//! # Aplicación de Demostración
//! src/demo.rs
//!
//! Aplicación de ejemplo incluida con el gateway, usada por el binario
//! cuando no se provee otra. Muestra la convención de invocación completa:
//! leer el call-environment, declarar status y headers con
//! `start_response`, y retornar los chunks del body.
//!
//! ## Rutas
//!
//! - `/` → saludo en texto plano
//! - `/hello` → respuesta mínima de dos bytes
//! - `/status` → estado del gateway y métricas en JSON

use crate::gateway::app::{AppError, Application, Body, StaticBody};
use crate::gateway::environ::{Environ, SERVER_SOFTWARE};
use crate::http::response::ResponseContext;
use crate::http::StatusCode;
use crate::metrics::MetricsCollector;
use std::sync::Arc;

/// Aplicación demo con rutas fijas
pub struct DemoApp {
    metrics: Arc<MetricsCollector>,
}

impl DemoApp {
    /// Crea la aplicación demo leyendo métricas del collector dado
    pub fn new(metrics: Arc<MetricsCollector>) -> Self {
        Self { metrics }
    }

    /// Respuesta de texto plano con 200 OK
    fn plain_text(
        response: &mut ResponseContext,
        body: &[u8],
    ) -> Result<Box<dyn Body>, AppError> {
        response.start_response(
            &StatusCode::Ok.to_string(),
            &[("Content-Type", "text/plain")],
        )?;
        Ok(Box::new(StaticBody::from_bytes(body)))
    }

    /// Respuesta JSON con el status dado
    fn json(
        response: &mut ResponseContext,
        status: StatusCode,
        body: String,
    ) -> Result<Box<dyn Body>, AppError> {
        response.start_response(
            &status.to_string(),
            &[("Content-Type", "application/json")],
        )?;
        Ok(Box::new(StaticBody::from(body)))
    }

    /// Handler para /status: estado del gateway más la foto de métricas
    fn status(&self, response: &mut ResponseContext) -> Result<Box<dyn Body>, AppError> {
        let snapshot = self.metrics.snapshot();

        let body = serde_json::json!({
            "status": "running",
            "software": SERVER_SOFTWARE,
            "metrics": snapshot,
        });

        let rendered = serde_json::to_string_pretty(&body)
            .map_err(|e| AppError::new(format!("cannot serialize status: {}", e)))?;

        Self::json(response, StatusCode::Ok, rendered)
    }
}

impl Application for DemoApp {
    fn call(
        &self,
        environ: Environ,
        response: &mut ResponseContext,
    ) -> Result<Box<dyn Body>, AppError> {
        let path = environ.get_str("PATH_INFO").unwrap_or("/");

        match path {
            "/" => Self::plain_text(response, b"hello web"),
            "/hello" => Self::plain_text(response, b"hi"),
            "/status" => self.status(response),
            _ => Self::json(
                response,
                StatusCode::NotFound,
                format!(r#"{{"error": "Route not found: {}"}}"#, path),
            ),
        }
    }
}
