//! # Procesamiento de Conexiones
//! src/server/worker.rs
//!
//! Pipeline por-conexión que ejecuta cada worker: parsear la request line
//! y los headers, construir el call-environment, invocar la aplicación y
//! escribir la respuesta. Cualquier fallo aborta la conexión por el camino
//! de error, la cierra y deja al worker listo para la siguiente; ningún
//! request puede tumbar al servidor.
//!
//! Estados de una conexión desde el punto de vista del worker:
//!
//! ```text
//! ACCEPTED → PARSING_LINE → PARSING_HEADERS → BUILDING_ENVIRONMENT
//!          → INVOKING_APPLICATION → WRITING_RESPONSE → CLOSED
//! ```

use crate::gateway::app::{AppError, Application, Body};
use crate::gateway::environ::Environ;
use crate::http::request::{parse_headers, parse_request_line, ParseError};
use crate::http::response::ResponseContext;
use crate::metrics::{MetricsCollector, RequestOutcome};
use crate::server::connection::Connection;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Errores por-conexión del pipeline
#[derive(Debug)]
pub enum GatewayError {
    /// Falló la clonación del stream de la conexión
    Connection(io::Error),

    /// Request line o headers malformados (o I/O leyendo el request)
    Parse(ParseError),

    /// La aplicación retornó un error o entró en pánico
    Application(AppError),

    /// Falló la escritura de la respuesta (peer cerró antes, etc.)
    Write(io::Error),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Connection(e) => write!(f, "Connection error: {}", e),
            GatewayError::Parse(e) => write!(f, "Parse error: {}", e),
            GatewayError::Application(e) => write!(f, "Application error: {}", e),
            GatewayError::Write(e) => write!(f, "Write error: {}", e),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<ParseError> for GatewayError {
    fn from(e: ParseError) -> Self {
        GatewayError::Parse(e)
    }
}

impl GatewayError {
    /// Categoría del fallo para las métricas
    pub fn outcome(&self) -> RequestOutcome {
        match self {
            GatewayError::Connection(_) => RequestOutcome::ConnectionError,
            GatewayError::Parse(_) => RequestOutcome::ParseError,
            GatewayError::Application(_) => RequestOutcome::ApplicationError,
            GatewayError::Write(_) => RequestOutcome::WriteError,
        }
    }
}

/// Puente por-request entre la conexión y la aplicación
///
/// Compartido entre todos los workers; no guarda estado por-request.
pub struct Gateway {
    app: Arc<dyn Application>,
    server_name: String,
    server_port: u16,
    metrics: Arc<MetricsCollector>,
}

impl Gateway {
    pub fn new(
        app: Arc<dyn Application>,
        server_name: String,
        server_port: u16,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            app,
            server_name,
            server_port,
            metrics,
        }
    }

    /// Procesa una conexión de punta a punta y la cierra
    ///
    /// Nunca retorna error ni entra en pánico: los fallos se registran y
    /// el worker queda listo para la próxima conexión.
    pub fn handle_connection(&self, mut conn: Connection) {
        let start = Instant::now();
        let peer = conn.peer_addr();

        let result = self.process(&conn);

        // CLOSED en todo camino de salida (idempotente)
        conn.close();

        let latency = start.elapsed();

        match result {
            Ok(()) => {
                self.metrics.record(RequestOutcome::Completed, latency);
                println!(
                    "   ✅ {} atendida ({:.2}ms)",
                    peer,
                    latency.as_secs_f64() * 1000.0
                );
            }
            Err(e) => {
                self.metrics.record(e.outcome(), latency);
                eprintln!("   ❌ {}: {}", peer, e);
            }
        }
    }

    /// Pipeline del request: parsear, construir environment, invocar,
    /// escribir la respuesta
    fn process(&self, conn: &Connection) -> Result<(), GatewayError> {
        let mut reader = conn.reader().map_err(GatewayError::Connection)?;

        // PARSING_LINE → PARSING_HEADERS
        let request_line = parse_request_line(&mut reader)?;
        let headers = parse_headers(&mut reader)?;

        // BUILDING_ENVIRONMENT: base + overlays en orden
        let mut environ = Environ::base(&self.server_name, self.server_port);
        environ.apply_request_line(&request_line);
        environ.apply_headers(&headers);
        environ.set_remote_addr(&conn.peer_addr().ip().to_string());
        environ.set_input(Box::new(reader));

        let mut writer = conn.writer().map_err(GatewayError::Connection)?;
        let mut ctx = ResponseContext::new(&mut writer);

        // INVOKING_APPLICATION → WRITING_RESPONSE, con aislamiento de
        // pánicos: una aplicación que entra en pánico no debe matar al
        // worker ni achicar el pool
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut body = self
                .app
                .call(environ, &mut ctx)
                .map_err(GatewayError::Application)?;

            let written = Self::stream_body(&mut ctx, body.as_mut());

            // close del body en todo camino de salida, incluso si la
            // escritura terminó antes por un fallo
            body.close();

            written
        }));

        match outcome {
            Ok(result) => result?,
            Err(_) => {
                return Err(GatewayError::Application(AppError::new(
                    "application panicked while handling the request",
                )));
            }
        }

        writer.flush().map_err(GatewayError::Write)?;

        Ok(())
    }

    /// Escribe los chunks del body en orden
    fn stream_body(ctx: &mut ResponseContext, body: &mut dyn Body) -> Result<(), GatewayError> {
        // La respuesta debe haberse iniciado antes del primer chunk
        if !ctx.started() {
            return Err(GatewayError::Application(AppError::new(
                "application returned a body without calling start_response",
            )));
        }

        while let Some(chunk) = body.next_chunk() {
            ctx.write_chunk(&chunk).map_err(GatewayError::Write)?;
        }

        Ok(())
    }
}
