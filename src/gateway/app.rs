//! # Convención de Invocación de Aplicaciones
//! src/gateway/app.rs
//!
//! Define el contrato entre el gateway y la aplicación externa: la
//! aplicación recibe el call-environment y el contexto de respuesta,
//! declara status y headers vía `start_response`, y retorna un productor
//! de chunks del body.
//!
//! ## Ejemplo
//!
//! ```rust
//! use gateway_server::gateway::app::{app_fn, AppError, Application, Body, StaticBody};
//! use gateway_server::gateway::environ::Environ;
//! use gateway_server::http::response::ResponseContext;
//!
//! // Una fn/closure con la firma del contrato, envuelta con app_fn
//! let app = app_fn(|_environ: Environ, response: &mut ResponseContext| {
//!     response.start_response("200 OK", &[("Content-Type", "text/plain")])?;
//!     Ok(Box::new(StaticBody::from_bytes(b"hola")) as Box<dyn Body>)
//! });
//!
//! let mut out: Vec<u8> = Vec::new();
//! let mut ctx = ResponseContext::new(&mut out);
//! let environ = Environ::base("localhost", 8888);
//! let body = app.call(environ, &mut ctx).unwrap();
//! drop(body);
//! ```

use crate::gateway::environ::Environ;
use crate::http::response::{ResponseContext, ResponseError};
use std::collections::VecDeque;

/// Error producido por la aplicación o por su productor de chunks
#[derive(Debug)]
pub struct AppError {
    message: String,
}

impl AppError {
    /// Crea un error de aplicación con el mensaje dado
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<ResponseError> for AppError {
    fn from(e: ResponseError) -> Self {
        AppError::new(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::new(e.to_string())
    }
}

/// Productor de los chunks del body de la respuesta
///
/// Los chunks pueden producirse de forma eager (ya materializados) o lazy
/// (generados al pedirlos); el writer soporta ambas. `close` es la
/// capacidad explícita de liberación: un productor que posee recursos la
/// implementa, el resto hereda el no-op.
pub trait Body {
    /// Próximo chunk del body, `None` cuando se agotó
    fn next_chunk(&mut self) -> Option<Vec<u8>>;

    /// Libera los recursos del productor.
    /// Se invoca en todo camino de salida, incluso si la escritura falló.
    fn close(&mut self) {}
}

/// Body eager: una secuencia de chunks ya materializada
pub struct StaticBody {
    chunks: VecDeque<Vec<u8>>,
}

impl StaticBody {
    /// Crea un body a partir de una lista de chunks
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }

    /// Crea un body de un único chunk
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::new(vec![data.to_vec()])
    }

    /// Crea un body vacío
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Body for StaticBody {
    fn next_chunk(&mut self) -> Option<Vec<u8>> {
        self.chunks.pop_front()
    }
}

impl From<String> for StaticBody {
    fn from(s: String) -> Self {
        StaticBody::new(vec![s.into_bytes()])
    }
}

/// Contrato de la aplicación externa
///
/// Se invoca una vez por request con el environment (propiedad de la
/// aplicación durante la invocación) y el contexto de respuesta. La
/// aplicación debe llamar `start_response` a lo más una vez, antes de
/// retornar su body.
pub trait Application: Send + Sync {
    fn call(
        &self,
        environ: Environ,
        response: &mut ResponseContext,
    ) -> Result<Box<dyn Body>, AppError>;
}

/// Adaptador que convierte una fn/closure en una [`Application`]
pub struct AppFn<F> {
    f: F,
}

/// Envuelve una fn/closure con la firma del contrato como aplicación
///
/// ```rust
/// use gateway_server::gateway::app::{app_fn, AppError, Body, StaticBody};
/// use gateway_server::gateway::environ::Environ;
/// use gateway_server::http::response::ResponseContext;
///
/// let app = app_fn(|_environ, response: &mut ResponseContext| {
///     response.start_response("200 OK", &[])?;
///     Ok(Box::new(StaticBody::from_bytes(b"ok")) as Box<dyn Body>)
/// });
/// ```
pub fn app_fn<F>(f: F) -> AppFn<F>
where
    F: Fn(Environ, &mut ResponseContext) -> Result<Box<dyn Body>, AppError> + Send + Sync,
{
    AppFn { f }
}

impl<F> Application for AppFn<F>
where
    F: Fn(Environ, &mut ResponseContext) -> Result<Box<dyn Body>, AppError> + Send + Sync,
{
    fn call(
        &self,
        environ: Environ,
        response: &mut ResponseContext,
    ) -> Result<Box<dyn Body>, AppError> {
        (self.f)(environ, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_body_chunks_in_order() {
        let mut body = StaticBody::new(vec![b"uno".to_vec(), b"dos".to_vec()]);

        assert_eq!(body.next_chunk(), Some(b"uno".to_vec()));
        assert_eq!(body.next_chunk(), Some(b"dos".to_vec()));
        assert_eq!(body.next_chunk(), None);
    }

    #[test]
    fn test_static_body_empty() {
        let mut body = StaticBody::empty();
        assert_eq!(body.next_chunk(), None);
    }

    #[test]
    fn test_static_body_close_is_noop() {
        let mut body = StaticBody::from_bytes(b"datos");
        body.close();
        // El default no consume los chunks
        assert_eq!(body.next_chunk(), Some(b"datos".to_vec()));
    }

    #[test]
    fn test_closable_body_releases_resources() {
        struct TrackedBody {
            closed: std::rc::Rc<std::cell::Cell<bool>>,
        }

        impl Body for TrackedBody {
            fn next_chunk(&mut self) -> Option<Vec<u8>> {
                None
            }

            fn close(&mut self) {
                self.closed.set(true);
            }
        }

        let flag = std::rc::Rc::new(std::cell::Cell::new(false));
        let mut body = TrackedBody {
            closed: std::rc::Rc::clone(&flag),
        };

        body.close();
        assert!(flag.get());
    }

    #[test]
    fn test_app_fn_is_application() {
        let app = app_fn(
            |_environ: Environ,
             response: &mut ResponseContext|
             -> Result<Box<dyn Body>, AppError> {
                response.start_response("200 OK", &[])?;
                Ok(Box::new(StaticBody::from_bytes(b"ok")))
            },
        );

        let mut out: Vec<u8> = Vec::new();
        let mut ctx = ResponseContext::new(&mut out);
        let environ = Environ::base("localhost", 8888);

        let mut body = app.call(environ, &mut ctx).unwrap();
        assert_eq!(body.next_chunk(), Some(b"ok".to_vec()));
        assert!(out.starts_with(b"HTTP/1.0 200 OK\r\n"));
    }

    #[test]
    fn test_app_error_display() {
        let error = AppError::new("algo salió mal");
        assert_eq!(error.to_string(), "algo salió mal");
    }
}
