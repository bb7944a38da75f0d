//! # Escritura de Respuestas HTTP/1.0
//! src/http/response.rs
//!
//! Contexto de respuesta por-request: envuelve el stream de escritura de la
//! conexión junto con el flag "respuesta iniciada". La aplicación declara
//! status y headers una única vez con [`ResponseContext::start_response`] y
//! el worker luego escribe los chunks del body en orden.
//!
//! ## Formato producido
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/plain\r\n
//! \r\n
//! <chunks del body, concatenados tal cual>
//! ```
//!
//! No se calcula ni inyecta Content-Length: en HTTP/1.0 el cierre de la
//! conexión delimita el body.

use std::io::{self, Write};

/// Errores al iniciar la respuesta
#[derive(Debug)]
pub enum ResponseError {
    /// `start_response` ya fue invocado para este request
    AlreadyStarted,

    /// Error de I/O escribiendo al stream
    Io(io::Error),
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseError::AlreadyStarted => {
                write!(f, "start_response called more than once")
            }
            ResponseError::Io(e) => write!(f, "I/O error while writing response: {}", e),
        }
    }
}

impl std::error::Error for ResponseError {}

impl From<io::Error> for ResponseError {
    fn from(e: io::Error) -> Self {
        ResponseError::Io(e)
    }
}

/// Contexto de respuesta de un request
///
/// Se construye fresco por request sobre el stream de escritura de la
/// conexión y viaja por referencia hasta la aplicación.
pub struct ResponseContext<'a> {
    writer: &'a mut dyn Write,
    started: bool,
}

impl<'a> ResponseContext<'a> {
    /// Crea un contexto sobre el stream de escritura de la conexión
    pub fn new(writer: &'a mut dyn Write) -> Self {
        Self {
            writer,
            started: false,
        }
    }

    /// Declara la status line y los headers de la respuesta
    ///
    /// En la primera invocación serializa inmediatamente la status line,
    /// los headers en el orden recibido y la línea en blanco. Una segunda
    /// invocación falla con [`ResponseError::AlreadyStarted`] sin escribir
    /// nada.
    ///
    /// # Ejemplo
    /// ```rust
    /// use gateway_server::http::response::ResponseContext;
    ///
    /// let mut out: Vec<u8> = Vec::new();
    /// let mut ctx = ResponseContext::new(&mut out);
    ///
    /// ctx.start_response("200 OK", &[("Content-Type", "text/plain")]).unwrap();
    ///
    /// assert_eq!(out, b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\n");
    /// ```
    pub fn start_response(
        &mut self,
        status_line: &str,
        headers: &[(&str, &str)],
    ) -> Result<(), ResponseError> {
        if self.started {
            return Err(ResponseError::AlreadyStarted);
        }

        // Armar el bloque completo y escribirlo de una vez
        let mut head = format!("HTTP/1.0 {}\r\n", status_line);

        for (name, value) in headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }

        head.push_str("\r\n");

        self.writer.write_all(head.as_bytes())?;
        self.started = true;

        Ok(())
    }

    /// Indica si la respuesta ya fue iniciada
    pub fn started(&self) -> bool {
        self.started
    }

    /// Escribe un chunk del body al stream
    pub fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.writer.write_all(chunk)
    }

    /// Vacía el stream de escritura
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_response_wire_format() {
        let mut out: Vec<u8> = Vec::new();
        let mut ctx = ResponseContext::new(&mut out);

        ctx.start_response("200 OK", &[("Content-Type", "text/plain")])
            .unwrap();

        assert_eq!(out, b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\n");
    }

    #[test]
    fn test_headers_preserve_order() {
        let mut out: Vec<u8> = Vec::new();
        let mut ctx = ResponseContext::new(&mut out);

        ctx.start_response(
            "200 OK",
            &[("B-Second", "2"), ("A-First", "1"), ("C-Third", "3")],
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let b = text.find("B-Second").unwrap();
        let a = text.find("A-First").unwrap();
        let c = text.find("C-Third").unwrap();

        // En el orden recibido, no alfabético
        assert!(b < a && a < c);
    }

    #[test]
    fn test_start_response_no_headers() {
        let mut out: Vec<u8> = Vec::new();
        let mut ctx = ResponseContext::new(&mut out);

        ctx.start_response("204 No Content", &[]).unwrap();

        assert_eq!(out, b"HTTP/1.0 204 No Content\r\n\r\n");
    }

    #[test]
    fn test_double_start_fails() {
        let mut out: Vec<u8> = Vec::new();
        let mut ctx = ResponseContext::new(&mut out);

        ctx.start_response("200 OK", &[]).unwrap();
        let second = ctx.start_response("500 Internal Server Error", &[]);

        assert!(matches!(second, Err(ResponseError::AlreadyStarted)));

        // La segunda invocación no escribió nada
        assert_eq!(out, b"HTTP/1.0 200 OK\r\n\r\n");
    }

    #[test]
    fn test_started_flag() {
        let mut out: Vec<u8> = Vec::new();
        let mut ctx = ResponseContext::new(&mut out);

        assert!(!ctx.started());
        ctx.start_response("200 OK", &[]).unwrap();
        assert!(ctx.started());
    }

    #[test]
    fn test_write_chunks_in_order() {
        let mut out: Vec<u8> = Vec::new();
        let mut ctx = ResponseContext::new(&mut out);

        ctx.start_response("200 OK", &[]).unwrap();
        ctx.write_chunk(b"hello ").unwrap();
        ctx.write_chunk(b"world").unwrap();

        assert_eq!(out, b"HTTP/1.0 200 OK\r\n\r\nhello world");
    }
}
