//! # Parsing de Requests HTTP/1.0
//! src/http/request.rs
//!
//! Este módulo implementa un parser HTTP/1.0 desde cero, operando
//! directamente sobre el stream de lectura de la conexión.
//!
//! ## Formato de un Request HTTP/1.0
//!
//! ```text
//! GET /path?param1=value1&param2=value2 HTTP/1.0\r\n
//! Host: localhost:8888\r\n
//! User-Agent: curl/7.68.0\r\n
//! \r\n
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path?query HTTP/1.0`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//!
//! Los nombres de headers se normalizan al estilo del call-environment:
//! mayúsculas, `-` reemplazado por `_`, y prefijo `HTTP_` salvo para
//! `CONTENT_TYPE` y `CONTENT_LENGTH` que se guardan sin prefijo.

use std::collections::HashMap;
use std::io::{self, BufRead};

/// Máximo de headers aceptados por request.
/// El protocolo no impone límite; acotamos la cantidad para que un peer
/// no pueda crecer la tabla sin fin. El largo de línea queda sin acotar.
pub const MAX_HEADER_COUNT: usize = 128;

/// Tabla de headers normalizados (nombre → valor, el último valor gana)
pub type HeaderTable = HashMap<String, String>;

/// Resultado de parsear la primera línea del request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// Método HTTP tal como llegó (ej: "GET")
    pub method: String,

    /// Path de la petición, sin query (ej: "/search")
    pub path_info: String,

    /// Texto después del primer `?`, o vacío si no hay
    pub query_string: String,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug)]
pub enum ParseError {
    /// El stream terminó antes de entregar una request line
    EmptyRequest,

    /// Formato inválido de la request line (cantidad de tokens distinta de 3)
    MalformedRequestLine(String),

    /// Línea de header sin el separador `": "`
    MalformedHeaderLine(String),

    /// Se superó el límite de headers por request
    TooManyHeaders,

    /// Error de I/O leyendo del stream
    Io(io::Error),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::MalformedRequestLine(line) => {
                write!(f, "Malformed request line: {:?}", line)
            }
            ParseError::MalformedHeaderLine(line) => {
                write!(f, "Malformed header line: {:?}", line)
            }
            ParseError::TooManyHeaders => {
                write!(f, "Too many headers (max {})", MAX_HEADER_COUNT)
            }
            ParseError::Io(e) => write!(f, "I/O error while parsing request: {}", e),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}

/// Lee una línea del stream y descarta el terminador CRLF o LF
fn read_line(stream: &mut impl BufRead) -> Result<Option<String>, ParseError> {
    let mut line = String::new();
    let bytes_read = stream.read_line(&mut line)?;

    if bytes_read == 0 {
        // Fin del stream
        return Ok(None);
    }

    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }

    Ok(Some(line))
}

/// Parsea la request line (primera línea del request)
///
/// Formato: `GET /path?query HTTP/1.0`. La versión se lee pero no se
/// valida más allá de su presencia.
///
/// # Ejemplo
/// ```rust
/// use gateway_server::http::request::parse_request_line;
///
/// let mut stream = &b"GET /search?q=cat HTTP/1.0\r\n"[..];
/// let line = parse_request_line(&mut stream).unwrap();
///
/// assert_eq!(line.method, "GET");
/// assert_eq!(line.path_info, "/search");
/// assert_eq!(line.query_string, "q=cat");
/// ```
pub fn parse_request_line(stream: &mut impl BufRead) -> Result<RequestLine, ParseError> {
    let line = match read_line(stream)? {
        Some(line) => line,
        None => return Err(ParseError::EmptyRequest),
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();

    // Debe tener exactamente 3 partes: METHOD TARGET VERSION
    if tokens.len() != 3 {
        return Err(ParseError::MalformedRequestLine(line));
    }

    let method = tokens[0].to_string();

    // Separar path y query string en el primer '?'
    let (path_info, query_string) = match tokens[1].split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (tokens[1].to_string(), String::new()),
    };

    Ok(RequestLine {
        method,
        path_info,
        query_string,
    })
}

/// Parsea los headers HTTP hasta la línea vacía o el fin del stream
///
/// Cada línea tiene formato `Name: Value`. El nombre se pasa a mayúsculas
/// con `-` → `_`; salvo `CONTENT_TYPE` y `CONTENT_LENGTH`, se antepone
/// `HTTP_`. Headers duplicados: el último valor gana (simplificación
/// deliberada, no semántica HTTP completa).
///
/// # Ejemplo
/// ```rust
/// use gateway_server::http::request::parse_headers;
///
/// let mut stream = &b"X-Foo: bar\r\nContent-Type: text/plain\r\n\r\n"[..];
/// let headers = parse_headers(&mut stream).unwrap();
///
/// assert_eq!(headers.get("HTTP_X_FOO").unwrap(), "bar");
/// assert_eq!(headers.get("CONTENT_TYPE").unwrap(), "text/plain");
/// ```
pub fn parse_headers(stream: &mut impl BufRead) -> Result<HeaderTable, ParseError> {
    let mut headers = HeaderTable::new();

    loop {
        let line = match read_line(stream)? {
            Some(line) => line,
            // Fin del stream: tratarlo como fin de headers
            None => break,
        };

        // La línea vacía marca el fin de los headers
        if line.is_empty() {
            break;
        }

        if headers.len() >= MAX_HEADER_COUNT {
            return Err(ParseError::TooManyHeaders);
        }

        // Separar en la primera ocurrencia de ": "
        let (name, value) = match line.split_once(": ") {
            Some((name, value)) => (name, value),
            None => return Err(ParseError::MalformedHeaderLine(line)),
        };

        let normalized = name.to_uppercase().replace('-', "_");

        let key = if normalized == "CONTENT_TYPE" || normalized == "CONTENT_LENGTH" {
            normalized
        } else {
            format!("HTTP_{}", normalized)
        };

        // Último valor gana
        headers.insert(key, value.to_string());
    }

    Ok(headers)
}
