//! # Call-Environment
//! src/gateway/environ.rs
//!
//! El call-environment es el registro por-request que recibe la aplicación:
//! metadata del servidor más los datos parseados del request. Se construye
//! fresco para cada request partiendo de un registro base fijo y aplicando
//! overlays en orden: request line, headers, dirección remota y el handle
//! de lectura del body.
//!
//! ## Claves requeridas
//!
//! ```text
//! SERVER_NAME      SERVER_PORT      SERVER_SOFTWARE   SERVER_PROTOCOL
//! SCRIPT_NAME      REQUEST_METHOD   PATH_INFO         QUERY_STRING
//! CONTENT_TYPE     CONTENT_LENGTH   REMOTE_ADDR       REMOTE_HOST
//! HTTP_<NAME>      (cada header restante, normalizado)
//! gateway.version  gateway.url_scheme  gateway.multithread
//! gateway.multiprocess  gateway.run_once
//! ```

use crate::http::request::{HeaderTable, RequestLine};
use std::collections::HashMap;
use std::io::BufRead;

/// Identificador de software que el gateway reporta en SERVER_SOFTWARE
pub const SERVER_SOFTWARE: &str = "RedUnix-Gateway/0.1";

/// Handle de lectura del body del request, ligado al stream de la conexión
pub type RequestInput = Box<dyn BufRead + Send>;

/// Valor de una clave del call-environment
///
/// Las claves mezclan tipos semánticos: strings, enteros, flags y la
/// tupla de versión del protocolo del gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    /// Valor textual (la mayoría de las claves)
    Text(String),

    /// Valor entero (SERVER_PORT, CONTENT_LENGTH por defecto)
    Number(i64),

    /// Flag booleano (gateway.multithread, etc.)
    Flag(bool),

    /// Tupla de versión (gateway.version)
    Version(u32, u32),
}

impl EnvValue {
    /// El valor textual, si la clave es de tipo texto
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EnvValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// El valor numérico, si la clave es de tipo entero
    pub fn as_number(&self) -> Option<i64> {
        match self {
            EnvValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for EnvValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvValue::Text(s) => write!(f, "{}", s),
            EnvValue::Number(n) => write!(f, "{}", n),
            EnvValue::Flag(b) => write!(f, "{}", b),
            EnvValue::Version(major, minor) => write!(f, "({}, {})", major, minor),
        }
    }
}

impl From<&str> for EnvValue {
    fn from(s: &str) -> Self {
        EnvValue::Text(s.to_string())
    }
}

impl From<String> for EnvValue {
    fn from(s: String) -> Self {
        EnvValue::Text(s)
    }
}

impl From<i64> for EnvValue {
    fn from(n: i64) -> Self {
        EnvValue::Number(n)
    }
}

impl From<bool> for EnvValue {
    fn from(b: bool) -> Self {
        EnvValue::Flag(b)
    }
}

/// Call-environment de un request
///
/// Propiedad exclusiva del worker que procesa el request; nunca se
/// comparte entre requests.
pub struct Environ {
    values: HashMap<String, EnvValue>,
    input: Option<RequestInput>,
}

impl Environ {
    /// Construye el registro base con la identidad del servidor y los
    /// valores por defecto de todas las claves por-request
    pub fn base(server_name: &str, server_port: u16) -> Self {
        let mut values = HashMap::new();

        // Identidad del servidor (fija durante el startup)
        values.insert("SERVER_NAME".to_string(), EnvValue::from(server_name));
        values.insert(
            "SERVER_PORT".to_string(),
            EnvValue::Number(i64::from(server_port)),
        );
        values.insert("SERVER_SOFTWARE".to_string(), EnvValue::from(SERVER_SOFTWARE));
        values.insert("SERVER_PROTOCOL".to_string(), EnvValue::from("HTTP/1.0"));
        values.insert("SCRIPT_NAME".to_string(), EnvValue::from(""));

        // Metadata del gateway
        values.insert("gateway.version".to_string(), EnvValue::Version(1, 0));
        values.insert("gateway.url_scheme".to_string(), EnvValue::from("http"));
        values.insert("gateway.multithread".to_string(), EnvValue::Flag(true));
        values.insert("gateway.multiprocess".to_string(), EnvValue::Flag(false));
        values.insert("gateway.run_once".to_string(), EnvValue::Flag(false));

        // Valores por defecto, sobreescritos por los overlays
        values.insert("REQUEST_METHOD".to_string(), EnvValue::from("GET"));
        values.insert("PATH_INFO".to_string(), EnvValue::from("/"));
        values.insert("QUERY_STRING".to_string(), EnvValue::from(""));
        values.insert("CONTENT_TYPE".to_string(), EnvValue::from(""));
        values.insert("CONTENT_LENGTH".to_string(), EnvValue::Number(0));
        values.insert("REMOTE_ADDR".to_string(), EnvValue::from("127.0.0.1"));
        values.insert("REMOTE_HOST".to_string(), EnvValue::from(""));

        Self {
            values,
            input: None,
        }
    }

    /// Overlay de los campos de la request line
    pub fn apply_request_line(&mut self, line: &RequestLine) {
        self.values.insert(
            "REQUEST_METHOD".to_string(),
            EnvValue::from(line.method.as_str()),
        );
        self.values.insert(
            "PATH_INFO".to_string(),
            EnvValue::from(line.path_info.as_str()),
        );
        self.values.insert(
            "QUERY_STRING".to_string(),
            EnvValue::from(line.query_string.as_str()),
        );
    }

    /// Overlay de los headers parseados (ya normalizados por el parser)
    pub fn apply_headers(&mut self, headers: &HeaderTable) {
        for (name, value) in headers {
            self.values
                .insert(name.clone(), EnvValue::from(value.as_str()));
        }
    }

    /// Overlay de la dirección IP del peer
    pub fn set_remote_addr(&mut self, addr: &str) {
        self.values
            .insert("REMOTE_ADDR".to_string(), EnvValue::from(addr));
    }

    /// Liga el handle de lectura del body al stream de la conexión
    pub fn set_input(&mut self, input: RequestInput) {
        self.input = Some(input);
    }

    /// Obtiene el valor de una clave
    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.values.get(key)
    }

    /// Obtiene el valor textual de una clave
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_text())
    }

    /// Verifica si la clave existe
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Inserta o reemplaza una clave (overlay plano: el último valor gana)
    pub fn insert(&mut self, key: &str, value: EnvValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Cantidad de claves presentes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Verifica si el environment está vacío
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Toma el handle de lectura del body (queda None en el environment)
    pub fn take_input(&mut self) -> Option<RequestInput> {
        self.input.take()
    }

    /// Indica si el handle de lectura del body está presente
    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::{parse_headers, parse_request_line};

    /// Claves que todo environment debe tener antes de invocar la aplicación
    const REQUIRED_KEYS: &[&str] = &[
        "SERVER_NAME",
        "SERVER_PORT",
        "SERVER_SOFTWARE",
        "SERVER_PROTOCOL",
        "SCRIPT_NAME",
        "REQUEST_METHOD",
        "PATH_INFO",
        "QUERY_STRING",
        "CONTENT_TYPE",
        "CONTENT_LENGTH",
        "REMOTE_ADDR",
        "REMOTE_HOST",
        "gateway.version",
        "gateway.url_scheme",
        "gateway.multithread",
        "gateway.multiprocess",
        "gateway.run_once",
    ];

    #[test]
    fn test_base_contains_required_keys() {
        let environ = Environ::base("localhost", 8888);

        for key in REQUIRED_KEYS {
            assert!(environ.contains_key(key), "missing key: {}", key);
        }
    }

    #[test]
    fn test_base_server_identity() {
        let environ = Environ::base("localhost", 8888);

        assert_eq!(environ.get_str("SERVER_NAME"), Some("localhost"));
        assert_eq!(
            environ.get("SERVER_PORT").unwrap().as_number(),
            Some(8888)
        );
        assert_eq!(environ.get_str("SERVER_PROTOCOL"), Some("HTTP/1.0"));
        assert_eq!(environ.get_str("SERVER_SOFTWARE"), Some(SERVER_SOFTWARE));
    }

    #[test]
    fn test_base_defaults() {
        let environ = Environ::base("localhost", 8888);

        assert_eq!(environ.get_str("REQUEST_METHOD"), Some("GET"));
        assert_eq!(environ.get_str("PATH_INFO"), Some("/"));
        assert_eq!(environ.get_str("QUERY_STRING"), Some(""));
        assert_eq!(environ.get("CONTENT_LENGTH").unwrap().as_number(), Some(0));
        assert_eq!(
            environ.get("gateway.version"),
            Some(&EnvValue::Version(1, 0))
        );
        assert_eq!(
            environ.get("gateway.multithread"),
            Some(&EnvValue::Flag(true))
        );
        assert!(!environ.has_input());
    }

    #[test]
    fn test_request_line_overlay() {
        let mut stream = &b"GET /search?q=cat HTTP/1.0\r\n"[..];
        let line = parse_request_line(&mut stream).unwrap();

        let mut environ = Environ::base("localhost", 8888);
        environ.apply_request_line(&line);

        assert_eq!(environ.get_str("REQUEST_METHOD"), Some("GET"));
        assert_eq!(environ.get_str("PATH_INFO"), Some("/search"));
        assert_eq!(environ.get_str("QUERY_STRING"), Some("q=cat"));
    }

    #[test]
    fn test_headers_overlay() {
        let mut stream =
            &b"X-Foo: bar\r\nContent-Type: text/plain\r\nContent-Length: 12\r\n\r\n"[..];
        let headers = parse_headers(&mut stream).unwrap();

        let mut environ = Environ::base("localhost", 8888);
        environ.apply_headers(&headers);

        assert_eq!(environ.get_str("HTTP_X_FOO"), Some("bar"));
        assert_eq!(environ.get_str("CONTENT_TYPE"), Some("text/plain"));
        // El header sobreescribe el default numérico con su valor textual
        assert_eq!(environ.get_str("CONTENT_LENGTH"), Some("12"));
    }

    #[test]
    fn test_overlay_order_later_wins() {
        let mut environ = Environ::base("localhost", 8888);

        environ.insert("PATH_INFO", EnvValue::from("/primero"));
        environ.insert("PATH_INFO", EnvValue::from("/segundo"));

        assert_eq!(environ.get_str("PATH_INFO"), Some("/segundo"));
    }

    #[test]
    fn test_remote_addr_overlay() {
        let mut environ = Environ::base("localhost", 8888);
        environ.set_remote_addr("10.0.0.7");

        assert_eq!(environ.get_str("REMOTE_ADDR"), Some("10.0.0.7"));
    }

    #[test]
    fn test_input_handle() {
        let mut environ = Environ::base("localhost", 8888);
        environ.set_input(Box::new(&b"cuerpo"[..]));

        assert!(environ.has_input());

        let mut input = environ.take_input().unwrap();
        let mut body = Vec::new();
        std::io::Read::read_to_end(&mut input, &mut body).unwrap();

        assert_eq!(body, b"cuerpo");
        assert!(!environ.has_input());
    }

    #[test]
    fn test_env_value_display() {
        assert_eq!(EnvValue::from("texto").to_string(), "texto");
        assert_eq!(EnvValue::Number(42).to_string(), "42");
        assert_eq!(EnvValue::Flag(true).to_string(), "true");
        assert_eq!(EnvValue::Version(1, 0).to_string(), "(1, 0)");
    }
}
