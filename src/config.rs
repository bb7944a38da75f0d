//! # Configuración del Gateway
//! src/config.rs
//!
//! Este módulo define la configuración del gateway HTTP con soporte
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./gateway_server --port 8888 \
//!   --workers 4 \
//!   --queue-capacity 64 \
//!   --backlog 8
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! GATEWAY_PORT=8888 GATEWAY_HOST=0.0.0.0 ./gateway_server
//! ```

use clap::Parser;

/// Configuración del gateway HTTP/1.0
#[derive(Debug, Clone, Parser)]
#[command(name = "gateway_server")]
#[command(about = "Puente HTTP/1.0 concurrente entre sockets TCP y aplicaciones externas")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el gateway (0 = puerto efímero)
    #[arg(short, long, default_value = "8888", env = "GATEWAY_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "GATEWAY_HOST")]
    pub host: String,

    /// Backlog del socket de escucha (cola de conexiones pendientes del SO,
    /// distinta de la cola de despacho interna)
    #[arg(long, default_value = "8", env = "GATEWAY_BACKLOG")]
    pub backlog: i32,

    // === Workers ===

    /// Número de workers que procesan conexiones
    #[arg(long, default_value = "4", env = "GATEWAY_WORKERS")]
    pub workers: usize,

    // === Cola de despacho ===

    /// Capacidad máxima de la cola de despacho.
    /// Cuando la cola está llena, el acceptor se bloquea (backpressure)
    #[arg(long = "queue-capacity", default_value = "64", env = "GATEWAY_QUEUE")]
    pub queue_capacity: usize,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    ///
    /// # Ejemplo
    /// ```rust
    /// use gateway_server::config::Config;
    ///
    /// let config = Config::new();
    /// println!("Gateway listening on {}", config.address());
    /// ```
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use gateway_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8888");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }

        if self.queue_capacity == 0 {
            return Err("Queue capacity must be >= 1".to_string());
        }

        if self.backlog <= 0 {
            return Err("Backlog must be >= 1".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════╗");
        println!("║       RedUnix Gateway HTTP/1.0 Configuration     ║");
        println!("╚══════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Backlog:      {}", self.backlog);
        println!();
        println!("👷 Dispatch:");
        println!("   Workers:      {}", self.workers);
        println!("   Queue cap:    {} (acceptor blocks when full)", self.queue_capacity);
        println!();
        println!("════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8888,
            host: "127.0.0.1".to_string(),
            backlog: 8,
            workers: 4,
            queue_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8888);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.backlog, 8);
        assert_eq!(config.workers, 4);
        assert_eq!(config.queue_capacity, 64);
    }

    #[test]
    fn test_address() {
        let config = Config::default();
        assert_eq!(config.address(), "127.0.0.1:8888");
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    // ==================== Workers Validation ====================

    #[test]
    fn test_validate_invalid_workers() {
        let mut config = Config::default();
        config.workers = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Workers"));
    }

    // ==================== Queue Capacity Validation ====================

    #[test]
    fn test_validate_invalid_queue_capacity() {
        let mut config = Config::default();
        config.queue_capacity = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Queue capacity"));
    }

    // ==================== Backlog Validation ====================

    #[test]
    fn test_validate_invalid_backlog() {
        let mut config = Config::default();
        config.backlog = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Backlog"));
    }

    #[test]
    fn test_validate_negative_backlog() {
        let mut config = Config::default();
        config.backlog = -1;
        assert!(config.validate().is_err());
    }

    // ==================== Custom Values ====================

    #[test]
    fn test_config_custom_values() {
        let mut config = Config::default();
        config.port = 3000;
        config.host = "0.0.0.0".to_string();
        config.workers = 8;
        config.queue_capacity = 128;

        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.workers, 8);
        assert_eq!(config.queue_capacity, 128);
        assert!(config.validate().is_ok());
    }

    // ==================== Print Summary ====================

    #[test]
    fn test_config_print_summary() {
        let config = Config::default();
        // Should not panic
        config.print_summary();
    }
}
