//! # Gateway Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del gateway HTTP/1.0.
//!
//! Levanta el gateway con la aplicación demo incluida. La configuración
//! llega por CLI o variables de entorno.

use gateway_server::config::Config;
use gateway_server::demo::DemoApp;
use gateway_server::metrics::MetricsCollector;
use gateway_server::server::Server;
use std::sync::Arc;

fn main() {
    println!("=================================");
    println!("  RedUnix Gateway HTTP/1.0");
    println!("  Principios de Sistemas Operativos");
    println!("=================================\n");

    // Crear configuración desde CLI / env
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        std::process::exit(1);
    }

    config.print_summary();

    // La demo app comparte el collector para exponerlo en /status
    let metrics = Arc::new(MetricsCollector::new());
    let app = Arc::new(DemoApp::new(Arc::clone(&metrics)));

    let server = Server::with_metrics(config, app, metrics);

    // Iniciar el servidor (esto bloqueará el thread)
    if let Err(e) = server.run() {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }
}
