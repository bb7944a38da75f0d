//! # Gateway Server
//! src/lib.rs
//!
//! Puente HTTP/1.0 concurrente entre sockets TCP y aplicaciones externas,
//! implementado desde cero para demostrar conceptos de sistemas
//! operativos: concurrencia, sincronización y manejo de recursos.
//!
//! El gateway es dueño de las conexiones TCP, habla lo justo de HTTP/1.0
//! para extraer un request, lo traduce a un call-environment estándar,
//! invoca la aplicación provista por el caller y serializa su respuesta
//! de vuelta al socket. Un request por conexión; la conexión se cierra
//! al terminar.
//!
//! ## Arquitectura
//!
//! El gateway está dividido en módulos especializados:
//! - `http`: Parsing de requests y escritura de responses HTTP/1.0
//! - `gateway`: El call-environment y la convención de invocación
//! - `dispatch`: Cola acotada de despacho y pool fijo de workers
//! - `server`: Listener TCP, pipeline por-conexión y ciclo de vida
//! - `metrics`: Recolección de métricas y observabilidad
//! - `demo`: Aplicación de ejemplo incluida
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use gateway_server::config::Config;
//! use gateway_server::demo::DemoApp;
//! use gateway_server::metrics::MetricsCollector;
//! use gateway_server::server::Server;
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let metrics = Arc::new(MetricsCollector::new());
//! let app = Arc::new(DemoApp::new(Arc::clone(&metrics)));
//!
//! let server = Server::with_metrics(config, app, metrics);
//! server.run().expect("Error al iniciar el gateway");
//! ```

pub mod config;
pub mod demo;
pub mod dispatch;
pub mod gateway;
pub mod http;
pub mod metrics;
pub mod server;
