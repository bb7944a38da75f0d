//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Este módulo implementa la capa TCP del gateway:
//! 1. Escucha en un puerto (SO_REUSEADDR + backlog configurado)
//! 2. Acepta conexiones y las empuja a la cola de despacho
//! 3. Los workers parsean el request, construyen el call-environment,
//!    invocan la aplicación y escriben la respuesta
//! 4. Cada conexión se cierra exactamente una vez, en todo camino

pub mod connection;
pub mod tcp;
pub mod worker;

// Re-exportar para facilitar el uso
pub use connection::Connection;
pub use tcp::{Listener, Server, ServerHandle};
pub use worker::{Gateway, GatewayError};
