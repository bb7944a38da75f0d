//! # Módulo de Despacho
//! src/dispatch/mod.rs
//!
//! Mecanismo de despacho concurrente: una cola FIFO acotada comparte las
//! conexiones aceptadas entre un pool fijo de workers. El acceptor es el
//! único productor; los workers son los únicos consumidores. Toda la
//! sincronización vive dentro del push/pop de la cola.

pub mod pool;
pub mod queue;

// Re-exportar para facilitar el uso
pub use pool::WorkerPool;
pub use queue::{BoundedQueue, QueueError};
