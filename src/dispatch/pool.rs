//! # Pool de Workers
//! src/dispatch/pool.rs
//!
//! Pool de tamaño fijo de workers de larga vida, creados una sola vez al
//! iniciar el servidor. Cada worker corre el loop: bloquear en el pop de
//! la cola → procesar un elemento completo → volver al pop. El cierre de
//! la cola es el sentinel de salida, así el pool se drena y joinea de
//! forma determinista.

use crate::dispatch::queue::BoundedQueue;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Pool fijo de workers consumiendo de una cola compartida
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Inicia `count` workers consumiendo de `queue` y procesando cada
    /// elemento con `handler`
    pub fn start<T, F>(count: usize, queue: Arc<BoundedQueue<T>>, handler: F) -> Self
    where
        T: Send + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        let mut handles = Vec::with_capacity(count);

        for i in 0..count {
            let queue = Arc::clone(&queue);
            let handler = Arc::clone(&handler);
            let name = format!("Gateway-{}", i);

            handles.push(thread::spawn(move || {
                Self::worker_loop(name, queue, handler);
            }));
        }

        Self { handles }
    }

    /// Loop principal del worker
    fn worker_loop<T, F>(name: String, queue: Arc<BoundedQueue<T>>, handler: Arc<F>)
    where
        F: Fn(T),
    {
        println!("🔧 Worker {} iniciado", name);

        // pop retorna None cuando la cola se cierra y drena
        while let Some(item) = queue.pop() {
            handler(item);
        }

        println!("🔧 Worker {} terminado", name);
    }

    /// Cantidad de workers del pool
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Espera a que todos los workers terminen
    ///
    /// Solo retorna después de que la cola fue cerrada y drenada.
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}
