//! # Cola de Despacho Acotada
//! src/dispatch/queue.rs
//!
//! Cola FIFO thread-safe y acotada entre el acceptor y los workers.
//! Cuando la cola está llena, `push` bloquea al productor (backpressure
//! natural) en vez de descartar o crecer sin límite. `close` es el
//! sentinel de apagado: despierta a todos los bloqueados, `pop` drena lo
//! pendiente y luego retorna `None`.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// Errores de la cola
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// La cola fue cerrada; no se aceptan más elementos
    Closed,
}

impl std::fmt::Display for QueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Closed => write!(f, "Queue is closed"),
        }
    }
}

impl std::error::Error for QueueError {}

/// Estado interno protegido por el mutex
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Cola FIFO acotada con push bloqueante
pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,

    /// Notifica a consumidores esperando elementos
    not_empty: Condvar,

    /// Notifica a productores esperando espacio
    not_full: Condvar,

    /// Capacidad máxima de la cola
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Crea una nueva cola con la capacidad dada
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// Encola un elemento
    ///
    /// Bloquea mientras la cola esté llena. Retorna `Err(QueueError::Closed)`
    /// si la cola fue cerrada (el elemento se descarta).
    pub fn push(&self, item: T) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap();

        while state.items.len() >= self.capacity && !state.closed {
            state = self.not_full.wait(state).unwrap();
        }

        if state.closed {
            return Err(QueueError::Closed);
        }

        state.items.push_back(item);
        self.not_empty.notify_one();

        Ok(())
    }

    /// Desencola el próximo elemento en orden FIFO
    ///
    /// Bloquea hasta que haya un elemento disponible. Tras `close`, drena
    /// lo pendiente y luego retorna `None`.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();

        loop {
            if let Some(item) = state.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }

            if state.closed {
                return None;
            }

            state = self.not_empty.wait(state).unwrap();
        }
    }

    /// Cierra la cola y despierta a todos los bloqueados
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Indica si la cola fue cerrada
    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    /// Retorna el tamaño actual de la cola
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retorna la capacidad máxima
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Verifica si la cola está llena
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }
}
