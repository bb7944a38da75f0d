//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta y agrega métricas del gateway en tiempo real: requests por
//! resultado y latencias con percentiles.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Resultado de procesar una conexión, para efectos de métricas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Respuesta escrita completa
    Completed,

    /// Request line o headers malformados
    ParseError,

    /// La aplicación falló o entró en pánico
    ApplicationError,

    /// Falló la escritura de la respuesta
    WriteError,

    /// Falló la preparación de los streams de la conexión
    ConnectionError,
}

/// Datos internos de métricas
struct MetricsData {
    total_requests: u64,
    completed: u64,
    parse_errors: u64,
    app_errors: u64,
    write_errors: u64,
    connection_errors: u64,

    /// Latencias registradas (en microsegundos)
    latencies: Vec<u64>,

    /// Máximo de latencias a guardar (para calcular percentiles)
    max_latencies: usize,
}

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Resumen de latencias en milisegundos
#[derive(Debug, Clone, Serialize)]
pub struct LatencySummary {
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub avg: f64,
}

/// Foto serializable del estado de las métricas
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub completed: u64,
    pub parse_errors: u64,
    pub app_errors: u64,
    pub write_errors: u64,
    pub connection_errors: u64,
    pub latency_ms: LatencySummary,
}

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData {
                total_requests: 0,
                completed: 0,
                parse_errors: 0,
                app_errors: 0,
                write_errors: 0,
                connection_errors: 0,
                latencies: Vec::with_capacity(10000),
                max_latencies: 10000, // Guardar últimas 10k latencias
            })),
            start_time: Instant::now(),
        }
    }

    /// Registra el resultado de una conexión procesada
    pub fn record(&self, outcome: RequestOutcome, latency: Duration) {
        let mut data = self.inner.lock().unwrap();

        data.total_requests += 1;

        match outcome {
            RequestOutcome::Completed => data.completed += 1,
            RequestOutcome::ParseError => data.parse_errors += 1,
            RequestOutcome::ApplicationError => data.app_errors += 1,
            RequestOutcome::WriteError => data.write_errors += 1,
            RequestOutcome::ConnectionError => data.connection_errors += 1,
        }

        // Registrar latencia (en microsegundos)
        let latency_us = latency.as_micros() as u64;

        // Si tenemos demasiadas latencias, eliminar las más antiguas
        if data.latencies.len() >= data.max_latencies {
            data.latencies.remove(0);
        }
        data.latencies.push(latency_us);
    }

    /// Total de requests registrados
    pub fn total_requests(&self) -> u64 {
        self.inner.lock().unwrap().total_requests
    }

    /// Obtiene una foto del estado actual
    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.inner.lock().unwrap();

        let (p50, p95, p99, avg) = Self::calculate_percentiles(&data.latencies);

        MetricsSnapshot {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            total_requests: data.total_requests,
            completed: data.completed,
            parse_errors: data.parse_errors,
            app_errors: data.app_errors,
            write_errors: data.write_errors,
            connection_errors: data.connection_errors,
            latency_ms: LatencySummary {
                p50: p50 / 1000.0,
                p95: p95 / 1000.0,
                p99: p99 / 1000.0,
                avg: avg / 1000.0,
            },
        }
    }

    /// Calcula percentiles p50/p95/p99 y promedio (en microsegundos)
    fn calculate_percentiles(latencies: &[u64]) -> (f64, f64, f64, f64) {
        if latencies.is_empty() {
            return (0.0, 0.0, 0.0, 0.0);
        }

        let mut sorted = latencies.to_vec();
        sorted.sort_unstable();

        let percentile = |p: f64| -> f64 {
            let idx = ((sorted.len() as f64) * p).ceil() as usize;
            sorted[idx.saturating_sub(1).min(sorted.len() - 1)] as f64
        };

        let sum: u64 = sorted.iter().sum();
        let avg = sum as f64 / sorted.len() as f64;

        (percentile(0.50), percentile(0.95), percentile(0.99), avg)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
