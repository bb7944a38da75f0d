//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Recolección y agregación de métricas del gateway:
//! - Requests por resultado (completados, errores de parseo, de aplicación,
//!   de escritura, de conexión)
//! - Latencias (p50, p95, p99, promedio)

pub mod collector;

pub use collector::{LatencySummary, MetricsCollector, MetricsSnapshot, RequestOutcome};
