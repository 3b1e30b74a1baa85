//! Environment-driven configuration for the coordinator and worker
//! processes. Every knob has a default; overrides apply only when the
//! environment value actually parses (and, for latencies, is positive).

use std::env;

use crate::expr::BinaryOp;

/// Coordinator configuration: listen port plus the simulated latency
/// assigned to each operator's tasks.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Simulated addition latency in milliseconds.
    pub time_addition_ms: u64,
    /// Simulated subtraction latency in milliseconds.
    pub time_subtraction_ms: u64,
    /// Simulated multiplication latency in milliseconds.
    pub time_multiplication_ms: u64,
    /// Simulated division latency in milliseconds.
    pub time_division_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            time_addition_ms: 100,
            time_subtraction_ms: 100,
            time_multiplication_ms: 100,
            time_division_ms: 100,
        }
    }
}

impl CoordinatorConfig {
    /// Read `PORT` and the four `TIME_*_MS` variables, keeping defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(port) = env_parse::<u16>("PORT") {
            cfg.port = port;
        }
        cfg.time_addition_ms = env_latency("TIME_ADDITION_MS", cfg.time_addition_ms);
        cfg.time_subtraction_ms = env_latency("TIME_SUBTRACTION_MS", cfg.time_subtraction_ms);
        cfg.time_multiplication_ms =
            env_latency("TIME_MULTIPLICATIONS_MS", cfg.time_multiplication_ms);
        cfg.time_division_ms = env_latency("TIME_DIVISIONS_MS", cfg.time_division_ms);
        cfg
    }

    /// Simulated latency for one operator's tasks.
    pub fn operation_time(&self, op: BinaryOp) -> u64 {
        match op {
            BinaryOp::Add => self.time_addition_ms,
            BinaryOp::Sub => self.time_subtraction_ms,
            BinaryOp::Mul => self.time_multiplication_ms,
            BinaryOp::Div => self.time_division_ms,
        }
    }
}

/// Worker configuration: how many polling loops to run and where the
/// coordinator lives.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of concurrent polling loops. Never less than 1.
    pub computing_power: usize,
    /// Base URL of the coordinator.
    pub coordinator_url: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            computing_power: 1,
            coordinator_url: "http://localhost:8080".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Read `COMPUTING_POWER` and `ORCHESTRATOR_URL`, keeping defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(power) = env_parse::<usize>("COMPUTING_POWER") {
            if power >= 1 {
                cfg.computing_power = power;
            }
        }
        if let Ok(url) = env::var("ORCHESTRATOR_URL") {
            if !url.is_empty() {
                cfg.coordinator_url = url;
            }
        }
        cfg
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok()?.parse().ok()
}

/// Latency overrides must be positive integers; anything else keeps the
/// default.
fn env_latency(name: &str, default: u64) -> u64 {
    match env_parse::<u64>(name) {
        Some(ms) if ms > 0 => ms,
        _ => default,
    }
}
