//! Health monitoring utilities.
//!
//! This module provides types for reporting and tracking the operational
//! status of long-running components (the pooler, the scheduler's runner
//! loop, a worker process) in a uniform shape.

use std::collections::HashMap;
use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents the operational status of a component.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    /// Operating normally.
    #[default]
    Healthy,
    /// Operating with some issues but still functional.
    Degraded,
    /// Not operational.
    Unhealthy,
}

/// Health information for a component.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Current status.
    pub status: ServiceStatus,
    /// Response time for the health check, if measured.
    pub response: Option<Duration>,
    /// Optional message describing the current state.
    pub message: Option<String>,
    /// Timestamp when the health check was performed.
    pub checked_at: Timestamp,
    /// Additional metrics about the component.
    pub metrics: HashMap<String, Value>,
}

impl ServiceHealth {
    /// Creates a new healthy report.
    pub fn healthy() -> Self {
        Self {
            status: ServiceStatus::Healthy,
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    /// Creates a new degraded report.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Degraded,
            message: Some(message.into()),
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    /// Creates a new unhealthy report.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Unhealthy,
            message: Some(message.into()),
            checked_at: Timestamp::now(),
            metrics: HashMap::new(),
            ..Default::default()
        }
    }

    /// Sets the response time for this health check.
    pub fn with_response_time(mut self, response_time: Duration) -> Self {
        self.response = Some(response_time);
        self
    }

    /// Adds a metric to the health report.
    pub fn with_metric(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }
}
