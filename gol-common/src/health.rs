//! Health reporting for the broker's progress loop and a worker's
//! halo-exchange-and-compute loop.
//!
//! `HealthRegistry` allows an arbitrary number of components (here: "the
//! progress loop", "worker halo-exchange loop", one entry per registered
//! run component) to report their health on a schedule. The process is
//! healthy only if every registered component has reported within its
//! deadline; a stalled report (no ping before the deadline) fails the
//! check, surfacing a broker or worker that stopped making turn progress.
//!
//! Unlike a generic "I'm alive" ping, a report here always carries the
//! turn number the component just reached, so `/_liveness` can show not
//! just *that* a halo-exchange loop or progress loop is healthy but which
//! turn it last completed — the number an operator actually needs to tell
//! "one turn behind" from "stuck for an hour".

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::ops::Add;
use std::sync::{Arc, RwLock};

use time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Default, Debug)]
pub struct HealthStatus {
    pub healthy: bool,
    pub components: HashMap<String, ComponentStatus>,
}

impl IntoResponse for HealthStatus {
    fn into_response(self) -> Response {
        let body = format!("{:?}", self);
        match self.healthy {
            true => (StatusCode::OK, body),
            false => (StatusCode::INTERNAL_SERVER_ERROR, body),
        }
        .into_response()
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ComponentStatus {
    Starting,
    /// Last reported healthy while at `turn`, valid until `until`.
    HealthyAtTurn {
        until: time::OffsetDateTime,
        turn: u32,
    },
    Unhealthy,
    Stalled,
}

struct HealthMessage {
    component: String,
    status: ComponentStatus,
}

#[derive(Clone)]
pub struct HealthHandle {
    component: String,
    deadline: Duration,
    sender: mpsc::Sender<HealthMessage>,
}

impl HealthHandle {
    /// Report healthy at the turn just reached; call at least once per
    /// turn so a stalled halo-exchange or progress loop shows up as
    /// `Stalled` rather than `HealthyAtTurn` with a turn that never moves.
    pub async fn report_healthy(&self, turn: u32) {
        self.report_status(ComponentStatus::HealthyAtTurn {
            until: time::OffsetDateTime::now_utc().add(self.deadline),
            turn,
        })
        .await
    }

    pub async fn report_status(&self, status: ComponentStatus) {
        let message = HealthMessage {
            component: self.component.clone(),
            status,
        };
        if let Err(err) = self.sender.send(message).await {
            warn!("failed to report health status: {}", err)
        }
    }
}

#[derive(Clone)]
pub struct HealthRegistry {
    name: String,
    components: Arc<RwLock<HashMap<String, ComponentStatus>>>,
    sender: mpsc::Sender<HealthMessage>,
}

impl HealthRegistry {
    pub fn new(name: &str) -> Self {
        let (tx, mut rx) = mpsc::channel::<HealthMessage>(16);
        let registry = Self {
            name: name.to_owned(),
            components: Default::default(),
            sender: tx,
        };

        let components = registry.components.clone();
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Ok(mut map) = components.write() {
                    _ = map.insert(message.component, message.status);
                } else {
                    warn!("poisoned HealthRegistry mutex")
                }
            }
        });

        registry
    }

    pub async fn register(&self, component: String, deadline: time::Duration) -> HealthHandle {
        let handle = HealthHandle {
            component,
            deadline,
            sender: self.sender.clone(),
        };
        handle.report_status(ComponentStatus::Starting).await;
        handle
    }

    pub fn get_status(&self) -> HealthStatus {
        let components = self
            .components
            .read()
            .expect("poisoned HealthRegistry mutex");

        let result = HealthStatus {
            healthy: !components.is_empty(),
            components: Default::default(),
        };
        let now = time::OffsetDateTime::now_utc();

        let result = components
            .iter()
            .fold(result, |mut result, (name, status)| {
                match status {
                    ComponentStatus::HealthyAtTurn { until, .. } => {
                        if until.gt(&now) {
                            _ = result.components.insert(name.clone(), status.clone())
                        } else {
                            result.healthy = false;
                            _ = result
                                .components
                                .insert(name.clone(), ComponentStatus::Stalled)
                        }
                    }
                    _ => {
                        result.healthy = false;
                        _ = result.components.insert(name.clone(), status.clone())
                    }
                }
                result
            });
        match result.healthy {
            true => info!("{} health check ok", self.name),
            false => warn!("{} health check failed: {:?}", self.name, result.components),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::Sub;
    use time::OffsetDateTime;

    async fn assert_or_retry<F: Fn() -> bool>(check: F) {
        let deadline = OffsetDateTime::now_utc().add(Duration::seconds(5));
        while !check() && OffsetDateTime::now_utc().lt(&deadline) {
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }
        assert!(check())
    }

    #[tokio::test]
    async fn defaults_to_unhealthy() {
        let registry = HealthRegistry::new("liveness");
        assert!(!registry.get_status().healthy);
    }

    #[tokio::test]
    async fn one_component_goes_healthy_then_stalls() {
        let registry = HealthRegistry::new("liveness");
        let handle = registry
            .register("progress-loop".to_string(), Duration::milliseconds(50))
            .await;
        assert_or_retry(|| registry.get_status().components.len() == 1).await;

        handle.report_healthy(3).await;
        assert_or_retry(|| registry.get_status().healthy).await;
        assert!(matches!(
            registry.get_status().components.get("progress-loop"),
            Some(ComponentStatus::HealthyAtTurn { turn: 3, .. })
        ));

        handle
            .report_status(ComponentStatus::HealthyAtTurn {
                until: OffsetDateTime::now_utc().sub(Duration::seconds(1)),
                turn: 3,
            })
            .await;
        assert_or_retry(|| !registry.get_status().healthy).await;
        assert_eq!(
            registry.get_status().components.get("progress-loop"),
            Some(&ComponentStatus::Stalled)
        );
    }
}
