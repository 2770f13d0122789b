//! Process identity: who this replica is and when it started.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::ServiceConfig;

/// Immutable build and runtime metadata for this process.
///
/// Created once at startup and shared read-only for the lifetime of the
/// process. `instance_id` is a fresh UUID v4 per process, so two replicas
/// behind the same Service can be told apart even with identical pod names.
#[derive(Debug, Clone)]
pub struct ServiceIdentity {
    pub service: String,
    pub version: String,
    pub git_sha: String,
    pub pod_name: String,
    pub instance_id: String,
    pub started_at: DateTime<Utc>,
}

impl ServiceIdentity {
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_start(config, Utc::now())
    }

    pub fn with_start(config: &ServiceConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            service: config.name.clone(),
            version: config.version.clone(),
            git_sha: config.git_sha.clone(),
            pod_name: config.pod_name.clone(),
            instance_id: Uuid::new_v4().to_string(),
            started_at,
        }
    }

    /// First 8 characters of the instance id, as shown in greetings.
    pub fn short_instance_id(&self) -> &str {
        self.instance_id
            .char_indices()
            .nth(8)
            .map_or(self.instance_id.as_str(), |(idx, _)| &self.instance_id[..idx])
    }

    /// Whole seconds elapsed between start and `now`, clamped at zero.
    pub fn uptime_secs_at(&self, now: DateTime<Utc>) -> u64 {
        (now - self.started_at).num_seconds().max(0) as u64
    }

    pub fn uptime_secs(&self) -> u64 {
        self.uptime_secs_at(Utc::now())
    }
}
