//! Source identification record
//!
//! Sent to the capture agent as JSON immediately after connecting; the agent
//! uses it to pick which interface to sample. Field names are the agent's
//! wire contract and must not change.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identity of one capture source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Source name (e.g. the workload/container name)
    #[serde(rename = "container_name")]
    pub name: String,

    /// Namespace the source lives in
    #[serde(rename = "container_namespace")]
    pub namespace: String,

    /// Network interface the agent should sample
    pub interface: String,

    /// Destination path of this source's trace file
    #[serde(rename = "file_name")]
    pub trace_path: PathBuf,
}

impl SourceInfo {
    /// Create a source identity with the default interface (`eth0`)
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        trace_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            interface: "eth0".to_string(),
            trace_path: trace_path.into(),
        }
    }

    /// Override the sampled interface
    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    /// Serialize the record for the agent handshake
    pub fn handshake(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl std::fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
