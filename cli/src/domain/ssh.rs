//! SSH connection descriptor, derived from a pod's runtime ports.

use serde::Serialize;

use crate::domain::pod::PortMapping;

/// Username for every pod SSH session.
pub const SSH_USER: &str = "root";

/// Where to reach a pod over SSH. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SshEndpoint {
    pub host: String,
    pub port: u16,
    pub username: String,
}

impl SshEndpoint {
    /// Select the port entry whose private port is 22.
    ///
    /// Returns `None` when the pod exposes no such entry; that is not an error.
    #[must_use]
    pub fn from_ports(ports: &[PortMapping]) -> Option<Self> {
        ports.iter().find(|p| p.private_port == 22).map(|p| Self {
            host: p.ip.clone(),
            port: p.public_port,
            username: SSH_USER.to_string(),
        })
    }

    /// `user@host` target for ssh/scp.
    #[must_use]
    pub fn target(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}
