//! Domain primitive types used across the portreap workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::ENDPOINT_SEPARATOR;

/// Kernel-assigned socket identifier (the socket inode number).
///
/// Stable for the lifetime of the socket and the only join key between
/// two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Creates a connection ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Local and remote address of a TCP connection, as printed by `ss`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointPair {
    /// Local `address:port`.
    pub local: String,
    /// Remote `address:port`.
    pub remote: String,
}

impl EndpointPair {
    /// Creates an endpoint pair.
    #[must_use]
    pub fn new(local: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            remote: remote.into(),
        }
    }

    /// Returns `true` when both sides are non-empty single tokens.
    ///
    /// Anything else cannot be passed to the termination filter safely.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let valid = |s: &str| !s.is_empty() && !s.chars().any(char::is_whitespace);
        valid(&self.local) && valid(&self.remote)
    }
}

impl fmt::Display for EndpointPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{ENDPOINT_SEPARATOR}{}", self.local, self.remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_pair_display_uses_arrow() {
        let pair = EndpointPair::new("10.0.0.1:50090", "10.0.0.2:41000");
        assert_eq!(pair.to_string(), "10.0.0.1:50090 -> 10.0.0.2:41000");
    }

    #[test]
    fn endpoint_pair_rejects_missing_remote() {
        assert!(!EndpointPair::new("10.0.0.1:50090", "").is_well_formed());
    }

    #[test]
    fn endpoint_pair_rejects_embedded_whitespace() {
        assert!(!EndpointPair::new("10.0.0.1:50090", "dst 10.0.0.2").is_well_formed());
    }

    #[test]
    fn endpoint_pair_accepts_ipv6() {
        assert!(EndpointPair::new("[::1]:50090", "[::1]:41000").is_well_formed());
    }

    #[test]
    fn connection_id_orders_lexically() {
        let mut ids = vec![ConnectionId::new("20"), ConnectionId::new("10")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "10");
    }
}
