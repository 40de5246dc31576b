//! Connection snapshots: obtaining the raw table and turning it into records.
//!
//! The text format is an `ss` implementation detail. It is confined to
//! [`parser`] and [`provider`] so the reconciler only ever sees
//! [`ObservedRecord`]s.

pub mod parser;
pub mod provider;

use portreap_common::error::Result;
use portreap_common::types::{ConnectionId, EndpointPair};
use serde::{Deserialize, Serialize};

use self::provider::SnapshotProvider;

/// One connection seen in a single snapshot. Carries no history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedRecord {
    /// Kernel socket identifier.
    pub id: ConnectionId,
    /// Local and remote address.
    pub endpoints: EndpointPair,
}

/// Fetches a snapshot from `provider` and parses it.
///
/// # Errors
///
/// Returns an error if the provider cannot produce a snapshot. Individual
/// malformed lines never fail the call.
pub fn observe(provider: &dyn SnapshotProvider) -> Result<Vec<ObservedRecord>> {
    let raw = provider.fetch()?;
    Ok(parser::parse_snapshot(&raw))
}
