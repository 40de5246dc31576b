//! Parser for `ss -tnpeH` output built on `nom`.
//!
//! Each line yields at most one [`ObservedRecord`]. The socket inode is
//! located by its `ino:<digits>` token anywhere on the line; the local and
//! peer addresses are taken by whitespace field position.

use std::collections::BTreeMap;

use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::digit1,
    sequence::preceded,
};
use portreap_common::constants::{INODE_TOKEN_PREFIX, LOCAL_ADDR_FIELD, PEER_ADDR_FIELD};
use portreap_common::types::{ConnectionId, EndpointPair};

use super::ObservedRecord;

/// Matches `ino:` followed by at least one digit, returning the digits.
fn inode_token(input: &str) -> IResult<&str, &str> {
    preceded(tag(INODE_TOKEN_PREFIX), digit1).parse(input)
}

/// Returns the first inode token on the line, if any.
pub fn extract_inode(line: &str) -> Option<ConnectionId> {
    line.match_indices(INODE_TOKEN_PREFIX)
        .find_map(|(idx, _)| inode_token(&line[idx..]).ok())
        .map(|(_, digits)| ConnectionId::new(digits))
}

/// Returns the local and peer address fields, or `None` when the line is
/// too short to contain both.
pub fn extract_endpoints(line: &str) -> Option<EndpointPair> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let local = fields.get(LOCAL_ADDR_FIELD)?;
    let peer = fields.get(PEER_ADDR_FIELD)?;
    Some(EndpointPair::new(*local, *peer))
}

/// Parses one line into a record.
///
/// A line without an inode token is logged and skipped. A line with an
/// inode but too few fields is dropped without a warning.
fn parse_line(line: &str) -> Option<ObservedRecord> {
    let Some(id) = extract_inode(line) else {
        tracing::warn!(line, "could not extract inode from snapshot line");
        return None;
    };
    let Some(endpoints) = extract_endpoints(line) else {
        tracing::debug!(inode = %id, line, "snapshot line has too few fields");
        return None;
    };
    Some(ObservedRecord { id, endpoints })
}

/// Parses a full snapshot into observed records.
///
/// Blank lines are ignored. If an inode appears twice the last line wins.
/// Output is ordered by inode.
pub fn parse_snapshot(raw: &str) -> Vec<ObservedRecord> {
    let mut records: BTreeMap<ConnectionId, ObservedRecord> = BTreeMap::new();
    for line in raw.lines().filter(|l| !l.trim().is_empty()) {
        if let Some(record) = parse_line(line) {
            let _ = records.insert(record.id.clone(), record);
        }
    }
    tracing::debug!(records = records.len(), "parsed snapshot");
    records.into_values().collect()
}
