//! System-wide constants and defaults.

/// Default monitored source port.
pub const DEFAULT_PORT: u16 = 50090;

/// Default interval between monitoring cycles, in minutes.
pub const DEFAULT_CHECK_INTERVAL_MIN: u32 = 30;

/// Default maximum lifetime of an active connection, in minutes.
pub const DEFAULT_MAX_ACTIVE_MIN: u32 = 120;

/// Default time an unseen connection stays tracked, in minutes.
pub const DEFAULT_MAX_INACTIVE_MIN: u32 = 60;

/// Socket statistics utility (iproute2) used for enumeration and kills.
pub const SS_BINARY: &str = "ss";

/// Prefix of the socket inode token in `ss -e` output.
pub const INODE_TOKEN_PREFIX: &str = "ino:";

/// Field index of the local address in `ss -tnpeH` output.
pub const LOCAL_ADDR_FIELD: usize = 3;

/// Field index of the peer address in `ss -tnpeH` output.
pub const PEER_ADDR_FIELD: usize = 4;

/// Separator used when rendering an endpoint pair.
pub const ENDPOINT_SEPARATOR: &str = " -> ";

/// Application name used in CLI output.
pub const APP_NAME: &str = "portreap";
