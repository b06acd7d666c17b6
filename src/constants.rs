// -
// Observe option values

/// Observe option value of a registration request
pub const OBSERVE_REGISTER: u32 = 0;
/// Observe option value of a deregistration request
pub const OBSERVE_CANCEL: u32 = 1;

/// Observe sequence numbers are 24 bit wide
pub(crate) const OBSERVE_SEQUENCE_BITS: u32 = 24;
pub(crate) const OBSERVE_SEQUENCE_MASK: u32 = (1 << OBSERVE_SEQUENCE_BITS) - 1;
/// Half of the sequence number space, 2^23
pub(crate) const OBSERVE_SEQUENCE_HALF: u32 = 1 << (OBSERVE_SEQUENCE_BITS - 1);

/// A notification older than this is no longer trusted for ordering
pub(crate) const NOTIFICATION_FRESHNESS_WINDOW_NANOS: u64 = 128 * 1_000_000_000;

// -
// Config defaults

pub(crate) const DEFAULT_NOTIFICATION_CHECK_INTERVAL_TIME_IN_MS: u64 = 24 * 60 * 60 * 1000;
pub(crate) const DEFAULT_NOTIFICATION_CHECK_INTERVAL_COUNT: u32 = 100;
pub(crate) const DEFAULT_MAX_SERVER_OBSERVES: usize = 50_000;

/// Environment variable prefix for settings overrides
pub(crate) const CONFIG_ENV_PREFIX: &str = "OBSERVE";
