//! Constants used by the adapter config.

/// Env value for [`Config::service`](crate::Config::service).
pub const REQSIGN_INTERCEPTOR_SERVICE: &str = "REQSIGN_INTERCEPTOR_SERVICE";
/// Env value for [`Config::time_offset`](crate::Config::time_offset).
pub const REQSIGN_INTERCEPTOR_TIME_OFFSET: &str = "REQSIGN_INTERCEPTOR_TIME_OFFSET";
/// Env value for [`Config::read_limit`](crate::Config::read_limit).
pub const REQSIGN_INTERCEPTOR_READ_LIMIT: &str = "REQSIGN_INTERCEPTOR_READ_LIMIT";

/// Bytes of a streamed body that can be replayed after a signer read them.
///
/// 128 KiB plus one byte, so a signer reading a full 128 KiB chunk can still
/// detect the end of stream and reset.
pub const DEFAULT_READ_LIMIT: usize = 128 * 1024 + 1;
