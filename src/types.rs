//! Shared identifiers and time units.

/// External elementary stream identifier.
pub type StreamId = u16;

/// Object descriptor identifier.
pub type OdId = u16;

/// Stream time in milliseconds, as driven by the host clock.
pub type StreamTime = u32;

/// Stream time value that requests a seek back to the start of the addressed stream.
pub const SEEK_RESET: StreamTime = u32::MAX;

/// Time-scale used when a stream does not declare one (ticks per second).
pub const DEFAULT_TIME_SCALE: u32 = 1000;
