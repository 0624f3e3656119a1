//! scene-replay: Timed Scene Update Playback
//!
//! Replays time-stamped graph mutation commands, grouped into per-stream
//! timelines, against a host-owned scene graph in lock-step with an external
//! stream clock. Supports seek to start, rewind to the nearest random-access
//! point, progressive ingestion and pruning of applied root history.

pub mod cli;
pub mod conditional;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod ingest;
pub mod logging;
pub mod replay;
pub mod timeline;
pub mod types;

pub use engine::{Engine, TickStatus};
pub use error::{ApplyError, EngineError, ParseError};
pub use host::{ObjectHandle, SceneHost};
pub use ingest::{LoadPhase, SceneLoader, SourceDescriptor};
pub use types::{StreamId, StreamTime, SEEK_RESET};
