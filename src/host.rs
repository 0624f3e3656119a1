//! Host collaborators
//!
//! The engine never owns the scene graph, the object manager or the rendering
//! front-end. The host hands them in as one value implementing [`SceneHost`].

use crate::error::{ApplyError, ImportError};
use crate::timeline::{Context, EsDescriptor, GraphCommand, MuxInfo, ObjectDescriptor, SceneSize};
use crate::types::OdId;

/// Opaque handle to a live media object owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u64);

/// Clock the graph should read scene time from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// Scene time follows the stream clock (default).
    Stream,
    /// Scene time is UTC wall-clock seconds since the epoch.
    WallClock,
}

impl TimeSource {
    /// Wall-clock reading in seconds with millisecond precision.
    pub fn wall_clock_seconds() -> f64 {
        chrono::Utc::now().timestamp_millis() as f64 / 1000.0
    }
}

/// Live graph and its command interpreter.
pub trait SceneGraph {
    /// Apply one command. Exactly-once: the engine never re-applies a success.
    fn apply_command(&mut self, command: &GraphCommand) -> Result<(), ApplyError>;

    /// Apply a command on behalf of a node event at `scene_time` seconds.
    fn apply_command_at(
        &mut self,
        command: &GraphCommand,
        _scene_time: f64,
    ) -> Result<(), ApplyError> {
        self.apply_command(command)
    }

    /// Drop all nodes (scene teardown).
    fn reset_graph(&mut self);

    fn set_scene_size(&mut self, size: SceneSize);

    fn set_time_source(&mut self, _source: TimeSource) {}
}

/// Object/session manager.
pub trait ObjectManager {
    fn find_object(&self, id: OdId) -> Option<ObjectHandle>;

    fn disconnect_object(&mut self, handle: ObjectHandle);

    /// Create and connect a new object for `od`.
    fn setup_object(&mut self, od: ObjectDescriptor) -> ObjectHandle;

    /// Import a text subtitle track into `ctx` as a new stream.
    fn import_subtitle(
        &mut self,
        _ctx: &mut Context,
        _esd: &EsDescriptor,
        _mux: &MuxInfo,
    ) -> Result<(), ImportError> {
        Err(ImportError::Unsupported)
    }
}

/// Rendering front-end.
pub trait Presentation {
    fn attach_to_presentation(&mut self, size: SceneSize);

    /// Report the total duration of the root timeline, in ms.
    fn set_duration(&mut self, _duration_ms: u64) {}
}

/// Everything the engine needs from its host.
pub trait SceneHost: SceneGraph + ObjectManager + Presentation {}

impl<T: SceneGraph + ObjectManager + Presentation> SceneHost for T {}
