//! Console host: a graph that only logs what it is asked to do.

use crate::error::ApplyError;
use crate::host::{ObjectHandle, ObjectManager, Presentation, SceneGraph, TimeSource};
use crate::timeline::{GraphCommand, ObjectDescriptor, SceneSize};
use crate::types::OdId;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Default)]
pub struct ConsoleHost {
    pub commands_applied: usize,
    pub objects_bound: usize,
    pub objects_disconnected: usize,
    pub attached: bool,
    pub duration_ms: Option<u64>,
    pub scene_size: SceneSize,
    objects: HashMap<OdId, ObjectHandle>,
    next_handle: u64,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }
}

impl SceneGraph for ConsoleHost {
    fn apply_command(&mut self, command: &GraphCommand) -> Result<(), ApplyError> {
        if command.op.is_empty() {
            return Err(ApplyError::Rejected {
                op: command.op.clone(),
                reason: "empty operation".to_string(),
            });
        }
        self.commands_applied += 1;
        info!(op = %command.op, args = %command.args, "apply");
        Ok(())
    }

    fn reset_graph(&mut self) {
        info!("graph reset");
        self.objects.clear();
    }

    fn set_scene_size(&mut self, size: SceneSize) {
        self.scene_size = size;
        info!(width = size.width, height = size.height, "scene size");
    }

    fn set_time_source(&mut self, source: TimeSource) {
        info!(source = ?source, "time source");
    }
}

impl ObjectManager for ConsoleHost {
    fn find_object(&self, id: OdId) -> Option<ObjectHandle> {
        self.objects.get(&id).copied()
    }

    fn disconnect_object(&mut self, handle: ObjectHandle) {
        self.objects.retain(|_, h| *h != handle);
        self.objects_disconnected += 1;
        info!(handle = handle.0, "object disconnected");
    }

    fn setup_object(&mut self, od: ObjectDescriptor) -> ObjectHandle {
        self.next_handle += 1;
        let handle = ObjectHandle(self.next_handle);
        info!(od_id = od.id, url = ?od.url, streams = od.es_descriptors.len(), "object bound");
        self.objects.insert(od.id, handle);
        self.objects_bound += 1;
        handle
    }
}

impl Presentation for ConsoleHost {
    fn attach_to_presentation(&mut self, size: SceneSize) {
        self.attached = true;
        info!(width = size.width, height = size.height, "attached to presentation");
    }

    fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = Some(duration_ms);
        info!(duration_ms, "duration");
    }
}
