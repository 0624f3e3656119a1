//! Conditional node activation.
//!
//! A conditional node buffers graph commands and applies them to the graph it
//! lives in when activated. Hooks are attached per node instance.

use crate::error::ApplyError;
use crate::host::SceneGraph;
use crate::timeline::GraphCommand;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Node event hooks.
pub trait ActivationHooks {
    fn on_activate(&self, graph: &mut dyn SceneGraph, scene_time: f64) -> Result<(), ApplyError>;

    fn on_reverse_activate(
        &self,
        graph: &mut dyn SceneGraph,
        scene_time: f64,
    ) -> Result<(), ApplyError>;
}

/// Which event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Activate,
    ReverseActivate,
}

impl Activation {
    pub fn fire(
        self,
        hooks: &dyn ActivationHooks,
        graph: &mut dyn SceneGraph,
        scene_time: f64,
    ) -> Result<(), ApplyError> {
        match self {
            Activation::Activate => hooks.on_activate(graph, scene_time),
            Activation::ReverseActivate => hooks.on_reverse_activate(graph, scene_time),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionalNode {
    pub activate: bool,
    pub reverse_activate: bool,
    #[serde(default)]
    pub commands: Vec<GraphCommand>,
}

impl ConditionalNode {
    pub fn new(commands: Vec<GraphCommand>) -> Self {
        Self {
            commands,
            ..Default::default()
        }
    }

    fn apply_all(&self, graph: &mut dyn SceneGraph, scene_time: f64) -> Result<(), ApplyError> {
        debug!(commands = self.commands.len(), scene_time, "Conditional fired");
        for command in &self.commands {
            graph.apply_command_at(command, scene_time)?;
        }
        Ok(())
    }
}

impl ActivationHooks for ConditionalNode {
    fn on_activate(&self, graph: &mut dyn SceneGraph, scene_time: f64) -> Result<(), ApplyError> {
        if self.activate {
            self.apply_all(graph, scene_time)?;
        }
        Ok(())
    }

    fn on_reverse_activate(
        &self,
        graph: &mut dyn SceneGraph,
        scene_time: f64,
    ) -> Result<(), ApplyError> {
        if !self.reverse_activate {
            self.apply_all(graph, scene_time)?;
        }
        Ok(())
    }
}
