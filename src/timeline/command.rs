//! Commands carried by access units.

use crate::timeline::descriptor::ObjectDescriptor;
use crate::types::OdId;
use serde::{Deserialize, Serialize};

/// Opaque graph mutation, interpreted by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphCommand {
    pub op: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

impl GraphCommand {
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            args: serde_json::Value::Null,
        }
    }

    pub fn with_args(mut self, args: serde_json::Value) -> Self {
        self.args = args;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "snake_case")]
pub enum Command {
    GraphMutation(GraphCommand),
    ObjectDescriptorUpdate(Vec<ObjectDescriptor>),
    ObjectDescriptorRemove(Vec<OdId>),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::GraphMutation(_) => "graph_mutation",
            Command::ObjectDescriptorUpdate(_) => "od_update",
            Command::ObjectDescriptorRemove(_) => "od_remove",
        }
    }

    pub fn is_graph_mutation(&self) -> bool {
        matches!(self, Command::GraphMutation(_))
    }
}

impl From<GraphCommand> for Command {
    fn from(cmd: GraphCommand) -> Self {
        Command::GraphMutation(cmd)
    }
}
