//! The immutable table of callable tools.

use crate::error::GatewayError;
use crate::Result;
use mapgate_core::types::ToolDefinition;
use mapgate_tools::Tool;
use std::collections::HashMap;
use std::sync::Arc;

/// Tools in discovery order, indexed by name.
///
/// Built once at startup and shared read-only by every session.
pub struct ToolCatalog {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Build a catalog. Two tools sharing a name is a configuration error.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self> {
        let mut index = HashMap::with_capacity(tools.len());
        for (position, tool) in tools.iter().enumerate() {
            if index.insert(tool.name().to_string(), position).is_some() {
                return Err(GatewayError::Configuration(format!(
                    "Duplicate tool name: {}",
                    tool.name()
                )));
            }
        }
        Ok(Self { tools, index })
    }

    /// All tools in discovery order.
    pub fn list(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Look up a tool by name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| self.tools[i].clone())
    }

    /// Discovery metadata for every tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.list().iter().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
