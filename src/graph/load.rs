use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::Graph;

impl Graph {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).context("failed to parse graph JSON")?;
        if !value.is_object() {
            return Err(anyhow!("graph JSON must be an object with `nodes` and `links`"));
        }
        serde_json::from_value(value).context("graph JSON has an unexpected shape")
    }
}

pub fn load_graph(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph {}", path.display()))?;
    Graph::from_json_str(&json).with_context(|| format!("failed to load graph {}", path.display()))
}
