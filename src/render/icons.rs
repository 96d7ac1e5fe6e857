use std::collections::BTreeMap;

use crate::config::RenderConfig;
use crate::graph::split_resource_type;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IconMap {
    icons: BTreeMap<String, String>,
    fallback: String,
}

impl IconMap {
    pub fn new(icons: BTreeMap<String, String>, fallback: impl Into<String>) -> Self {
        Self {
            icons,
            fallback: fallback.into(),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.icons.clone(), config.fallback_icon.clone())
    }

    pub fn lookup(&self, kind: &str) -> &str {
        if let Some(icon) = self.icons.get(kind) {
            return icon;
        }

        let service = match split_resource_type(kind) {
            Some((namespace, service, _)) => Some(format!("{namespace}::{service}")),
            None => kind
                .rsplit_once("::")
                .map(|(prefix, _)| prefix.to_owned()),
        };
        service
            .and_then(|service| self.icons.get(&service))
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}
