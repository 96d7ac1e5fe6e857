use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FALLBACK_ICON: &str = "icons/generic-resource.svg";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub node_radius: f32,
    pub arrowhead_size: f32,
    pub arrowhead_viewbox: String,
    pub primary_label_y_offset: f32,
    pub secondary_label_y_offset: f32,
    pub link_opacity: f32,
    pub link_hit_width: f32,
    pub link_curve_spacing: f32,
    pub reheat_alpha_target: f32,
    pub alpha_target: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub velocity_decay: f32,
    pub charge_strength: f32,
    pub theta: f32,
    pub link_distance: f32,
    pub center_strength: f32,
    pub position_strength: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub pin_on_release: bool,
    pub faded_opacity: f32,
    pub icons: BTreeMap<String, String>,
    pub fallback_icon: String,
    pub link_colors: BTreeMap<String, String>,
    pub default_link_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node_radius: 25.0,
            arrowhead_size: 10.0,
            arrowhead_viewbox: "0 -5 10 10".to_owned(),
            primary_label_y_offset: 40.0,
            secondary_label_y_offset: 55.0,
            link_opacity: 0.6,
            link_hit_width: 12.0,
            link_curve_spacing: 28.0,
            reheat_alpha_target: 0.3,
            alpha_target: 0.0,
            alpha_decay: 0.0228,
            alpha_min: -1.0,
            velocity_decay: 0.4,
            charge_strength: -600.0,
            theta: 0.9,
            link_distance: 150.0,
            center_strength: 1.0,
            position_strength: 0.05,
            viewport_width: 960.0,
            viewport_height: 640.0,
            pin_on_release: false,
            faded_opacity: 0.15,
            icons: BTreeMap::new(),
            fallback_icon: DEFAULT_FALLBACK_ICON.to_owned(),
            link_colors: BTreeMap::from([
                ("DependsOn".to_owned(), "#c2410c".to_owned()),
                ("Intrinsic Function".to_owned(), "#1d4ed8".to_owned()),
            ]),
            default_link_color: "#6b7280".to_owned(),
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid render config JSON")?;
        Ok(config.sanitized())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read render config {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("failed to parse render config {}", path.display()))
    }

    pub fn sanitized(mut self) -> Self {
        self.node_radius = finite_or(self.node_radius, 25.0).max(0.0);
        self.arrowhead_size = finite_or(self.arrowhead_size, 10.0).max(0.0);
        self.link_opacity = finite_or(self.link_opacity, 0.6).clamp(0.0, 1.0);
        self.link_hit_width = finite_or(self.link_hit_width, 12.0).max(0.0);
        self.link_curve_spacing = finite_or(self.link_curve_spacing, 28.0).max(0.0);
        self.faded_opacity = finite_or(self.faded_opacity, 0.15).clamp(0.0, 1.0);
        self.alpha_decay = finite_or(self.alpha_decay, 0.0228).clamp(0.0, 1.0);
        self.velocity_decay = finite_or(self.velocity_decay, 0.4).clamp(0.0, 1.0);
        self.theta = finite_or(self.theta, 0.9).max(0.05);
        self.link_distance = finite_or(self.link_distance, 150.0).max(0.0);
        self.viewport_width = finite_or(self.viewport_width, 960.0).max(1.0);
        self.viewport_height = finite_or(self.viewport_height, 640.0).max(1.0);
        self
    }

    pub fn link_color(&self, kind: &str) -> &str {
        self.link_colors
            .get(kind)
            .map(String::as_str)
            .unwrap_or(self.default_link_color.as_str())
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}
