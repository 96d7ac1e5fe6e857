use eframe::egui::Vec2;
use tracing::{info, warn};

use crate::graph::FilterMode;
use crate::render::{ElementId, EventKind, RenderTarget, UiAction, sync_filter_buttons};
use crate::util::format_number;

use super::ForceDirectedGraph;

pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            k: 1.0,
        }
    }
}

impl ZoomTransform {
    pub fn to_attribute(self) -> String {
        format!(
            "translate({},{}) scale({})",
            format_number(self.x),
            format_number(self.y),
            format_number(self.k)
        )
    }
}

impl<T: RenderTarget> ForceDirectedGraph<T> {
    pub fn drag_start(&mut self, node: usize) {
        if !self.model.is_active(node, self.filter) {
            warn!(node, "drag start on a node that is not displayed");
            return;
        }
        if let Some(sim_node) = self.model.node_mut(node) {
            let position = sim_node.position();
            sim_node.pin(position);
        }
        self.dragging = Some(node);
        self.simulation.reheat();
    }

    pub fn drag_move(&mut self, node: usize, position: Vec2) {
        if self.dragging != Some(node) {
            return;
        }
        let Some(sim_node) = self.model.node_mut(node) else {
            warn!(node, "drag move on an unknown node");
            return;
        };
        sim_node.pin(position);
    }

    pub fn drag_end(&mut self, node: usize) {
        if self.dragging == Some(node) {
            self.dragging = None;
        }
        let pin_on_release = self.config.pin_on_release;
        let Some(sim_node) = self.model.node_mut(node) else {
            warn!(node, "drag end on an unknown node");
            return;
        };
        if !pin_on_release {
            sim_node.unpin();
        }
    }

    pub fn set_filter(&mut self, mode: FilterMode) {
        if mode == self.filter {
            return;
        }

        self.filter = mode;
        self.refresh_active();
        if self.focus.is_some_and(|index| !self.model.is_active(index, mode)) {
            self.focus = None;
        }
        if let Some(node) = self.dragging.filter(|&index| !self.model.is_active(index, mode)) {
            self.dragging = None;
            if let Some(sim_node) = self.model.node_mut(node) {
                sim_node.unpin();
            }
        }

        if let Some(buttons) = self.view.filter_buttons {
            sync_filter_buttons(&mut self.target, &buttons, mode);
        }
        self.rebuild_layers();
        self.apply_focus();
        self.simulation.reheat();

        info!(
            filter = mode.value(),
            nodes = self.active_nodes.len(),
            links = self.active_links.len(),
            "filter changed"
        );
    }

    pub fn toggle_filter(&mut self) {
        self.set_filter(self.filter.toggled());
    }

    pub fn dispatch(&mut self, element: ElementId, event: EventKind, pointer: Vec2) {
        for action in self.target.listeners(element, event) {
            match (action, event) {
                (UiAction::SetFilter(mode), EventKind::Change) => self.set_filter(mode),
                (UiAction::Drag(node), EventKind::PointerDown) => self.drag_start(node),
                (UiAction::Drag(node), EventKind::PointerMove) => self.drag_move(node, pointer),
                (UiAction::Drag(node), EventKind::PointerUp) => self.drag_end(node),
                (UiAction::Hover(node), EventKind::PointerEnter) => self.focus_node(node),
                (UiAction::Hover(_), EventKind::PointerLeave) => self.clear_focus(),
                _ => {}
            }
        }
    }

    pub fn focus_node(&mut self, node: usize) {
        if !self.model.is_active(node, self.filter) {
            warn!(node, "focus on a node that is not displayed");
            return;
        }
        self.focus = Some(node);
        self.apply_focus();
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
        self.apply_focus();
    }

    pub(super) fn apply_focus(&mut self) {
        let faded = format_number(self.config.faded_opacity);
        let neighbors = self.focus.map(|index| self.model.neighbors(index));
        let related = |index: usize| match (self.focus, &neighbors) {
            (Some(focus), Some(neighbors)) => index == focus || neighbors.contains(&index),
            _ => true,
        };

        if let Some(layer) = &self.view.nodes {
            for elements in &layer.elements {
                let opacity = if related(elements.node) { "1" } else { faded.as_str() };
                self.target.set_style(elements.group, "opacity", opacity);
            }
        }
        if let Some(layer) = &self.view.links {
            for elements in &layer.elements {
                let touches_focus = match (self.focus, self.model.link(elements.link)) {
                    (Some(focus), Some(link)) => link.source == focus || link.target == focus,
                    _ => true,
                };
                let opacity = if touches_focus { "1" } else { faded.as_str() };
                self.target.set_style(elements.group, "opacity", opacity);
            }
        }
    }

    pub fn zoom(&self) -> ZoomTransform {
        self.view.zoom
    }

    pub fn set_zoom(&mut self, transform: ZoomTransform) {
        let k = if transform.k.is_finite() {
            transform.k.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            1.0
        };
        self.view.zoom = ZoomTransform { k, ..transform };
        self.apply_zoom();
    }

    pub(super) fn apply_zoom(&mut self) {
        if let Some(layer) = self.view.zoom_layer {
            let transform = self.view.zoom.to_attribute();
            self.target.set_attribute(layer, "transform", &transform);
        }
    }
}
