use eframe::egui::epaint::QuadraticBezierShape;
use eframe::egui::{
    self, Align2, Color32, FontId, PointerButton, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2,
};

use stackviz::force_graph::{MAX_ZOOM, MIN_ZOOM};
use stackviz::geometry::{LinkGeometry, parallel_bend};
use stackviz::util::short_type;

use super::ViewerApp;
use super::render_utils::{
    circle_visible, draw_background, parse_color, resource_color, screen_to_world,
    world_to_screen,
};

const NODE_FILL: Color32 = Color32::from_rgb(30, 36, 44);
const LABEL_COLOR: Color32 = Color32::from_gray(238);
const TYPE_LABEL_COLOR: Color32 = Color32::from_gray(150);

impl ViewerApp {
    fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
        self.sync_zoom();
    }

    fn handle_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(PointerButton::Secondary) || response.dragged_by(PointerButton::Middle)
        {
            self.pan += response.drag_delta();
            self.sync_zoom();
        }
    }

    fn to_screen(&self, rect: Rect, position: Vec2) -> Pos2 {
        world_to_screen(rect, self.pan, self.zoom, position - self.graph_center())
    }

    fn hovered_node(&self, ui: &Ui, rect: Rect, radius: f32) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }
        let nodes = self.graph.model().nodes();
        self.graph
            .active_nodes()
            .iter()
            .filter_map(|&index| {
                let distance = self.to_screen(rect, nodes[index].position()).distance(pointer);
                (distance <= radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    fn handle_node_drag(&mut self, rect: Rect, response: &egui::Response, hovered: Option<usize>) {
        if response.drag_started_by(PointerButton::Primary)
            && let Some(index) = hovered
        {
            self.graph.drag_start(index);
            self.dragging = self.graph.dragging();
        }

        let Some(index) = self.dragging else {
            return;
        };
        if response.dragged_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let world = screen_to_world(rect, self.pan, self.zoom, pointer) + self.graph_center();
            self.graph.drag_move(index, world);
        }
        if response.drag_stopped() {
            self.graph.drag_end(index);
            self.dragging = None;
        }
    }

    fn handle_hover(&mut self, hovered: Option<usize>) {
        let hovered = self.dragging.or(hovered);
        if hovered == self.hovered {
            return;
        }
        match hovered {
            Some(index) => self.graph.focus_node(index),
            None => self.graph.clear_focus(),
        }
        self.hovered = hovered;
    }

    fn emphasis(&self, related: bool) -> f32 {
        if self.hovered.is_none() || related {
            1.0
        } else {
            self.graph.config().faded_opacity
        }
    }

    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);
        self.handle_zoom(ui, rect, &response);
        self.handle_pan(&response);

        let config = self.graph.config().clone();
        let radius = config.node_radius * self.zoom;
        let hovered = self.hovered_node(ui, rect, radius);
        self.handle_node_drag(rect, &response, hovered);
        self.handle_hover(hovered);

        if self.live_physics {
            self.graph.tick();
            ui.ctx().request_repaint();
        }

        if hovered.is_some() || self.dragging.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grab);
        }

        let focus_neighbors = self
            .hovered
            .map(|index| self.graph.model().neighbors(index))
            .unwrap_or_default();
        let model = self.graph.model();
        let nodes = model.nodes();

        for &link_index in self.graph.active_links() {
            let Some(link) = model.link(link_index) else {
                continue;
            };
            let geometry = LinkGeometry::between(
                nodes[link.source].position(),
                nodes[link.target].position(),
                config.node_radius,
                config.arrowhead_size,
                parallel_bend(link.parallel_rank, config.link_curve_spacing),
            );
            let start = self.to_screen(rect, geometry.start);
            let control = self.to_screen(rect, geometry.control);
            let end = self.to_screen(rect, geometry.end);

            let touches_focus = self
                .hovered
                .is_some_and(|focus| link.source == focus || link.target == focus);
            let opacity = config.link_opacity * self.emphasis(touches_focus);
            let color = parse_color(config.link_color(&link.kind)).gamma_multiply(opacity);
            let stroke = Stroke::new((1.5 * self.zoom.sqrt()).clamp(0.6, 3.4), color);

            if geometry.curved {
                painter.add(QuadraticBezierShape::from_points_stroke(
                    [start, control, end],
                    false,
                    Color32::TRANSPARENT,
                    stroke,
                ));
            } else {
                painter.line_segment([start, end], stroke);
            }

            let direction = (end - control).normalized();
            if direction != Vec2::ZERO {
                let size = config.arrowhead_size * self.zoom;
                let tip = end + direction * size;
                let side = direction.rot90() * (size * 0.5);
                painter.add(Shape::convex_polygon(
                    vec![tip, end + side, end - side],
                    color,
                    Stroke::NONE,
                ));
            }
        }

        let show_labels = self.zoom > 0.45;
        for &index in self.graph.active_nodes() {
            let node = &nodes[index];
            let position = self.to_screen(rect, node.position());
            if !circle_visible(rect, position, radius + 60.0 * self.zoom) {
                continue;
            }

            let related = self.hovered == Some(index) || focus_neighbors.contains(&index);
            let opacity = self.emphasis(related);
            let ring = resource_color(&node.kind).gamma_multiply(opacity);
            painter.circle_filled(position, radius, NODE_FILL.gamma_multiply(opacity));
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(if node.is_pinned() { 3.0 } else { 2.0 }, ring),
            );
            painter.text(
                position,
                Align2::CENTER_CENTER,
                short_type(&node.kind),
                FontId::proportional((10.0 * self.zoom).clamp(6.0, 18.0)),
                ring,
            );

            if show_labels {
                painter.text(
                    position + Vec2::new(0.0, config.primary_label_y_offset * self.zoom),
                    Align2::CENTER_BOTTOM,
                    node.name.as_str(),
                    FontId::proportional((12.0 * self.zoom).clamp(8.0, 20.0)),
                    LABEL_COLOR.gamma_multiply(opacity),
                );
                painter.text(
                    position + Vec2::new(0.0, config.secondary_label_y_offset * self.zoom),
                    Align2::CENTER_BOTTOM,
                    node.kind.as_str(),
                    FontId::proportional((10.0 * self.zoom).clamp(7.0, 16.0)),
                    TYPE_LABEL_COLOR.gamma_multiply(opacity),
                );
            }
        }

        if let Some(node) = self.hovered.and_then(|index| nodes.get(index)) {
            painter.text(
                rect.left_top() + Vec2::new(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{}  |  {}  |  {} neighbors",
                    node.name,
                    node.kind,
                    focus_neighbors.len()
                ),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}
