use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use eframe::egui::{self, Context, Vec2, vec2};
use tracing::info;

use stackviz::render::Document;
use stackviz::{FilterMode, ForceDirectedGraph, Phase, ZoomTransform};

mod render_utils;
mod view;

pub struct ViewerApp {
    graph: ForceDirectedGraph<Document>,
    source: PathBuf,
    export_path: String,
    status: Option<String>,
    pan: Vec2,
    zoom: f32,
    live_physics: bool,
    hovered: Option<usize>,
    dragging: Option<usize>,
}

impl ViewerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        graph: ForceDirectedGraph<Document>,
        source: PathBuf,
    ) -> Self {
        let export_path = source.with_extension("svg").display().to_string();
        Self {
            graph,
            source,
            export_path,
            status: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            live_physics: true,
            hovered: None,
            dragging: None,
        }
    }

    fn graph_center(&self) -> Vec2 {
        let config = self.graph.config();
        vec2(config.viewport_width * 0.5, config.viewport_height * 0.5)
    }

    fn sync_zoom(&mut self) {
        let center = self.graph_center();
        let offset = center + self.pan - center * self.zoom;
        self.graph.set_zoom(ZoomTransform {
            x: offset.x,
            y: offset.y,
            k: self.zoom,
        });
    }

    fn export_svg(&self, path: &Path) -> Result<()> {
        let markup = self
            .graph
            .svg_markup()
            .context("the graph has not been mounted")?;
        fs::write(path, markup).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "svg exported");
        Ok(())
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Resources");
        let mut filter = self.graph.filter();
        for mode in [FilterMode::PrimaryOnly, FilterMode::All] {
            ui.radio_value(&mut filter, mode, mode.label());
        }
        if filter != self.graph.filter() {
            self.hovered = None;
            self.graph.set_filter(filter);
        }

        ui.separator();
        ui.heading("Simulation");
        ui.checkbox(&mut self.live_physics, "Live physics");
        ui.horizontal(|ui| {
            if ui.button("Reheat").clicked() {
                self.graph.simulation_mut().reheat();
            }
            if ui.button("Reset view").clicked() {
                self.pan = Vec2::ZERO;
                self.zoom = 1.0;
                self.sync_zoom();
            }
        });
        let simulation = self.graph.simulation();
        let phase = match simulation.phase() {
            Phase::Hot => "hot",
            Phase::Cold => "cooling",
        };
        ui.label(format!("alpha {:.3} ({phase})", simulation.alpha()));
        ui.label(format!(
            "{} of {} nodes, {} of {} links",
            self.graph.active_nodes().len(),
            self.graph.model().nodes().len(),
            self.graph.active_links().len(),
            self.graph.model().links().len()
        ));

        ui.separator();
        ui.heading("Export");
        ui.text_edit_singleline(&mut self.export_path);
        if ui.button("Export SVG").clicked() {
            let path = PathBuf::from(self.export_path.trim());
            self.status = Some(match self.export_svg(&path) {
                Ok(()) => format!("wrote {}", path.display()),
                Err(error) => format!("{error:#}"),
            });
        }
        if let Some(status) = &self.status {
            ui.label(status.as_str());
        }

        if let Some(node) = self.hovered.and_then(|index| self.graph.model().node(index)) {
            ui.separator();
            ui.heading(node.name.as_str());
            ui.label(node.kind.as_str());
            if node.is_pinned() {
                ui.label("pinned");
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("stackviz");
                    ui.separator();
                    ui.label(self.source.display().to_string());
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }
}
