mod interaction;

use std::fs;
use std::path::Path;

use anyhow::Context as _;
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::graph::{FilterMode, Graph, GraphError, GraphModel};
use crate::physics::Simulation;
use crate::render::svg::{self, LinkElements, NodeElements, Scene};
use crate::render::{
    Document, ElementId, FilterButtons, IconMap, RenderTarget, draw_filter_radio_buttons,
};

pub use interaction::{MAX_ZOOM, MIN_ZOOM, ZoomTransform};

pub const SVG_ID: &str = "graph-svg";
pub const ZOOM_LAYER_ID: &str = "zoom-layer";
pub const LINKS_ID: &str = "links";
pub const NODES_ID: &str = "nodes";
pub const FILTER_GROUP_ID: &str = "filter-buttons";
pub const FILTER_PRIMARY_ID: &str = "filter-primary";
pub const FILTER_ALL_ID: &str = "filter-all";
pub const DEFAULT_ARROWHEAD_ID: &str = "arrowhead";

struct LinkLayer {
    container: ElementId,
    id: String,
    elements: Vec<LinkElements>,
}

struct NodeLayer {
    container: ElementId,
    id: String,
    icons: IconMap,
    draggable: bool,
    elements: Vec<NodeElements>,
}

#[derive(Default)]
struct ViewState {
    svg: Option<ElementId>,
    zoom_layer: Option<ElementId>,
    links: Option<LinkLayer>,
    nodes: Option<NodeLayer>,
    filter_buttons: Option<FilterButtons>,
    zoom: ZoomTransform,
}

pub struct ForceDirectedGraph<T: RenderTarget> {
    model: GraphModel,
    simulation: Simulation,
    config: RenderConfig,
    icons: IconMap,
    filter: FilterMode,
    active_nodes: Vec<usize>,
    active_links: Vec<usize>,
    dragging: Option<usize>,
    focus: Option<usize>,
    view: ViewState,
    target: T,
}

impl<T: RenderTarget> ForceDirectedGraph<T> {
    pub fn new(
        graph: &Graph,
        filtered_types: &[String],
        config: RenderConfig,
        target: T,
    ) -> Result<Self, GraphError> {
        let model = GraphModel::new(graph, filtered_types, &config)?;
        let simulation = Simulation::new(&config);
        let filter = FilterMode::default();
        let active_nodes = model.active_nodes(filter);
        let active_links = model.active_links(filter);

        info!(
            nodes = model.nodes().len(),
            links = model.links().len(),
            active_nodes = active_nodes.len(),
            active_links = active_links.len(),
            hidden_types = filtered_types.len(),
            "graph constructed"
        );

        Ok(Self {
            icons: IconMap::from_config(&config),
            model,
            simulation,
            config,
            filter,
            active_nodes,
            active_links,
            dragging: None,
            focus: None,
            view: ViewState::default(),
            target,
        })
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn active_nodes(&self) -> &[usize] {
        &self.active_nodes
    }

    pub fn active_links(&self) -> &[usize] {
        &self.active_links
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn constructed_links(&self) -> &[LinkElements] {
        self.view
            .links
            .as_ref()
            .map(|layer| layer.elements.as_slice())
            .unwrap_or(&[])
    }

    pub fn constructed_nodes(&self) -> &[NodeElements] {
        self.view
            .nodes
            .as_ref()
            .map(|layer| layer.elements.as_slice())
            .unwrap_or(&[])
    }

    pub fn construct_svg(&mut self, width: f32, height: f32, id: &str) -> ElementId {
        let svg = svg::construct_svg(&mut self.target, width, height, id);
        self.view.svg = Some(svg);
        svg
    }

    pub fn define_arrow_head(&mut self, svg: ElementId, id: &str) -> ElementId {
        svg::define_arrow_head(
            &mut self.target,
            &self.config,
            svg,
            id,
            &self.config.default_link_color,
        )
    }

    pub fn append_g_container_element(&mut self, parent: ElementId, id: Option<&str>) -> ElementId {
        svg::append_g_container_element(&mut self.target, parent, id)
    }

    pub fn construct_links(&mut self, container: ElementId, links: &[usize], id: &str) {
        let scene = Scene {
            model: &self.model,
            config: &self.config,
        };
        let elements = svg::construct_links(&mut self.target, scene, container, links, id);
        debug!(layer = id, links = elements.len(), "link layer constructed");
        self.view.links = Some(LinkLayer {
            container,
            id: id.to_owned(),
            elements,
        });
    }

    pub fn construct_nodes(
        &mut self,
        container: ElementId,
        nodes: &[usize],
        icons: &IconMap,
        draggable: bool,
        id: &str,
    ) {
        let scene = Scene {
            model: &self.model,
            config: &self.config,
        };
        let elements =
            svg::construct_nodes(&mut self.target, scene, container, nodes, icons, draggable, id);
        debug!(layer = id, nodes = elements.len(), "node layer constructed");
        self.view.nodes = Some(NodeLayer {
            container,
            id: id.to_owned(),
            icons: icons.clone(),
            draggable,
            elements,
        });
    }

    pub fn draw_filter_radio_buttons(
        &mut self,
        primary_id: &str,
        all_id: &str,
        group_id: &str,
    ) -> FilterButtons {
        let buttons =
            draw_filter_radio_buttons(&mut self.target, primary_id, all_id, group_id, self.filter);
        self.view.filter_buttons = Some(buttons);
        buttons
    }

    pub fn mount(&mut self, width: f32, height: f32) -> ElementId {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self.simulation.set_viewport(width, height);

        self.draw_filter_radio_buttons(FILTER_PRIMARY_ID, FILTER_ALL_ID, FILTER_GROUP_ID);
        let svg = self.construct_svg(width, height, SVG_ID);
        self.define_arrow_head(svg, DEFAULT_ARROWHEAD_ID);
        let kinds = self
            .model
            .link_kinds()
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        for (ordinal, kind) in kinds.iter().enumerate() {
            svg::define_arrow_head(
                &mut self.target,
                &self.config,
                svg,
                &svg::arrowhead_id(ordinal, kind),
                self.config.link_color(kind),
            );
        }

        let zoom_layer = self.append_g_container_element(svg, Some(ZOOM_LAYER_ID));
        self.view.zoom_layer = Some(zoom_layer);
        let links = self.active_links.clone();
        let nodes = self.active_nodes.clone();
        let icons = self.icons.clone();
        self.construct_links(zoom_layer, &links, LINKS_ID);
        self.construct_nodes(zoom_layer, &nodes, &icons, true, NODES_ID);
        self.apply_zoom();
        self.apply_focus();

        info!(
            width,
            height,
            nodes = nodes.len(),
            links = links.len(),
            arrowheads = kinds.len() + 1,
            "view mounted"
        );
        svg
    }

    pub fn tick(&mut self) {
        self.simulation
            .step(&mut self.model, &self.active_nodes, &self.active_links);
        self.ticked();
    }

    pub fn ticked(&mut self) {
        self.simulation.cool_if_reached();
        self.render_positions();
    }

    fn render_positions(&mut self) {
        let scene = Scene {
            model: &self.model,
            config: &self.config,
        };
        if let Some(layer) = &self.view.links {
            for elements in &layer.elements {
                svg::update_link(&mut self.target, scene, elements);
            }
        }
        if let Some(layer) = &self.view.nodes {
            for elements in &layer.elements {
                svg::update_node(&mut self.target, scene, elements);
            }
        }
    }

    fn refresh_active(&mut self) {
        self.active_nodes = self.model.active_nodes(self.filter);
        self.active_links = self.model.active_links(self.filter);
    }

    fn rebuild_layers(&mut self) {
        let links = self.active_links.clone();
        if let Some((container, id)) = self
            .view
            .links
            .as_ref()
            .map(|layer| (layer.container, layer.id.clone()))
        {
            self.construct_links(container, &links, &id);
        }

        let nodes = self.active_nodes.clone();
        if let Some((container, id, icons, draggable)) = self.view.nodes.as_ref().map(|layer| {
            (
                layer.container,
                layer.id.clone(),
                layer.icons.clone(),
                layer.draggable,
            )
        }) {
            self.construct_nodes(container, &nodes, &icons, draggable, &id);
        }
    }
}

impl ForceDirectedGraph<Document> {
    pub fn headless(
        graph: &Graph,
        filtered_types: &[String],
        config: RenderConfig,
    ) -> Result<Self, GraphError> {
        Self::new(graph, filtered_types, config, Document::new())
    }

    pub fn document(&self) -> &Document {
        &self.target
    }

    pub fn svg_markup(&self) -> Option<String> {
        self.view.svg.map(|svg| self.target.to_markup(svg))
    }

    pub fn write_svg(&mut self, ticks: usize, path: &Path) -> anyhow::Result<()> {
        for _ in 0..ticks {
            self.tick();
        }
        let markup = self.svg_markup().context("no svg was mounted")?;
        fs::write(path, markup).with_context(|| format!("failed to write {}", path.display()))?;
        info!(
            path = %path.display(),
            ticks,
            alpha = self.simulation.alpha(),
            "svg written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Link, Node};
    use crate::physics::Phase;

    fn graph() -> Graph {
        Graph {
            nodes: vec![
                Node::new("Api", "AWS::ApiGateway::RestApi"),
                Node::new("Role", "AWS::IAM::Role"),
                Node::new("Table", "AWS::DynamoDB::Table"),
            ],
            links: vec![
                Link::new("Api", "Role", "Intrinsic Function"),
                Link::new("Api", "Table", "DependsOn"),
            ],
        }
    }

    #[test]
    fn mount_builds_layers_in_draw_order() {
        let mut view = ForceDirectedGraph::headless(&graph(), &[], RenderConfig::default())
            .expect("graph builds");
        let svg = view.mount(800.0, 600.0);
        let document = view.document();

        let zoom = document.element_by_id(ZOOM_LAYER_ID).expect("zoom layer");
        let links = document.element_by_id(LINKS_ID).expect("links");
        let nodes = document.element_by_id(NODES_ID).expect("nodes");
        assert_eq!(document.children(zoom), &[links, nodes]);
        assert!(document.contains(svg, zoom));
        assert_eq!(document.descendants_by_tag(svg, "marker").len(), 3);
        assert_eq!(document.descendants_by_class(nodes, "node").len(), 3);
        assert_eq!(view.config().viewport_width, 800.0);
    }

    #[test]
    fn tick_moves_nodes_and_rewrites_transforms() {
        let mut view = ForceDirectedGraph::headless(&graph(), &[], RenderConfig::default())
            .expect("graph builds");
        view.mount(800.0, 600.0);
        let group = view.constructed_nodes()[0].group;
        let before = view.document().attribute(group, "transform").map(str::to_owned);
        for _ in 0..5 {
            view.tick();
        }
        let after = view.document().attribute(group, "transform").map(str::to_owned);
        assert_ne!(before, after);
        assert!(after.is_some_and(|value| value.starts_with("translate(")));
    }

    #[test]
    fn ticked_cools_once_the_reheat_target_is_reached() {
        let mut view = ForceDirectedGraph::headless(&graph(), &[], RenderConfig::default())
            .expect("graph builds");
        view.ticked();
        assert_eq!(view.simulation().phase(), Phase::Hot);

        let reheat = view.config().reheat_alpha_target;
        view.simulation_mut().set_alpha(reheat);
        view.ticked();
        assert_eq!(view.simulation().phase(), Phase::Cold);
        assert_eq!(view.simulation().alpha_target(), view.config().alpha_target);
    }

    #[test]
    fn markup_is_available_only_after_mount() {
        let mut view = ForceDirectedGraph::headless(&graph(), &[], RenderConfig::default())
            .expect("graph builds");
        assert!(view.svg_markup().is_none());
        view.mount(320.0, 200.0);
        let markup = view.svg_markup().expect("markup");
        assert!(markup.starts_with("<svg "));
        assert!(markup.contains("width=\"320\""));
        assert!(markup.contains("Api → Role (Intrinsic Function)"));
    }

    #[test]
    fn link_kinds_with_matching_slugs_get_their_own_markers() {
        let mut graph = graph();
        graph.links = vec![
            Link::new("Api", "Role", "Fn::GetAtt"),
            Link::new("Api", "Table", "Fn GetAtt"),
        ];
        let mut config = RenderConfig::default();
        config.link_colors.insert("Fn::GetAtt".to_owned(), "#111111".to_owned());
        config.link_colors.insert("Fn GetAtt".to_owned(), "#222222".to_owned());
        let mut view = ForceDirectedGraph::headless(&graph, &[], config).expect("graph builds");
        let svg = view.mount(800.0, 600.0);

        let document = view.document();
        assert_eq!(document.descendants_by_tag(svg, "marker").len(), 3);
        for elements in view.constructed_links() {
            let marker_end = document
                .attribute(elements.visible, "marker-end")
                .expect("links carry a marker");
            let marker_id = marker_end
                .trim_start_matches("url(#")
                .trim_end_matches(')');
            let marker = document.element_by_id(marker_id).expect("marker is defined");
            let arrow = document.children(marker)[0];
            assert_eq!(
                document.attribute(arrow, "fill"),
                document.attribute(elements.visible, "stroke")
            );
        }
    }
}
