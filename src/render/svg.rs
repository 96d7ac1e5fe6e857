use crate::config::RenderConfig;
use crate::geometry::{LinkGeometry, parallel_bend};
use crate::graph::GraphModel;
use crate::util::{format_number, hex_color, slug, type_color};

use super::{ElementId, EventKind, IconMap, RenderTarget, UiAction};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const DEPENDS_ON: &str = "DependsOn";

const LINK_STROKE_WIDTH: &str = "1.5";
const DEPENDS_ON_DASH: &str = "6 4";
const RING_STROKE_WIDTH: &str = "2";

#[derive(Clone, Copy)]
pub struct Scene<'a> {
    pub model: &'a GraphModel,
    pub config: &'a RenderConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkElements {
    pub link: usize,
    pub group: ElementId,
    pub visible: ElementId,
    pub hit: ElementId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeElements {
    pub node: usize,
    pub group: ElementId,
}

pub fn arrowhead_id(ordinal: usize, kind: &str) -> String {
    format!("arrowhead-{ordinal}-{}", slug(kind))
}

pub fn construct_svg<T: RenderTarget>(target: &mut T, width: f32, height: f32, id: &str) -> ElementId {
    let svg = match target.element_by_id(id) {
        Some(existing) => existing,
        None => {
            let svg = target.create_element("svg");
            target.set_attribute(svg, "id", id);
            target.set_attribute(svg, "xmlns", SVG_NAMESPACE);
            let body = target.body();
            target.append_child(body, svg);
            svg
        }
    };
    target.set_attribute(svg, "width", &format_number(width));
    target.set_attribute(svg, "height", &format_number(height));
    svg
}

pub fn define_arrow_head<T: RenderTarget>(
    target: &mut T,
    config: &RenderConfig,
    svg: ElementId,
    id: &str,
    color: &str,
) -> ElementId {
    if let Some(existing) = target.element_by_id(id) {
        return existing;
    }

    let defs_id = defs_id(target, svg);
    let defs = match target.element_by_id(&defs_id) {
        Some(defs) => defs,
        None => {
            let defs = target.create_element("defs");
            target.set_attribute(defs, "id", &defs_id);
            target.append_child(svg, defs);
            defs
        }
    };

    let size = format_number(config.arrowhead_size);
    let marker = target.create_element("marker");
    target.set_attribute(marker, "id", id);
    target.set_attribute(marker, "viewBox", &config.arrowhead_viewbox);
    target.set_attribute(marker, "refX", "0");
    target.set_attribute(marker, "refY", "0");
    target.set_attribute(marker, "markerWidth", &size);
    target.set_attribute(marker, "markerHeight", &size);
    target.set_attribute(marker, "markerUnits", "userSpaceOnUse");
    target.set_attribute(marker, "orient", "auto");
    target.append_child(defs, marker);

    let arrow = target.create_element("path");
    target.set_attribute(arrow, "d", "M0,-5L10,0L0,5");
    target.set_attribute(arrow, "fill", color);
    target.set_style(arrow, "opacity", &format_number(config.link_opacity));
    target.append_child(marker, arrow);

    marker
}

fn defs_id<T: RenderTarget>(target: &T, svg: ElementId) -> String {
    match target.attribute(svg, "id") {
        Some(svg_id) => format!("{svg_id}-defs"),
        None => "defs".to_owned(),
    }
}

pub fn append_g_container_element<T: RenderTarget>(
    target: &mut T,
    parent: ElementId,
    id: Option<&str>,
) -> ElementId {
    if let Some(existing) = id.and_then(|id| target.element_by_id(id)) {
        return existing;
    }

    let group = target.create_element("g");
    if let Some(id) = id {
        target.set_attribute(group, "id", id);
    }
    target.append_child(parent, group);
    group
}

fn cleared_layer<T: RenderTarget>(target: &mut T, container: ElementId, id: &str) -> ElementId {
    let layer = append_g_container_element(target, container, Some(id));
    target.remove_children(layer);
    layer
}

pub fn construct_links<T: RenderTarget>(
    target: &mut T,
    scene: Scene<'_>,
    container: ElementId,
    links: &[usize],
    id: &str,
) -> Vec<LinkElements> {
    let layer = cleared_layer(target, container, id);
    let opacity = format_number(scene.config.link_opacity);
    let hit_width = format_number(scene.config.link_hit_width);
    let kinds = scene.model.link_kinds();

    let mut constructed = Vec::with_capacity(links.len());
    for &index in links {
        let Some(link) = scene.model.link(index) else {
            continue;
        };
        let (Some(source), Some(target_node)) =
            (scene.model.node(link.source), scene.model.node(link.target))
        else {
            continue;
        };

        let group = target.create_element("g");
        target.set_attribute(group, "class", "link");
        target.set_attribute(group, "data-link", &index.to_string());
        target.set_attribute(group, "data-type", &link.kind);
        target.append_child(layer, group);

        let color = scene.config.link_color(&link.kind);
        let visible = target.create_element("path");
        target.set_attribute(visible, "class", "link-path");
        target.set_attribute(visible, "fill", "none");
        target.set_attribute(visible, "stroke", color);
        target.set_attribute(visible, "stroke-width", LINK_STROKE_WIDTH);
        if link.kind == DEPENDS_ON {
            target.set_attribute(visible, "stroke-dasharray", DEPENDS_ON_DASH);
        }
        let ordinal = kinds
            .iter()
            .position(|kind| *kind == link.kind)
            .unwrap_or_default();
        target.set_attribute(
            visible,
            "marker-end",
            &format!("url(#{})", arrowhead_id(ordinal, &link.kind)),
        );
        target.set_style(visible, "stroke-opacity", &opacity);
        target.append_child(group, visible);

        let hit = target.create_element("path");
        target.set_attribute(hit, "class", "link-hit");
        target.set_attribute(hit, "fill", "none");
        target.set_attribute(hit, "stroke", color);
        target.set_attribute(hit, "stroke-width", &hit_width);
        target.set_style(hit, "stroke-opacity", "0");
        target.append_child(group, hit);

        let title = target.create_element("title");
        target.set_text(
            title,
            &format!("{} → {} ({})", source.name, target_node.name, link.kind),
        );
        target.append_child(hit, title);

        let elements = LinkElements {
            link: index,
            group,
            visible,
            hit,
        };
        update_link(target, scene, &elements);
        constructed.push(elements);
    }
    constructed
}

pub fn construct_nodes<T: RenderTarget>(
    target: &mut T,
    scene: Scene<'_>,
    container: ElementId,
    nodes: &[usize],
    icons: &IconMap,
    draggable: bool,
    id: &str,
) -> Vec<NodeElements> {
    let layer = cleared_layer(target, container, id);
    let radius = format_number(scene.config.node_radius);
    let diameter = format_number(scene.config.node_radius * 2.0);
    let corner = format_number(-scene.config.node_radius);

    let mut constructed = Vec::with_capacity(nodes.len());
    for &index in nodes {
        let Some(node) = scene.model.node(index) else {
            continue;
        };

        let group = target.create_element("g");
        target.set_attribute(group, "class", "node");
        target.set_attribute(group, "data-node", &index.to_string());
        target.append_child(layer, group);

        let clip_id = format!("{id}-clip-{index}");
        let clip = target.create_element("clipPath");
        target.set_attribute(clip, "id", &clip_id);
        let clip_circle = target.create_element("circle");
        target.set_attribute(clip_circle, "r", &radius);
        target.set_attribute(clip_circle, "cx", "0");
        target.set_attribute(clip_circle, "cy", "0");
        target.append_child(clip, clip_circle);
        target.append_child(group, clip);

        let ring = target.create_element("circle");
        target.set_attribute(ring, "class", "node-ring");
        target.set_attribute(ring, "r", &radius);
        target.set_attribute(ring, "fill", "#ffffff");
        target.set_attribute(ring, "stroke", &hex_color(type_color(&node.kind)));
        target.set_attribute(ring, "stroke-width", RING_STROKE_WIDTH);
        target.append_child(group, ring);

        let image = target.create_element("image");
        target.set_attribute(image, "href", icons.lookup(&node.kind));
        target.set_attribute(image, "x", &corner);
        target.set_attribute(image, "y", &corner);
        target.set_attribute(image, "width", &diameter);
        target.set_attribute(image, "height", &diameter);
        target.set_attribute(image, "preserveAspectRatio", "xMidYMid slice");
        target.set_attribute(image, "clip-path", &format!("url(#{clip_id})"));
        target.append_child(group, image);

        let primary = target.create_element("text");
        target.set_attribute(primary, "class", "node-label");
        target.set_attribute(primary, "text-anchor", "middle");
        target.set_attribute(
            primary,
            "dy",
            &format_number(scene.config.primary_label_y_offset),
        );
        target.set_text(primary, &node.name);
        target.append_child(group, primary);

        let secondary = target.create_element("text");
        target.set_attribute(secondary, "class", "node-type");
        target.set_attribute(secondary, "text-anchor", "middle");
        target.set_attribute(
            secondary,
            "dy",
            &format_number(scene.config.secondary_label_y_offset),
        );
        target.set_text(secondary, &node.kind);
        target.append_child(group, secondary);

        let title = target.create_element("title");
        target.set_text(title, &node.name);
        target.append_child(group, title);

        if draggable {
            target.set_style(group, "cursor", "grab");
            for event in [EventKind::PointerDown, EventKind::PointerMove, EventKind::PointerUp] {
                target.add_listener(group, event, UiAction::Drag(index));
            }
        }
        for event in [EventKind::PointerEnter, EventKind::PointerLeave] {
            target.add_listener(group, event, UiAction::Hover(index));
        }

        let elements = NodeElements { node: index, group };
        update_node(target, scene, &elements);
        constructed.push(elements);
    }
    constructed
}

pub fn update_link<T: RenderTarget>(target: &mut T, scene: Scene<'_>, elements: &LinkElements) {
    let Some(link) = scene.model.link(elements.link) else {
        return;
    };
    let (Some(source), Some(target_node)) =
        (scene.model.node(link.source), scene.model.node(link.target))
    else {
        return;
    };

    let bend = parallel_bend(link.parallel_rank, scene.config.link_curve_spacing);
    let path = LinkGeometry::between(
        source.position(),
        target_node.position(),
        scene.config.node_radius,
        scene.config.arrowhead_size,
        bend,
    )
    .to_path();
    target.set_attribute(elements.visible, "d", &path);
    target.set_attribute(elements.hit, "d", &path);
}

pub fn update_node<T: RenderTarget>(target: &mut T, scene: Scene<'_>, elements: &NodeElements) {
    let Some(node) = scene.model.node(elements.node) else {
        return;
    };
    target.set_attribute(
        elements.group,
        "transform",
        &format!("translate({:.2},{:.2})", node.x, node.y),
    );
}
