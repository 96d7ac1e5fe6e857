use std::path::Path;

use eframe::egui::vec2;
use stackviz::force_graph::{FILTER_ALL_ID, FILTER_PRIMARY_ID, LINKS_ID, NODES_ID};
use stackviz::render::{Document, EventKind, RenderTarget};
use stackviz::{
    FilterMode, ForceDirectedGraph, Graph, GraphError, Link, Phase, RenderConfig, load_graph,
};

const HIDDEN: [&str; 2] = ["AWS::IAM::Role", "AWS::ApiGateway::Deployment"];

fn fixture() -> Graph {
    load_graph(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/music_api.json"))
        .expect("fixture loads")
}

fn mounted(config: RenderConfig) -> ForceDirectedGraph<Document> {
    let hidden = HIDDEN.iter().map(|kind| (*kind).to_owned()).collect::<Vec<_>>();
    let mut view = ForceDirectedGraph::headless(&fixture(), &hidden, config).expect("graph builds");
    view.mount(960.0, 640.0);
    view
}

fn layer_len(view: &ForceDirectedGraph<Document>, id: &str) -> usize {
    let document = view.document();
    let layer = document.element_by_id(id).expect("layer exists");
    document.children(layer).len()
}

fn cool_down(view: &mut ForceDirectedGraph<Document>) {
    let reheat = view.config().reheat_alpha_target;
    view.simulation_mut().set_alpha(reheat);
    view.ticked();
    assert_eq!(view.simulation().phase(), Phase::Cold);
}

#[test]
fn primary_filter_hides_secondary_nodes_and_their_links() {
    let view = mounted(RenderConfig::default());
    assert_eq!(layer_len(&view, NODES_ID), 9);
    assert_eq!(layer_len(&view, LINKS_ID), 12);
}

#[test]
fn toggling_the_filter_rebuilds_layers_and_syncs_the_radios() {
    let mut view = mounted(RenderConfig::default());
    cool_down(&mut view);

    view.toggle_filter();
    assert_eq!(view.filter(), FilterMode::All);
    assert_eq!(layer_len(&view, NODES_ID), 11);
    assert_eq!(layer_len(&view, LINKS_ID), 19);
    assert_eq!(view.simulation().phase(), Phase::Hot);
    assert_eq!(
        view.simulation().alpha_target(),
        view.config().reheat_alpha_target
    );

    let document = view.document();
    let primary = document.element_by_id(FILTER_PRIMARY_ID).expect("primary radio");
    let all = document.element_by_id(FILTER_ALL_ID).expect("all radio");
    assert!(document.attribute(primary, "checked").is_none());
    assert!(document.attribute(all, "checked").is_some());

    view.toggle_filter();
    let document = view.document();
    let primary = document.element_by_id(FILTER_PRIMARY_ID).expect("primary radio");
    let all = document.element_by_id(FILTER_ALL_ID).expect("all radio");
    assert!(document.attribute(primary, "checked").is_some());
    assert!(document.attribute(all, "checked").is_none());
    assert_eq!(layer_len(&view, NODES_ID), 9);
}

#[test]
fn radio_change_event_switches_the_filter() {
    let mut view = mounted(RenderConfig::default());
    let all = view
        .document()
        .element_by_id(FILTER_ALL_ID)
        .expect("all radio");
    view.dispatch(all, EventKind::Change, vec2(0.0, 0.0));
    assert_eq!(view.filter(), FilterMode::All);
}

#[test]
fn dragged_node_follows_the_pointer_through_ticks() {
    let mut view = mounted(RenderConfig::default());
    let api = view.model().index_of("Api").expect("api node");
    cool_down(&mut view);

    view.drag_start(api);
    assert_eq!(view.simulation().phase(), Phase::Hot);
    view.drag_move(api, vec2(100.0, 120.0));
    for _ in 0..10 {
        view.tick();
    }
    let node = &view.model().nodes()[api];
    assert_eq!((node.x, node.y), (100.0, 120.0));

    let group = view
        .constructed_nodes()
        .iter()
        .find(|elements| elements.node == api)
        .map(|elements| elements.group)
        .expect("api is rendered");
    assert_eq!(
        view.document().attribute(group, "transform"),
        Some("translate(100.00,120.00)")
    );

    view.drag_end(api);
    assert!(!view.model().nodes()[api].is_pinned());
}

#[test]
fn simulation_reheats_then_cools_on_its_own() {
    let mut view = mounted(RenderConfig::default());
    let mut cooled_at = None;
    for tick in 0..2_000 {
        view.tick();
        if view.simulation().phase() == Phase::Cold {
            cooled_at = Some(tick);
            break;
        }
    }
    assert!(cooled_at.is_some(), "alpha never reached the reheat target");

    view.toggle_filter();
    assert_eq!(view.simulation().phase(), Phase::Hot);
}

#[test]
fn dragging_restarts_a_simulation_that_stopped_itself() {
    let mut view = mounted(RenderConfig {
        alpha_min: 0.001,
        ..RenderConfig::default()
    });
    for _ in 0..2_000 {
        view.tick();
    }
    assert!(!view.simulation().is_running());
    let stopped = view.simulation().alpha();

    let api = view.model().index_of("Api").expect("api node");
    view.drag_start(api);
    for _ in 0..50 {
        view.tick();
    }
    assert!(view.simulation().is_running());
    assert!(view.simulation().alpha() > stopped);
}

#[test]
fn link_to_unknown_node_fails_construction() {
    let mut graph = fixture();
    graph.links.push(Link::new("Api", "LambdaFunction", "DependsOn"));
    let error = ForceDirectedGraph::headless(&graph, &[], RenderConfig::default())
        .err()
        .expect("construction fails");
    assert!(matches!(error, GraphError::UnknownEndpoint { link: 19, .. }));
    assert!(error.to_string().contains("LambdaFunction"));
}
