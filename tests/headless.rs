use std::fs;
use std::path::Path;

use stackviz::{FilterMode, ForceDirectedGraph, Graph, RenderConfig, load_graph};

fn fixture() -> Graph {
    load_graph(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/music_api.json"))
        .expect("fixture loads")
}

fn render(hidden: &[&str], show_all: bool) -> String {
    let hidden = hidden.iter().map(|kind| (*kind).to_owned()).collect::<Vec<_>>();
    let mut view =
        ForceDirectedGraph::headless(&fixture(), &hidden, RenderConfig::default()).expect("graph builds");
    if show_all {
        view.set_filter(FilterMode::All);
    }
    view.mount(800.0, 500.0);

    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("graph.svg");
    view.write_svg(120, &output).expect("svg written");
    fs::read_to_string(&output).expect("svg readable")
}

#[test]
fn writes_a_settled_svg_file() {
    let markup = render(&[], false);
    assert!(markup.starts_with("<svg "));
    assert!(markup.contains("width=\"800\""));
    assert!(markup.contains("height=\"500\""));
    assert!(!markup.contains("NaN"));
    assert_eq!(markup.matches("class=\"node\"").count(), 11);
    assert_eq!(markup.matches("class=\"link\"").count(), 19);
}

#[test]
fn hidden_types_are_left_out_of_the_file() {
    let markup = render(&["AWS::IAM::Role", "AWS::ApiGateway::Deployment"], false);
    assert_eq!(markup.matches("class=\"node\"").count(), 9);
    assert_eq!(markup.matches("class=\"link\"").count(), 12);
    assert!(!markup.contains(">AWS::IAM::Role<"));
}

#[test]
fn show_all_keeps_hidden_types_in_the_file() {
    let markup = render(&["AWS::IAM::Role", "AWS::ApiGateway::Deployment"], true);
    assert_eq!(markup.matches("class=\"node\"").count(), 11);
    assert_eq!(markup.matches("class=\"link\"").count(), 19);
    assert!(markup.contains(">AWS::IAM::Role<"));
}

#[test]
fn writing_before_mount_fails() {
    let mut view =
        ForceDirectedGraph::headless(&fixture(), &[], RenderConfig::default()).expect("graph builds");
    let dir = tempfile::tempdir().expect("temp dir");
    let error = view
        .write_svg(1, &dir.path().join("graph.svg"))
        .expect_err("nothing mounted");
    assert!(error.to_string().contains("no svg was mounted"));
}
