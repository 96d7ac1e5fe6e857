use std::collections::{BTreeSet, HashMap, HashSet};
use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};

use crate::config::RenderConfig;

use super::{Endpoint, Graph, GraphError};

const INITIAL_RADIUS: f32 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    #[default]
    PrimaryOnly,
    All,
}

impl FilterMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::PrimaryOnly => "Primary resources",
            Self::All => "All resources",
        }
    }

    pub fn value(self) -> &'static str {
        match self {
            Self::PrimaryOnly => "primary",
            Self::All => "all",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::PrimaryOnly => Self::All,
            Self::All => Self::PrimaryOnly,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
    pub name: String,
    pub kind: String,
    pub secondary: bool,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub fx: Option<f32>,
    pub fy: Option<f32>,
}

impl SimNode {
    pub fn position(&self) -> Vec2 {
        vec2(self.x, self.y)
    }

    pub fn velocity(&self) -> Vec2 {
        vec2(self.vx, self.vy)
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }

    pub fn pin(&mut self, at: Vec2) {
        self.fx = Some(at.x);
        self.fy = Some(at.y);
    }

    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
    pub kind: String,
    pub parallel_rank: usize,
}

#[derive(Clone, Debug)]
pub struct GraphModel {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    index_by_name: HashMap<String, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl GraphModel {
    pub fn new(
        graph: &Graph,
        filtered_types: &[String],
        config: &RenderConfig,
    ) -> Result<Self, GraphError> {
        let secondary_types = filtered_types
            .iter()
            .map(String::as_str)
            .collect::<HashSet<_>>();
        let origin = vec2(config.viewport_width * 0.5, config.viewport_height * 0.5);

        let mut index_by_name = HashMap::with_capacity(graph.nodes.len());
        let mut nodes = Vec::with_capacity(graph.nodes.len());
        for (index, node) in graph.nodes.iter().enumerate() {
            if index_by_name.insert(node.name.clone(), index).is_some() {
                return Err(GraphError::DuplicateNode(node.name.clone()));
            }

            let position = origin + initial_offset(index);
            nodes.push(SimNode {
                name: node.name.clone(),
                kind: node.kind.clone(),
                secondary: secondary_types.contains(node.kind.as_str()),
                x: position.x,
                y: position.y,
                vx: 0.0,
                vy: 0.0,
                fx: None,
                fy: None,
            });
        }

        let mut links = Vec::with_capacity(graph.links.len());
        let mut pair_counts: HashMap<(usize, usize), usize> = HashMap::new();
        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for (link_index, link) in graph.links.iter().enumerate() {
            let resolve = |name: &str, endpoint| {
                index_by_name
                    .get(name)
                    .copied()
                    .ok_or_else(|| GraphError::UnknownEndpoint {
                        link: link_index,
                        endpoint,
                        name: name.to_owned(),
                    })
            };
            let source = resolve(&link.source, Endpoint::Source)?;
            let target = resolve(&link.target, Endpoint::Target)?;

            let pair = (source.min(target), source.max(target));
            let rank = pair_counts.entry(pair).or_insert(0);
            let parallel_rank = *rank;
            *rank += 1;

            outgoing[source].push(target);
            incoming[target].push(source);
            links.push(SimLink {
                source,
                target,
                kind: link.kind.clone(),
                parallel_rank,
            });
        }

        Ok(Self {
            nodes,
            links,
            index_by_name,
            outgoing,
            incoming,
        })
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&SimNode> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut SimNode> {
        self.nodes.get_mut(index)
    }

    pub fn links(&self) -> &[SimLink] {
        &self.links
    }

    pub fn link(&self, index: usize) -> Option<&SimLink> {
        self.links.get(index)
    }

    pub fn nodes_and_links_mut(&mut self) -> (&mut [SimNode], &[SimLink]) {
        (&mut self.nodes, &self.links)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    pub fn is_active(&self, index: usize, mode: FilterMode) -> bool {
        self.nodes
            .get(index)
            .is_some_and(|node| mode == FilterMode::All || !node.secondary)
    }

    pub fn active_nodes(&self, mode: FilterMode) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&index| self.is_active(index, mode))
            .collect()
    }

    pub fn active_links(&self, mode: FilterMode) -> Vec<usize> {
        self.links
            .iter()
            .enumerate()
            .filter(|(_, link)| self.is_active(link.source, mode) && self.is_active(link.target, mode))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn neighbors(&self, index: usize) -> BTreeSet<usize> {
        let mut neighbors = BTreeSet::new();
        if let Some(targets) = self.outgoing.get(index) {
            neighbors.extend(targets.iter().copied());
        }
        if let Some(sources) = self.incoming.get(index) {
            neighbors.extend(sources.iter().copied());
        }
        neighbors.remove(&index);
        neighbors
    }

    pub fn link_kinds(&self) -> BTreeSet<&str> {
        self.links.iter().map(|link| link.kind.as_str()).collect()
    }
}

fn initial_offset(index: usize) -> Vec2 {
    let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * PI * (3.0 - 5f32.sqrt());
    vec2(radius * angle.cos(), radius * angle.sin())
}
