use eframe::egui::{Vec2, vec2};

use crate::graph::{SimLink, SimNode};

use super::quadtree::ChargeTree;

const DISTANCE_MIN_SQ: f32 = 1.0;
const JIGGLE: f32 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct ManyBodyForce {
    pub strength: f32,
    pub theta: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CenterForce {
    pub x: f32,
    pub y: f32,
    pub strength: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PositionForce {
    pub target: f32,
    pub strength: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkForce {
    pub distance: f32,
    pub iterations: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Force {
    ManyBody(ManyBodyForce),
    Center(CenterForce),
    X(PositionForce),
    Y(PositionForce),
    Link(LinkForce),
}

#[derive(Default)]
pub(super) struct ForceScratch {
    positions: Vec<Vec2>,
    degree: Vec<usize>,
}

pub(super) struct ForceInput<'a> {
    pub(super) nodes: &'a mut [SimNode],
    pub(super) links: &'a [SimLink],
    pub(super) active_nodes: &'a [usize],
    pub(super) active_links: &'a [usize],
    pub(super) alpha: f32,
}

impl Force {
    pub(super) fn apply(&self, input: &mut ForceInput<'_>, scratch: &mut ForceScratch) {
        match self {
            Self::ManyBody(force) => force.apply(input, scratch),
            Self::Center(force) => force.apply(input),
            Self::X(force) => {
                for &index in input.active_nodes {
                    let node = &mut input.nodes[index];
                    node.vx += (force.target - node.x) * force.strength * input.alpha;
                }
            }
            Self::Y(force) => {
                for &index in input.active_nodes {
                    let node = &mut input.nodes[index];
                    node.vy += (force.target - node.y) * force.strength * input.alpha;
                }
            }
            Self::Link(force) => force.apply(input, scratch),
        }
    }
}

fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * JIGGLE
}

impl ManyBodyForce {
    fn apply(&self, input: &mut ForceInput<'_>, scratch: &mut ForceScratch) {
        if input.active_nodes.len() < 2 {
            return;
        }

        scratch.positions.clear();
        scratch
            .positions
            .extend(input.active_nodes.iter().map(|&index| input.nodes[index].position()));
        let point_charge = self.strength * input.alpha;
        let Some(tree) = ChargeTree::build(&scratch.positions, point_charge) else {
            return;
        };

        let field = ChargeField {
            tree: &tree,
            positions: &scratch.positions,
            point_charge,
            theta_sq: self.theta * self.theta,
        };
        for (local, &index) in input.active_nodes.iter().enumerate() {
            let velocity = field.velocity_at(tree.root(), local);
            let node = &mut input.nodes[index];
            node.vx += velocity.x;
            node.vy += velocity.y;
        }
    }
}

fn charge_between(delta: Vec2, charge: f32) -> Vec2 {
    let mut distance_sq = delta.length_sq();
    if distance_sq < DISTANCE_MIN_SQ {
        distance_sq = (DISTANCE_MIN_SQ * distance_sq).sqrt();
    }
    delta * (charge / distance_sq)
}

struct ChargeField<'a> {
    tree: &'a ChargeTree,
    positions: &'a [Vec2],
    point_charge: f32,
    theta_sq: f32,
}

impl ChargeField<'_> {
    fn velocity_at(&self, cell_index: usize, local: usize) -> Vec2 {
        let cell = self.tree.cell(cell_index);
        if cell.charge == 0.0 {
            return Vec2::ZERO;
        }

        let point = self.positions[local];
        let delta = cell.centroid - point;
        if cell.is_distant(delta.length_sq(), self.theta_sq) {
            return charge_between(delta, cell.charge);
        }

        if !cell.is_leaf() {
            return cell
                .children
                .iter()
                .flatten()
                .fold(Vec2::ZERO, |sum, &child| sum + self.velocity_at(child, local));
        }

        cell.members
            .iter()
            .filter(|&&other| other != local)
            .fold(Vec2::ZERO, |sum, &other| {
                let mut delta = self.positions[other] - point;
                if delta.length_sq() <= 0.0 {
                    delta = jiggle(local, other);
                }
                sum + charge_between(delta, self.point_charge)
            })
    }
}

impl CenterForce {
    fn apply(&self, input: &mut ForceInput<'_>) {
        if input.active_nodes.is_empty() {
            return;
        }

        let mut mean = Vec2::ZERO;
        for &index in input.active_nodes {
            mean += input.nodes[index].position();
        }
        mean /= input.active_nodes.len() as f32;

        let shift = (mean - vec2(self.x, self.y)) * self.strength;
        for &index in input.active_nodes {
            let node = &mut input.nodes[index];
            node.x -= shift.x;
            node.y -= shift.y;
        }
    }
}

impl LinkForce {
    fn apply(&self, input: &mut ForceInput<'_>, scratch: &mut ForceScratch) {
        scratch.degree.clear();
        scratch.degree.resize(input.nodes.len(), 0);
        for &link_index in input.active_links {
            let link = &input.links[link_index];
            scratch.degree[link.source] += 1;
            scratch.degree[link.target] += 1;
        }

        for _ in 0..self.iterations.max(1) {
            for &link_index in input.active_links {
                let link = &input.links[link_index];
                let (source, target) = (link.source, link.target);
                if source == target {
                    continue;
                }

                let source_degree = scratch.degree[source] as f32;
                let target_degree = scratch.degree[target] as f32;
                let strength = 1.0 / source_degree.min(target_degree);
                let bias = source_degree / (source_degree + target_degree);

                let source_node = &input.nodes[source];
                let target_node = &input.nodes[target];
                let mut delta = (target_node.position() + target_node.velocity())
                    - (source_node.position() + source_node.velocity());
                if delta.length_sq() <= 0.0 {
                    delta = jiggle(source, target);
                }

                let length = delta.length();
                let correction = delta * ((length - self.distance) / length * input.alpha * strength);

                let target_node = &mut input.nodes[target];
                target_node.vx -= correction.x * bias;
                target_node.vy -= correction.y * bias;
                let source_node = &mut input.nodes[source];
                source_node.vx += correction.x * (1.0 - bias);
                source_node.vy += correction.y * (1.0 - bias);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(x: f32, y: f32) -> SimNode {
        SimNode {
            name: format!("{x},{y}"),
            kind: "AWS::S3::Bucket".to_owned(),
            secondary: false,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
        }
    }

    fn link(source: usize, target: usize) -> SimLink {
        SimLink {
            source,
            target,
            kind: "DependsOn".to_owned(),
            parallel_rank: 0,
        }
    }

    fn apply(force: Force, nodes: &mut [SimNode], links: &[SimLink]) {
        let active_nodes = (0..nodes.len()).collect::<Vec<_>>();
        let active_links = (0..links.len()).collect::<Vec<_>>();
        let mut input = ForceInput {
            nodes,
            links,
            active_nodes: &active_nodes,
            active_links: &active_links,
            alpha: 1.0,
        };
        force.apply(&mut input, &mut ForceScratch::default());
    }

    #[test]
    fn charge_pushes_pairs_apart() {
        let mut nodes = vec![node(0.0, 0.0), node(10.0, 0.0)];
        apply(
            Force::ManyBody(ManyBodyForce {
                strength: -30.0,
                theta: 0.9,
            }),
            &mut nodes,
            &[],
        );
        assert!(nodes[0].vx < 0.0);
        assert!(nodes[1].vx > 0.0);
        assert!((nodes[0].vx + nodes[1].vx).abs() < 1e-4);
    }

    #[test]
    fn charge_separates_coincident_nodes() {
        let mut nodes = vec![node(5.0, 5.0), node(5.0, 5.0)];
        apply(
            Force::ManyBody(ManyBodyForce {
                strength: -30.0,
                theta: 0.9,
            }),
            &mut nodes,
            &[],
        );
        assert!(nodes[0].velocity().length() > 0.0);
        assert!(nodes[0].vx.is_finite() && nodes[0].vy.is_finite());
    }

    #[test]
    fn approximated_charge_matches_direction_of_exact_charge() {
        let mut nodes = (0..60)
            .map(|i| node(400.0 + (i % 6) as f32 * 3.0, (i / 6) as f32 * 3.0))
            .collect::<Vec<_>>();
        nodes.push(node(0.0, 10.0));
        let probe = nodes.len() - 1;
        apply(
            Force::ManyBody(ManyBodyForce {
                strength: -30.0,
                theta: 0.9,
            }),
            &mut nodes,
            &[],
        );
        assert!(nodes[probe].vx < 0.0);
    }

    #[test]
    fn approximated_charge_stays_close_to_exact_charge() {
        let cluster = |theta| {
            let mut nodes = (0..60)
                .map(|i| node(400.0 + (i % 6) as f32 * 3.0, (i / 6) as f32 * 3.0))
                .collect::<Vec<_>>();
            nodes.push(node(0.0, 10.0));
            apply(
                Force::ManyBody(ManyBodyForce {
                    strength: -30.0,
                    theta,
                }),
                &mut nodes,
                &[],
            );
            nodes[60].velocity()
        };
        let exact = cluster(0.0);
        let approximate = cluster(0.9);
        assert!((approximate - exact).length() < exact.length() * 0.1);
    }

    #[test]
    fn center_moves_mean_onto_target() {
        let mut nodes = vec![node(0.0, 0.0), node(20.0, 40.0)];
        apply(
            Force::Center(CenterForce {
                x: 100.0,
                y: 100.0,
                strength: 1.0,
            }),
            &mut nodes,
            &[],
        );
        let mean = (nodes[0].position() + nodes[1].position()) / 2.0;
        assert!((mean - vec2(100.0, 100.0)).length() < 1e-3);
        assert_eq!(nodes[1].position() - nodes[0].position(), vec2(20.0, 40.0));
    }

    #[test]
    fn position_forces_pull_each_axis_independently() {
        let mut nodes = vec![node(0.0, 0.0)];
        apply(
            Force::X(PositionForce {
                target: 100.0,
                strength: 0.1,
            }),
            &mut nodes,
            &[],
        );
        assert!((nodes[0].vx - 10.0).abs() < 1e-4);
        assert_eq!(nodes[0].vy, 0.0);

        apply(
            Force::Y(PositionForce {
                target: -50.0,
                strength: 0.1,
            }),
            &mut nodes,
            &[],
        );
        assert!((nodes[0].vy + 5.0).abs() < 1e-4);
    }

    #[test]
    fn link_pulls_distant_nodes_together_and_pushes_close_ones_apart() {
        let mut far = vec![node(0.0, 0.0), node(300.0, 0.0)];
        apply(
            Force::Link(LinkForce {
                distance: 100.0,
                iterations: 1,
            }),
            &mut far,
            &[link(0, 1)],
        );
        assert!(far[0].vx > 0.0 && far[1].vx < 0.0);

        let mut near = vec![node(0.0, 0.0), node(20.0, 0.0)];
        apply(
            Force::Link(LinkForce {
                distance: 100.0,
                iterations: 1,
            }),
            &mut near,
            &[link(0, 1)],
        );
        assert!(near[0].vx < 0.0 && near[1].vx > 0.0);
    }

    #[test]
    fn self_links_are_ignored() {
        let mut nodes = vec![node(0.0, 0.0)];
        apply(
            Force::Link(LinkForce {
                distance: 100.0,
                iterations: 1,
            }),
            &mut nodes,
            &[link(0, 0)],
        );
        assert_eq!(nodes[0].velocity(), Vec2::ZERO);
    }
}
