mod forces;
mod quadtree;

use tracing::debug;

use crate::config::RenderConfig;
use crate::graph::GraphModel;

pub use forces::{CenterForce, Force, LinkForce, ManyBodyForce, PositionForce};
use forces::{ForceInput, ForceScratch};

pub const FORCE_LINK: &str = "link";
pub const FORCE_CHARGE: &str = "charge";
pub const FORCE_CENTER: &str = "center";
pub const FORCE_X: &str = "forceX";
pub const FORCE_Y: &str = "forceY";

pub const ALPHA_EPSILON: f32 = 1e-3;

const INITIAL_ALPHA: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Hot,
    Cold,
}

pub struct Simulation {
    alpha: f32,
    alpha_target: f32,
    alpha_decay: f32,
    alpha_min: f32,
    velocity_decay: f32,
    reheat_alpha_target: f32,
    resting_alpha_target: f32,
    phase: Phase,
    stopped: bool,
    forces: Vec<(&'static str, Force)>,
    scratch: ForceScratch,
}

impl Simulation {
    pub fn new(config: &RenderConfig) -> Self {
        let center_x = config.viewport_width * 0.5;
        let center_y = config.viewport_height * 0.5;
        let forces = vec![
            (
                FORCE_LINK,
                Force::Link(LinkForce {
                    distance: config.link_distance,
                    iterations: 1,
                }),
            ),
            (
                FORCE_CHARGE,
                Force::ManyBody(ManyBodyForce {
                    strength: config.charge_strength,
                    theta: config.theta,
                }),
            ),
            (
                FORCE_CENTER,
                Force::Center(CenterForce {
                    x: center_x,
                    y: center_y,
                    strength: config.center_strength,
                }),
            ),
            (
                FORCE_X,
                Force::X(PositionForce {
                    target: center_x,
                    strength: config.position_strength,
                }),
            ),
            (
                FORCE_Y,
                Force::Y(PositionForce {
                    target: center_y,
                    strength: config.position_strength,
                }),
            ),
        ];

        Self {
            alpha: INITIAL_ALPHA,
            alpha_target: config.reheat_alpha_target,
            alpha_decay: config.alpha_decay,
            alpha_min: config.alpha_min,
            velocity_decay: config.velocity_decay,
            reheat_alpha_target: config.reheat_alpha_target,
            resting_alpha_target: config.alpha_target,
            phase: Phase::Hot,
            stopped: false,
            forces,
            scratch: ForceScratch::default(),
        }
    }

    pub fn force(&self, name: &str) -> Option<&Force> {
        self.forces
            .iter()
            .find(|(force_name, _)| *force_name == name)
            .map(|(_, force)| force)
    }

    pub fn force_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.forces.iter().map(|(name, _)| *name)
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let (center_x, center_y) = (width * 0.5, height * 0.5);
        for (_, force) in &mut self.forces {
            match force {
                Force::Center(center) => {
                    center.x = center_x;
                    center.y = center_y;
                }
                Force::X(position) => position.target = center_x,
                Force::Y(position) => position.target = center_y,
                Force::ManyBody(_) | Force::Link(_) => {}
            }
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn alpha_decay(&self) -> f32 {
        self.alpha_decay
    }

    pub fn alpha_min(&self) -> f32 {
        self.alpha_min
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Turns false once a tick leaves alpha below `alpha_min`, until the next
    /// reheat. With a negative `alpha_min` it never does.
    pub fn is_running(&self) -> bool {
        !self.stopped
    }

    pub fn reheat(&mut self) {
        if self.phase == Phase::Cold || self.stopped {
            debug!(alpha = self.alpha, "simulation reheated");
        }
        self.stopped = false;
        self.phase = Phase::Hot;
        self.alpha_target = self.reheat_alpha_target;
    }

    pub fn cool_if_reached(&mut self) -> bool {
        if self.phase != Phase::Hot
            || (self.alpha - self.reheat_alpha_target).abs() > ALPHA_EPSILON
        {
            return false;
        }

        self.phase = Phase::Cold;
        self.alpha_target = self.resting_alpha_target;
        debug!(alpha = self.alpha, "simulation cooling down");
        true
    }

    pub fn step(&mut self, model: &mut GraphModel, active_nodes: &[usize], active_links: &[usize]) {
        if self.stopped {
            return;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        if self.alpha < self.alpha_min {
            self.stopped = true;
            debug!(alpha = self.alpha, "simulation stopped");
        }

        let (nodes, links) = model.nodes_and_links_mut();
        let mut input = ForceInput {
            nodes,
            links,
            active_nodes,
            active_links,
            alpha: self.alpha,
        };
        for (_, force) in &self.forces {
            force.apply(&mut input, &mut self.scratch);
        }

        let retain = 1.0 - self.velocity_decay;
        for &index in active_nodes {
            let node = &mut input.nodes[index];
            match node.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx *= retain;
                    node.x += node.vx;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy *= retain;
                    node.y += node.vy;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::graph::{FilterMode, Graph, Link, Node};

    fn model() -> GraphModel {
        let graph = Graph {
            nodes: vec![
                Node::new("Api", "AWS::ApiGateway::RestApi"),
                Node::new("Role", "AWS::IAM::Role"),
                Node::new("Table", "AWS::DynamoDB::Table"),
                Node::new("Queue", "AWS::SQS::Queue"),
            ],
            links: vec![
                Link::new("Api", "Role", "Intrinsic Function"),
                Link::new("Role", "Table", "Intrinsic Function"),
                Link::new("Queue", "Table", "DependsOn"),
            ],
        };
        GraphModel::new(&graph, &[], &RenderConfig::default()).expect("model builds")
    }

    fn run(simulation: &mut Simulation, model: &mut GraphModel, ticks: usize) {
        let nodes = model.active_nodes(FilterMode::All);
        let links = model.active_links(FilterMode::All);
        for _ in 0..ticks {
            simulation.step(model, &nodes, &links);
        }
    }

    #[test]
    fn registers_named_forces() {
        let simulation = Simulation::new(&RenderConfig::default());
        for name in [FORCE_CHARGE, FORCE_CENTER, FORCE_X, FORCE_Y, FORCE_LINK] {
            assert!(simulation.force(name).is_some(), "missing {name}");
        }
        assert_eq!(simulation.force_names().count(), 5);
        assert!(simulation.force("collide").is_none());
    }

    #[test]
    fn starts_hot_with_auto_stop_disabled() {
        let config = RenderConfig::default();
        let simulation = Simulation::new(&config);
        assert_eq!(simulation.phase(), Phase::Hot);
        assert_eq!(simulation.alpha(), 1.0);
        assert_eq!(simulation.alpha_target(), config.reheat_alpha_target);
        assert_eq!(simulation.alpha_decay(), config.alpha_decay);
        assert_eq!(simulation.alpha_min(), -1.0);
    }

    #[test]
    fn cools_only_after_reaching_reheat_target() {
        let config = RenderConfig::default();
        let mut simulation = Simulation::new(&config);

        assert!(!simulation.cool_if_reached());
        assert_eq!(simulation.alpha_target(), config.reheat_alpha_target);

        simulation.set_alpha(config.reheat_alpha_target);
        assert!(simulation.cool_if_reached());
        assert_eq!(simulation.phase(), Phase::Cold);
        assert_eq!(simulation.alpha_target(), config.alpha_target);

        assert!(!simulation.cool_if_reached());
    }

    #[test]
    fn reheat_from_cold_restores_reheat_target() {
        let config = RenderConfig::default();
        let mut simulation = Simulation::new(&config);
        simulation.set_alpha(config.reheat_alpha_target);
        simulation.cool_if_reached();

        simulation.reheat();
        assert_eq!(simulation.phase(), Phase::Hot);
        assert_eq!(simulation.alpha_target(), config.reheat_alpha_target);
    }

    #[test]
    fn alpha_decays_toward_target() {
        let mut model = model();
        let mut simulation = Simulation::new(&RenderConfig::default());
        run(&mut simulation, &mut model, 10);
        assert!(simulation.alpha() < 1.0);
        assert!(simulation.alpha() > simulation.alpha_target());
    }

    #[test]
    fn never_stops_on_its_own() {
        let mut model = model();
        let mut simulation = Simulation::new(&RenderConfig::default());
        simulation.set_alpha(RenderConfig::default().reheat_alpha_target);
        simulation.cool_if_reached();
        run(&mut simulation, &mut model, 2_000);
        assert!(simulation.is_running());
        assert!(simulation.alpha() >= 0.0);
    }

    #[test]
    fn reheat_resumes_a_stopped_simulation() {
        let config = RenderConfig {
            alpha_min: 0.001,
            ..RenderConfig::default()
        };
        let mut model = model();
        let mut simulation = Simulation::new(&config);
        simulation.set_alpha(config.reheat_alpha_target);
        simulation.cool_if_reached();
        run(&mut simulation, &mut model, 2_000);
        assert!(!simulation.is_running());
        let stopped = simulation.alpha();
        let frozen = model.nodes()[0].position();
        run(&mut simulation, &mut model, 10);
        assert_eq!(simulation.alpha(), stopped);
        assert_eq!(model.nodes()[0].position(), frozen);

        simulation.reheat();
        assert!(simulation.is_running());
        run(&mut simulation, &mut model, 50);
        assert!(simulation.alpha() > stopped);
        assert!(simulation.is_running());
    }

    #[test]
    fn pinned_nodes_hold_their_position() {
        let mut model = model();
        if let Some(node) = model.node_mut(0) {
            node.pin(vec2(42.0, 24.0));
        }
        let mut simulation = Simulation::new(&RenderConfig::default());
        run(&mut simulation, &mut model, 25);

        let pinned = &model.nodes()[0];
        assert_eq!(pinned.position(), vec2(42.0, 24.0));
        assert_eq!(pinned.velocity(), eframe::egui::Vec2::ZERO);
    }

    #[test]
    fn layout_spreads_nodes_and_stays_near_viewport_center() {
        let config = RenderConfig::default();
        let mut model = model();
        let mut simulation = Simulation::new(&config);
        run(&mut simulation, &mut model, 300);

        let center = vec2(config.viewport_width * 0.5, config.viewport_height * 0.5);
        let nodes = model.nodes();
        let mean = nodes
            .iter()
            .fold(eframe::egui::Vec2::ZERO, |sum, node| sum + node.position())
            / nodes.len() as f32;
        assert!((mean - center).length() < 5.0, "mean drifted to {mean:?}");
        for (i, a) in nodes.iter().enumerate() {
            assert!(a.x.is_finite() && a.y.is_finite());
            for b in &nodes[i + 1..] {
                assert!((a.position() - b.position()).length() > 20.0);
            }
        }
    }

    #[test]
    fn inactive_nodes_are_left_alone() {
        let mut model = model();
        let before = model.nodes()[3].position();
        let mut simulation = Simulation::new(&RenderConfig::default());
        let nodes = vec![0, 1, 2];
        let links = vec![0, 1];
        for _ in 0..20 {
            simulation.step(&mut model, &nodes, &links);
        }
        assert_eq!(model.nodes()[3].position(), before);
    }

    #[test]
    fn set_viewport_retargets_containment() {
        let mut simulation = Simulation::new(&RenderConfig::default());
        simulation.set_viewport(500.0, 300.0);
        assert_eq!(
            simulation.force(FORCE_X),
            Some(&Force::X(PositionForce {
                target: 250.0,
                strength: RenderConfig::default().position_strength,
            }))
        );
        match simulation.force(FORCE_CENTER) {
            Some(Force::Center(center)) => assert_eq!((center.x, center.y), (250.0, 150.0)),
            other => panic!("unexpected center force {other:?}"),
        }
    }
}
