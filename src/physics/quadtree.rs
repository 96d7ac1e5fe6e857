use eframe::egui::{Vec2, vec2};

const MAX_DEPTH: usize = 16;

pub(super) struct ChargeCell {
    pub(super) width: f32,
    pub(super) charge: f32,
    pub(super) centroid: Vec2,
    pub(super) children: [Option<usize>; 4],
    pub(super) members: Vec<usize>,
}

impl ChargeCell {
    /// Far enough that the whole cell may act as one charge at its centroid.
    pub(super) fn is_distant(&self, distance_sq: f32, theta_sq: f32) -> bool {
        self.width * self.width / theta_sq < distance_sq
    }

    pub(super) fn is_leaf(&self) -> bool {
        !self.members.is_empty()
    }
}

pub(super) struct ChargeTree {
    cells: Vec<ChargeCell>,
}

impl ChargeTree {
    pub(super) fn build(positions: &[Vec2], point_charge: f32) -> Option<Self> {
        let (origin, width) = cover(positions)?;
        let mut tree = Self {
            cells: Vec::with_capacity(positions.len() * 2),
        };
        tree.subdivide(
            origin,
            width,
            (0..positions.len()).collect(),
            positions,
            point_charge,
            0,
        );
        Some(tree)
    }

    pub(super) fn root(&self) -> usize {
        0
    }

    pub(super) fn cell(&self, index: usize) -> &ChargeCell {
        &self.cells[index]
    }

    fn subdivide(
        &mut self,
        origin: Vec2,
        width: f32,
        members: Vec<usize>,
        positions: &[Vec2],
        point_charge: f32,
        depth: usize,
    ) -> usize {
        let slot = self.cells.len();
        let count = members.len() as f32;
        let centroid = members
            .iter()
            .fold(Vec2::ZERO, |sum, &member| sum + positions[member])
            / count;
        self.cells.push(ChargeCell {
            width,
            charge: point_charge * count,
            centroid,
            children: [None; 4],
            members: Vec::new(),
        });

        let first = positions[members[0]];
        let spread = members.iter().any(|&member| positions[member] != first);
        if !spread || depth >= MAX_DEPTH {
            self.cells[slot].members = members;
            return slot;
        }

        let half = width * 0.5;
        let mut quadrants: [Vec<usize>; 4] = Default::default();
        for member in members {
            let position = positions[member];
            let east = usize::from(position.x >= origin.x + half);
            let south = usize::from(position.y >= origin.y + half);
            quadrants[east | (south << 1)].push(member);
        }

        for (quadrant, members) in quadrants.into_iter().enumerate() {
            if members.is_empty() {
                continue;
            }
            let offset = vec2(
                if quadrant & 1 == 1 { half } else { 0.0 },
                if quadrant & 2 == 2 { half } else { 0.0 },
            );
            let child = self.subdivide(
                origin + offset,
                half,
                members,
                positions,
                point_charge,
                depth + 1,
            );
            self.cells[slot].children[quadrant] = Some(child);
        }
        slot
    }
}

fn cover(positions: &[Vec2]) -> Option<(Vec2, f32)> {
    let (min, max) = positions.iter().fold(
        (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
        |(min, max), &position| (min.min(position), max.max(position)),
    );
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    Some((min, (max - min).max_elem().max(1.0)))
}
