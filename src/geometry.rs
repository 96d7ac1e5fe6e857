use eframe::egui::{Vec2, vec2};

const DEGENERATE_LENGTH: f32 = 1e-6;

/// Offset from a node center to the point on its circular boundary facing
/// `(dx, dy)`. Returns the zero vector when the displacement has no length.
pub fn scale_link_vector(dx: f32, dy: f32, radius: f32) -> Vec2 {
    let length = (dx * dx + dy * dy).sqrt();
    if !length.is_finite() || length <= DEGENERATE_LENGTH {
        return Vec2::ZERO;
    }
    vec2(dx, dy) * (radius / length)
}

/// The displacement `(dx, dy)` cut short by `trim` at its far end.
pub fn shorten_link_vector(dx: f32, dy: f32, trim: f32) -> Vec2 {
    let length = (dx * dx + dy * dy).sqrt();
    if !length.is_finite() || length <= trim.max(DEGENERATE_LENGTH) {
        return Vec2::ZERO;
    }
    vec2(dx, dy) - scale_link_vector(dx, dy, trim)
}

pub fn perpendicular_offset(dx: f32, dy: f32, offset: f32) -> Vec2 {
    scale_link_vector(-dy, dx, offset)
}

/// Bend for the `rank`-th link between the same pair of nodes: 0, +s, -s, +2s, -2s, ...
pub fn parallel_bend(rank: usize, spacing: f32) -> f32 {
    if rank == 0 {
        return 0.0;
    }
    let step = rank.div_ceil(2) as f32 * spacing;
    if rank % 2 == 1 { step } else { -step }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkGeometry {
    pub start: Vec2,
    pub control: Vec2,
    pub end: Vec2,
    pub curved: bool,
}

impl LinkGeometry {
    pub fn between(source: Vec2, target: Vec2, radius: f32, arrowhead: f32, bend: f32) -> Self {
        let delta = target - source;
        let curved = bend.abs() > f32::EPSILON;
        let control = source + delta * 0.5 + perpendicular_offset(delta.x, delta.y, bend);

        let outbound = control - source;
        let start = source + scale_link_vector(outbound.x, outbound.y, radius);

        let inbound = target - control;
        let trimmed = scale_link_vector(inbound.x, inbound.y, radius + arrowhead);
        let end = if inbound.length() > radius + arrowhead {
            target - trimmed
        } else {
            control
        };

        Self {
            start,
            control,
            end,
            curved,
        }
    }

    pub fn to_path(self) -> String {
        if self.curved {
            format!(
                "M{:.2},{:.2} Q{:.2},{:.2} {:.2},{:.2}",
                self.start.x, self.start.y, self.control.x, self.control.y, self.end.x, self.end.y
            )
        } else {
            format!(
                "M{:.2},{:.2} L{:.2},{:.2}",
                self.start.x, self.start.y, self.end.x, self.end.y
            )
        }
    }
}

pub fn link_path(source: Vec2, target: Vec2, radius: f32, arrowhead: f32, bend: f32) -> String {
    LinkGeometry::between(source, target, radius, arrowhead, bend).to_path()
}
