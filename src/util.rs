use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::graph::split_resource_type;

/// Shortest decimal form: `25.0` prints `25`, `0.6` prints `0.6`.
pub fn format_number(value: f32) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    format!("{value}")
}

pub fn short_type(kind: &str) -> &str {
    split_resource_type(kind)
        .map(|(_, _, resource)| resource)
        .unwrap_or(kind)
}

pub fn slug(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut last_dash = true;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

pub fn type_color(kind: &str) -> [u8; 3] {
    let key = match split_resource_type(kind) {
        Some((namespace, service, _)) => format!("{namespace}::{service}"),
        None => kind.to_owned(),
    };
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();

    let hue = (hash & 0xffff) as f32 / 65_535.0 * 360.0;
    hsl_to_rgb(hue, 0.55, 0.45)
}

pub fn hex_color([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma * 0.5;
    let channel = |value: f32| ((value + m).clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(r), channel(g), channel(b)]
}
