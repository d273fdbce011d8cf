use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eframe::egui::Color32;

const HOST_PALETTE: [Color32; 12] = [
    Color32::from_rgb(92, 170, 236),
    Color32::from_rgb(236, 135, 92),
    Color32::from_rgb(126, 205, 120),
    Color32::from_rgb(214, 112, 188),
    Color32::from_rgb(240, 200, 86),
    Color32::from_rgb(98, 206, 196),
    Color32::from_rgb(176, 140, 232),
    Color32::from_rgb(226, 96, 110),
    Color32::from_rgb(160, 196, 82),
    Color32::from_rgb(104, 132, 220),
    Color32::from_rgb(232, 160, 140),
    Color32::from_rgb(140, 180, 160),
];

/// Strips everything after the first dot, so `builder3.lab.example` reads as
/// `builder3`. Names that start with a dot are kept intact.
pub fn short_name(name: &str) -> &str {
    match name.split_once('.') {
        Some((host, _)) if !host.is_empty() => host,
        _ => name,
    }
}

pub fn host_label(name: &str, suppress_domain: bool) -> &str {
    if suppress_domain {
        short_name(name)
    } else {
        name
    }
}

pub fn stable_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

pub fn palette_color(key: &str) -> Color32 {
    HOST_PALETTE[(stable_hash(key) % HOST_PALETTE.len() as u64) as usize]
}

pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};

    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}
