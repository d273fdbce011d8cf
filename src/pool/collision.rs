use std::f32::consts::TAU;

use eframe::egui::Vec2;

use crate::config::LayoutConfig;

use super::node::Node;

/// Separates every overlapping pair once. Returns how many pairs collided.
pub fn resolve_all(nodes: &mut [Node], config: &LayoutConfig) -> usize {
    let mut collisions = 0;
    for i in 0..nodes.len() {
        let (head, tail) = nodes.split_at_mut(i + 1);
        let a = &mut head[i];
        for (offset, b) in tail.iter_mut().enumerate() {
            let fallback = fallback_angle(i, i + 1 + offset);
            if resolve_pair(a, b, config, fallback) {
                collisions += 1;
            }
        }
    }
    collisions
}

fn fallback_angle(i: usize, j: usize) -> f32 {
    ((i as f32) * 0.618_034 + (j as f32) * 0.414_214) * TAU
}

/// Pushes `a` and `b` apart if they overlap and averages the speed along the
/// line between them. `fallback` is the separation angle used when both
/// centers coincide.
pub fn resolve_pair(a: &mut Node, b: &mut Node, config: &LayoutConfig, fallback: f32) -> bool {
    let reach = a.radius + b.radius;
    let delta = b.position - a.position;
    let distance_sq = delta.length_sq();
    if distance_sq >= reach * reach {
        return false;
    }

    let angle = if distance_sq > 1e-8 {
        delta.angle()
    } else {
        fallback
    };
    let axis = Vec2::angled(angle);

    let midpoint = (a.position + b.position) * 0.5;
    let half_gap = reach * config.separation_margin * 0.5;
    a.position = midpoint - axis * half_gap;
    b.position = midpoint + axis * half_gap;

    if a.speed > config.exchange_threshold || b.speed > config.exchange_threshold {
        exchange_normal_speed(a, b, axis);
    }

    true
}

fn exchange_normal_speed(a: &mut Node, b: &mut Node, axis: Vec2) {
    let velocity_a = a.velocity();
    let velocity_b = b.velocity();
    let normal_a = velocity_a.dot(axis);
    let normal_b = velocity_b.dot(axis);
    let tangent_a = velocity_a - axis * normal_a;
    let tangent_b = velocity_b - axis * normal_b;

    let shared = (normal_a.abs() + normal_b.abs()) * 0.5;
    a.set_velocity(tangent_a + axis * shared.copysign(normal_a));
    b.set_velocity(tangent_b + axis * shared.copysign(normal_b));
}
