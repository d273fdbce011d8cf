use std::f32::consts::PI;

use eframe::egui::{Color32, Vec2, vec2};
use tracing::trace;

use crate::config::{LayoutConfig, PoolOptions};

use super::collision::resolve_all;
use super::links::JobLinkTracker;
use super::node::Node;
use super::registry::NodeRegistry;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub collisions: usize,
    pub moving: usize,
}

struct Attraction {
    barycenter: Vec2,
    color: Color32,
}

/// Advances every node by one tick.
pub fn tick(
    nodes: &mut NodeRegistry,
    links: &JobLinkTracker,
    config: &LayoutConfig,
    options: &PoolOptions,
    canvas: Vec2,
) -> TickReport {
    if canvas.x <= 0.0 || canvas.y <= 0.0 {
        trace!(?canvas, "skipping tick on an empty canvas");
        return TickReport::default();
    }

    let attractions = nodes
        .iter()
        .map(|node| attraction_for(node, nodes, links, options.clients_attract_hosts))
        .collect::<Vec<_>>();

    for (node, attraction) in nodes.as_mut_slice().iter_mut().zip(attractions) {
        advance(node, attraction, config, canvas);
        contain(node, canvas);
    }

    let collisions = resolve_all(nodes.as_mut_slice(), config);
    let mut moving = 0;
    for node in nodes.as_mut_slice() {
        contain(node, canvas);
        if node.speed > 0.0 {
            moving += 1;
        }
    }

    TickReport { collisions, moving }
}

fn attraction_for(
    node: &Node,
    nodes: &NodeRegistry,
    links: &JobLinkTracker,
    clients_attract_hosts: bool,
) -> Option<Attraction> {
    let partners = links.partners(node.id, nodes, clients_attract_hosts);
    let first = nodes.get(*partners.first()?)?;

    let sum = partners
        .iter()
        .filter_map(|&id| nodes.get(id))
        .fold(Vec2::ZERO, |sum, partner| sum + partner.position);
    Some(Attraction {
        barycenter: sum / partners.len() as f32,
        color: first.base_color,
    })
}

fn advance(node: &mut Node, attraction: Option<Attraction>, config: &LayoutConfig, canvas: Vec2) {
    node.speed *= 1.0 - config.friction;
    if node.speed < config.rest_speed {
        node.speed = 0.0;
    }

    let mut velocity = node.velocity();
    match attraction {
        Some(attraction) => {
            let offset = attraction.barycenter - node.position;
            velocity += vec2(offset.x / canvas.x, offset.y / canvas.y) * config.attraction_scale;
            node.color = attraction.color;
        }
        None => node.color = node.base_color,
    }

    let speed = velocity.length();
    if speed > config.max_speed {
        velocity *= config.max_speed / speed;
    }
    node.set_velocity(velocity);

    node.position += velocity;
}

/// Keeps the node's circle on the canvas, turning its heading back inward
/// at any wall it crossed. A no-op for nodes already inside.
pub fn contain(node: &mut Node, canvas: Vec2) {
    let velocity = node.velocity();

    let (x, bounce_x) = clamp_axis(node.position.x, velocity.x, node.radius, canvas.x);
    if bounce_x {
        node.set_heading(PI - node.heading);
    }

    let (y, bounce_y) = clamp_axis(node.position.y, velocity.y, node.radius, canvas.y);
    if bounce_y {
        node.set_heading(-node.heading);
    }

    node.position = vec2(x, y);
}

fn clamp_axis(position: f32, velocity: f32, radius: f32, extent: f32) -> (f32, bool) {
    let min = radius;
    let max = extent - radius;
    if max < min {
        return (extent * 0.5, false);
    }

    if position < min {
        (min, velocity < 0.0)
    } else if position > max {
        (max, velocity > 0.0)
    } else {
        (position, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{Job, JobState};
    use crate::pool::node::NodeDescriptor;

    const CANVAS: Vec2 = Vec2::new(800.0, 600.0);

    fn registry_with(entries: &[(u32, Vec2, Vec2)]) -> NodeRegistry {
        let mut nodes = NodeRegistry::new(9);
        let config = LayoutConfig::default();
        for &(id, position, velocity) in entries {
            let color = Color32::from_rgb(id as u8 * 20, 0, 0);
            let node = nodes
                .ensure(id, &NodeDescriptor::new(format!("n{id}"), color), CANVAS, &config)
                .unwrap();
            node.set_position(position);
            node.set_velocity(velocity);
        }
        nodes
    }

    #[test]
    fn damping_decreases_speed_until_rest() {
        let mut nodes = registry_with(&[(1, vec2(400.0, 300.0), vec2(0.5, 0.0))]);
        let links = JobLinkTracker::new();
        let config = LayoutConfig::default();
        let options = PoolOptions::default();

        let mut last = nodes.get(1).unwrap().speed();
        let mut reached_rest = false;
        for _ in 0..200 {
            tick(&mut nodes, &links, &config, &options, CANVAS);
            let speed = nodes.get(1).unwrap().speed();
            if reached_rest {
                assert_eq!(speed, 0.0);
            } else if speed == 0.0 {
                reached_rest = true;
            } else {
                assert!(speed < last, "{speed} >= {last}");
            }
            last = speed;
        }
        assert!(reached_rest);
    }

    #[test]
    fn speed_is_clamped() {
        let mut nodes = registry_with(&[(1, vec2(400.0, 300.0), vec2(50.0, 0.0))]);
        let config = LayoutConfig::default();

        tick(&mut nodes, &JobLinkTracker::new(), &config, &PoolOptions::default(), CANVAS);

        let node = nodes.get(1).unwrap();
        assert!((node.speed() - config.max_speed).abs() < 1e-4);
        assert!((node.position().x - 410.0).abs() < 1e-3);
    }

    #[test]
    fn server_drifts_toward_its_client_and_borrows_its_color() {
        let mut nodes = registry_with(&[
            (3, vec2(100.0, 300.0), Vec2::ZERO),
            (7, vec2(700.0, 300.0), Vec2::ZERO),
        ]);
        let mut links = JobLinkTracker::new();
        links.update(&Job::new(1, 7, Some(3), JobState::Compiling), &mut nodes);
        let config = LayoutConfig::default();

        tick(&mut nodes, &links, &config, &PoolOptions::default(), CANVAS);

        let server = nodes.get(3).unwrap();
        let client = nodes.get(7).unwrap();
        assert!((server.position().x - (100.0 + 600.0 / 800.0 * 50.0)).abs() < 1e-3);
        assert_eq!(client.position(), vec2(700.0, 300.0));
        assert_eq!(server.color(), client.base_color());
        assert_eq!(client.color(), client.base_color());
    }

    #[test]
    fn clients_attract_hosts_pulls_the_client_too() {
        let mut nodes = registry_with(&[
            (3, vec2(100.0, 300.0), Vec2::ZERO),
            (7, vec2(700.0, 300.0), Vec2::ZERO),
        ]);
        let mut links = JobLinkTracker::new();
        links.update(&Job::new(1, 7, Some(3), JobState::Compiling), &mut nodes);
        let options = PoolOptions {
            clients_attract_hosts: true,
            ..PoolOptions::default()
        };

        tick(&mut nodes, &links, &LayoutConfig::default(), &options, CANVAS);

        assert!(nodes.get(7).unwrap().position().x < 700.0);
    }

    #[test]
    fn color_returns_once_the_job_finishes() {
        let mut nodes = registry_with(&[
            (3, vec2(100.0, 300.0), Vec2::ZERO),
            (7, vec2(700.0, 300.0), Vec2::ZERO),
        ]);
        let mut links = JobLinkTracker::new();
        let job = Job::new(1, 7, Some(3), JobState::Compiling);
        let config = LayoutConfig::default();
        let options = PoolOptions::default();

        links.update(&job, &mut nodes);
        tick(&mut nodes, &links, &config, &options, CANVAS);
        links.update(&job.with_state(JobState::Finished), &mut nodes);
        tick(&mut nodes, &links, &config, &options, CANVAS);

        let server = nodes.get(3).unwrap();
        assert_eq!(server.color(), server.base_color());
    }

    #[test]
    fn wall_reflects_horizontal_heading() {
        let mut nodes = registry_with(&[(1, vec2(795.0, 300.0), vec2(5.0, 0.0))]);

        tick(&mut nodes, &JobLinkTracker::new(), &LayoutConfig::default(), &PoolOptions::default(), CANVAS);

        let node = nodes.get(1).unwrap();
        assert_eq!(node.position().x, CANVAS.x - node.radius());
        assert!(node.velocity().x < 0.0);
    }

    #[test]
    fn contain_is_idempotent_inside_bounds() {
        let mut nodes = registry_with(&[(1, vec2(400.0, 300.0), vec2(3.0, -2.0))]);
        let node = nodes.get_mut(1).unwrap();
        let (position, heading) = (node.position(), node.heading());

        contain(node, CANVAS);
        contain(node, CANVAS);

        assert_eq!(node.position(), position);
        assert_eq!(node.heading(), heading);
    }

    #[test]
    fn contain_turns_outward_heading_inward_only() {
        let mut nodes = registry_with(&[(1, vec2(-5.0, 620.0), vec2(-1.0, 1.0))]);
        let node = nodes.get_mut(1).unwrap();

        contain(node, CANVAS);
        let velocity = node.velocity();
        assert_eq!(node.position(), vec2(node.radius(), CANVAS.y - node.radius()));
        assert!(velocity.x > 0.0 && velocity.y < 0.0);

        contain(node, CANVAS);
        let again = node.velocity();
        assert!((again - velocity).length() < 1e-5);
    }

    #[test]
    fn empty_canvas_skips_the_tick() {
        let mut nodes = registry_with(&[(1, vec2(10.0, 10.0), vec2(1.0, 0.0))]);

        let report = tick(
            &mut nodes,
            &JobLinkTracker::new(),
            &LayoutConfig::default(),
            &PoolOptions::default(),
            Vec2::ZERO,
        );

        assert_eq!(report, TickReport::default());
        assert_eq!(nodes.get(1).unwrap().position(), vec2(10.0, 10.0));
    }
}
