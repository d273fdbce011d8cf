use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::config::LayoutConfig;
use crate::monitor::HostId;

use super::node::{Node, NodeDescriptor};

/// Live nodes, stored in an arena and indexed by host id.
#[derive(Debug)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    index_by_id: HashMap<HostId, usize>,
    rng: StdRng,
}

impl NodeRegistry {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            nodes: Vec::new(),
            index_by_id: HashMap::new(),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: HostId) -> bool {
        self.index_by_id.contains_key(&id)
    }

    pub fn get(&self, id: HostId) -> Option<&Node> {
        let index = *self.index_by_id.get(&id)?;
        self.nodes.get(index)
    }

    pub fn get_mut(&mut self, id: HostId) -> Option<&mut Node> {
        let index = *self.index_by_id.get(&id)?;
        self.nodes.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn ids(&self) -> Vec<HostId> {
        self.nodes.iter().map(|node| node.id).collect()
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Returns the node for `id`, creating it on first sight. Offline hosts and
    /// empty labels never produce a node.
    pub fn ensure(
        &mut self,
        id: HostId,
        descriptor: &NodeDescriptor,
        canvas: Vec2,
        config: &LayoutConfig,
    ) -> Option<&mut Node> {
        let radius = config.label.radius_for(&descriptor.label);

        if let Some(&index) = self.index_by_id.get(&id) {
            let node = &mut self.nodes[index];
            node.refresh(descriptor, radius);
            return Some(node);
        }

        if descriptor.offline || descriptor.label.is_empty() {
            trace!(host = id, "not creating a node for an offline or unnamed host");
            return None;
        }

        let mut node = Node::new(id, descriptor, radius);
        let heading = self.rng.random_range(0.0..TAU);
        node.set_velocity(Vec2::angled(heading) * config.initial_speed);
        node.set_heading(heading);
        node.position = self.free_position(radius, canvas, config.placement_attempts);

        debug!(host = id, label = %node.label, x = node.position.x, y = node.position.y, "node created");
        let index = self.nodes.len();
        self.nodes.push(node);
        self.index_by_id.insert(id, index);
        Some(&mut self.nodes[index])
    }

    /// Places every node again on `canvas`, in arena order, each avoiding the
    /// ones already placed. Used for nodes created before the canvas had a size.
    pub fn scatter(&mut self, canvas: Vec2, config: &LayoutConfig) {
        let pending = std::mem::take(&mut self.nodes);
        for mut node in pending {
            node.position = self.free_position(node.radius, canvas, config.placement_attempts);
            self.nodes.push(node);
        }
        debug!(nodes = self.nodes.len(), ?canvas, "nodes scattered");
    }

    fn free_position(&mut self, radius: f32, canvas: Vec2, attempts: usize) -> Vec2 {
        let attempts = attempts.max(1);
        let mut candidate = self.random_position(radius, canvas);
        for attempt in 1..=attempts {
            let overlaps = self.nodes.iter().any(|other| {
                let reach = radius + other.radius;
                (other.position - candidate).length_sq() < reach * reach
            });
            if !overlaps {
                return candidate;
            }
            if attempt == attempts {
                break;
            }
            trace!(attempt, "placement candidate overlaps; retrying");
            candidate = self.random_position(radius, canvas);
        }
        debug!(attempts, "placement attempts exhausted; accepting an overlapping position");
        candidate
    }

    fn random_position(&mut self, radius: f32, canvas: Vec2) -> Vec2 {
        let mut axis = |extent: f32| {
            if extent > radius * 2.0 {
                self.rng.random_range(radius..extent - radius)
            } else {
                extent.max(0.0) * 0.5
            }
        };
        let x = axis(canvas.x);
        let y = axis(canvas.y);
        vec2(x, y)
    }

    /// Removes the node only; the caller is responsible for the job slots it held.
    pub fn remove(&mut self, id: HostId) -> Option<Node> {
        let index = self.index_by_id.remove(&id)?;
        let node = self.nodes.swap_remove(index);
        if let Some(moved) = self.nodes.get(index) {
            self.index_by_id.insert(moved.id, index);
        }
        debug!(host = id, "node removed");
        Some(node)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index_by_id.clear();
    }

    /// The node whose circle contains `point`, nearest center first.
    pub fn node_at(&self, point: Vec2) -> Option<&Node> {
        self.nodes
            .iter()
            .filter(|node| node.contains(point))
            .min_by(|a, b| {
                (a.position - point)
                    .length_sq()
                    .total_cmp(&(b.position - point).length_sq())
            })
    }
}
