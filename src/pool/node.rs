use std::collections::BTreeSet;

use eframe::egui::{Color32, Vec2};

use crate::monitor::{HostDirectory, HostId, JobId};
use crate::util::{host_label, wrap_angle};

/// Descriptive attributes a node is created or refreshed from.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDescriptor {
    pub label: String,
    pub color: Color32,
    pub is_local: bool,
    pub offline: bool,
}

impl NodeDescriptor {
    pub fn new(label: impl Into<String>, color: Color32) -> Self {
        Self {
            label: label.into(),
            color,
            is_local: false,
            offline: false,
        }
    }

    pub fn from_directory(id: HostId, hosts: &HostDirectory, suppress_domain: bool) -> Option<Self> {
        let info = hosts.get(id)?;
        Some(Self {
            label: host_label(&info.name, suppress_domain).to_owned(),
            color: hosts.color_for(id),
            is_local: hosts.is_local(id),
            offline: info.offline,
        })
    }
}

/// One simulated particle.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) id: HostId,
    pub(crate) label: String,
    pub(crate) position: Vec2,
    pub(crate) speed: f32,
    pub(crate) heading: f32,
    pub(crate) radius: f32,
    pub(crate) base_color: Color32,
    pub(crate) color: Color32,
    pub(crate) is_local: bool,
    pub(crate) linked_jobs: BTreeSet<JobId>,
    pub(crate) client_jobs: BTreeSet<JobId>,
}

impl Node {
    pub fn new(id: HostId, descriptor: &NodeDescriptor, radius: f32) -> Self {
        Self {
            id,
            label: descriptor.label.clone(),
            position: Vec2::ZERO,
            speed: 0.0,
            heading: 0.0,
            radius,
            base_color: descriptor.color,
            color: descriptor.color,
            is_local: descriptor.is_local,
            linked_jobs: BTreeSet::new(),
            client_jobs: BTreeSet::new(),
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn moving(mut self, velocity: Vec2) -> Self {
        self.set_velocity(velocity);
        self
    }

    pub fn id(&self) -> HostId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn base_color(&self) -> Color32 {
        self.base_color
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    pub fn linked_jobs(&self) -> &BTreeSet<JobId> {
        &self.linked_jobs
    }

    pub fn client_jobs(&self) -> &BTreeSet<JobId> {
        &self.client_jobs
    }

    pub fn is_active_client(&self) -> bool {
        !self.client_jobs.is_empty()
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::angled(self.heading) * self.speed
    }

    /// Stores `velocity` in polar form. A zero vector keeps the old heading.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.speed = velocity.length();
        if self.speed > 0.0 {
            self.heading = velocity.angle();
        }
    }

    pub fn set_heading(&mut self, heading: f32) {
        self.heading = wrap_angle(heading);
    }

    pub fn contains(&self, point: Vec2) -> bool {
        (point - self.position).length_sq() <= self.radius * self.radius
    }

    pub fn overlaps(&self, other: &Node) -> bool {
        let reach = self.radius + other.radius;
        (other.position - self.position).length_sq() < reach * reach
    }

    pub(crate) fn refresh(&mut self, descriptor: &NodeDescriptor, radius: f32) {
        self.label.clone_from(&descriptor.label);
        self.radius = radius;
        if self.color == self.base_color {
            self.color = descriptor.color;
        }
        self.base_color = descriptor.color;
        self.is_local = descriptor.is_local;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::HostInfo;
    use eframe::egui::vec2;
    use std::f32::consts::FRAC_PI_2;

    fn node(radius: f32) -> Node {
        Node::new(1, &NodeDescriptor::new("one", Color32::RED), radius)
    }

    #[test]
    fn velocity_round_trips_through_polar_form() {
        let mut node = node(10.0);
        node.set_velocity(vec2(0.0, 3.0));
        assert!((node.speed() - 3.0).abs() < 1e-6);
        assert!((node.heading() - FRAC_PI_2).abs() < 1e-6);
        assert!((node.velocity() - vec2(0.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn zero_velocity_keeps_heading() {
        let mut node = node(10.0).moving(vec2(-1.0, 0.0));
        let heading = node.heading();
        node.set_velocity(Vec2::ZERO);
        assert_eq!(node.speed(), 0.0);
        assert_eq!(node.heading(), heading);
    }

    #[test]
    fn overlap_uses_sum_of_radii() {
        let a = node(15.0).at(vec2(10.0, 10.0));
        let b = node(15.0).at(vec2(39.0, 10.0));
        let c = node(15.0).at(vec2(40.0, 10.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains(vec2(24.0, 10.0)));
        assert!(!a.contains(vec2(26.0, 10.0)));
    }

    #[test]
    fn descriptor_reads_directory() {
        let mut hosts = HostDirectory::new();
        hosts.upsert(4, HostInfo::new("builder4.lab.example", "x86_64"));
        hosts.set_local_host(4);

        let short = NodeDescriptor::from_directory(4, &hosts, true).unwrap();
        assert_eq!(short.label, "builder4");
        assert!(short.is_local);
        assert!(!short.offline);

        let long = NodeDescriptor::from_directory(4, &hosts, false).unwrap();
        assert_eq!(long.label, "builder4.lab.example");
        assert!(NodeDescriptor::from_directory(5, &hosts, true).is_none());
    }

    #[test]
    fn refresh_keeps_borrowed_display_color() {
        let mut node = node(10.0);
        node.color = Color32::BLUE;
        node.refresh(&NodeDescriptor::new("renamed", Color32::GREEN), 20.0);
        assert_eq!(node.label(), "renamed");
        assert_eq!(node.radius(), 20.0);
        assert_eq!(node.base_color(), Color32::GREEN);
        assert_eq!(node.color(), Color32::BLUE);
    }
}
