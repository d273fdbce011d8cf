use eframe::egui::{Color32, Vec2};

use crate::monitor::{HostId, JobId, JobState};

/// What the renderer needs to draw one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoolSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub links: Vec<LinkSnapshot>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot {
    pub id: HostId,
    pub label: String,
    pub position: Vec2,
    pub radius: f32,
    pub color: Color32,
    pub is_local: bool,
    /// `Idle` when the node holds no running job.
    pub activity: JobState,
    pub job_count: usize,
}

/// A line from the node running a job to the client that asked for it.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkSnapshot {
    pub job: JobId,
    pub from: Vec2,
    pub to: Vec2,
    pub color: Color32,
}

impl PoolSnapshot {
    pub fn node(&self, id: HostId) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
