use std::collections::HashMap;

use tracing::debug;

use crate::monitor::{HostId, Job, JobId, JobState};

use super::registry::NodeRegistry;

/// The node currently representing a job, plus what is needed to draw and
/// attract along it.
#[derive(Clone, Debug, PartialEq)]
pub struct JobSlot {
    pub holder: HostId,
    pub client: HostId,
    pub state: JobState,
    pub file_name: String,
}

/// Tracks which node holds each in-flight job.
#[derive(Debug, Default)]
pub struct JobLinkTracker {
    slots: HashMap<JobId, JobSlot>,
}

impl JobLinkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, job: JobId) -> Option<&JobSlot> {
        self.slots.get(&job)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots ordered by job id.
    pub fn iter(&self) -> impl Iterator<Item = (JobId, &JobSlot)> {
        let mut slots = self.slots.iter().map(|(id, slot)| (*id, slot)).collect::<Vec<_>>();
        slots.sort_unstable_by_key(|(id, _)| *id);
        slots.into_iter()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn update(&mut self, job: &Job, nodes: &mut NodeRegistry) {
        if matches!(job.state, JobState::WaitingForAssignment | JobState::Idle) {
            return;
        }

        // Local jobs finish without a server, so terminal updates are matched by id alone.
        if job.state.is_terminal() {
            if let Some(slot) = self.slots.remove(&job.id) {
                release(job.id, &slot, nodes);
            }
            return;
        }

        let Some(processor) = job.processor() else {
            debug!(job = job.id, client = job.client, "job has no server yet; skipping");
            return;
        };

        if self.slots.contains_key(&job.id) {
            self.update_slot(job, processor, nodes);
            return;
        }

        let Some(holder) = nodes.get_mut(processor) else {
            debug!(job = job.id, processor, "job processor is not on the canvas; dropping");
            return;
        };
        holder.linked_jobs.insert(job.id);

        self.slots.insert(
            job.id,
            JobSlot {
                holder: processor,
                client: job.client,
                state: job.state,
                file_name: job.file_name.clone(),
            },
        );
        if job.state == JobState::Compiling {
            mark_client(job, processor, nodes);
        }
    }

    fn update_slot(&mut self, job: &Job, processor: HostId, nodes: &mut NodeRegistry) {
        let Some(slot) = self.slots.get_mut(&job.id) else {
            return;
        };

        // Re-marked below if the job is still compiling for a remote client.
        if let Some(client) = nodes.get_mut(slot.client) {
            client.client_jobs.remove(&job.id);
        }

        if processor != slot.holder && nodes.contains(processor) {
            if let Some(old) = nodes.get_mut(slot.holder) {
                old.linked_jobs.remove(&job.id);
            }
            if let Some(new) = nodes.get_mut(processor) {
                new.linked_jobs.insert(job.id);
            }
            slot.holder = processor;
        }

        slot.state = job.state;
        slot.client = job.client;
        slot.file_name.clone_from(&job.file_name);
        if job.state == JobState::Compiling {
            mark_client(job, slot.holder, nodes);
        }
    }

    /// Drops every slot held by `host` along with the client marks those slots set.
    pub fn forget_node(&mut self, host: HostId, nodes: &mut NodeRegistry) {
        let held = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.holder == host)
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();

        for job in held {
            if let Some(slot) = self.slots.remove(&job) {
                release(job, &slot, nodes);
            }
        }
    }

    /// Hosts `node` is drawn toward, in job order: the clients of the jobs it
    /// holds, and with `clients_attract_hosts` the holders of the jobs it is a
    /// client of.
    pub fn partners(
        &self,
        node: HostId,
        nodes: &NodeRegistry,
        clients_attract_hosts: bool,
    ) -> Vec<HostId> {
        let Some(this) = nodes.get(node) else {
            return Vec::new();
        };

        let mut partners = Vec::new();
        let mut push = |other: HostId| {
            if other != node && nodes.contains(other) && !partners.contains(&other) {
                partners.push(other);
            }
        };

        for job in &this.linked_jobs {
            if let Some(slot) = self.slots.get(job) {
                push(slot.client);
            }
        }

        if clients_attract_hosts {
            for job in &this.client_jobs {
                if let Some(slot) = self.slots.get(job) {
                    push(slot.holder);
                }
            }
        }

        partners
    }
}

fn mark_client(job: &Job, holder: HostId, nodes: &mut NodeRegistry) {
    if job.client == holder {
        return;
    }
    if let Some(client) = nodes.get_mut(job.client) {
        client.client_jobs.insert(job.id);
    }
}

fn release(job: JobId, slot: &JobSlot, nodes: &mut NodeRegistry) {
    if let Some(holder) = nodes.get_mut(slot.holder) {
        holder.linked_jobs.remove(&job);
    }
    if let Some(client) = nodes.get_mut(slot.client) {
        client.client_jobs.remove(&job);
    }
}
