use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};

use super::host::{HostDirectory, HostId, HostInfo};
use super::job::Job;

/// One line of a monitor feed.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    Host { id: HostId, info: HostInfo },
    HostRemoved { id: HostId },
    LocalHost { id: HostId },
    Job(Job),
    Scheduler { online: bool },
}

/// A view that reacts to the monitor feed.
pub trait PoolObserver {
    fn on_job_update(&mut self, job: &Job, hosts: &HostDirectory);
    fn on_node_check(&mut self, host: HostId, hosts: &HostDirectory);
    fn on_node_removed(&mut self, host: HostId, hosts: &HostDirectory);
    fn on_scheduler_state_changed(&mut self, online: bool, hosts: &HostDirectory);
}

/// Parses a JSON-lines feed. Blank lines and `#` comments are skipped.
pub fn parse_feed(raw: &str) -> Result<Vec<MonitorEvent>> {
    let mut events = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event = serde_json::from_str(line).map_err(|source| Error::Feed {
            line: index + 1,
            source,
        })?;
        events.push(event);
    }

    debug!(events = events.len(), "parsed monitor feed");
    Ok(events)
}

pub fn dispatch(event: &MonitorEvent, hosts: &mut HostDirectory, observer: &mut dyn PoolObserver) {
    trace!(?event, "dispatching monitor event");
    match event {
        MonitorEvent::Host { id, info } => {
            hosts.upsert(*id, info.clone());
            if info.offline {
                observer.on_node_removed(*id, hosts);
            } else {
                observer.on_node_check(*id, hosts);
            }
        }
        MonitorEvent::HostRemoved { id } => {
            hosts.mark_offline(*id);
            observer.on_node_removed(*id, hosts);
        }
        MonitorEvent::LocalHost { id } => {
            hosts.set_local_host(*id);
            observer.on_node_check(*id, hosts);
        }
        MonitorEvent::Job(job) => observer.on_job_update(job, hosts),
        MonitorEvent::Scheduler { online } => {
            hosts.set_scheduler_online(*online);
            observer.on_scheduler_state_changed(*online, hosts);
        }
    }
}
