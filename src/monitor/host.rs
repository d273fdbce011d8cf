use std::collections::HashMap;

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::util::palette_color;

pub type HostId = u32;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HostInfo {
    pub name: String,
    pub ip: String,
    pub platform: String,
    pub offline: bool,
    pub no_remote: bool,
    pub max_jobs: u32,
    pub server_speed: f32,
    pub server_load: u32,
}

impl HostInfo {
    pub fn new(name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            platform: platform.into(),
            ..Default::default()
        }
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}

/// What the monitor currently knows about every host it has seen.
#[derive(Debug, Default)]
pub struct HostDirectory {
    hosts: HashMap<HostId, HostInfo>,
    local_host: Option<HostId>,
    scheduler_online: bool,
}

impl HostDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, id: HostId, info: HostInfo) {
        self.hosts.insert(id, info);
    }

    /// Keeps the record around so late job updates can still name the host.
    pub fn mark_offline(&mut self, id: HostId) {
        if let Some(info) = self.hosts.get_mut(&id) {
            info.offline = true;
        }
    }

    pub fn get(&self, id: HostId) -> Option<&HostInfo> {
        self.hosts.get(&id)
    }

    pub fn is_offline(&self, id: HostId) -> bool {
        self.hosts.get(&id).is_none_or(|info| info.offline)
    }

    pub fn ids(&self) -> Vec<HostId> {
        let mut ids = self.hosts.keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn set_local_host(&mut self, id: HostId) {
        self.local_host = Some(id);
    }

    pub fn local_host(&self) -> Option<HostId> {
        self.local_host
    }

    pub fn is_local(&self, id: HostId) -> bool {
        self.local_host == Some(id)
    }

    pub fn set_scheduler_online(&mut self, online: bool) {
        self.scheduler_online = online;
    }

    pub fn scheduler_online(&self) -> bool {
        self.scheduler_online
    }

    pub fn color_for(&self, id: HostId) -> Color32 {
        match self.hosts.get(&id) {
            Some(info) if !info.name.is_empty() => palette_color(&info.name),
            _ => Color32::GRAY,
        }
    }

    pub fn name_for(&self, id: HostId) -> Option<&str> {
        self.hosts.get(&id).map(|info| info.name.as_str())
    }
}
