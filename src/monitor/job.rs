use serde::{Deserialize, Serialize};

use super::host::HostId;

pub type JobId = u32;

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    WaitingForAssignment,
    LocalOnly,
    Compiling,
    Finished,
    Failed,
    Idle,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::WaitingForAssignment => "waiting",
            Self::LocalOnly => "local",
            Self::Compiling => "compiling",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Idle => "idle",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub client: HostId,
    #[serde(default)]
    pub server: Option<HostId>,
    #[serde(default)]
    pub state: JobState,
    #[serde(default)]
    pub file_name: String,
}

impl Job {
    pub fn new(id: JobId, client: HostId, server: Option<HostId>, state: JobState) -> Self {
        Self {
            id,
            client,
            server,
            state,
            file_name: String::new(),
        }
    }

    /// The host doing the work: the client for local jobs, the server otherwise.
    pub fn processor(&self) -> Option<HostId> {
        if self.state == JobState::LocalOnly {
            Some(self.client)
        } else {
            self.server
        }
    }

    pub fn with_state(&self, state: JobState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }
}
