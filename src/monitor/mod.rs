mod event;
mod host;
mod job;

pub use event::{MonitorEvent, PoolObserver, dispatch, parse_feed};
pub use host::{HostDirectory, HostId, HostInfo};
pub use job::{Job, JobId, JobState};
