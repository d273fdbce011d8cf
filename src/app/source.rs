use std::collections::VecDeque;
use std::mem;

use poolview::monitor::{HostId, HostInfo, Job, JobId, JobState, MonitorEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PLATFORMS: [&str; 3] = ["x86_64", "x86_64", "aarch64"];
const SOURCE_FILES: [&str; 8] = [
    "src/parser.cpp",
    "src/lexer.cpp",
    "src/codegen/emit.cpp",
    "src/codegen/regalloc.cpp",
    "lib/codec/huffman.c",
    "lib/codec/deflate.c",
    "tools/driver/main.cpp",
    "tests/unit/parser_test.cpp",
];

/// Frames between job events when replaying a recording.
const REPLAY_FRAMES_PER_JOB: u64 = 12;

pub(crate) enum FeedSource {
    Synthetic(ClusterSimulator),
    Replay(Replay),
}

impl FeedSource {
    pub(crate) fn synthetic(host_count: u32, seed: u64) -> Self {
        Self::Synthetic(ClusterSimulator::new(host_count, seed))
    }

    pub(crate) fn replay(events: Vec<MonitorEvent>) -> Self {
        Self::Replay(Replay::new(events))
    }

    /// Events to apply before this frame's tick.
    pub(crate) fn poll(&mut self) -> Vec<MonitorEvent> {
        match self {
            Self::Synthetic(simulator) => simulator.poll(),
            Self::Replay(replay) => replay.poll(),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Synthetic(simulator) => {
                format!("simulated cluster: {} hosts", simulator.hosts.len())
            }
            Self::Replay(replay) => format!(
                "replay: {}/{} events",
                replay.total - replay.pending.len(),
                replay.total
            ),
        }
    }
}

struct RunningJob {
    job: Job,
    ends_at: u64,
}

/// A made-up build farm: one workstation and a rack of builders handing
/// compile jobs to each other.
pub(crate) struct ClusterSimulator {
    rng: StdRng,
    hosts: Vec<(HostId, HostInfo)>,
    running: Vec<RunningJob>,
    next_job: JobId,
    frame: u64,
    announced: bool,
}

impl ClusterSimulator {
    fn new(host_count: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let hosts = (1..=host_count.max(2))
            .map(|id| {
                let name = if id == 1 {
                    "workstation.lab.example".to_owned()
                } else {
                    format!("builder{id:02}.lab.example")
                };
                let mut info =
                    HostInfo::new(name, PLATFORMS[rng.random_range(0..PLATFORMS.len())]);
                info.ip = format!("10.0.0.{id}");
                info.max_jobs = rng.random_range(2..=16);
                info.server_speed = rng.random_range(4.0..16.0);
                (id, info)
            })
            .collect();

        Self {
            rng,
            hosts,
            running: Vec::new(),
            next_job: 1,
            frame: 0,
            announced: false,
        }
    }

    fn poll(&mut self) -> Vec<MonitorEvent> {
        self.frame += 1;

        if !self.announced {
            self.announced = true;
            let mut events = vec![MonitorEvent::Scheduler { online: true }];
            events.extend(self.hosts.iter().map(|(id, info)| MonitorEvent::Host {
                id: *id,
                info: info.clone(),
            }));
            events.push(MonitorEvent::LocalHost { id: 1 });
            return events;
        }

        let mut events = Vec::new();
        self.finish_due_jobs(&mut events);
        if self.rng.random_bool(0.2)
            && let Some(job) = self.start_job()
        {
            events.push(MonitorEvent::Job(job));
        }
        if self.rng.random_bool(0.002) {
            events.push(self.toggle_host());
        }
        events
    }

    fn finish_due_jobs(&mut self, events: &mut Vec<MonitorEvent>) {
        let frame = self.frame;
        let (done, running): (Vec<_>, Vec<_>) = mem::take(&mut self.running)
            .into_iter()
            .partition(|running| running.ends_at <= frame);
        self.running = running;

        for RunningJob { job, .. } in done {
            let state = if self.rng.random_bool(0.05) {
                JobState::Failed
            } else {
                JobState::Finished
            };
            events.push(MonitorEvent::Job(job.with_state(state)));
        }
    }

    fn start_job(&mut self) -> Option<Job> {
        let online = self
            .hosts
            .iter()
            .filter(|(_, info)| !info.offline)
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();
        if online.len() < 2 {
            return None;
        }

        let client = online[self.rng.random_range(0..online.len())];
        let id = self.next_job;
        self.next_job += 1;

        let mut job = if self.rng.random_bool(0.15) {
            Job::new(id, client, None, JobState::LocalOnly)
        } else {
            let servers = online
                .iter()
                .copied()
                .filter(|&host| host != client)
                .collect::<Vec<_>>();
            let server = servers[self.rng.random_range(0..servers.len())];
            Job::new(id, client, Some(server), JobState::Compiling)
        };
        job.file_name = SOURCE_FILES[self.rng.random_range(0..SOURCE_FILES.len())].to_owned();

        self.running.push(RunningJob {
            job: job.clone(),
            ends_at: self.frame + self.rng.random_range(60..400),
        });
        Some(job)
    }

    /// Flips a builder between offline and online. The workstation stays up.
    fn toggle_host(&mut self) -> MonitorEvent {
        let index = self.rng.random_range(1..self.hosts.len());
        let (id, info) = &mut self.hosts[index];
        info.offline = !info.offline;
        MonitorEvent::Host {
            id: *id,
            info: info.clone(),
        }
    }
}

/// Plays back a recorded feed: host and scheduler updates arrive at once,
/// job updates one at a time.
pub(crate) struct Replay {
    pending: VecDeque<MonitorEvent>,
    total: usize,
    frame: u64,
}

impl Replay {
    fn new(events: Vec<MonitorEvent>) -> Self {
        Self {
            total: events.len(),
            pending: events.into(),
            frame: 0,
        }
    }

    fn poll(&mut self) -> Vec<MonitorEvent> {
        self.frame += 1;
        if self.frame % REPLAY_FRAMES_PER_JOB != 1 {
            return Vec::new();
        }

        let mut events = Vec::new();
        while let Some(event) = self.pending.pop_front() {
            let is_job = matches!(event, MonitorEvent::Job(_));
            events.push(event);
            if is_job {
                break;
            }
        }
        events
    }
}
