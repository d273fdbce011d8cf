mod collision;
mod links;
mod node;
mod registry;
mod snapshot;
mod step;

use eframe::egui::Vec2;
use regex::Regex;
use tracing::{debug, info, trace};

use crate::config::{LayoutConfig, PoolConfig, PoolOptions};
use crate::error::{Error, Result};
use crate::monitor::{HostDirectory, HostId, Job, JobState, PoolObserver};

pub use collision::{resolve_all, resolve_pair};
pub use links::{JobLinkTracker, JobSlot};
pub use node::{Node, NodeDescriptor};
pub use registry::NodeRegistry;
pub use snapshot::{LinkSnapshot, NodeSnapshot, PoolSnapshot};
pub use step::{TickReport, contain, tick};

/// The pool view engine: nodes, job slots and the options that steer them.
#[derive(Debug)]
pub struct PoolLayout {
    config: LayoutConfig,
    options: PoolOptions,
    platform_filter: Option<Regex>,
    canvas: Vec2,
    nodes: NodeRegistry,
    links: JobLinkTracker,
    running: bool,
    ticks: u64,
}

impl PoolLayout {
    pub fn new(config: PoolConfig, seed: u64) -> Result<Self> {
        let platform_filter = compile_filter(config.options.platform_filter.as_deref())?;
        Ok(Self {
            config: config.layout,
            options: config.options,
            platform_filter,
            canvas: Vec2::ZERO,
            nodes: NodeRegistry::new(seed),
            links: JobLinkTracker::new(),
            running: true,
            ticks: 0,
        })
    }

    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    /// Nodes checked while the canvas had no area all sit at the origin, so
    /// the first real size spreads them out.
    pub fn set_canvas(&mut self, canvas: Vec2) {
        let had_area = self.canvas.x > 0.0 && self.canvas.y > 0.0;
        self.canvas = canvas;
        if !had_area && canvas.x > 0.0 && canvas.y > 0.0 && !self.nodes.is_empty() {
            self.nodes.scatter(canvas, &self.config);
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn options(&self) -> &PoolOptions {
        &self.options
    }

    /// Applies new options and re-checks every known host against them. An
    /// invalid platform filter leaves the current options in place.
    pub fn set_options(&mut self, options: PoolOptions, hosts: &HostDirectory) -> Result<()> {
        self.platform_filter = compile_filter(options.platform_filter.as_deref())?;
        info!(?options, "pool options changed");
        self.options = options;
        for id in hosts.ids() {
            if hosts.is_offline(id) {
                continue;
            }
            self.check_node(id, hosts);
        }
        Ok(())
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn links(&self) -> &JobLinkTracker {
        &self.links
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn accepts_platform(&self, platform: &str) -> bool {
        self.platform_filter
            .as_ref()
            .is_none_or(|filter| filter.is_match(platform))
    }

    pub fn check_node(&mut self, id: HostId, hosts: &HostDirectory) {
        let Some(info) = hosts.get(id) else {
            trace!(host = id, "check for a host the directory does not know");
            return;
        };

        if !self.accepts_platform(&info.platform) {
            if self.nodes.contains(id) {
                debug!(host = id, platform = %info.platform, "host filtered out by platform");
            }
            self.force_remove(id);
            return;
        }

        if let Some(descriptor) =
            NodeDescriptor::from_directory(id, hosts, self.options.suppress_domain)
        {
            self.nodes.ensure(id, &descriptor, self.canvas, &self.config);
        }
    }

    /// Removes the node if the directory reports the host offline or no
    /// longer knows it.
    pub fn remove_node(&mut self, id: HostId, hosts: &HostDirectory) {
        if !hosts.is_offline(id) {
            trace!(host = id, "ignoring removal of a host that is still online");
            return;
        }
        self.force_remove(id);
    }

    pub fn force_remove(&mut self, id: HostId) {
        if self.nodes.remove(id).is_some() {
            self.links.forget_node(id, &mut self.nodes);
        }
    }

    pub fn update_job(&mut self, job: &Job) {
        self.links.update(job, &mut self.nodes);
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.nodes.clear();
    }

    pub fn tick(&mut self) -> TickReport {
        if !self.running {
            return TickReport::default();
        }

        self.ticks += 1;
        tick(
            &mut self.nodes,
            &self.links,
            &self.config,
            &self.options,
            self.canvas,
        )
    }

    pub fn node_at(&self, point: Vec2) -> Option<&Node> {
        self.nodes.node_at(point)
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let nodes = self
            .nodes
            .iter()
            .map(|node| NodeSnapshot {
                id: node.id(),
                label: node.label().to_owned(),
                position: node.position(),
                radius: node.radius(),
                color: node.color(),
                is_local: node.is_local(),
                activity: self.activity_of(node),
                job_count: node.linked_jobs().len(),
            })
            .collect();

        let links = if self.options.show_job_lines {
            self.links
                .iter()
                .filter(|(_, slot)| slot.client != slot.holder)
                .filter_map(|(job, slot)| {
                    let holder = self.nodes.get(slot.holder)?;
                    let client = self.nodes.get(slot.client)?;
                    Some(LinkSnapshot {
                        job,
                        from: holder.position(),
                        to: client.position(),
                        color: client.base_color(),
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        PoolSnapshot { nodes, links }
    }

    fn activity_of(&self, node: &Node) -> JobState {
        let mut activity = JobState::Idle;
        for job in node.linked_jobs() {
            match self.links.slot(*job).map(|slot| slot.state) {
                Some(JobState::Compiling) => return JobState::Compiling,
                Some(JobState::LocalOnly) => activity = JobState::LocalOnly,
                _ => {}
            }
        }
        activity
    }
}

impl PoolObserver for PoolLayout {
    fn on_job_update(&mut self, job: &Job, _hosts: &HostDirectory) {
        self.update_job(job);
    }

    fn on_node_check(&mut self, host: HostId, hosts: &HostDirectory) {
        self.check_node(host, hosts);
    }

    fn on_node_removed(&mut self, host: HostId, hosts: &HostDirectory) {
        self.remove_node(host, hosts);
    }

    fn on_scheduler_state_changed(&mut self, online: bool, hosts: &HostDirectory) {
        if online {
            info!(hosts = hosts.len(), "scheduler online");
            for id in hosts.ids() {
                self.check_node(id, hosts);
            }
        } else {
            info!("scheduler offline; clearing the pool");
            self.clear();
        }
    }
}

fn compile_filter(pattern: Option<&str>) -> Result<Option<Regex>> {
    let Some(pattern) = pattern.map(str::trim).filter(|pattern| !pattern.is_empty()) else {
        return Ok(None);
    };
    Regex::new(pattern)
        .map(Some)
        .map_err(|source| Error::PlatformFilter {
            pattern: pattern.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::HostInfo;
    use eframe::egui::vec2;

    fn hosts() -> HostDirectory {
        let mut hosts = HostDirectory::new();
        hosts.upsert(3, HostInfo::new("server3.lab", "x86_64"));
        hosts.upsert(4, HostInfo::new("server4.lab", "aarch64"));
        hosts.upsert(7, HostInfo::new("client7.lab", "x86_64"));
        hosts.set_local_host(7);
        hosts
    }

    fn layout(options: PoolOptions) -> PoolLayout {
        let mut layout = PoolLayout::new(
            PoolConfig {
                layout: LayoutConfig::default(),
                options,
            },
            11,
        )
        .unwrap();
        layout.set_canvas(vec2(800.0, 600.0));
        layout
    }

    fn populated(options: PoolOptions) -> (PoolLayout, HostDirectory) {
        let hosts = hosts();
        let mut layout = layout(options);
        for id in hosts.ids() {
            layout.check_node(id, &hosts);
        }
        (layout, hosts)
    }

    #[test]
    fn hosts_checked_before_sizing_are_spread_once_sized() {
        let hosts = hosts();
        let mut layout = PoolLayout::new(PoolConfig::default(), 5).unwrap();
        for id in hosts.ids() {
            layout.check_node(id, &hosts);
        }
        assert!(layout.nodes().iter().all(|node| node.position() == Vec2::ZERO));

        let canvas = vec2(800.0, 600.0);
        layout.set_canvas(canvas);

        let nodes = layout.nodes().iter().collect::<Vec<_>>();
        assert_eq!(nodes.len(), 3);
        for (i, a) in nodes.iter().enumerate() {
            let p = a.position();
            assert!(p.x >= a.radius() && p.x <= canvas.x - a.radius());
            assert!(p.y >= a.radius() && p.y <= canvas.y - a.radius());
            for b in &nodes[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }

        // Resizing an already sized canvas leaves positions alone.
        let before = layout.nodes().iter().map(Node::position).collect::<Vec<_>>();
        layout.set_canvas(vec2(900.0, 700.0));
        let after = layout.nodes().iter().map(Node::position).collect::<Vec<_>>();
        assert_eq!(before, after);
    }

    #[test]
    fn platform_filter_keeps_matching_hosts_only() {
        let (layout, _) = populated(PoolOptions {
            platform_filter: Some("x86".to_owned()),
            ..PoolOptions::default()
        });
        assert_eq!(layout.nodes().len(), 2);
        assert!(!layout.nodes().contains(4));
    }

    #[test]
    fn tightening_the_filter_force_removes_online_hosts() {
        let (mut layout, hosts) = populated(PoolOptions::default());
        layout.update_job(&Job::new(1, 7, Some(4), JobState::Compiling));
        assert_eq!(layout.links().len(), 1);

        layout
            .set_options(
                PoolOptions {
                    platform_filter: Some("^x86_64$".to_owned()),
                    ..PoolOptions::default()
                },
                &hosts,
            )
            .unwrap();

        assert!(!layout.nodes().contains(4));
        assert!(layout.links().is_empty());
        assert!(!layout.nodes().get(7).unwrap().is_active_client());
    }

    #[test]
    fn invalid_filter_is_rejected_and_previous_options_kept() {
        let (mut layout, hosts) = populated(PoolOptions::default());
        let error = layout
            .set_options(
                PoolOptions {
                    platform_filter: Some("(".to_owned()),
                    ..PoolOptions::default()
                },
                &hosts,
            )
            .unwrap_err();

        assert!(matches!(error, Error::PlatformFilter { .. }));
        assert_eq!(layout.options(), &PoolOptions::default());
        assert_eq!(layout.nodes().len(), 3);
        assert!(PoolLayout::new(
            PoolConfig {
                options: PoolOptions {
                    platform_filter: Some("[".to_owned()),
                    ..PoolOptions::default()
                },
                ..PoolConfig::default()
            },
            1
        )
        .is_err());
    }

    #[test]
    fn labels_follow_domain_suppression() {
        let (mut layout, hosts) = populated(PoolOptions::default());
        assert_eq!(layout.nodes().get(3).unwrap().label(), "server3");

        layout
            .set_options(
                PoolOptions {
                    suppress_domain: false,
                    ..PoolOptions::default()
                },
                &hosts,
            )
            .unwrap();
        let node = layout.nodes().get(3).unwrap();
        assert_eq!(node.label(), "server3.lab");
        assert_eq!(node.radius(), layout.config().label.radius_for("server3.lab"));
    }

    #[test]
    fn remove_node_waits_for_the_host_to_go_offline() {
        let (mut layout, mut hosts) = populated(PoolOptions::default());

        layout.remove_node(3, &hosts);
        assert!(layout.nodes().contains(3));

        hosts.mark_offline(3);
        layout.remove_node(3, &hosts);
        assert!(!layout.nodes().contains(3));

        layout.remove_node(3, &hosts);
        layout.force_remove(99);
        assert_eq!(layout.nodes().len(), 2);
    }

    #[test]
    fn snapshot_reports_links_and_activity() {
        let (mut layout, _) = populated(PoolOptions::default());
        layout.update_job(&Job::new(1, 7, Some(3), JobState::Compiling));
        layout.update_job(&Job::new(2, 4, None, JobState::LocalOnly));

        let snapshot = layout.snapshot();

        assert_eq!(snapshot.links.len(), 1);
        let link = &snapshot.links[0];
        assert_eq!(link.job, 1);
        assert_eq!(link.from, snapshot.node(3).unwrap().position);
        assert_eq!(link.to, snapshot.node(7).unwrap().position);
        assert_eq!(snapshot.node(3).unwrap().activity, JobState::Compiling);
        assert_eq!(snapshot.node(4).unwrap().activity, JobState::LocalOnly);
        assert_eq!(snapshot.node(7).unwrap().activity, JobState::Idle);
        assert!(snapshot.node(7).unwrap().is_local);
    }

    #[test]
    fn hidden_job_lines_are_left_out() {
        let (mut layout, _) = populated(PoolOptions {
            show_job_lines: false,
            ..PoolOptions::default()
        });
        layout.update_job(&Job::new(1, 7, Some(3), JobState::Compiling));

        assert!(layout.snapshot().links.is_empty());
    }

    #[test]
    fn scheduler_outage_clears_and_recovery_restores() {
        let (mut layout, hosts) = populated(PoolOptions::default());
        layout.update_job(&Job::new(1, 7, Some(3), JobState::Compiling));

        layout.on_scheduler_state_changed(false, &hosts);
        assert!(layout.nodes().is_empty());
        assert!(layout.links().is_empty());

        layout.on_scheduler_state_changed(true, &hosts);
        assert_eq!(layout.nodes().len(), 3);
    }

    #[test]
    fn paused_layout_does_not_move() {
        let (mut layout, _) = populated(PoolOptions::default());
        let before = layout.snapshot();

        layout.set_running(false);
        assert_eq!(layout.tick(), TickReport::default());
        assert_eq!(layout.snapshot(), before);
        assert_eq!(layout.ticks(), 0);

        layout.set_running(true);
        layout.tick();
        assert_eq!(layout.ticks(), 1);
        assert_ne!(layout.snapshot(), before);
    }
}
