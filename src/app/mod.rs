use eframe::egui::{self, Context};
use poolview::config::PoolOptions;
use poolview::monitor::{HostDirectory, HostId, dispatch};
use poolview::pool::{PoolLayout, TickReport};
use tracing::warn;

mod controls;
mod render_utils;
mod source;
mod view;

pub(crate) use source::FeedSource;

pub struct PoolViewApp {
    hosts: HostDirectory,
    layout: PoolLayout,
    source: FeedSource,
    search: String,
    filter_text: String,
    filter_error: Option<String>,
    hovered: Option<HostId>,
    last_report: TickReport,
    events_applied: usize,
}

impl PoolViewApp {
    pub(crate) fn new(
        _cc: &eframe::CreationContext<'_>,
        layout: PoolLayout,
        source: FeedSource,
    ) -> Self {
        let filter_text = layout.options().platform_filter.clone().unwrap_or_default();
        Self {
            hosts: HostDirectory::new(),
            layout,
            source,
            search: String::new(),
            filter_text,
            filter_error: None,
            hovered: None,
            last_report: TickReport::default(),
            events_applied: 0,
        }
    }

    /// Applies everything the feed produced since the last frame.
    fn pump_feed(&mut self) {
        for event in self.source.poll() {
            dispatch(&event, &mut self.hosts, &mut self.layout);
            self.events_applied += 1;
        }
    }

    fn apply_options(&mut self, options: PoolOptions) {
        match self.layout.set_options(options, &self.hosts) {
            Ok(()) => self.filter_error = None,
            Err(error) => {
                warn!(%error, "rejected pool options");
                self.filter_error = Some(error.to_string());
            }
        }
    }
}

impl eframe::App for PoolViewApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_pool(ui));
    }
}
