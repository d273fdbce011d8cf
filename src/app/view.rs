use std::collections::HashSet;

use eframe::egui::{Align2, Color32, FontId, Sense, Stroke, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use poolview::config::LABEL_FONT_SIZE;
use poolview::monitor::{HostId, JobState};
use poolview::pool::{Node, PoolSnapshot};

use super::PoolViewApp;
use super::render_utils::{blend_color, dim_color, draw_background, label_color};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl PoolViewApp {
    /// Hosts whose label or full name matches the search box, or `None`
    /// when the box is empty.
    fn search_matches(&self, snapshot: &PoolSnapshot) -> Option<HashSet<HostId>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        let matches = snapshot
            .nodes
            .iter()
            .filter(|node| {
                fuzzy_match_score(&matcher, &node.label, query).is_some()
                    || self
                        .hosts
                        .name_for(node.id)
                        .is_some_and(|name| fuzzy_match_score(&matcher, name, query).is_some())
            })
            .map(|node| node.id)
            .collect();
        Some(matches)
    }

    pub(in crate::app) fn draw_pool(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        // The canvas has to be sized before new hosts are placed on it.
        self.layout.set_canvas(rect.size());
        self.pump_feed();
        if self.layout.is_running() {
            self.last_report = self.layout.tick();
            ui.ctx().request_repaint();
        }

        let snapshot = self.layout.snapshot();
        let matches = self.search_matches(&snapshot);
        let origin = rect.min;

        for link in &snapshot.links {
            let dimmed = matches.as_ref().is_some_and(|matches| {
                self.layout
                    .links()
                    .slot(link.job)
                    .is_none_or(|slot| !matches.contains(&slot.holder) && !matches.contains(&slot.client))
            });
            let color = if dimmed {
                dim_color(link.color, 0.25)
            } else {
                link.color.gamma_multiply(0.85)
            };
            painter.line_segment([origin + link.from, origin + link.to], Stroke::new(1.5, color));
        }

        self.hovered = response
            .hover_pos()
            .and_then(|pointer| self.layout.node_at(pointer - origin))
            .map(Node::id);

        for node in &snapshot.nodes {
            let center = origin + node.position;
            let highlighted = matches
                .as_ref()
                .is_none_or(|matches| matches.contains(&node.id));

            let mut fill = node.color;
            if node.activity == JobState::Compiling {
                fill = blend_color(fill, Color32::WHITE, 0.18);
            }
            if !highlighted {
                fill = dim_color(fill, 0.3);
            }

            let stroke = if self.hovered == Some(node.id) {
                Stroke::new(2.5, Color32::from_rgb(255, 214, 102))
            } else if node.is_local {
                Stroke::new(2.5, Color32::WHITE)
            } else {
                Stroke::new(1.0, dim_color(fill, 0.6))
            };

            painter.circle_filled(center, node.radius, fill);
            painter.circle_stroke(center, node.radius, stroke);
            painter.text(
                center,
                Align2::CENTER_CENTER,
                &node.label,
                FontId::monospace(LABEL_FONT_SIZE),
                label_color(fill),
            );
        }

        if snapshot.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                if self.hosts.scheduler_online() {
                    "No hosts match the current filter."
                } else {
                    "Waiting for the scheduler..."
                },
                FontId::proportional(16.0),
                Color32::GRAY,
            );
        }

        if let Some(id) = self.hovered {
            response.on_hover_ui_at_pointer(|ui| self.host_tooltip(ui, id));
        }
    }

    fn host_tooltip(&self, ui: &mut Ui, id: HostId) {
        let Some(info) = self.hosts.get(id) else {
            return;
        };

        ui.strong(&info.name);
        if !info.ip.is_empty() {
            ui.label(format!("address: {}", info.ip));
        }
        ui.label(format!("platform: {}", info.platform));
        ui.label(format!(
            "max jobs: {}  speed: {:.1}  load: {}",
            info.max_jobs, info.server_speed, info.server_load
        ));
        if info.no_remote {
            ui.label("does not accept remote jobs");
        }

        let Some(node) = self.layout.nodes().get(id) else {
            return;
        };
        if node.is_active_client() {
            ui.label(format!("waiting on {} remote jobs", node.client_jobs().len()));
        }
        if node.linked_jobs().is_empty() {
            return;
        }

        ui.separator();
        for job in node.linked_jobs() {
            let Some(slot) = self.layout.links().slot(*job) else {
                continue;
            };
            let client = self.hosts.name_for(slot.client).unwrap_or("?");
            ui.label(format!(
                "#{job} {} {} for {client}",
                slot.state.label(),
                slot.file_name
            ));
        }
    }
}
