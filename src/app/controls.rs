use eframe::egui::{self, Color32, Key, Ui};

use super::PoolViewApp;

impl PoolViewApp {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Compile pool");
        ui.separator();
        ui.add_space(4.0);

        ui.label(self.source.describe());
        ui.label(format!(
            "scheduler: {}",
            if self.hosts.scheduler_online() {
                "online"
            } else {
                "offline"
            }
        ));
        ui.label(format!(
            "hosts: {} shown / {} known",
            self.layout.nodes().len(),
            self.hosts.len()
        ));
        ui.label(format!("jobs in flight: {}", self.layout.links().len()));
        ui.label(format!(
            "tick {}: {} moving, {} collisions",
            self.layout.ticks(),
            self.last_report.moving,
            self.last_report.collisions
        ));
        ui.label(format!("feed events applied: {}", self.events_applied));

        ui.separator();

        let mut running = self.layout.is_running();
        if ui
            .checkbox(&mut running, "Animate")
            .on_hover_text("Pause to freeze the layout. Feed events still apply.")
            .changed()
        {
            self.layout.set_running(running);
        }

        ui.label("Search hosts")
            .on_hover_text("Fuzzy-highlight hosts by short label or full name.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();

        let mut options = self.layout.options().clone();
        let mut changed = false;

        changed |= ui
            .checkbox(&mut options.suppress_domain, "Hide domain names")
            .on_hover_text("Label hosts with the part of their name before the first dot.")
            .changed();
        changed |= ui
            .checkbox(&mut options.show_job_lines, "Show job lines")
            .on_hover_text("Draw a line from each running job to the host that asked for it.")
            .changed();
        changed |= ui
            .checkbox(&mut options.clients_attract_hosts, "Clients follow their servers")
            .on_hover_text("Pull waiting clients toward the hosts compiling for them too.")
            .changed();

        ui.add_space(6.0);
        ui.label("Platform filter (regex)")
            .on_hover_text("Only hosts whose platform matches are shown. Leave empty to show all.");
        let filter_response = ui.text_edit_singleline(&mut self.filter_text);
        let submitted =
            filter_response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() || submitted {
                options.platform_filter = Some(self.filter_text.trim().to_owned())
                    .filter(|pattern| !pattern.is_empty());
                changed = true;
            }
            if ui.button("Clear").clicked() {
                self.filter_text.clear();
                options.platform_filter = None;
                changed = true;
            }
        });

        if changed {
            self.apply_options(options);
        }
        if let Some(error) = &self.filter_error {
            ui.colored_label(Color32::LIGHT_RED, error);
        }

        ui.separator();

        egui::CollapsingHeader::new("Jobs in flight")
            .default_open(false)
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .max_height(320.0)
                    .show(ui, |ui| self.draw_job_list(ui));
            });
    }

    fn draw_job_list(&self, ui: &mut Ui) {
        if self.layout.links().is_empty() {
            ui.label("No jobs running.");
            return;
        }

        for (job, slot) in self.layout.links().iter() {
            let holder = self.layout.nodes().get(slot.holder).map_or("?", |node| node.label());
            let client = self.layout.nodes().get(slot.client).map_or("?", |node| node.label());
            let line = if slot.holder == slot.client {
                format!("#{job} {holder}: {}", slot.state.label())
            } else {
                format!("#{job} {holder} \u{2190} {client}: {}", slot.state.label())
            };
            ui.label(line).on_hover_text(slot.file_name.as_str());
        }
    }
}
