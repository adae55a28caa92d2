use anyhow::Context;
use eframe::{App, Frame, CreationContext, egui};
use egui::{Ui, ScrollArea, RichText, Color32, Layout, Align};
use egui_extras::{Column, TableBuilder};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use workout_planner::config::PlannerConfig;
use workout_planner::notifier::Notifier;
use workout_planner::routines::today;
use workout_planner::{
    kpi, Assignment, Day, FileStorage, PlannerStore, StoreError, WorkoutId, WorkoutInput,
    WorkoutType,
};

const GOLD: Color32 = Color32::from_rgb(212, 175, 55);
const SILVER: Color32 = Color32::from_rgb(192, 192, 192);
const DANGER: Color32 = Color32::from_rgb(255, 90, 106);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PlannerConfig::load()?;
    let data_dir = config.resolved_data_dir()?;
    tracing::info!(data_dir = %data_dir.display(), "starting workout planner");

    let store = PlannerStore::open_with_key(FileStorage::new(data_dir), config.storage_key.clone());
    let notifier = Notifier::new(&config.notifier).context("Failed to build webhook client")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Workout Planner",
        options,
        Box::new(move |cc| Ok(Box::new(PlannerApp::new(cc, store, notifier)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run planner window: {e}"))
}

#[derive(PartialEq, Clone, Copy)]
enum DisplayMode {
    Planner,
    Library,
}

enum PendingAction {
    Unassign(Day, usize),
    Delete(WorkoutId),
}

struct PlannerApp {
    store: PlannerStore<FileStorage>,
    notifier: Notifier,
    form: WorkoutInput,
    selected_workout: Option<WorkoutId>,
    selected_day: Day,
    error: Option<String>,
    confirm_reset: bool,
    display_mode: DisplayMode,
}

impl PlannerApp {
    fn new(cc: &CreationContext, store: PlannerStore<FileStorage>, notifier: Notifier) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        let mut style = (*cc.egui_ctx.style()).clone();
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::new(16.0, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Heading,
            egui::FontId::new(26.0, egui::FontFamily::Proportional),
        );
        cc.egui_ctx.set_style(style);

        PlannerApp {
            store,
            notifier,
            form: WorkoutInput::default(),
            selected_workout: None,
            selected_day: today(),
            error: None,
            confirm_reset: false,
            display_mode: DisplayMode::Planner,
        }
    }

    /// Fire-and-forget; the UI never waits on the webhook.
    fn notify(&self, event: &'static str, payload: Value) {
        if !self.notifier.is_enabled() {
            return;
        }
        let notifier = self.notifier.clone();
        std::thread::spawn(move || {
            if let Err(e) = notifier.track(event, payload) {
                tracing::warn!(event, "webhook notification failed: {}", e);
            }
        });
    }

    fn report(&mut self, result: Result<(), StoreError>) -> bool {
        match result {
            Ok(()) => {
                self.error = None;
                true
            }
            Err(e) => {
                if e.validation().is_none() {
                    tracing::warn!("planner change not applied: {}", e);
                }
                self.error = Some(e.to_string());
                false
            }
        }
    }

    fn add_workout(&mut self) {
        match self.store.create_workout(&self.form) {
            Ok(workout) => {
                self.error = None;
                self.notify(
                    "workout_created",
                    json!({ "id": workout.id, "name": workout.name, "type": workout.kind }),
                );
                self.form = WorkoutInput {
                    kind: self.form.kind,
                    ..Default::default()
                };
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn assign_workout(&mut self) {
        let id = self.selected_workout.clone().unwrap_or_else(|| WorkoutId::from(""));
        let day = self.selected_day;
        let result = self.store.assign_workout(day, &id);
        if self.report(result) {
            self.notify("workout_assigned", json!({ "id": id, "day": day }));
        }
    }

    fn apply(&mut self, action: PendingAction) {
        match action {
            PendingAction::Unassign(day, index) => {
                let result = self.store.unassign(day, index);
                if self.report(result) {
                    self.notify("assignment_removed", json!({ "day": day, "index": index }));
                }
            }
            PendingAction::Delete(id) => {
                let result = self.store.delete_workout(&id);
                if self.report(result) {
                    if self.selected_workout.as_ref() == Some(&id) {
                        self.selected_workout = None;
                    }
                    self.notify("workout_deleted", json!({ "id": id }));
                }
            }
        }
    }

    fn reset_all(&mut self) {
        let result = self.store.reset_all();
        if self.report(result) {
            self.selected_workout = None;
            self.selected_day = Day::Monday;
            self.notify("planner_reset", Value::Null);
        }
    }
}

impl App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new("Workout Planner").heading().strong().color(GOLD));
                ui.label(RichText::new("Black • Gold • Silver").color(SILVER));
                ui.add_space(20.0);
                if ui.selectable_label(self.display_mode == DisplayMode::Planner, "Planner").clicked() {
                    self.display_mode = DisplayMode::Planner;
                }
                if ui.selectable_label(self.display_mode == DisplayMode::Library, "Library").clicked() {
                    self.display_mode = DisplayMode::Library;
                }
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Reset Planner").clicked() {
                        self.confirm_reset = true;
                    }
                });
            });
            ui.add_space(6.0);
        });

        let mut pending = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            match self.display_mode {
                DisplayMode::Planner => {
                    ui.columns(2, |columns| {
                        self.show_create_form(&mut columns[0]);
                        columns[0].separator();
                        self.show_assign_form(&mut columns[0]);
                        columns[0].separator();
                        self.show_kpis(&mut columns[0]);
                        pending = self.show_week(&mut columns[1]);
                    });
                }
                DisplayMode::Library => pending = self.show_library(ui),
            }
        });
        if let Some(action) = pending {
            self.apply(action);
        }

        if self.confirm_reset {
            egui::Window::new("Reset planner?")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("Clear all workouts and the weekly plan? This cannot be undone.");
                    ui.horizontal(|ui| {
                        if ui.button(RichText::new("Clear everything").color(DANGER)).clicked() {
                            self.reset_all();
                            self.confirm_reset = false;
                        }
                        if ui.button("Cancel").clicked() {
                            self.confirm_reset = false;
                        }
                    });
                });
        }
    }
}

impl PlannerApp {
    fn show_error(&self, ui: &mut Ui) {
        if let Some(error) = &self.error {
            ui.label(RichText::new(error.as_str()).color(DANGER));
        }
    }

    fn show_create_form(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Create Workout").heading().strong());
        ui.add(
            egui::TextEdit::singleline(&mut self.form.name)
                .hint_text("Workout name (e.g., Push Day, Legs, HIIT)"),
        );
        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Type")
                .selected_text(self.form.kind.as_str())
                .show_ui(ui, |ui| {
                    for kind in WorkoutType::ALL {
                        ui.selectable_value(&mut self.form.kind, kind, kind.as_str());
                    }
                });
            ui.add(
                egui::TextEdit::singleline(&mut self.form.duration_minutes)
                    .hint_text("Duration (min)")
                    .desired_width(110.0),
            );
        });
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.form.sets).hint_text("Sets").desired_width(80.0));
            ui.add(egui::TextEdit::singleline(&mut self.form.reps).hint_text("Reps").desired_width(80.0));
        });
        ui.add(
            egui::TextEdit::multiline(&mut self.form.notes)
                .hint_text("Notes (optional): exercises, cues, intensity, etc.")
                .desired_rows(3),
        );
        self.show_error(ui);
        if ui.button("Add Workout").clicked() {
            self.add_workout();
        }
    }

    fn show_assign_form(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Assign to Day").heading().strong());

        let selected_text = self
            .selected_workout
            .as_ref()
            .and_then(|id| self.store.snapshot().find(id))
            .map(|w| w.name.clone())
            .unwrap_or_else(|| "Select a workout…".to_string());
        egui::ComboBox::from_label("Workout")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.selected_workout, None, "Select a workout…");
                for workout in self.store.workouts() {
                    ui.selectable_value(
                        &mut self.selected_workout,
                        Some(workout.id.clone()),
                        workout.name.as_str(),
                    );
                }
            });
        egui::ComboBox::from_label("Day")
            .selected_text(self.selected_day.as_str())
            .show_ui(ui, |ui| {
                for day in Day::ALL {
                    ui.selectable_value(&mut self.selected_day, day, day.as_str());
                }
            });

        self.show_error(ui);
        let has_workouts = !self.store.workouts().is_empty();
        if ui.add_enabled(has_workouts, egui::Button::new("Assign Workout")).clicked() {
            self.assign_workout();
        }
    }

    fn show_kpis(&self, ui: &mut Ui) {
        let kpis = kpi::compute_kpis(self.store.workouts(), self.store.plan());
        ui.label(RichText::new("KPI Snapshot").heading().strong());
        ui.horizontal(|ui| {
            for (label, value) in [
                ("Workouts created", kpis.total_workouts_defined.to_string()),
                ("Assignments (week)", kpis.total_assignments.to_string()),
                ("Avg / day", format!("{:.1}", kpis.avg_assignments_per_day)),
            ] {
                ui.vertical(|ui| {
                    ui.label(RichText::new(label).color(SILVER));
                    ui.label(RichText::new(value).size(28.0).strong().color(GOLD));
                });
                ui.add_space(24.0);
            }
        });
    }

    fn show_week(&self, ui: &mut Ui) -> Option<PendingAction> {
        let mut pending = None;
        let today = today();
        ui.label(RichText::new("Weekly Plan").heading().strong());
        ScrollArea::vertical().id_salt("week").show(ui, |ui| {
            for day in Day::ALL {
                let assignments = self.store.assignments(day);
                ui.horizontal(|ui| {
                    let name = RichText::new(day.as_str()).strong();
                    ui.label(if day == today { name.color(GOLD) } else { name });
                    ui.label(RichText::new(format!("{} assigned", assignments.len())).color(SILVER));
                });
                if assignments.is_empty() {
                    ui.label(RichText::new("No workouts assigned.").italics());
                }
                for (index, assignment) in assignments.iter().enumerate() {
                    ui.horizontal(|ui| {
                        match assignment {
                            Assignment::Resolved(workout) => {
                                ui.label(RichText::new(workout.name.as_str()).strong());
                                ui.label(RichText::new(workout.meta_summary()).color(SILVER));
                            }
                            Assignment::Dangling(_) => {
                                ui.label(RichText::new("Deleted workout").strong().color(DANGER));
                                ui.label("This entry references a workout that no longer exists.");
                            }
                        }
                        if ui.small_button("Remove").clicked() {
                            pending = Some(PendingAction::Unassign(day, index));
                        }
                    });
                }
                ui.add_space(8.0);
            }
        });
        pending
    }

    fn show_library(&self, ui: &mut Ui) -> Option<PendingAction> {
        let mut pending = None;
        ui.label(RichText::new("Workout Library").heading().strong());
        if self.store.workouts().is_empty() {
            ui.label("No workouts yet. Create a few templates, then assign them to your week.");
            return None;
        }

        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .column(Column::auto().at_least(160.0))
            .column(Column::auto().at_least(220.0))
            .column(Column::remainder())
            .column(Column::auto())
            .header(24.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Name");
                });
                header.col(|ui| {
                    ui.strong("Details");
                });
                header.col(|ui| {
                    ui.strong("Notes");
                });
                header.col(|ui| {
                    ui.strong("");
                });
            })
            .body(|mut body| {
                for workout in self.store.workouts() {
                    body.row(28.0, |mut row| {
                        row.col(|ui| {
                            ui.label(RichText::new(workout.name.as_str()).strong());
                        });
                        row.col(|ui| {
                            ui.label(workout.meta_summary());
                        });
                        row.col(|ui| {
                            ui.label(workout.notes.as_str());
                        });
                        row.col(|ui| {
                            if ui.button(RichText::new("Delete").color(DANGER)).clicked() {
                                pending = Some(PendingAction::Delete(workout.id.clone()));
                            }
                        });
                    });
                }
            });
        pending
    }
}
