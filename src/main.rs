//! Planner window and persistent user settings.

use dirs_next as dirs;
use eframe::{App, Frame, NativeOptions, egui};
use egui::{Color32, RichText};
use egui_extras::Column;
use egui_plot::Plot;
use log::info;
use rfd::FileDialog;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

mod advice;
mod catalog;
mod coefficients;
mod drills;
mod export;
mod identity;
mod numeric;
mod planner;
mod plotting;
mod report;
mod sessions;
mod storage;
mod variations;
mod volume;

use advice::{AdviceClient, resolve_api_key};
use catalog::{DRILL_CATEGORIES, parse_preset, suggest_presets};
use coefficients::{ALL_DAYS, TrainingDay};
use drills::{Drill, DrillEdit, DrillField};
use identity::{ConfiguredIdentity, Identity, UserProfile, sign_in_or_guest};
use numeric::format_number;
use planner::{DEFAULT_TEAM_NAME, Planner};
use storage::{LocalStore, Persistence};
use variations::{Balance, VariationField};

fn default_team_name() -> String {
    DEFAULT_TEAM_NAME.to_string()
}

fn default_advice_endpoint() -> String {
    advice::DEFAULT_ENDPOINT.to_string()
}

fn default_advice_model() -> String {
    advice::DEFAULT_MODEL.to_string()
}

/// Persistent configuration for the planner window and its collaborators.
///
/// Serialized to a JSON file in the user config directory. Every field has a
/// serde default so older files keep loading as new options are added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Settings {
    #[serde(default = "default_team_name")]
    team_name: String,
    #[serde(default)]
    selected_day: TrainingDay,
    /// Base URL of the cloud document store; cloud saving is off when unset.
    #[serde(default)]
    cloud_url: Option<String>,
    #[serde(default)]
    cloud_token: Option<String>,
    /// Coach profile used to sign in. Guest mode when unset.
    #[serde(default)]
    profile: Option<UserProfile>,
    #[serde(default = "default_advice_endpoint")]
    advice_endpoint: String,
    #[serde(default = "default_advice_model")]
    advice_model: String,
    /// Overridden by the `GEMINI_API_KEY` or `API_KEY` environment variables.
    #[serde(default)]
    advice_api_key: Option<String>,
    #[serde(default)]
    last_export_dir: Option<String>,
}

impl Settings {
    const FILE: &'static str = "training_planner_settings.json";

    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(Self::FILE))
    }

    fn load() -> Self {
        if let Some(path) = Self::path() {
            if let Ok(data) = std::fs::read_to_string(&path) {
                if let Ok(cfg) = serde_json::from_str(&data) {
                    return cfg;
                }
            }
        }
        Self::default()
    }

    fn save(&self) {
        if let Some(path) = Self::path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(data) = serde_json::to_string_pretty(self) {
                let _ = std::fs::write(path, data);
            }
        }
    }

    fn persistence(&self) -> Persistence {
        Persistence {
            local: LocalStore::new(),
            cloud_url: self.cloud_url.clone(),
            cloud_token: self.cloud_token.clone(),
        }
    }

    fn advice_client(&self) -> AdviceClient {
        AdviceClient::new(
            &self.advice_endpoint,
            &self.advice_model,
            resolve_api_key(self.advice_api_key.as_deref()),
        )
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            team_name: default_team_name(),
            selected_day: TrainingDay::Monday,
            cloud_url: None,
            cloud_token: None,
            profile: None,
            advice_endpoint: default_advice_endpoint(),
            advice_model: default_advice_model(),
            advice_api_key: None,
            last_export_dir: None,
        }
    }
}

/// A coach interaction, applied after the frame has been laid out.
#[derive(Debug, Clone, PartialEq)]
enum Action {
    AddDrill,
    AddNamedDrill(String, String),
    RemoveDrill(String),
    EditDrillText(String, DrillField, String),
    ApplyPreset(String, &'static str),
    Generate,
    AdjustTarget(u32, String),
    SetRest(u32, String),
    AddVariation(u32, i64),
    EditVariationText(u32, String, VariationField, String),
    RemoveVariation(u32, String),
    Save,
    Load,
    AskAdvice,
    SuggestDrills,
    SignIn,
    SignOut,
    ExportSessions,
    ExportVolume,
    PrintPlan,
}

const NOTICE_DURATION: Duration = Duration::from_secs(6);

struct PlannerApp {
    planner: Planner,
    settings: Settings,
    identity: Identity,
    advice: Option<String>,
    suggestion_category: String,
    suggestions: Vec<String>,
    notice: Option<(String, Instant)>,
    /// Numeric text as typed, keyed by drill id and field.
    drill_text: HashMap<(String, DrillField), String>,
    /// Sets text as typed, keyed by variation id.
    sets_text: HashMap<String, String>,
    show_settings: bool,
    show_suggestions: bool,
    settings_dirty: bool,
}

impl Default for PlannerApp {
    fn default() -> Self {
        let settings = Settings::load();
        let mut planner = Planner::default();
        planner.team_name = settings.team_name.clone();
        planner.selected_day = settings.selected_day;
        Self {
            planner,
            settings,
            identity: Identity::Guest,
            advice: None,
            suggestion_category: DRILL_CATEGORIES[0].to_string(),
            suggestions: Vec::new(),
            notice: None,
            drill_text: HashMap::new(),
            sets_text: HashMap::new(),
            show_settings: false,
            show_suggestions: false,
            settings_dirty: false,
        }
    }
}

fn balance_color(balance: Balance) -> Color32 {
    match balance {
        Balance::Balanced => Color32::from_rgb(16, 185, 129),
        Balance::Under => Color32::from_rgb(245, 158, 11),
        Balance::Over => Color32::from_rgb(244, 63, 94),
    }
}

fn optional_text(ui: &mut egui::Ui, value: &mut Option<String>) -> bool {
    let mut text = value.clone().unwrap_or_default();
    let changed = ui.text_edit_singleline(&mut text).changed();
    if changed {
        *value = if text.trim().is_empty() { None } else { Some(text) };
    }
    changed
}

fn export_dialog(last_dir: Option<&str>) -> FileDialog {
    let dialog = FileDialog::new()
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"]);
    match last_dir {
        Some(dir) => dialog.set_directory(dir),
        None => dialog,
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

impl PlannerApp {
    fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.notice = Some((message, Instant::now()));
    }

    fn remember_export_dir(&mut self, path: &Path) {
        if let Some(dir) = path.parent() {
            self.settings.last_export_dir = Some(dir.display().to_string());
            self.settings_dirty = true;
        }
    }

    /// Base or fact as the coach typed it, or the stored value.
    fn drill_number_text(&self, d: &Drill, field: DrillField) -> String {
        if let Some(text) = self.drill_text.get(&(d.id.clone(), field)) {
            return text.clone();
        }
        match field {
            DrillField::Base => format_number(d.base),
            DrillField::Fact => format_number(d.fact),
            DrillField::Category => d.category.clone(),
            DrillField::Name => d.name.clone(),
        }
    }

    fn finish_export(&mut self, what: &str, path: &Path, result: Result<(), String>) {
        match result {
            Ok(()) => self.notify(format!("Exported {what} to {}", path.display())),
            Err(e) => {
                log::error!("Failed to export {what}: {e}");
                self.notify(format!("Export failed: {e}"));
            }
        }
        self.remember_export_dir(path);
    }

    fn export_sessions_to(&mut self, path: &Path) {
        let sessions = self.planner.plan().sessions();
        let result = if is_csv(path) {
            export::save_sessions_csv(path, sessions).map_err(|e| e.to_string())
        } else {
            export::save_sessions_json(path, sessions).map_err(|e| e.to_string())
        };
        self.finish_export("session plan", path, result);
    }

    fn export_volume_to(&mut self, path: &Path) {
        let drills = self.planner.registry().drills();
        let result = if is_csv(path) {
            export::save_weekly_volume_csv(path, drills).map_err(|e| e.to_string())
        } else {
            export::save_weekly_volume_json(path, drills).map_err(|e| e.to_string())
        };
        self.finish_export("weekly volume", path, result);
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::AddDrill => {
                self.planner.add_drill();
            }
            Action::AddNamedDrill(category, name) => {
                let id = self.planner.add_drill();
                self.planner.update_drill(&id, DrillEdit::Category(category));
                self.planner.update_drill(&id, DrillEdit::Name(name));
            }
            Action::RemoveDrill(id) => {
                self.drill_text.retain(|(drill_id, _), _| *drill_id != id);
                self.planner.remove_drill(&id);
            }
            Action::EditDrillText(id, field, text) => {
                if matches!(field, DrillField::Base | DrillField::Fact) {
                    self.drill_text.insert((id.clone(), field), text.clone());
                }
                self.planner.update_drill_text(&id, field, &text);
            }
            Action::ApplyPreset(id, preset) => {
                let (category, name) = parse_preset(preset);
                if let Some(category) = category {
                    self.planner.update_drill(&id, DrillEdit::Category(category));
                }
                self.planner.update_drill(&id, DrillEdit::Name(name));
            }
            Action::Generate => self.planner.generate_plan(),
            Action::AdjustTarget(id, text) => {
                self.planner.adjust_target(id, &text);
            }
            Action::SetRest(id, text) => {
                self.planner.set_rest(id, &text);
            }
            Action::AddVariation(id, reps) => {
                self.planner.add_variation(id, reps);
            }
            Action::EditVariationText(id, var_id, field, text) => {
                if field == VariationField::Sets {
                    self.sets_text.insert(var_id.clone(), text.clone());
                }
                self.planner.update_variation_text(id, &var_id, field, &text);
            }
            Action::RemoveVariation(id, var_id) => {
                self.sets_text.remove(&var_id);
                self.planner.remove_variation(id, &var_id);
            }
            Action::Save => {
                let persistence = self.settings.persistence();
                match persistence.save(&self.identity, &self.planner.snapshot()) {
                    Ok(outcome) => self.notify(outcome.notice()),
                    Err(e) => {
                        log::error!("Failed to save plan: {e}");
                        self.notify(format!("Save failed: {e}"));
                    }
                }
            }
            Action::Load => {
                let persistence = self.settings.persistence();
                match persistence.load(&self.identity) {
                    Ok(Some(snapshot)) => {
                        self.planner.restore(snapshot);
                        self.drill_text.clear();
                        self.sets_text.clear();
                        self.settings.team_name = self.planner.team_name.clone();
                        self.settings_dirty = true;
                        self.notify("Plan loaded. Press Refresh Data to rebuild sessions.");
                    }
                    Ok(None) => self.notify("No saved plan found."),
                    Err(e) => {
                        log::error!("Failed to load plan: {e}");
                        self.notify(format!("Load failed: {e}"));
                    }
                }
            }
            Action::AskAdvice => {
                if let Some(summary) = self.planner.advice_summary() {
                    let client = self.settings.advice_client();
                    self.advice = Some(client.training_advice(&self.planner.team_name, &summary));
                }
            }
            Action::SuggestDrills => {
                let client = self.settings.advice_client();
                self.suggestions = client.drill_suggestions(&self.suggestion_category);
                if self.suggestions.is_empty() {
                    self.notify("No drill suggestions available.");
                }
            }
            Action::SignIn => {
                let provider = ConfiguredIdentity::new(self.settings.profile.clone());
                let (identity, notice) = sign_in_or_guest(&provider);
                self.identity = identity;
                match notice {
                    Some(n) => self.notify(n),
                    None => self.notify(format!("Signed in as {}", self.identity.label())),
                }
            }
            Action::SignOut => {
                self.identity = Identity::Guest;
                self.notify("Signed out. Using guest mode.");
            }
            Action::ExportSessions => {
                if let Some(path) = export_dialog(self.settings.last_export_dir.as_deref())
                    .set_file_name("session_plan.csv")
                    .save_file()
                {
                    self.export_sessions_to(&path);
                }
            }
            Action::ExportVolume => {
                if let Some(path) = export_dialog(self.settings.last_export_dir.as_deref())
                    .set_file_name("weekly_volume.csv")
                    .save_file()
                {
                    self.export_volume_to(&path);
                }
            }
            Action::PrintPlan => {
                let mut dialog = FileDialog::new()
                    .add_filter("HTML", &["html"])
                    .set_file_name("training_plan.html");
                if let Some(dir) = self.settings.last_export_dir.as_deref() {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(path) = dialog.save_file() {
                    match report::export_html_plan(&path, &self.planner) {
                        Ok(()) => {
                            if let Err(e) = open::that(&path) {
                                log::error!("Failed to open {}: {e}", path.display());
                            }
                        }
                        Err(e) => {
                            log::error!("Failed to write plan: {e}");
                            self.notify(format!("Print failed: {e}"));
                        }
                    }
                    self.remember_export_dir(&path);
                }
            }
        }
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                for (label, action) in [
                    ("Save", Action::Save),
                    ("Load", Action::Load),
                    ("Export Session Plan", Action::ExportSessions),
                    ("Export Weekly Volume", Action::ExportVolume),
                    ("Print Plan", Action::PrintPlan),
                ] {
                    if ui.button(label).clicked() {
                        actions.push(action);
                        ui.close_menu();
                    }
                }
                if ui.button("Settings").clicked() {
                    self.show_settings = true;
                    ui.close_menu();
                }
            });
            ui.menu_button("Account", |ui| {
                if self.identity.is_guest() {
                    if ui.button("Sign In").clicked() {
                        actions.push(Action::SignIn);
                        ui.close_menu();
                    }
                } else if ui.button("Sign Out").clicked() {
                    actions.push(Action::SignOut);
                    ui.close_menu();
                }
            });
            ui.menu_button("Drills", |ui| {
                if ui.button("Drill Ideas").clicked() {
                    self.show_suggestions = true;
                    ui.close_menu();
                }
            });
        });
    }

    fn volume_section(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            ui.heading("1. Weekly Volume");
            if ui.button("Add Drill").clicked() {
                actions.push(Action::AddDrill);
            }
            if ui
                .add_enabled(!self.planner.registry().is_empty(), egui::Button::new("Ask AI"))
                .clicked()
            {
                actions.push(Action::AskAdvice);
            }
            ui.weak(format!("{} drills", self.planner.registry().len()));
        });

        let drills: Vec<Drill> = self.planner.registry().drills().to_vec();
        if drills.is_empty() {
            ui.label("No drills yet. Add a drill to start planning.");
            return;
        }

        ui.push_id("drill_table", |ui| {
            let row_height = ui.text_style_height(&egui::TextStyle::Body) + 8.0;
            let mut table = egui_extras::TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .column(Column::auto())
                .column(Column::auto())
                .column(Column::auto())
                .column(Column::auto())
                .column(Column::auto())
                .column(Column::auto());
            for _ in ALL_DAYS {
                table = table.column(Column::auto());
            }
            table
                .column(Column::auto())
                .header(row_height * 1.6, |mut header| {
                    for title in ["NO", "CATEGORY", "DRILL ITEM", "BASE", "FACT", "TOTAL"] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                    for day in ALL_DAYS {
                        header.col(|ui| {
                            ui.vertical(|ui| {
                                ui.strong(day.short_name());
                                ui.small(day.percent_label());
                            });
                        });
                    }
                    header.col(|_ui| {});
                })
                .body(|mut body| {
                    for (i, d) in drills.iter().enumerate() {
                        body.row(row_height, |mut row| {
                            row.col(|ui| {
                                ui.label((i + 1).to_string());
                            });
                            row.col(|ui| {
                                let mut category = d.category.clone();
                                let resp = ui.add(
                                    egui::TextEdit::singleline(&mut category)
                                        .desired_width(100.0)
                                        .hint_text("e.g. Physical"),
                                );
                                if resp.changed() {
                                    actions.push(Action::EditDrillText(
                                        d.id.clone(),
                                        DrillField::Category,
                                        category,
                                    ));
                                }
                            });
                            row.col(|ui| {
                                ui.horizontal(|ui| {
                                    let mut name = d.name.clone();
                                    let resp = ui.add(
                                        egui::TextEdit::singleline(&mut name)
                                            .desired_width(160.0)
                                            .hint_text("e.g. Bench Press"),
                                    );
                                    if resp.changed() {
                                        actions.push(Action::EditDrillText(
                                            d.id.clone(),
                                            DrillField::Name,
                                            name,
                                        ));
                                    }
                                    ui.menu_button("\u{25BE}", |ui| {
                                        for preset in suggest_presets(&d.name, 5) {
                                            if ui.button(preset).clicked() {
                                                actions.push(Action::ApplyPreset(
                                                    d.id.clone(),
                                                    preset,
                                                ));
                                                ui.close_menu();
                                            }
                                        }
                                    });
                                });
                            });
                            for field in [DrillField::Base, DrillField::Fact] {
                                row.col(|ui| {
                                    let mut text = self.drill_number_text(d, field);
                                    if ui
                                        .add(egui::TextEdit::singleline(&mut text).desired_width(50.0))
                                        .changed()
                                    {
                                        actions.push(Action::EditDrillText(d.id.clone(), field, text));
                                    }
                                });
                            }
                            row.col(|ui| {
                                ui.strong(format_number(d.total));
                            });
                            for v in d.daily_values {
                                row.col(|ui| {
                                    ui.label(v.to_string());
                                });
                            }
                            row.col(|ui| {
                                if ui.small_button("Remove").clicked() {
                                    actions.push(Action::RemoveDrill(d.id.clone()));
                                }
                            });
                        });
                    }
                });
        });

        Plot::new("daily_volume_plot")
            .height(140.0)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(plotting::daily_volume_bar(&drills));
            });
    }

    fn breakdown_section(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            ui.heading("2. Daily Breakdown");
            if ui.button("Refresh Data").clicked() {
                actions.push(Action::Generate);
            }
        });
        let plan = self.planner.plan();
        if plan.sessions().is_empty() {
            ui.label(if plan.is_built() {
                "No drill has volume on any day."
            } else {
                "Click \"Refresh Data\" to generate."
            });
            return;
        }
        egui::Grid::new("session_table")
            .striped(true)
            .num_columns(7)
            .show(ui, |ui| {
                for title in ["NO", "DRILL ITEM", "RAW VOL", "ROUNDED", "SETS", "REPS", "REST"] {
                    ui.strong(title);
                }
                ui.end_row();
                for day in ALL_DAYS {
                    let sessions: Vec<_> = plan.for_day(day).collect();
                    if sessions.is_empty() {
                        continue;
                    }
                    ui.label(RichText::new(day.name().to_uppercase()).strong());
                    ui.end_row();
                    for (i, s) in sessions.iter().enumerate() {
                        ui.label((i + 1).to_string());
                        ui.label(format!("{} ({})", s.drill, s.category));
                        ui.label(s.raw_volume().to_string());
                        ui.strong(s.rounded_volume().to_string());
                        let mut target = s.target_sets.clone();
                        if ui
                            .add(egui::TextEdit::singleline(&mut target).desired_width(50.0))
                            .changed()
                        {
                            actions.push(Action::AdjustTarget(s.id, target));
                        }
                        ui.label(s.reps_per_set.to_string());
                        let mut rest = s.rest.clone();
                        if ui
                            .add(egui::TextEdit::singleline(&mut rest).desired_width(60.0))
                            .changed()
                        {
                            actions.push(Action::SetRest(s.id, rest));
                        }
                        ui.end_row();
                    }
                }
            });
    }

    fn builder_section(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            ui.heading("3. Session Builder");
            let mut day = self.planner.selected_day;
            egui::ComboBox::from_id_source("selected_day_combo")
                .selected_text(day.name())
                .show_ui(ui, |ui| {
                    for d in ALL_DAYS {
                        ui.selectable_value(&mut day, d, d.name());
                    }
                });
            if day != self.planner.selected_day {
                self.planner.selected_day = day;
                self.settings.selected_day = day;
                self.settings_dirty = true;
            }
        });

        let day = self.planner.selected_day;
        let sessions: Vec<_> = self.planner.sessions_for_selected_day().cloned().collect();
        if sessions.is_empty() {
            ui.label(format!(
                "No session data for {day}. Add drills in the table above first."
            ));
            return;
        }
        for s in sessions {
            ui.group(|ui| {
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&s.drill).strong().size(16.0));
                        ui.small(format!(
                            "CAT: {}  TARGET: {} Sets  REPS: {}  REST: {}",
                            s.category, s.target_sets, s.reps_per_set, s.rest
                        ));
                    });
                    if let (Some(remaining), Some(balance)) = (
                        self.planner.remaining_sets(s.id, day),
                        self.planner.balance(s.id, day),
                    ) {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                            ui.vertical(|ui| {
                                ui.small("REMAINING SETS");
                                ui.label(
                                    RichText::new(format_number(remaining))
                                        .size(22.0)
                                        .strong()
                                        .color(balance_color(balance)),
                                );
                            });
                        });
                    }
                });
                egui::Grid::new(("variations", s.id))
                    .num_columns(4)
                    .show(ui, |ui| {
                        ui.small("VARIATION NAME");
                        ui.small("SETS");
                        ui.small("REPS");
                        ui.end_row();
                        for v in self.planner.variations(s.id) {
                            let mut name = v.name.clone();
                            if ui
                                .add(
                                    egui::TextEdit::singleline(&mut name)
                                        .hint_text("Specific drill variant..."),
                                )
                                .changed()
                            {
                                actions.push(Action::EditVariationText(
                                    s.id,
                                    v.id.clone(),
                                    VariationField::Name,
                                    name,
                                ));
                            }
                            let mut sets = self
                                .sets_text
                                .get(&v.id)
                                .cloned()
                                .unwrap_or_else(|| v.sets_label());
                            if ui
                                .add(egui::TextEdit::singleline(&mut sets).desired_width(40.0))
                                .changed()
                            {
                                actions.push(Action::EditVariationText(
                                    s.id,
                                    v.id.clone(),
                                    VariationField::Sets,
                                    sets,
                                ));
                            }
                            ui.label(&v.reps);
                            if ui.small_button("Remove").clicked() {
                                actions.push(Action::RemoveVariation(s.id, v.id.clone()));
                            }
                            ui.end_row();
                        }
                    });
                if ui.button("Add Variation").clicked() {
                    actions.push(Action::AddVariation(s.id, s.reps_per_set));
                }
            });
        }
    }

    fn settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(true)
            .show(ctx, |ui| {
                let mut changed = false;
                egui::Grid::new("settings_grid").num_columns(2).show(ui, |ui| {
                    ui.label("Cloud URL:");
                    changed |= optional_text(ui, &mut self.settings.cloud_url);
                    ui.end_row();
                    ui.label("Cloud token:");
                    changed |= optional_text(ui, &mut self.settings.cloud_token);
                    ui.end_row();

                    let profile = self.settings.profile.get_or_insert_with(UserProfile::default);
                    ui.label("Coach uid:");
                    changed |= ui.text_edit_singleline(&mut profile.uid).changed();
                    ui.end_row();
                    ui.label("Display name:");
                    changed |= optional_text(ui, &mut profile.display_name);
                    ui.end_row();
                    ui.label("Email:");
                    changed |= optional_text(ui, &mut profile.email);
                    ui.end_row();

                    ui.label("Advice endpoint:");
                    changed |= ui
                        .text_edit_singleline(&mut self.settings.advice_endpoint)
                        .changed();
                    ui.end_row();
                    ui.label("Advice model:");
                    changed |= ui.text_edit_singleline(&mut self.settings.advice_model).changed();
                    ui.end_row();
                    ui.label("Advice API key:");
                    changed |= optional_text(ui, &mut self.settings.advice_api_key);
                    ui.end_row();
                });
                if self
                    .settings
                    .profile
                    .as_ref()
                    .is_some_and(|p| p.uid.trim().is_empty() && p.display_name.is_none())
                {
                    self.settings.profile = None;
                }
                if changed {
                    self.settings_dirty = true;
                }
            });
        self.show_settings = open;
    }

    fn suggestions_window(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let mut open = self.show_suggestions;
        egui::Window::new("Drill Ideas")
            .open(&mut open)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    egui::ComboBox::from_id_source("suggestion_category_combo")
                        .selected_text(self.suggestion_category.as_str())
                        .show_ui(ui, |ui| {
                            for c in DRILL_CATEGORIES {
                                ui.selectable_value(&mut self.suggestion_category, c.to_string(), c);
                            }
                        });
                    if ui.button("Suggest").clicked() {
                        actions.push(Action::SuggestDrills);
                    }
                });
                for s in &self.suggestions {
                    ui.horizontal(|ui| {
                        ui.label(s);
                        if ui.small_button("Add").clicked() {
                            actions.push(Action::AddNamedDrill(
                                self.suggestion_category.clone(),
                                s.clone(),
                            ));
                        }
                    });
                }
            });
        self.show_suggestions = open;
    }
}

impl App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let mut actions = Vec::new();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ui, &mut actions);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.identity.label());
                if let Some((message, started)) = &self.notice {
                    if started.elapsed() < NOTICE_DURATION {
                        ui.separator();
                        ui.label(message);
                        ctx.request_repaint_after(Duration::from_millis(500));
                    }
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Team:");
                    if ui
                        .add(
                            egui::TextEdit::singleline(&mut self.planner.team_name)
                                .desired_width(320.0),
                        )
                        .changed()
                    {
                        self.settings.team_name = self.planner.team_name.clone();
                        self.settings_dirty = true;
                    }
                });
                if let Some(advice) = &self.advice {
                    ui.group(|ui| {
                        ui.strong("AI Insight");
                        ui.label(advice);
                    });
                }
                ui.separator();
                self.volume_section(ui, &mut actions);
                ui.separator();
                self.breakdown_section(ui, &mut actions);
                ui.separator();
                self.builder_section(ui, &mut actions);
            });
        });

        if self.show_settings {
            self.settings_window(ctx);
        }
        if self.show_suggestions {
            self.suggestions_window(ctx, &mut actions);
        }

        for action in actions {
            self.apply(action);
        }

        if self.settings_dirty {
            self.settings.save();
            self.settings_dirty = false;
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.settings.team_name = self.planner.team_name.clone();
        self.settings.selected_day = self.planner.selected_day;
        self.settings.save();
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let options = NativeOptions::default();
    eframe::run_native(
        "Sport Science Training Planner",
        options,
        Box::new(|_cc| Box::new(PlannerApp::default())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    /// Point the config directory at a temporary folder for the closure.
    fn with_config_dir(f: impl FnOnce()) {
        use std::env;

        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let prev_config = env::var_os("XDG_CONFIG_HOME");
        unsafe {
            env::set_var("XDG_CONFIG_HOME", dir.path());
        }

        f();

        if let Some(val) = prev_config {
            unsafe {
                env::set_var("XDG_CONFIG_HOME", val);
            }
        } else {
            unsafe {
                env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }

    #[test]
    fn settings_roundtrip() {
        let mut s = Settings::default();
        s.team_name = "Juniors".into();
        s.selected_day = TrainingDay::Thursday;
        s.cloud_url = Some("https://store.example".into());
        s.cloud_token = Some("tok".into());
        s.profile = Some(UserProfile {
            uid: "coach-1".into(),
            display_name: Some("Coach".into()),
            ..UserProfile::default()
        });
        s.advice_model = "other-model".into();
        s.advice_api_key = Some("key".into());
        s.last_export_dir = Some("/tmp".into());

        let json = serde_json::to_string(&s).unwrap();
        let loaded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(s, loaded);
    }

    #[test]
    fn missing_settings_fields_use_defaults() {
        let loaded: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(loaded, Settings::default());
        assert_eq!(loaded.team_name, DEFAULT_TEAM_NAME);
        assert_eq!(loaded.advice_model, advice::DEFAULT_MODEL);
    }

    #[test]
    fn settings_persist_in_config_dir() {
        with_config_dir(|| {
            let mut s = Settings::default();
            s.selected_day = TrainingDay::Saturday;
            s.save();
            assert_eq!(Settings::load().selected_day, TrainingDay::Saturday);

            std::fs::write(Settings::path().unwrap(), "not json").unwrap();
            assert_eq!(Settings::load(), Settings::default());
        });
    }

    #[test]
    fn guest_save_and_load_round_trip() {
        with_config_dir(|| {
            let mut app = PlannerApp::default();
            app.apply(Action::AddDrill);
            let id = app.planner.registry().drills()[0].id.clone();
            app.apply(Action::EditDrillText(id.clone(), DrillField::Base, "10".into()));
            app.apply(Action::ApplyPreset(id.clone(), "[CORE] Plank"));
            app.apply(Action::Generate);
            app.apply(Action::AddVariation(1, 3));
            app.apply(Action::Save);
            assert_eq!(
                app.notice.as_ref().map(|(m, _)| m.as_str()),
                Some("Success: Saved to Device (Local)!")
            );

            let mut fresh = PlannerApp::default();
            fresh.apply(Action::Load);
            let drill = fresh.planner.registry().get(&id).unwrap();
            assert_eq!(drill.name, "Plank");
            assert_eq!(drill.category, "Core");
            assert_eq!(drill.total, 160.0);
            assert!(!fresh.planner.plan().is_built());
            assert_eq!(fresh.planner.variations(1).len(), 1);
        });
    }

    #[test]
    fn unreadable_numbers_zero_the_drill_but_keep_typed_text() {
        with_config_dir(|| {
            let mut app = PlannerApp::default();
            app.apply(Action::AddDrill);
            let id = app.planner.registry().drills()[0].id.clone();
            app.apply(Action::EditDrillText(id.clone(), DrillField::Base, "10".into()));
            app.apply(Action::EditDrillText(id.clone(), DrillField::Base, "1O".into()));
            let drill = app.planner.registry().get(&id).unwrap().clone();
            assert_eq!(drill.base, 0.0);
            assert_eq!(drill.total, 0.0);
            assert_eq!(app.drill_number_text(&drill, DrillField::Base), "1O");
            assert_eq!(app.drill_number_text(&drill, DrillField::Fact), "8");

            app.apply(Action::RemoveDrill(id));
            assert!(app.drill_text.is_empty());
        });
    }

    #[test]
    fn variation_sets_text_drives_remaining_sets() {
        with_config_dir(|| {
            let mut app = PlannerApp::default();
            app.apply(Action::AddDrill);
            let id = app.planner.registry().drills()[0].id.clone();
            app.apply(Action::EditDrillText(id, DrillField::Base, "10".into()));
            app.apply(Action::Generate);
            app.apply(Action::AddVariation(1, 3));
            let var_id = app.planner.variations(1)[0].id.clone();
            app.apply(Action::EditVariationText(
                1,
                var_id.clone(),
                VariationField::Sets,
                "5".into(),
            ));
            assert_eq!(
                app.planner.remaining_sets(1, TrainingDay::Monday),
                Some(-1.0)
            );
            assert_eq!(app.planner.balance(1, TrainingDay::Monday), Some(Balance::Over));
            assert_eq!(app.sets_text.get(&var_id).map(String::as_str), Some("5"));
        });
    }

    #[test]
    fn export_outcome_reaches_status_bar() {
        with_config_dir(|| {
            let dir = tempfile::tempdir().unwrap();
            let mut app = PlannerApp::default();
            app.apply(Action::AddDrill);
            app.apply(Action::Generate);

            let good = dir.path().join("sessions.csv");
            app.export_sessions_to(&good);
            assert!(good.exists());
            let notice = app.notice.as_ref().map(|(m, _)| m.clone()).unwrap();
            assert!(notice.starts_with("Exported session plan to"));
            assert_eq!(
                app.settings.last_export_dir.as_deref(),
                Some(dir.path().display().to_string().as_str())
            );

            let bad = dir.path().join("missing").join("volume.json");
            app.export_volume_to(&bad);
            let notice = app.notice.as_ref().map(|(m, _)| m.clone()).unwrap();
            assert!(notice.starts_with("Export failed:"));
            assert!(!bad.exists());
        });
    }

    #[test]
    fn load_without_save_reports_absence() {
        with_config_dir(|| {
            let mut app = PlannerApp::default();
            app.apply(Action::Load);
            assert_eq!(
                app.notice.as_ref().map(|(m, _)| m.as_str()),
                Some("No saved plan found.")
            );
        });
    }

    #[test]
    fn sign_in_without_profile_stays_guest() {
        with_config_dir(|| {
            let mut app = PlannerApp::default();
            app.apply(Action::SignIn);
            assert!(app.identity.is_guest());
            assert_eq!(
                app.notice.as_ref().map(|(m, _)| m.as_str()),
                Some(identity::NOT_CONFIGURED_NOTICE)
            );
        });
    }

    #[test]
    fn advice_is_skipped_without_drills() {
        with_config_dir(|| {
            let mut app = PlannerApp::default();
            app.apply(Action::AskAdvice);
            assert!(app.advice.is_none());
        });
    }
}
