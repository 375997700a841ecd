// Planner state: drills, generated sessions and variations for one team
use crate::coefficients::TrainingDay;
use crate::drills::{DrillEdit, DrillField, DrillRegistry};
use crate::sessions::{PrescribedSession, SessionPlan, adjust_target};
use crate::storage::AppSnapshot;
use crate::variations::{Balance, Variation, VariationEdit, VariationField, VariationLedger};

pub const DEFAULT_TEAM_NAME: &str = "TIM: INDONESIA WARRIORS (U-20)";

/// Everything a coach edits in one planning session.
///
/// The session plan is derived state: it starts [`SessionPlan::Unbuilt`] and
/// is only rebuilt by [`Planner::generate_plan`]. Variation operations work
/// on the currently selected day; the ledger keeps every day's entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Planner {
    pub team_name: String,
    pub selected_day: TrainingDay,
    registry: DrillRegistry,
    plan: SessionPlan,
    ledger: VariationLedger,
}

impl Default for Planner {
    fn default() -> Self {
        Self {
            team_name: DEFAULT_TEAM_NAME.to_string(),
            selected_day: TrainingDay::Monday,
            registry: DrillRegistry::default(),
            plan: SessionPlan::Unbuilt,
            ledger: VariationLedger::default(),
        }
    }
}

impl Planner {
    pub fn registry(&self) -> &DrillRegistry {
        &self.registry
    }

    pub fn plan(&self) -> &SessionPlan {
        &self.plan
    }

    pub fn ledger(&self) -> &VariationLedger {
        &self.ledger
    }

    pub fn add_drill(&mut self) -> String {
        self.registry.add()
    }

    pub fn remove_drill(&mut self, id: &str) {
        if let Some(d) = self.registry.get(id) {
            log::info!("Removing drill {:?}", d.name);
        }
        self.registry.remove(id);
    }

    pub fn update_drill(&mut self, id: &str, edit: DrillEdit) -> bool {
        self.registry.update(id, edit)
    }

    /// Apply raw field text; unreadable numbers become `0`.
    pub fn update_drill_text(&mut self, id: &str, field: DrillField, text: &str) -> bool {
        self.registry.update_text(id, field, text)
    }

    /// Replace the session plan with one generated from the current drills.
    pub fn generate_plan(&mut self) {
        self.plan.rebuild(self.registry.drills());
    }

    pub fn adjust_target(&mut self, session_id: u32, text: &str) -> bool {
        match self.plan.get_mut(session_id) {
            Some(s) => {
                adjust_target(s, text);
                true
            }
            None => false,
        }
    }

    pub fn set_rest(&mut self, session_id: u32, text: &str) -> bool {
        match self.plan.get_mut(session_id) {
            Some(s) => {
                s.rest = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn sessions_for_selected_day(&self) -> impl Iterator<Item = &PrescribedSession> {
        self.plan.for_day(self.selected_day)
    }

    pub fn variations(&self, session_id: u32) -> &[Variation] {
        self.ledger.variations(self.selected_day, session_id)
    }

    /// Add a variation under the selected day, seeded with `seed_reps`.
    pub fn add_variation(&mut self, session_id: u32, seed_reps: i64) -> String {
        self.ledger.add(self.selected_day, session_id, seed_reps)
    }

    pub fn update_variation(
        &mut self,
        session_id: u32,
        variation_id: &str,
        edit: VariationEdit,
    ) -> bool {
        self.ledger
            .update(self.selected_day, session_id, variation_id, edit)
    }

    pub fn update_variation_text(
        &mut self,
        session_id: u32,
        variation_id: &str,
        field: VariationField,
        text: &str,
    ) -> bool {
        self.update_variation(session_id, variation_id, VariationEdit::from_text(field, text))
    }

    pub fn remove_variation(&mut self, session_id: u32, variation_id: &str) {
        self.ledger
            .remove(self.selected_day, session_id, variation_id);
    }

    /// Target sets of the session minus the sets allocated under (`day`,
    /// `session_id`). `None` when the session is not in the current plan.
    pub fn remaining_sets(&self, session_id: u32, day: TrainingDay) -> Option<f64> {
        let session = self.plan.get(session_id)?;
        Some(
            self.ledger
                .remaining_sets(day, session_id, &session.target_sets),
        )
    }

    pub fn balance(&self, session_id: u32, day: TrainingDay) -> Option<Balance> {
        self.remaining_sets(session_id, day)
            .map(Balance::from_remaining)
    }

    /// Comma-joined drill names, or `None` when there are no drills.
    pub fn advice_summary(&self) -> Option<String> {
        if self.registry.is_empty() {
            return None;
        }
        Some(
            self.registry
                .drills()
                .iter()
                .map(|d| d.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    /// Persistable state. Sessions are not included.
    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            team_name: self.team_name.clone(),
            drills: self.registry.drills().to_vec(),
            variations: self.ledger.clone(),
        }
    }

    /// Replace drills and variations from `snapshot`; the plan becomes unbuilt.
    pub fn restore(&mut self, snapshot: AppSnapshot) {
        log::info!(
            "Restoring {} drills and {} variation groups for {}",
            snapshot.drills.len(),
            snapshot.variations.entries().len(),
            snapshot.team_name
        );
        self.team_name = snapshot.team_name;
        self.registry = DrillRegistry::from_drills(snapshot.drills);
        self.ledger = snapshot.variations;
        self.plan = SessionPlan::Unbuilt;
    }
}
