// Session plan generation and per-session target adjustment
use crate::coefficients::{ALL_DAYS, TrainingDay};
use crate::drills::Drill;
use crate::numeric::{parse_or_nonzero, round_half_up, round_to_i64};
use serde::{Deserialize, Serialize};

pub const INITIAL_TARGET_SETS: &str = "4";
pub const INITIAL_SET_DIVISOR: f64 = 4.0;
pub const DEFAULT_REST: &str = "90s";
pub const FALLBACK_CATEGORY: &str = "Uncategorized";
pub const FALLBACK_DRILL_NAME: &str = "Untitled Drill";

/// A prescribed (day, drill) session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescribedSession {
    pub id: u32,
    pub day: TrainingDay,
    pub category: String,
    pub drill: String,
    pub target_sets: String,
    pub reps_per_set: i64,
    pub rest: String,
}

impl PrescribedSession {
    /// Total reps implied by the current target, `round(reps * target)`.
    ///
    /// The target falls back to `1` when it is missing or zero.
    pub fn raw_volume(&self) -> i64 {
        let target = parse_or_nonzero(&self.target_sets, 1.0);
        round_to_i64(self.reps_per_set as f64 * target)
    }

    /// [`PrescribedSession::raw_volume`] rounded to the nearest ten.
    pub fn rounded_volume(&self) -> i64 {
        round_to_nearest_ten(self.reps_per_set as f64 * parse_or_nonzero(&self.target_sets, 1.0))
    }
}

fn round_to_nearest_ten(value: f64) -> i64 {
    round_to_i64(round_half_up(value / 10.0) * 10.0)
}

/// Build the session list for all days, numbering sessions from `1`.
///
/// Sessions are grouped by day in week order and, within a day, follow the
/// registry order of `drills`. A drill only appears on days where its daily
/// value is strictly positive.
pub fn generate(drills: &[Drill]) -> Vec<PrescribedSession> {
    let mut sessions = Vec::new();
    let mut next_id = 1u32;
    for day in ALL_DAYS {
        for drill in drills.iter().filter(|d| d.daily_values[day.index()] > 0) {
            let rounded = round_to_nearest_ten(drill.daily_values[day.index()] as f64);
            let reps_per_set = round_to_i64(rounded as f64 / INITIAL_SET_DIVISOR);
            sessions.push(PrescribedSession {
                id: next_id,
                day,
                category: non_empty_or(&drill.category, FALLBACK_CATEGORY),
                drill: non_empty_or(&drill.name, FALLBACK_DRILL_NAME),
                target_sets: INITIAL_TARGET_SETS.to_string(),
                reps_per_set,
                rest: DEFAULT_REST.to_string(),
            });
            next_id += 1;
        }
    }
    sessions
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Change the target set count of `session`, keeping its implied volume.
///
/// The implied volume is rebuilt from the stored `reps_per_set` and the
/// previous target, rounded to the nearest ten, then split over the new
/// target. Repeated adjustments therefore accumulate rounding drift. Missing
/// or zero targets, old or new, count as `1`. The typed text is stored as is.
pub fn adjust_target(session: &mut PrescribedSession, new_target_text: &str) {
    let new_sets = parse_or_nonzero(new_target_text, 1.0);
    let old_sets = parse_or_nonzero(&session.target_sets, 1.0);
    let implied_total = round_to_nearest_ten(session.reps_per_set as f64 * old_sets);
    session.reps_per_set = round_to_i64(implied_total as f64 / new_sets);
    session.target_sets = new_target_text.to_string();
}

/// Generated sessions, or the marker that generation has not run yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionPlan {
    #[default]
    Unbuilt,
    Built(Vec<PrescribedSession>),
}

impl SessionPlan {
    /// Discard any existing sessions and generate from `drills`.
    pub fn rebuild(&mut self, drills: &[Drill]) {
        let sessions = generate(drills);
        log::info!(
            "Generated {} sessions from {} drills",
            sessions.len(),
            drills.len()
        );
        *self = SessionPlan::Built(sessions);
    }

    pub fn is_built(&self) -> bool {
        matches!(self, SessionPlan::Built(_))
    }

    /// All sessions; empty while unbuilt.
    pub fn sessions(&self) -> &[PrescribedSession] {
        match self {
            SessionPlan::Unbuilt => &[],
            SessionPlan::Built(s) => s,
        }
    }

    pub fn get(&self, id: u32) -> Option<&PrescribedSession> {
        self.sessions().iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut PrescribedSession> {
        match self {
            SessionPlan::Unbuilt => None,
            SessionPlan::Built(s) => s.iter_mut().find(|s| s.id == id),
        }
    }

    /// Sessions scheduled on `day`, in plan order.
    pub fn for_day(&self, day: TrainingDay) -> impl Iterator<Item = &PrescribedSession> {
        self.sessions().iter().filter(move |s| s.day == day)
    }
}
