use crate::coefficients::DAY_COUNT;
use crate::numeric::coerce_field;
use crate::volume::recompute;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default multiplier for newly added drills.
pub const DEFAULT_FACT: f64 = 8.0;

/// A trainable exercise with coach inputs and derived weekly volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Drill {
    pub id: String,
    pub category: String,
    pub name: String,
    pub base: f64,
    pub fact: f64,
    pub total: f64,
    pub daily_values: [i64; DAY_COUNT],
}

impl Default for Drill {
    fn default() -> Self {
        Self {
            id: String::new(),
            category: String::new(),
            name: String::new(),
            base: 0.0,
            fact: DEFAULT_FACT,
            total: 0.0,
            daily_values: [0; DAY_COUNT],
        }
    }
}

impl Drill {
    /// New drill with a fresh identifier and zeroed derived fields.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ..Self::default()
        }
    }

    fn refresh_volume(&mut self) {
        let v = recompute(self.base, self.fact);
        self.total = v.total;
        self.daily_values = v.daily_values;
    }
}

/// Editable drill fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrillField {
    Category,
    Name,
    Base,
    Fact,
}

/// A single field assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum DrillEdit {
    Category(String),
    Name(String),
    Base(f64),
    Fact(f64),
}

impl DrillEdit {
    /// Build an edit from raw coach text; numeric fields coerce bad input to `0`.
    pub fn from_text(field: DrillField, text: &str) -> Self {
        match field {
            DrillField::Category => DrillEdit::Category(text.to_string()),
            DrillField::Name => DrillEdit::Name(text.to_string()),
            DrillField::Base => DrillEdit::Base(coerce_field(text)),
            DrillField::Fact => DrillEdit::Fact(coerce_field(text)),
        }
    }
}

/// The drills being edited, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrillRegistry {
    drills: Vec<Drill>,
}

impl DrillRegistry {
    pub fn from_drills(drills: Vec<Drill>) -> Self {
        Self { drills }
    }

    pub fn drills(&self) -> &[Drill] {
        &self.drills
    }

    pub fn len(&self) -> usize {
        self.drills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drills.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Drill> {
        self.drills.iter().find(|d| d.id == id)
    }

    /// Append a new zero-volume drill and return its identifier.
    pub fn add(&mut self) -> String {
        let drill = Drill::new();
        let id = drill.id.clone();
        self.drills.push(drill);
        id
    }

    /// Remove the drill with `id`. Unknown identifiers are ignored.
    pub fn remove(&mut self, id: &str) {
        self.drills.retain(|d| d.id != id);
    }

    /// Apply `edit` to the drill with `id`.
    ///
    /// Editing `base` or `fact` recomputes `total` and `daily_values` before
    /// returning. Returns `false` when no drill matches.
    pub fn update(&mut self, id: &str, edit: DrillEdit) -> bool {
        let Some(drill) = self.drills.iter_mut().find(|d| d.id == id) else {
            return false;
        };
        match edit {
            DrillEdit::Category(c) => drill.category = c,
            DrillEdit::Name(n) => drill.name = n,
            DrillEdit::Base(b) => {
                drill.base = b;
                drill.refresh_volume();
            }
            DrillEdit::Fact(f) => {
                drill.fact = f;
                drill.refresh_volume();
            }
        }
        true
    }

    /// Text entry point for [`DrillRegistry::update`].
    pub fn update_text(&mut self, id: &str, field: DrillField, text: &str) -> bool {
        self.update(id, DrillEdit::from_text(field, text))
    }

    #[cfg(test)]
    pub fn into_drills(self) -> Vec<Drill> {
        self.drills
    }
}
