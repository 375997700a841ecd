use crate::coefficients::TrainingDay;
use crate::numeric::{coerce_field, format_number};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Storage key for a session's variations: the day it was viewed on and the
/// session identifier.
///
/// Serialized as `"<Day>-<sessionId>"`, for example `"Monday-3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct VariationKey {
    pub day: TrainingDay,
    pub session_id: u32,
}

impl VariationKey {
    pub fn new(day: TrainingDay, session_id: u32) -> Self {
        Self { day, session_id }
    }
}

impl fmt::Display for VariationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day, self.session_id)
    }
}

impl From<VariationKey> for String {
    fn from(key: VariationKey) -> Self {
        key.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidKey(pub String);

impl fmt::Display for InvalidKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid variation key: {}", self.0)
    }
}

impl std::error::Error for InvalidKey {}

impl TryFrom<String> for VariationKey {
    type Error = InvalidKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (day, id) = value
            .rsplit_once('-')
            .ok_or_else(|| InvalidKey(value.clone()))?;
        let day = day.parse().map_err(|_| InvalidKey(value.clone()))?;
        let session_id = id.parse().map_err(|_| InvalidKey(value.clone()))?;
        Ok(Self { day, session_id })
    }
}

/// A named sub-drill planned under one prescribed session.
///
/// `drill_id` holds the owning session's identifier, not a drill identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub id: String,
    pub drill_id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "number_or_text")]
    pub sets: f64,
    #[serde(default)]
    pub reps: String,
}

// Older saves stored `sets` as the raw text of the input field.
fn number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(t) => coerce_field(&t),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationField {
    Name,
    Sets,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariationEdit {
    Name(String),
    Sets(f64),
}

impl VariationEdit {
    pub fn from_text(field: VariationField, text: &str) -> Self {
        match field {
            VariationField::Name => VariationEdit::Name(text.to_string()),
            VariationField::Sets => VariationEdit::Sets(coerce_field(text)),
        }
    }
}

/// How the allocated variation sets compare with the session target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balance {
    Balanced,
    Under,
    Over,
}

impl Balance {
    pub fn from_remaining(remaining: f64) -> Self {
        if remaining == 0.0 {
            Balance::Balanced
        } else if remaining > 0.0 {
            Balance::Under
        } else {
            Balance::Over
        }
    }
}

/// Variations for every (day, session) key, in insertion order per key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariationLedger {
    entries: BTreeMap<VariationKey, Vec<Variation>>,
}

impl VariationLedger {
    pub fn entries(&self) -> &BTreeMap<VariationKey, Vec<Variation>> {
        &self.entries
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    pub fn variations(&self, day: TrainingDay, session_id: u32) -> &[Variation] {
        self.entries
            .get(&VariationKey::new(day, session_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append an empty variation seeded with `seed_reps` and return its id.
    pub fn add(&mut self, day: TrainingDay, session_id: u32, seed_reps: i64) -> String {
        let variation = Variation {
            id: Uuid::new_v4().to_string(),
            drill_id: session_id,
            name: String::new(),
            sets: 0.0,
            reps: seed_reps.to_string(),
        };
        let id = variation.id.clone();
        self.entries
            .entry(VariationKey::new(day, session_id))
            .or_default()
            .push(variation);
        id
    }

    /// Update the name or sets of a variation in place. `reps` keeps its
    /// seeded value.
    pub fn update(
        &mut self,
        day: TrainingDay,
        session_id: u32,
        variation_id: &str,
        edit: VariationEdit,
    ) -> bool {
        let Some(v) = self
            .entries
            .get_mut(&VariationKey::new(day, session_id))
            .and_then(|list| list.iter_mut().find(|v| v.id == variation_id))
        else {
            return false;
        };
        match edit {
            VariationEdit::Name(n) => v.name = n,
            VariationEdit::Sets(s) => v.sets = s,
        }
        true
    }

    pub fn remove(&mut self, day: TrainingDay, session_id: u32, variation_id: &str) {
        if let Some(list) = self.entries.get_mut(&VariationKey::new(day, session_id)) {
            list.retain(|v| v.id != variation_id);
        }
    }

    /// Sum of sets over the variations at (`day`, `session_id`).
    pub fn allocated_sets(&self, day: TrainingDay, session_id: u32) -> f64 {
        self.variations(day, session_id).iter().map(|v| v.sets).sum()
    }

    /// Target sets minus the allocated sets. Not clamped.
    ///
    /// `target_sets` is read as a whole number field; unreadable text is `0`.
    pub fn remaining_sets(&self, day: TrainingDay, session_id: u32, target_sets: &str) -> f64 {
        coerce_field(target_sets) - self.allocated_sets(day, session_id)
    }
}

impl Variation {
    pub fn sets_label(&self) -> String {
        format_number(self.sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TrainingDay::*;

    #[test]
    fn key_round_trips_through_text() {
        let key = VariationKey::new(Wednesday, 12);
        assert_eq!(key.to_string(), "Wednesday-12");
        assert_eq!(VariationKey::try_from("Wednesday-12".to_string()), Ok(key));
        assert!(VariationKey::try_from("Sunday-1".to_string()).is_err());
        assert!(VariationKey::try_from("Monday".to_string()).is_err());
    }

    #[test]
    fn add_seeds_reps_and_references_session() {
        let mut ledger = VariationLedger::default();
        let id = ledger.add(Monday, 3, 5);
        let list = ledger.variations(Monday, 3);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);
        assert_eq!(list[0].drill_id, 3);
        assert_eq!(list[0].sets, 0.0);
        assert_eq!(list[0].reps, "5");
        assert!(list[0].name.is_empty());
        assert!(ledger.variations(Tuesday, 3).is_empty());
    }

    #[test]
    fn remaining_sets_can_go_negative() {
        let mut ledger = VariationLedger::default();
        let a = ledger.add(Monday, 1, 3);
        assert_eq!(ledger.remaining_sets(Monday, 1, "4"), 4.0);
        ledger.update(Monday, 1, &a, VariationEdit::Sets(4.0));
        assert_eq!(ledger.remaining_sets(Monday, 1, "4"), 0.0);
        assert_eq!(Balance::from_remaining(0.0), Balance::Balanced);

        let b = ledger.add(Monday, 1, 3);
        ledger.update(Monday, 1, &b, VariationEdit::from_text(VariationField::Sets, "1"));
        let remaining = ledger.remaining_sets(Monday, 1, "4");
        assert_eq!(remaining, -1.0);
        assert_eq!(Balance::from_remaining(remaining), Balance::Over);
        assert_eq!(Balance::from_remaining(2.0), Balance::Under);
    }

    #[test]
    fn unreadable_target_counts_as_zero() {
        let mut ledger = VariationLedger::default();
        let a = ledger.add(Friday, 2, 3);
        ledger.update(Friday, 2, &a, VariationEdit::Sets(2.0));
        assert_eq!(ledger.remaining_sets(Friday, 2, "four"), -2.0);
    }

    #[test]
    fn update_and_remove_are_scoped_to_key() {
        let mut ledger = VariationLedger::default();
        let a = ledger.add(Monday, 1, 3);
        let b = ledger.add(Tuesday, 1, 3);
        assert!(!ledger.update(Monday, 1, &b, VariationEdit::Name("x".into())));
        assert!(ledger.update(Monday, 1, &a, VariationEdit::Name("Wide grip".into())));
        ledger.remove(Monday, 1, &b);
        assert_eq!(ledger.variations(Tuesday, 1).len(), 1);
        ledger.remove(Monday, 1, &a);
        assert!(ledger.variations(Monday, 1).is_empty());
        assert_eq!(ledger.variations(Tuesday, 1)[0].id, b);
    }

    #[test]
    fn reps_are_not_recomputed() {
        let mut ledger = VariationLedger::default();
        let a = ledger.add(Monday, 1, 3);
        ledger.update(Monday, 1, &a, VariationEdit::Sets(6.0));
        assert_eq!(ledger.variations(Monday, 1)[0].reps, "3");
    }

    #[test]
    fn serializes_as_keyed_map() {
        let mut ledger = VariationLedger::default();
        ledger.add(Saturday, 7, 4);
        let json = serde_json::to_value(&ledger).unwrap();
        let list = json.get("Saturday-7").and_then(|v| v.as_array()).unwrap();
        assert_eq!(list[0]["drillId"], 7);
        assert_eq!(list[0]["reps"], "4");
    }

    #[test]
    fn accepts_text_sets_from_older_saves() {
        let json = r#"{"Monday-1":[{"id":"v1","drillId":1,"name":"A","sets":"3","reps":"5"}]}"#;
        let ledger: VariationLedger = serde_json::from_str(json).unwrap();
        assert_eq!(ledger.variations(Monday, 1)[0].sets, 3.0);
        assert_eq!(ledger.variations(Monday, 1)[0].sets_label(), "3");
    }
}
