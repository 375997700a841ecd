use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of training days in the fixed week.
pub const DAY_COUNT: usize = 6;

/// Share of the weekly total spread over the training days.
pub const WEEKLY_SHARE: f64 = 0.69;

/// Per-day multipliers, Monday first.
pub const COEFFICIENTS: [f64; DAY_COUNT] = [0.69, 0.702, 0.714, 0.916, 0.912, 0.618];

/// Display labels matching [`COEFFICIENTS`].
pub const PERCENTS: [&str; DAY_COUNT] = ["69%", "70.2%", "71.4%", "91.6%", "91.2%", "61.8%"];

/// One of the six days of the training week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrainingDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

pub const ALL_DAYS: [TrainingDay; DAY_COUNT] = [
    TrainingDay::Monday,
    TrainingDay::Tuesday,
    TrainingDay::Wednesday,
    TrainingDay::Thursday,
    TrainingDay::Friday,
    TrainingDay::Saturday,
];

static DAYS_BY_NAME: phf::Map<&'static str, TrainingDay> = phf_map! {
    "Monday" => TrainingDay::Monday,
    "Tuesday" => TrainingDay::Tuesday,
    "Wednesday" => TrainingDay::Wednesday,
    "Thursday" => TrainingDay::Thursday,
    "Friday" => TrainingDay::Friday,
    "Saturday" => TrainingDay::Saturday,
};

impl TrainingDay {
    /// Position of the day in the week, `0` for Monday.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TrainingDay::Monday => "Monday",
            TrainingDay::Tuesday => "Tuesday",
            TrainingDay::Wednesday => "Wednesday",
            TrainingDay::Thursday => "Thursday",
            TrainingDay::Friday => "Friday",
            TrainingDay::Saturday => "Saturday",
        }
    }

    /// Three letter column label.
    pub fn short_name(self) -> &'static str {
        &self.name()[..3]
    }

    pub fn coefficient(self) -> f64 {
        COEFFICIENTS[self.index()]
    }

    pub fn percent_label(self) -> &'static str {
        PERCENTS[self.index()]
    }
}

impl Default for TrainingDay {
    fn default() -> Self {
        TrainingDay::Monday
    }
}

impl fmt::Display for TrainingDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDay(pub String);

impl fmt::Display for UnknownDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown training day: {}", self.0)
    }
}

impl std::error::Error for UnknownDay {}

impl FromStr for TrainingDay {
    type Err = UnknownDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DAYS_BY_NAME
            .get(s)
            .copied()
            .ok_or_else(|| UnknownDay(s.to_string()))
    }
}
