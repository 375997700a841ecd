use egui_plot::{Bar, BarChart};

use crate::coefficients::{ALL_DAYS, DAY_COUNT};
use crate::drills::Drill;

/// Sum of every drill's daily value, per training day. Saturates at the
/// `i64` bounds.
pub fn daily_totals(drills: &[Drill]) -> [i64; DAY_COUNT] {
    let mut totals = [0i64; DAY_COUNT];
    for d in drills {
        for (total, value) in totals.iter_mut().zip(d.daily_values) {
            *total = total.saturating_add(value);
        }
    }
    totals
}

/// Bar chart of the week's daily volume, one bar per training day.
pub fn daily_volume_bar(drills: &[Drill]) -> BarChart {
    let totals = daily_totals(drills);
    let bars: Vec<Bar> = ALL_DAYS
        .iter()
        .zip(totals)
        .map(|(day, total)| Bar::new(day.index() as f64, total as f64).name(day.name()))
        .collect();
    BarChart::new(bars).name("Daily volume")
}
