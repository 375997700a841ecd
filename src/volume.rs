// Weekly volume derivation for a single drill
use crate::coefficients::{COEFFICIENTS, DAY_COUNT, WEEKLY_SHARE};
use crate::numeric::round_to_i64;

/// Derived volume figures for one drill.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VolumeBreakdown {
    pub total: f64,
    pub daily_values: [i64; DAY_COUNT],
}

/// Compute the weekly total and the per-day allocation from `base` and `fact`.
///
/// `total = base * fact * 2`; each day receives
/// `round(total * 0.69 / 6 * coefficient)`. No range checks are applied, so
/// negative inputs produce negative figures.
pub fn recompute(base: f64, fact: f64) -> VolumeBreakdown {
    let total = base * fact * 2.0;
    let daily_average = (total * WEEKLY_SHARE) / DAY_COUNT as f64;
    let mut daily_values = [0; DAY_COUNT];
    for (value, coefficient) in daily_values.iter_mut().zip(COEFFICIENTS) {
        *value = round_to_i64(daily_average * coefficient);
    }
    VolumeBreakdown {
        total,
        daily_values,
    }
}
