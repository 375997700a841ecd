// Built-in drill categories and presets offered while editing drills
use strsim::jaro_winkler;

pub const DRILL_CATEGORIES: [&str; 8] = [
    "Upper Body",
    "Lower Body",
    "Core",
    "Speed",
    "Agility",
    "Endurance",
    "Flexibility",
    "Technical",
];

pub const DRILL_PRESETS: [&str; 10] = [
    "[UPPER BODY] Standard Push-Up",
    "[UPPER BODY] Bench Press",
    "[LOWER BODY] Air Squat",
    "[LOWER BODY] Barbell Back Squat",
    "[CORE] Plank",
    "[CORE] Russian Twist",
    "[SPEED] Suicides (On-Court)",
    "[AGILITY] Defense Shuffle",
    "[TEKNIK] Righty - Lefty Drill",
    "[TEKNIK] Dribbling Around Cones",
];

/// Split a `"[CATEGORY] Name"` preset into its category and drill name.
///
/// Text without a bracketed prefix is returned as the name with no category.
pub fn parse_preset(preset: &str) -> (Option<String>, String) {
    let trimmed = preset.trim();
    if let Some(rest) = trimmed.strip_prefix('[') {
        if let Some((category, name)) = rest.split_once(']') {
            let category = category.trim();
            if !category.is_empty() {
                return (Some(title_case(category)), name.trim().to_string());
            }
        }
    }
    (None, trimmed.to_string())
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rank presets against `query`, best match first.
///
/// Presets containing the query as a substring come before the rest; within
/// each group presets are ordered by Jaro-Winkler similarity of the drill
/// name. An empty query returns the presets in their listed order.
pub fn suggest_presets(query: &str, limit: usize) -> Vec<&'static str> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return DRILL_PRESETS.iter().copied().take(limit).collect();
    }
    let mut scored: Vec<(bool, f64, &'static str)> = DRILL_PRESETS
        .iter()
        .map(|p| {
            let lower = p.to_lowercase();
            let (_, name) = parse_preset(p);
            (
                lower.contains(&q),
                jaro_winkler(&q, &name.to_lowercase()),
                *p,
            )
        })
        .collect();
    scored.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then(b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
    });
    scored.into_iter().take(limit).map(|(_, _, p)| p).collect()
}
