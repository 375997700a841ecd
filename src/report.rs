use crate::{
    coefficients::ALL_DAYS,
    numeric::format_number,
    planner::Planner,
    plotting::daily_totals,
};
use chrono::Local;
use maud::{DOCTYPE, Markup, html};
use plotters::prelude::*;
use std::path::Path;

/// Write a printable plan to `path` with a daily volume chart next to it.
pub fn export_html_plan<P: AsRef<Path>>(path: P, planner: &Planner) -> std::io::Result<()> {
    let path = path.as_ref();
    let chart_path = path.with_extension("png");
    let chart_file = match generate_daily_chart(planner, &chart_path) {
        Ok(_) => chart_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("")),
        Err(e) => {
            log::error!("Failed to generate chart: {}", e);
            std::ffi::OsStr::new("")
        }
    };
    let generated = Local::now().format("%Y-%m-%d %H:%M").to_string();
    let markup = build_html(planner, &generated, chart_file);
    std::fs::write(path, markup.into_string())
}

fn generate_daily_chart(planner: &Planner, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let totals = daily_totals(planner.registry().drills());
    let root = BitMapBackend::new(path, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    let max = totals.iter().copied().max().unwrap_or(0).max(1);
    let mut chart = ChartBuilder::on(&root)
        .caption("Daily Volume", ("sans-serif", 25))
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d((0..ALL_DAYS.len()).into_segmented(), 0i64..max)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => ALL_DAYS
                .get(*i)
                .map(|d| d.short_name().to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc("Volume")
        .draw()?;
    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.filled())
            .margin(10)
            .data(totals.iter().enumerate().map(|(i, v)| (i, (*v).max(0)))),
    )?;
    root.present()?;
    Ok(())
}

fn build_html(planner: &Planner, generated: &str, chart_file: &std::ffi::OsStr) -> Markup {
    let drills = planner.registry().drills();
    let plan = planner.plan();
    html! {
        (DOCTYPE)
        html {
            head { meta charset="utf-8"; title { (planner.team_name) " - Training Plan" } }
            body {
                h1 { (planner.team_name) }
                p { "Generated " (generated) }
                h2 { "Weekly Volume" }
                table border="1" {
                    tr {
                        th { "No" } th { "Category" } th { "Drill" } th { "Base" } th { "Fact" } th { "Total" }
                        @for day in ALL_DAYS {
                            th { (day.short_name()) br; small { (day.percent_label()) } }
                        }
                    }
                    @for (i, d) in drills.iter().enumerate() {
                        tr {
                            td { ((i + 1)) }
                            td { (d.category) }
                            td { (d.name) }
                            td { (format_number(d.base)) }
                            td { (format_number(d.fact)) }
                            td { (format_number(d.total)) }
                            @for v in d.daily_values {
                                td { (v) }
                            }
                        }
                    }
                }
                h2 { "Daily Volume" }
                @if chart_file.is_empty() {
                    p { "Chart unavailable" }
                } @else {
                    img src=(chart_file.to_string_lossy());
                }
                h2 { "Session Plan" }
                @if !plan.is_built() {
                    p { "Session plan not generated." }
                }
                @for day in ALL_DAYS {
                    @let sessions = plan.for_day(day).collect::<Vec<_>>();
                    @if !sessions.is_empty() {
                        h3 { (day.name().to_uppercase()) }
                        table border="1" {
                            tr {
                                th { "No" } th { "Drill" } th { "Raw Vol" } th { "Rounded" }
                                th { "Sets" } th { "Reps" } th { "Rest" } th { "Remaining Sets" }
                            }
                            @for (i, s) in sessions.iter().enumerate() {
                                tr {
                                    td { ((i + 1)) }
                                    td { (s.drill) " (" (s.category) ")" }
                                    td { (s.raw_volume()) }
                                    td { (s.rounded_volume()) }
                                    td { (s.target_sets) }
                                    td { (s.reps_per_set) }
                                    td { (s.rest) }
                                    td { (format_number(planner.ledger().remaining_sets(day, s.id, &s.target_sets))) }
                                }
                                @for v in planner.ledger().variations(day, s.id) {
                                    tr {
                                        td {}
                                        td colspan="3" { "- " (v.name) }
                                        td { (v.sets_label()) }
                                        td { (v.reps) }
                                        td {}
                                        td {}
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drills::DrillEdit;
    use crate::variations::VariationEdit;
    use std::ffi::OsStr;

    fn planner() -> Planner {
        let mut p = Planner::default();
        p.team_name = "Warriors".into();
        let id = p.add_drill();
        p.update_drill(&id, DrillEdit::Name("Bench Press".into()));
        p.update_drill(&id, DrillEdit::Category("Upper Body".into()));
        p.update_drill(&id, DrillEdit::Base(10.0));
        p
    }

    #[test]
    fn unbuilt_plan_is_flagged() {
        let output = build_html(&planner(), "2026-01-01 09:00", OsStr::new("plan.png")).into_string();
        assert!(output.contains("Warriors"));
        assert!(output.contains("Session plan not generated."));
        assert!(output.contains("<td>1</td><td>Upper Body</td><td>Bench Press</td>"));
        assert!(output.contains("<td>160</td>"));
        assert!(output.contains("91.6%"));
        assert!(output.contains("<img src=\"plan.png\">"));
    }

    #[test]
    fn sessions_grouped_by_day_with_variations() {
        let mut p = planner();
        p.generate_plan();
        let v = p.add_variation(1, 3);
        p.update_variation(1, &v, VariationEdit::Name("Close grip".into()));
        p.update_variation(1, &v, VariationEdit::Sets(5.0));
        let output = build_html(&p, "now", OsStr::new("")).into_string();
        assert!(output.contains("<h3>MONDAY</h3>"));
        assert!(output.contains("<h3>SATURDAY</h3>"));
        assert!(output.contains("- Close grip"));
        assert!(output.contains("<td>-1</td>"));
        assert!(output.contains("<tr><td>1</td><td>Bench Press (Upper Body)</td>"));
        assert!(output.contains("Chart unavailable"));
        assert!(!output.contains("<img"));
        assert!(!output.contains("not generated"));
    }
}
