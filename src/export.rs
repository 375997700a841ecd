use crate::coefficients::DAY_COUNT;
use crate::drills::Drill;
use crate::sessions::PrescribedSession;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(
    value: &T,
    path: P,
) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

pub fn write_csv<T: Serialize>(writer: impl Write, records: &[T]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in records {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(Into::into)
}

#[derive(Serialize)]
struct SessionRow<'a> {
    id: u32,
    day: &'a str,
    category: &'a str,
    drill: &'a str,
    raw_volume: i64,
    rounded_volume: i64,
    target_sets: &'a str,
    reps_per_set: i64,
    rest: &'a str,
}

fn session_rows(sessions: &[PrescribedSession]) -> Vec<SessionRow<'_>> {
    sessions
        .iter()
        .map(|s| SessionRow {
            id: s.id,
            day: s.day.name(),
            category: &s.category,
            drill: &s.drill,
            raw_volume: s.raw_volume(),
            rounded_volume: s.rounded_volume(),
            target_sets: &s.target_sets,
            reps_per_set: s.reps_per_set,
            rest: &s.rest,
        })
        .collect()
}

pub fn write_sessions_csv(writer: impl Write, sessions: &[PrescribedSession]) -> csv::Result<()> {
    write_csv(writer, &session_rows(sessions))
}

pub fn save_sessions_csv<P: AsRef<Path>>(
    path: P,
    sessions: &[PrescribedSession],
) -> csv::Result<()> {
    write_sessions_csv(std::fs::File::create(path)?, sessions)
}

pub fn save_sessions_json<P: AsRef<Path>>(
    path: P,
    sessions: &[PrescribedSession],
) -> std::io::Result<()> {
    write_json(sessions, path)
}

// csv cannot serialize a fixed array inside a record, so days get named columns.
#[derive(Serialize)]
struct VolumeRow<'a> {
    category: &'a str,
    name: &'a str,
    base: f64,
    fact: f64,
    total: f64,
    monday: i64,
    tuesday: i64,
    wednesday: i64,
    thursday: i64,
    friday: i64,
    saturday: i64,
}

fn volume_row(d: &Drill) -> VolumeRow<'_> {
    let [monday, tuesday, wednesday, thursday, friday, saturday]: [i64; DAY_COUNT] =
        d.daily_values;
    VolumeRow {
        category: &d.category,
        name: &d.name,
        base: d.base,
        fact: d.fact,
        total: d.total,
        monday,
        tuesday,
        wednesday,
        thursday,
        friday,
        saturday,
    }
}

pub fn write_weekly_volume_csv(writer: impl Write, drills: &[Drill]) -> csv::Result<()> {
    let rows: Vec<VolumeRow> = drills.iter().map(volume_row).collect();
    write_csv(writer, &rows)
}

pub fn save_weekly_volume_csv<P: AsRef<Path>>(path: P, drills: &[Drill]) -> csv::Result<()> {
    write_weekly_volume_csv(std::fs::File::create(path)?, drills)
}

pub fn save_weekly_volume_json<P: AsRef<Path>>(path: P, drills: &[Drill]) -> std::io::Result<()> {
    write_json(drills, path)
}
