//! Entry validation and slot deduplication.
//!
//! Every entry gets a canonical day and zero-padded times, or is dropped with
//! a message. Entries sharing a `(day, start_time, end_time)` slot are then
//! merged into one, keeping first-appearance order.

use tracing::debug;

use crate::model::{Day, ScheduleEntry};
use crate::slots::normalize_time;

/// Validate, normalize and merge `entries`.
///
/// Returns the surviving entries and one message per dropped-with-report
/// entry. Subjects shorter than two characters are dropped without a
/// message. Running this on its own output changes nothing.
pub fn validate_and_merge(entries: Vec<ScheduleEntry>) -> (Vec<ScheduleEntry>, Vec<String>) {
    let mut errors = Vec::new();
    let mut valid = Vec::with_capacity(entries.len());

    for entry in entries {
        match normalize(entry) {
            Ok(Some(entry)) => valid.push(entry),
            Ok(None) => {}
            Err(message) => errors.push(message),
        }
    }

    let merged = merge_slots(valid);
    debug!(
        "Validation kept {} entries ({} reported errors)",
        merged.len(),
        errors.len()
    );
    (merged, errors)
}

/// `Ok(None)` means a silent drop.
fn normalize(mut entry: ScheduleEntry) -> Result<Option<ScheduleEntry>, String> {
    let Some(day) = Day::from_fuzzy(&entry.day) else {
        return Err(format!(
            "Invalid day {:?} for {:?}; entry dropped",
            entry.day, entry.subject
        ));
    };
    let (Some(start), Some(end)) = (
        normalize_time(&entry.start_time),
        normalize_time(&entry.end_time),
    ) else {
        return Err(format!(
            "Invalid time {:?}-{:?} for {:?} on {}; entry dropped",
            entry.start_time, entry.end_time, entry.subject, day
        ));
    };

    entry.subject = entry.subject.trim().to_string();
    if entry.subject.chars().count() <= 1 {
        return Ok(None);
    }

    entry.day = day.name().to_string();
    entry.start_time = start;
    entry.end_time = end;
    for field in [
        &mut entry.teacher,
        &mut entry.room,
        &mut entry.block,
        &mut entry.class_name,
    ] {
        *field = field.trim().to_string();
    }
    Ok(Some(entry))
}

/// Group by slot in first-appearance order and merge multi-member groups.
fn merge_slots(entries: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
    let mut groups: Vec<Vec<ScheduleEntry>> = Vec::new();
    for entry in entries {
        let key = entry.slot_key();
        match groups.iter_mut().find(|group| group[0].slot_key() == key) {
            Some(group) => group.push(entry),
            None => groups.push(vec![entry]),
        }
    }

    groups
        .into_iter()
        .filter_map(|mut group| {
            if group.len() == 1 {
                return group.pop();
            }
            Some(merge_group(&group))
        })
        .collect()
}

fn merge_group(group: &[ScheduleEntry]) -> ScheduleEntry {
    let first = &group[0];
    let subjects = distinct(group.iter().flat_map(|e| e.subject.split(" / ")));
    let teachers = distinct(group.iter().flat_map(|e| e.teacher.split(',')));
    let list = |field: fn(&ScheduleEntry) -> &str| {
        distinct(group.iter().flat_map(|e| field(e).split(','))).join(", ")
    };

    ScheduleEntry {
        day: first.day.clone(),
        start_time: first.start_time.clone(),
        end_time: first.end_time.clone(),
        subject: subjects.join(" / "),
        teacher: teachers.join(", "),
        room: list(|e| e.room.as_str()),
        block: list(|e| e.block.as_str()),
        class_name: list(|e| e.class_name.as_str()),
    }
}

/// Trimmed, non-empty values in first-seen order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for value in values.map(str::trim).filter(|v| !v.is_empty()) {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}
