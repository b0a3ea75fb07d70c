//! End-to-end pipeline tests over synthetic positioned text.
//!
//! Coordinates follow PDF conventions: y grows upward, so the header sits at
//! the largest y and Monday is the top row.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use timegrid::{
    validate_and_merge, ParseError, ParserConfig, PositionedText, RefineError, Refiner,
    ScheduleEntry, SlotTable, TimeSlot, TimetableParser,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn run(text: &str, x: f32, y: f32) -> PositionedText {
    PositionedText::new(text, x, y, 6.0 * text.len() as f32, 10.0)
}

/// Header with period markers `1.` .. `n.` at x = 100, 200, ...
fn header(periods: usize) -> Vec<PositionedText> {
    (1..=periods)
        .map(|p| run(&format!("{p}."), 100.0 * p as f32, 700.0))
        .collect()
}

fn day_label(day: &str, row: usize) -> PositionedText {
    run(day, 10.0, 600.0 - 100.0 * row as f32)
}

/// A run inside the cell at `(row, period)`; `offset` moves it down.
fn cell_run(text: &str, row: usize, period: usize, offset: f32) -> PositionedText {
    run(text, 100.0 * period as f32 + 2.0, 600.0 - 100.0 * row as f32 - offset)
}

/// A full week: five days, nine periods, three classes per day.
fn week() -> Vec<PositionedText> {
    let days = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];
    let subjects = ["Algebra", "Physics", "Chemistry", "Biology", "History"];
    let mut runs = header(9);
    for (row, day) in days.iter().enumerate() {
        runs.push(day_label(day, row));
        for (n, period) in [1usize, 4, 7].into_iter().enumerate() {
            let subject = subjects[(row + n) % subjects.len()];
            runs.push(cell_run(subject, row, period, 0.0));
            runs.push(cell_run(&format!("CSE_T{row}{n}"), row, period, 10.0));
            runs.push(cell_run(&format!("HF{row}{n}"), row, period, 20.0));
        }
    }
    runs
}

fn parser() -> TimetableParser {
    TimetableParser::new(Arc::new(ParserConfig::default()))
}

fn entry(day: &str, start: &str, end: &str, subject: &str) -> ScheduleEntry {
    ScheduleEntry {
        day: day.into(),
        start_time: start.into(),
        end_time: end.into(),
        subject: subject.into(),
        ..Default::default()
    }
}

/// Returns every entry shifted off the slot grid, plus one invented entry.
struct HostileRefiner;

#[async_trait]
impl Refiner for HostileRefiner {
    fn name(&self) -> &'static str {
        "hostile"
    }

    async fn refine(
        &self,
        entries: &[ScheduleEntry],
        _raw_text: &str,
    ) -> Result<Vec<ScheduleEntry>, RefineError> {
        let mut refined: Vec<ScheduleEntry> = entries
            .iter()
            .map(|e| {
                let mut e = e.clone();
                e.start_time = e.start_time.replace(":00", ":05");
                e.end_time = "23:59".into();
                e
            })
            .collect();
        refined.push(entry("Saturday", "12:40", "14:00", "Recovered Seminar"));
        Ok(refined)
    }
}

/// Returns a fixed list regardless of input.
struct FixedRefiner(Vec<ScheduleEntry>);

#[async_trait]
impl Refiner for FixedRefiner {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn refine(
        &self,
        _entries: &[ScheduleEntry],
        _raw_text: &str,
    ) -> Result<Vec<ScheduleEntry>, RefineError> {
        Ok(self.0.clone())
    }
}

/// Returns the input with every time cleared.
struct TimelessRefiner;

#[async_trait]
impl Refiner for TimelessRefiner {
    fn name(&self) -> &'static str {
        "timeless"
    }

    async fn refine(
        &self,
        entries: &[ScheduleEntry],
        _raw_text: &str,
    ) -> Result<Vec<ScheduleEntry>, RefineError> {
        Ok(entries
            .iter()
            .map(|e| ScheduleEntry {
                start_time: String::new(),
                end_time: String::new(),
                ..e.clone()
            })
            .collect())
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn single_subject_cell_becomes_one_entry() {
    let mut runs = header(3);
    runs.push(day_label("Monday", 0));
    runs.push(day_label("Tuesday", 1));
    runs.push(cell_run("Mathematics", 0, 2, 5.0));

    let result = parser().parse_runs(runs).await.unwrap();

    assert_eq!(
        result.entries,
        vec![entry("Monday", "09:00", "09:50", "Mathematics")]
    );
    assert!(result.errors.is_empty());
    assert_eq!(result.raw_cell_count, 1);
    assert_eq!(result.final_entry_count, 1);
}

#[tokio::test]
async fn stacked_classes_split_then_share_the_slot() {
    let mut runs = header(3);
    runs.push(day_label("Monday", 0));
    runs.push(cell_run("Physics", 0, 1, 0.0));
    runs.push(cell_run("HF09", 0, 1, 12.0));
    runs.push(cell_run("Chemistry", 0, 1, 30.0));
    runs.push(cell_run("LAB02", 0, 1, 42.0));

    let parser = parser();
    let pass = parser.heuristic_pass(&runs).unwrap();
    assert_eq!(pass.entries.len(), 2);
    assert_eq!(pass.entries[0].subject, "Physics");
    assert_eq!(pass.entries[0].room, "HF09");
    assert_eq!(pass.entries[1].subject, "Chemistry");
    assert_eq!(pass.entries[1].room, "LAB02");
    assert_eq!(pass.entries[0].slot_key(), pass.entries[1].slot_key());

    let result = parser.parse_runs(runs).await.unwrap();
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].subject, "Physics / Chemistry");
    assert_eq!(result.entries[0].room, "HF09, LAB02");
}

#[tokio::test]
async fn refined_times_are_snapped_back() {
    let mut runs = header(3);
    runs.push(day_label("Monday", 0));
    runs.push(cell_run("Physcs", 0, 2, 0.0));

    let refiner = FixedRefiner(vec![entry("Monday", "09:05", "09:55", "Physics")]);
    let result = parser().with_refiner(refiner).parse_runs(runs).await.unwrap();

    assert_eq!(result.entries, vec![entry("Monday", "09:00", "09:50", "Physics")]);
}

#[tokio::test]
async fn refinement_without_times_does_not_erase_entries() {
    let mut runs = header(3);
    runs.push(day_label("Monday", 0));
    runs.push(cell_run("Physics", 0, 1, 0.0));
    runs.push(cell_run("Chemistry", 0, 2, 0.0));

    let result = parser()
        .with_refiner(TimelessRefiner)
        .parse_runs(runs)
        .await
        .unwrap();

    assert_eq!(
        result.entries,
        vec![
            entry("Monday", "08:00", "08:50", "Physics"),
            entry("Monday", "09:00", "09:50", "Chemistry"),
        ]
    );
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn no_runs_is_rejected() {
    let err = parser().parse_runs(Vec::new()).await.unwrap_err();
    assert_eq!(err, ParseError::NoTextFound);
    assert!(err.to_string().contains("No text found"));
}

#[tokio::test]
async fn duplicate_subjects_are_not_repeated() {
    let mut runs = header(3);
    runs.push(day_label("Monday", 0));
    runs.push(cell_run("Biology", 0, 3, 0.0));

    let refiner = FixedRefiner(vec![
        entry("Monday", "10:00", "10:50", "Biology"),
        entry("Monday", "10:00", "10:50", "Biology"),
    ]);
    let result = parser().with_refiner(refiner).parse_runs(runs).await.unwrap();

    assert_eq!(result.entries, vec![entry("Monday", "10:00", "10:50", "Biology")]);
}

#[tokio::test]
async fn document_without_day_labels_is_rejected() {
    let runs = vec![run("Quarterly report", 100.0, 700.0), run("Revenue", 100.0, 600.0)];
    assert_eq!(
        parser().parse_runs(runs).await.unwrap_err(),
        ParseError::NoDayLabelsFound
    );
}

// ─── Properties ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_week_is_recovered() {
    let result = parser().parse_runs(week()).await.unwrap();

    assert_eq!(result.raw_cell_count, 15);
    assert_eq!(result.final_entry_count, 15);
    assert!(result.errors.is_empty());

    let wednesday_first = result
        .entries
        .iter()
        .find(|e| e.day == "Wednesday" && e.start_time == "08:00")
        .unwrap();
    assert_eq!(wednesday_first.subject, "Chemistry");
    assert_eq!(wednesday_first.teacher, "CSE_T20");
    assert_eq!(wednesday_first.room, "HF20");
}

#[tokio::test]
async fn slot_keys_are_unique_and_counts_agree() {
    let mut runs = week();
    // Second class in an already populated cell.
    runs.push(cell_run("Drama", 0, 1, 45.0));
    runs.push(cell_run("Studio", 0, 1, 55.0));

    let result = parser().parse_runs(runs).await.unwrap();
    let keys: HashSet<_> = result.entries.iter().map(ScheduleEntry::slot_key).collect();
    assert_eq!(keys.len(), result.entries.len());
    assert_eq!(result.final_entry_count, result.entries.len());
}

#[tokio::test]
async fn times_stay_in_slot_table_under_hostile_refinement() {
    let config = ParserConfig::default();
    let slots = config.slots.clone();
    let parser = TimetableParser::new(Arc::new(config)).with_refiner(HostileRefiner);

    let result = parser.parse_runs(week()).await.unwrap();

    assert!(!result.entries.is_empty());
    for e in &result.entries {
        assert!(
            slots.contains_pair(&e.start_time, &e.end_time),
            "{} {}-{} is not a slot",
            e.day,
            e.start_time,
            e.end_time
        );
    }
    let recovered = result
        .entries
        .iter()
        .find(|e| e.subject == "Recovered Seminar")
        .unwrap();
    assert_eq!(recovered.start_time, "13:00");
    assert_eq!(recovered.end_time, "13:50");
}

#[tokio::test]
async fn validation_is_idempotent_on_pipeline_output() {
    let mut runs = week();
    runs.push(cell_run("Drama", 0, 1, 45.0));
    runs.push(cell_run("Studio", 0, 1, 55.0));
    let result = parser().parse_runs(runs).await.unwrap();

    let (again, errors) = validate_and_merge(result.entries.clone());
    assert_eq!(again, result.entries);
    assert!(errors.is_empty());
}

#[tokio::test]
async fn input_order_does_not_matter() {
    let forward = week();
    let mut reversed = forward.clone();
    reversed.reverse();
    let mut rotated = forward.clone();
    rotated.rotate_left(17);

    let parser = parser();
    let expected = parser.parse_runs(forward).await.unwrap();
    assert_eq!(parser.parse_runs(reversed).await.unwrap(), expected);
    assert_eq!(parser.parse_runs(rotated).await.unwrap(), expected);
}

#[tokio::test]
async fn alternate_slot_table_is_honored() {
    let slots = SlotTable::new(vec![
        TimeSlot::new("07:30", "08:45"),
        TimeSlot::new("09:00", "10:15"),
        TimeSlot::new("10:30", "11:45"),
    ])
    .unwrap();
    let config = ParserConfig {
        slots,
        ..ParserConfig::default()
    };
    let mut runs = header(3);
    runs.push(day_label("Thursday", 0));
    runs.push(cell_run("Statistics", 0, 3, 0.0));

    let result = TimetableParser::new(Arc::new(config))
        .parse_runs(runs)
        .await
        .unwrap();
    assert_eq!(result.entries, vec![entry("Thursday", "10:30", "11:45", "Statistics")]);
}

#[tokio::test]
async fn slow_refiner_times_out_to_heuristic() {
    struct Stalled;

    #[async_trait]
    impl Refiner for Stalled {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn refine(
            &self,
            _entries: &[ScheduleEntry],
            _raw_text: &str,
        ) -> Result<Vec<ScheduleEntry>, RefineError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    let result = parser()
        .with_refiner(Stalled)
        .with_timeout(Duration::from_millis(50))
        .parse_runs(week())
        .await
        .unwrap();
    assert_eq!(result.final_entry_count, 15);
}

#[tokio::test]
async fn time_label_headers_work_without_markers() {
    let mut runs = vec![
        run("08:00-08:50", 100.0, 700.0),
        run("09:00-09:50", 200.0, 700.0),
        run("10:00-10:50", 300.0, 700.0),
    ];
    runs.push(day_label("Friday", 0));
    runs.push(cell_run("Geography", 0, 3, 0.0));

    let result = parser().parse_runs(runs).await.unwrap();
    assert_eq!(result.entries, vec![entry("Friday", "10:00", "10:50", "Geography")]);
}
