//! Heuristic cell classification.
//!
//! A cell's runs are read top-to-bottom, left-to-right and split into
//! sub-groups at large vertical gaps. Each sub-group becomes at most one
//! [`ScheduleEntry`]: every token goes through the [`rules`] table and
//! whatever no rule claims becomes the subject.

pub mod rules;

use tracing::debug;

use crate::config::{LayoutConfig, LexiconConfig};
use crate::grid::Cell;
use crate::model::{PositionedText, ScheduleEntry};
use crate::slots::SlotTable;

pub use rules::{Field, Rule};

/// Token classifier built once per configuration.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
    subgroup_gap: f32,
}

impl Classifier {
    pub fn new(lexicon: &LexiconConfig, layout: &LayoutConfig) -> Self {
        Self {
            rules: rules::rule_table(lexicon),
            subgroup_gap: layout.subgroup_gap,
        }
    }

    /// First rule matching `token`, if any.
    pub fn field_for(&self, token: &str) -> Option<Field> {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(token))
            .map(|rule| rule.field)
    }

    /// Classify every cell, in cell order.
    pub fn classify_cells(&self, cells: &[Cell], slots: &SlotTable) -> Vec<ScheduleEntry> {
        let entries: Vec<ScheduleEntry> = cells
            .iter()
            .flat_map(|cell| self.classify_cell(cell, slots))
            .collect();
        debug!(
            "Classified {} cells into {} heuristic entries",
            cells.len(),
            entries.len()
        );
        entries
    }

    /// Entries for one cell: one per sub-group with a subject, or a single
    /// [`classify_flat`](Self::classify_flat) attempt over the whole cell
    /// when no sub-group produced one.
    pub fn classify_cell(&self, cell: &Cell, slots: &SlotTable) -> Vec<ScheduleEntry> {
        let Some(slot) = slots.get(cell.period_index) else {
            return Vec::new();
        };

        let mut texts: Vec<&PositionedText> = cell.texts.iter().collect();
        texts.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let groups = self.subgroups(&texts);
        let mut entries: Vec<ScheduleEntry> = groups
            .iter()
            .filter_map(|group| self.classify_tokens(group.iter().map(|t| t.text.as_str())))
            .collect();

        if entries.is_empty() {
            let tokens: Vec<&str> = texts.iter().map(|t| t.text.as_str()).collect();
            entries.extend(self.classify_flat(&tokens));
        }

        if groups.len() > 1 {
            debug!(
                "{} period {}: {} sub-groups, {} entries",
                cell.day,
                cell.period_index + 1,
                groups.len(),
                entries.len()
            );
        }

        for entry in &mut entries {
            entry.day = cell.day.name().to_string();
            entry.start_time.clone_from(&slot.start);
            entry.end_time.clone_from(&slot.end);
        }
        entries
    }

    /// Split sorted runs where the gap to the previous run exceeds
    /// `subgroup_gap` and the open group already holds two runs.
    fn subgroups<'a>(&self, texts: &[&'a PositionedText]) -> Vec<Vec<&'a PositionedText>> {
        let mut groups: Vec<Vec<&PositionedText>> = Vec::new();
        for &text in texts {
            let split = match groups.last() {
                Some(current) => {
                    let prev_y = current.last().map_or(text.y, |prev| prev.y);
                    prev_y - text.y > self.subgroup_gap && current.len() >= 2
                }
                None => true,
            };
            if split {
                groups.push(vec![text]);
            } else if let Some(current) = groups.last_mut() {
                current.push(text);
            }
        }
        groups
    }

    /// Assign tokens to fields. `None` if nothing became the subject.
    pub fn classify_tokens<'a>(
        &self,
        tokens: impl IntoIterator<Item = &'a str>,
    ) -> Option<ScheduleEntry> {
        let entry = self.assign(tokens);
        (!entry.subject.is_empty()).then_some(entry)
    }

    /// Whole-cell attempt once sub-grouping found no subject.
    ///
    /// Unclaimed tokens still win. Failing that, the first rule-claimed token
    /// that reads like a title (`Physics Lab 2`) becomes the subject and the
    /// rest keep their fields. Teacher codes are never promoted.
    pub fn classify_flat(&self, tokens: &[&str]) -> Option<ScheduleEntry> {
        if let Some(entry) = self.classify_tokens(tokens.iter().copied()) {
            return Some(entry);
        }

        let title = tokens.iter().position(|token| {
            let token = token.trim();
            reads_like_title(token) && self.field_for(token) != Some(Field::Teacher)
        })?;
        let mut entry = self.assign(
            tokens
                .iter()
                .enumerate()
                .filter(|&(idx, _)| idx != title)
                .map(|(_, token)| *token),
        );
        entry.subject = tokens[title].trim().to_string();
        Some(entry)
    }

    fn assign<'a>(&self, tokens: impl IntoIterator<Item = &'a str>) -> ScheduleEntry {
        let mut entry = ScheduleEntry::default();

        for token in tokens {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let slot = match self.field_for(token) {
                Some(Field::Teacher) => &mut entry.teacher,
                Some(Field::Room) => &mut entry.room,
                Some(Field::ClassName) => &mut entry.class_name,
                Some(Field::Block) => &mut entry.block,
                None if entry.subject.is_empty() => {
                    entry.subject = token.to_string();
                    continue;
                }
                None if rules::looks_like_section(token) => &mut entry.class_name,
                None => {
                    entry.subject.push(' ');
                    entry.subject.push_str(token);
                    continue;
                }
            };
            append(slot, token);
        }
        entry
    }
}

/// A word of three or more letters that is not all capitals.
fn reads_like_title(token: &str) -> bool {
    token
        .split(|c: char| !c.is_alphabetic())
        .any(|word| word.chars().count() >= 3 && word.chars().any(char::is_lowercase))
}

fn append(field: &mut String, value: &str) {
    if !field.is_empty() {
        field.push_str(", ");
    }
    field.push_str(value);
}
