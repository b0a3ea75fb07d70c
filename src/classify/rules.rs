//! Ordered token rules, first match wins.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::config::LexiconConfig;

/// Entry field a token can be assigned to by a rule.
///
/// `subject` is not here: it is whatever no rule claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Teacher,
    Room,
    ClassName,
    Block,
}

/// One `(pattern, field)` row of the rule table.
#[derive(Debug, Clone)]
pub struct Rule {
    pub field: Field,
    pub pattern: Regex,
}

impl Rule {
    fn new(field: Field, pattern: &str) -> Option<Self> {
        match Regex::new(pattern) {
            Ok(pattern) => Some(Self { field, pattern }),
            Err(e) => {
                warn!("Skipping {field:?} rule {pattern:?}: {e}");
                None
            }
        }
    }
}

/// Tokens after the subject that read like a section code (`4A`, `Sec-B`).
static SECTION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:sec(?:tion)?[-\s]+[a-z0-9]{1,3}|\d[a-z]|[a-z]\d)$").unwrap()
});

pub fn looks_like_section(token: &str) -> bool {
    SECTION_CODE.is_match(token.trim())
}

fn prefix_alternation(prefixes: &[String]) -> Option<String> {
    let escaped: Vec<String> = prefixes
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(regex::escape)
        .collect();
    (!escaped.is_empty()).then(|| escaped.join("|"))
}

/// Build the rule table in priority order: teacher, room, class, block.
pub fn rule_table(lexicon: &LexiconConfig) -> Vec<Rule> {
    let departments = prefix_alternation(&lexicon.department_prefixes);
    let programs = prefix_alternation(&lexicon.program_prefixes);

    let mut patterns: Vec<(Field, String)> = vec![(
        Field::Teacher,
        r"^[A-Z][A-Z0-9]*_[A-Za-z][\w.]*$".to_string(),
    )];
    if let Some(departments) = departments {
        patterns.push((Field::Teacher, format!(r"^(?:{departments})[_\-\s]")));
    }
    patterns.push((Field::Room, r"^[A-Z]{1,3}-?\d{2,4}[A-Z]?$".to_string()));
    patterns.push((Field::Room, r"(?i)lab.*\d".to_string()));
    if let Some(programs) = programs {
        patterns.push((Field::ClassName, format!(r"^(?:{programs})[-\s]?\d")));
    }
    patterns.push((Field::ClassName, r"(?i)^group\s*\d+".to_string()));
    patterns.push((Field::Block, r"^G\d$".to_string()));
    patterns.push((Field::Block, r"(?i)^(?:block|blk)".to_string()));

    patterns
        .into_iter()
        .filter_map(|(field, pattern)| Rule::new(field, &pattern))
        .collect()
}
