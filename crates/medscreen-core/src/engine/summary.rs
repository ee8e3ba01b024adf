use super::error::StageError;
use super::schema::FieldKind;
use super::table::{Column, ResultTable};
use super::verdict;
use std::fmt;

const RULE: &str = "================================================================================";
const SECTION_RULE: &str = "----------------------------------------";
const RULE_PREFIX: &str = "rule_";
const GROUP_PREFIX: &str = "has_";

const ALERTS_SECTION: &str = "STRUCTURAL ALERTS";
const COMPLEXITY_SECTION: &str = "COMPLEXITY";
const SCORES_SECTION: &str = "SCORES";

/// Section and label for a score column's mean line.
fn score_label(name: &str) -> (&'static str, String) {
    match name {
        "lilly_demerits" => (ALERTS_SECTION, "Lilly demerits".to_string()),
        "complexity_score" => (COMPLEXITY_SECTION, "complexity".to_string()),
        other => (SCORES_SECTION, other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryLine {
    Count {
        label: String,
        count: usize,
        percent: f64,
        verb: &'static str,
    },
    Mean {
        label: String,
        mean: Option<f64>,
    },
    Note(String),
}

impl fmt::Display for SummaryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryLine::Count {
                label,
                count,
                percent,
                verb,
            } => write!(f, "  {label}: {count} {verb} ({percent:.1}%)"),
            SummaryLine::Mean {
                label,
                mean: Some(mean),
            } => write!(f, "  Average {label}: {mean:.1}"),
            SummaryLine::Mean { label, mean: None } => write!(f, "  Average {label}: n/a"),
            SummaryLine::Note(text) => write!(f, "  {text}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummarySection {
    pub title: &'static str,
    pub lines: Vec<SummaryLine>,
}

/// Category-level statistics over a result table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub total: usize,
    pub sections: Vec<SummarySection>,
}

impl SummaryReport {
    pub fn section(&self, title: &str) -> Option<&SummarySection> {
        self.sections.iter().find(|s| s.title == title)
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "MEDCHEM FILTERING SUMMARY")?;
        writeln!(f, "{RULE}")?;
        writeln!(f)?;
        writeln!(f, "Total molecules processed: {}", self.total)?;
        writeln!(f)?;
        for section in &self.sections {
            writeln!(f, "{}:", section.title)?;
            writeln!(f, "{SECTION_RULE}")?;
            for line in &section.lines {
                writeln!(f, "{line}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{RULE}")
    }
}

struct Summarizer<'a> {
    table: &'a ResultTable,
}

impl Summarizer<'_> {
    fn percent(&self, count: usize) -> f64 {
        if self.table.is_empty() {
            0.0
        } else {
            100.0 * count as f64 / self.table.len() as f64
        }
    }

    fn count_where(column: &Column, wanted: bool) -> usize {
        column
            .values
            .iter()
            .filter(|v| v.as_bool() == Some(wanted))
            .count()
    }

    fn count_line(&self, label: impl Into<String>, count: usize, verb: &'static str) -> SummaryLine {
        SummaryLine::Count {
            label: label.into(),
            count,
            percent: self.percent(count),
            verb,
        }
    }

    fn passed(&self, name: &str, label: &str) -> Option<SummaryLine> {
        let column = self.table.column(name)?;
        Some(self.count_line(label, Self::count_where(column, true), "passed"))
    }

    fn mean(column: &Column, label: String) -> SummaryLine {
        let values: Vec<f64> = column.values.iter().filter_map(|v| v.as_f64()).collect();
        let mean = (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);
        SummaryLine::Mean { label, mean }
    }

    /// Mean lines for the score-like numeric columns that belong in `section`.
    fn scores(&self, section: &str) -> Vec<SummaryLine> {
        self.table
            .columns()
            .iter()
            .filter(|c| c.field.score && matches!(c.field.kind, FieldKind::Int | FieldKind::Float))
            .filter_map(|c| {
                let (home, label) = score_label(c.name());
                (home == section).then(|| Self::mean(c, label))
            })
            .collect()
    }

    fn bool_columns(&self, pred: impl Fn(&str) -> bool) -> impl Iterator<Item = &Column> {
        self.table
            .columns()
            .iter()
            .filter(move |c| c.field.kind == FieldKind::Bool && pred(c.name()))
    }

    fn rules(&self) -> Vec<SummaryLine> {
        self.bool_columns(|name| {
            name.starts_with(RULE_PREFIX) || name == super::stages::rules::ALL_RULES_COLUMN
        })
        .map(|c| self.count_line(c.name(), Self::count_where(c, true), "passed"))
        .collect()
    }

    fn alerts(&self) -> Vec<SummaryLine> {
        let mut lines = Vec::new();
        if let Some(column) = self.table.column("has_common_alerts") {
            lines.push(self.count_line(
                "Without common alerts",
                Self::count_where(column, false),
                "passed",
            ));
        }
        lines.extend(self.passed("passes_nibr", "Passes NIBR"));
        lines.extend(self.passed("passes_lilly", "Passes Lilly"));
        lines.extend(self.scores(ALERTS_SECTION));
        lines.extend(self.passed("passes_pains", "Passes PAINS"));
        lines
    }

    fn complexity(&self) -> Vec<SummaryLine> {
        let mut lines = Vec::new();
        lines.extend(self.scores(COMPLEXITY_SECTION));
        lines.extend(self.passed("passes_complexity", "Within threshold"));
        lines
    }

    fn constraints(&self) -> Vec<SummaryLine> {
        self.passed("passes_constraints", "Passes all constraints")
            .into_iter()
            .collect()
    }

    fn groups(&self) -> Vec<SummaryLine> {
        self.bool_columns(|name| name.starts_with(GROUP_PREFIX) && name != "has_common_alerts")
            .map(|c| {
                let label = c.name().trim_start_matches(GROUP_PREFIX);
                self.count_line(label, Self::count_where(c, true), "matched")
            })
            .collect()
    }

    fn overall(&self) -> Vec<SummaryLine> {
        verdict::verdicts(self.table)
            .map(|verdicts| {
                let count = verdicts.iter().filter(|&&v| v).count();
                vec![self.count_line("Molecules passing all filters", count, "passed")]
            })
            .unwrap_or_default()
    }
}

/// Summarizes `table`, listing `failed` stages in their own section.
///
/// Counts use the table's own row count as denominator; an empty table yields
/// zero percentages. The overall line is recomputed from the marker columns
/// rather than read from any stored verdict.
pub fn summarize(table: &ResultTable, failed: &[StageError]) -> SummaryReport {
    let s = Summarizer { table };
    let failures = failed
        .iter()
        .map(|e| SummaryLine::Note(e.to_string()))
        .collect();

    let sections = [
        ("RULE FILTERS", s.rules()),
        (ALERTS_SECTION, s.alerts()),
        (COMPLEXITY_SECTION, s.complexity()),
        ("CONSTRAINTS", s.constraints()),
        ("CHEMICAL GROUPS", s.groups()),
        (SCORES_SECTION, s.scores(SCORES_SECTION)),
        ("FAILED STAGES", failures),
        ("OVERALL", s.overall()),
    ]
    .into_iter()
    .filter(|(_, lines)| !lines.is_empty())
    .map(|(title, lines)| SummarySection { title, lines })
    .collect();

    SummaryReport {
        total: table.len(),
        sections,
    }
}
