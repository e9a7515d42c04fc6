//! Footprint Matrix
//!
//! The footprint is the square activity-by-activity table of qualitative
//! relations. Rows and columns are indexed by the activities in sorted
//! order; every cell holds exactly one of the four symbols.

use crate::event_log::Activity;
use crate::relations::OrderingRelations;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The relation symbol of one footprint cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationSymbol {
    /// `a -> b`: causality
    Follows,
    /// `a <- b`: the reverse pair is in causality
    Precedes,
    /// `a # b`: neither direction directly follows
    Choice,
    /// `a || b`: both directions directly follow
    Parallel,
}

impl RelationSymbol {
    pub fn glyph(self) -> &'static str {
        match self {
            RelationSymbol::Follows => "\u{2192}",
            RelationSymbol::Precedes => "\u{2190}",
            RelationSymbol::Choice => "#",
            RelationSymbol::Parallel => "\u{2225}",
        }
    }
}

/// Square relation matrix in canonical (sorted) activity order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    activities: Vec<Activity>,
    /// Row-major cells, `activities.len()` squared.
    cells: Vec<RelationSymbol>,
}

impl Footprint {
    /// Assemble the matrix from the extracted relations.
    pub fn build(relations: &OrderingRelations) -> Self {
        let activities: Vec<Activity> = relations.activities.iter().cloned().collect();
        let mut cells = Vec::with_capacity(activities.len() * activities.len());

        for row in &activities {
            for column in &activities {
                let pair = (row.clone(), column.clone());
                let symbol = if relations.parallel.contains(&pair) {
                    RelationSymbol::Parallel
                } else if relations.causality.contains(&pair) {
                    RelationSymbol::Follows
                } else if relations.causality.contains(&(column.clone(), row.clone())) {
                    RelationSymbol::Precedes
                } else {
                    RelationSymbol::Choice
                };
                cells.push(symbol);
            }
        }

        Footprint { activities, cells }
    }

    /// Activities in the canonical row/column order.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Symbol of cell `(row, column)`, if both activities are known.
    pub fn symbol(&self, row: &str, column: &str) -> Option<RelationSymbol> {
        let r = self.activities.iter().position(|a| a == row)?;
        let c = self.activities.iter().position(|a| a == column)?;
        Some(self.cells[r * self.activities.len() + c])
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .activities
            .iter()
            .map(|a| a.chars().count())
            .max()
            .unwrap_or(1)
            .max(1);

        write!(f, "{:width$}", "")?;
        for column in &self.activities {
            write!(f, " {column:>width$}")?;
        }
        writeln!(f)?;

        for (r, row) in self.activities.iter().enumerate() {
            write!(f, "{row:width$}")?;
            for c in 0..self.activities.len() {
                let glyph = self.cells[r * self.activities.len() + c].glyph();
                write!(f, " {glyph:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::EventLog;

    fn l1() -> OrderingRelations {
        let log = EventLog::from_traces(
            [
                vec!["a", "e", "d"],
                vec!["a", "c", "b", "d"],
                vec!["a", "b", "c", "d"],
            ]
            .into_iter()
            .map(|t| t.into_iter().map(String::from).collect())
            .collect(),
        );
        OrderingRelations::extract(&log)
    }

    #[test]
    fn test_one_symbol_per_cell() {
        let footprint = Footprint::build(&l1());
        for a in footprint.activities() {
            for b in footprint.activities() {
                assert!(footprint.symbol(a, b).is_some());
            }
        }
    }

    #[test]
    fn test_l1_cells() {
        let footprint = Footprint::build(&l1());
        assert_eq!(footprint.symbol("a", "b"), Some(RelationSymbol::Follows));
        assert_eq!(footprint.symbol("b", "a"), Some(RelationSymbol::Precedes));
        assert_eq!(footprint.symbol("b", "c"), Some(RelationSymbol::Parallel));
        assert_eq!(footprint.symbol("c", "b"), Some(RelationSymbol::Parallel));
        assert_eq!(footprint.symbol("b", "e"), Some(RelationSymbol::Choice));
        assert_eq!(footprint.symbol("a", "a"), Some(RelationSymbol::Choice));
    }

    #[test]
    fn test_display_is_square() {
        let footprint = Footprint::build(&l1());
        let rendered = footprint.to_string();
        // header plus one line per activity
        assert_eq!(rendered.lines().count(), footprint.activities().len() + 1);
        assert!(rendered.contains('#'));
        assert!(rendered.contains('\u{2192}'));
    }
}
