//! Cost lines and measurement vectors
//!
//! A cost line carries no prefix: `<line> <v1> <v2> ... <vk>`, one value per
//! declared event. Values are decoded positionally against the event
//! registry and summed into whichever vector the parser currently has open.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static COST_LINE: OnceLock<Regex> = OnceLock::new();

fn cost_line_pattern() -> &'static Regex {
    COST_LINE.get_or_init(|| Regex::new(r"^\d+(?:\s|$)").expect("cost line pattern is valid"))
}

/// Check whether a raw line has the shape of a cost line
pub fn is_cost_line(line: &str) -> bool {
    cost_line_pattern().is_match(line)
}

/// One decoded cost line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostLine {
    /// Source line number (first integer on the line)
    pub line: u32,
    /// Exactly one value per declared event
    pub values: Vec<i64>,
    /// Tokens that did not parse as integers (each counted as 0)
    pub malformed: usize,
    /// Tokens beyond the declared event count (dropped)
    pub surplus: usize,
}

impl CostLine {
    /// Decode `raw` against `event_count` declared events
    ///
    /// Missing trailing values read as 0, so the result always has
    /// `event_count` entries regardless of what the producer wrote.
    pub fn decode(raw: &str, event_count: usize) -> Self {
        let mut tokens = raw.split_whitespace();
        let mut malformed = 0;

        let line = match tokens.next().map(str::parse::<u32>) {
            Some(Ok(line)) => line,
            Some(Err(_)) => {
                malformed += 1;
                0
            }
            None => 0,
        };

        let (values, bad, surplus) = decode_values(tokens, event_count);
        malformed += bad;

        Self {
            line,
            values,
            malformed,
            surplus,
        }
    }
}

/// Decode a `summary:`/`totals:` payload (values only, no line number)
pub fn decode_totals(raw: &str, event_count: usize) -> Vec<i64> {
    decode_values(raw.split_whitespace(), event_count).0
}

/// Positional decode: (values, malformed count, surplus count)
fn decode_values<'a>(
    tokens: impl Iterator<Item = &'a str>,
    event_count: usize,
) -> (Vec<i64>, usize, usize) {
    let mut values = vec![0; event_count];
    let mut malformed = 0;
    let mut surplus = 0;
    for (i, token) in tokens.enumerate() {
        if i >= event_count {
            surplus += 1;
            continue;
        }
        match token.parse::<i64>() {
            Ok(value) => values[i] = value,
            Err(_) => malformed += 1,
        }
    }
    (values, malformed, surplus)
}

/// Measurement vector indexed by event position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostVector(Vec<i64>);

impl CostVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for the event at `index`; unwritten positions read as 0
    pub fn get(&self, index: usize) -> i64 {
        self.0.get(index).copied().unwrap_or(0)
    }

    /// Add `values` element-wise, growing the vector to fit
    pub fn accumulate(&mut self, values: &[i64]) {
        if self.0.len() < values.len() {
            self.0.resize(values.len(), 0);
        }
        for (slot, value) in self.0.iter_mut().zip(values) {
            *slot = slot.saturating_add(*value);
        }
    }

    pub fn values(&self) -> &[i64] {
        &self.0
    }

    /// True until the first cost line is attributed to this vector
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<i64>> for CostVector {
    fn from(values: Vec<i64>) -> Self {
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cost_line() {
        assert!(is_cost_line("3 15000293 32"));
        assert!(is_cost_line("0 10\t0"));
        assert!(is_cost_line("42"));
        assert!(!is_cost_line("fn=(1) main"));
        assert!(!is_cost_line("calls=1 0 0"));
        assert!(!is_cost_line("summary: 15000303 32"));
        assert!(!is_cost_line(" 3 4"));
        assert!(!is_cost_line("3x 4"));
        assert!(!is_cost_line(""));
    }

    #[test]
    fn test_decode_matches_event_count() {
        let cost = CostLine::decode("3 15000293 32", 2);
        assert_eq!(cost.line, 3);
        assert_eq!(cost.values, vec![15000293, 32]);
        assert_eq!(cost.malformed, 0);
        assert_eq!(cost.surplus, 0);
    }

    #[test]
    fn test_decode_pads_missing_values() {
        let cost = CostLine::decode("7 100", 3);
        assert_eq!(cost.values, vec![100, 0, 0]);
    }

    #[test]
    fn test_decode_drops_surplus_values() {
        let cost = CostLine::decode("7 1 2 3", 2);
        assert_eq!(cost.values, vec![1, 2]);
        assert_eq!(cost.surplus, 1);
    }

    #[test]
    fn test_decode_malformed_token_counts_as_zero() {
        let cost = CostLine::decode("7 12 abc", 2);
        assert_eq!(cost.values, vec![12, 0]);
        assert_eq!(cost.malformed, 1);
    }

    #[test]
    fn test_decode_without_events() {
        let cost = CostLine::decode("7 12 13", 0);
        assert!(cost.values.is_empty());
        assert_eq!(cost.surplus, 2);
    }

    #[test]
    fn test_decode_totals() {
        assert_eq!(decode_totals(" 15000303 32", 2), vec![15000303, 32]);
        assert_eq!(decode_totals("", 2), vec![0, 0]);
    }

    #[test]
    fn test_vector_reads_past_end_as_zero() {
        let vector = CostVector::from(vec![5]);
        assert_eq!(vector.get(0), 5);
        assert_eq!(vector.get(1), 0);
        assert_eq!(vector.get(usize::MAX), 0);
    }

    #[test]
    fn test_vector_accumulates() {
        let mut vector = CostVector::new();
        assert!(vector.is_empty());

        vector.accumulate(&[10, 0]);
        vector.accumulate(&[5, 32]);
        assert_eq!(vector.values(), &[15, 32]);
    }

    #[test]
    fn test_vector_accumulate_saturates() {
        let mut vector = CostVector::from(vec![i64::MAX]);
        vector.accumulate(&[1]);
        assert_eq!(vector.get(0), i64::MAX);
    }
}
