//! Per-instruction tally: occurrence counts and summed durations
//!
//! A tally is built in one forward pass over the input lines and keeps keys
//! in first-seen order. Two passes are supported:
//!
//! - single: every line is a key
//! - paired: lines alternate `<key>`, `<duration>`

use crate::error::{Result, TallyError};
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::num::ParseIntError;
use tracing::debug;

/// How the input lines are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One key per line, counts only
    Single,
    /// Alternating key and duration lines
    Paired,
}

/// Which column to print in text mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `1`: the keys themselves
    Keys,
    /// `2`: occurrence counts
    Counts,
    /// `3`: summed durations
    Durations,
}

impl Selector {
    /// Parse a positional selector; anything but `1`, `2` or `3` selects nothing
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1" => Some(Selector::Keys),
            "2" => Some(Selector::Counts),
            "3" => Some(Selector::Durations),
            _ => None,
        }
    }
}

/// Aggregate for a single key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStats {
    /// Number of times this key occurred
    pub count: u64,
    /// Sum of paired durations (always 0 in single mode)
    pub total_duration: i64,
}

/// Summary totals over all keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyTotals {
    pub distinct_keys: usize,
    pub total_count: u64,
    pub total_duration: i64,
}

/// Insertion-ordered tally of keys
#[derive(Debug, Clone)]
pub struct Tally {
    mode: Mode,
    /// Entries in first-seen order
    entries: Vec<(String, KeyStats)>,
    /// Key to position in `entries`
    index: FnvHashMap<String, usize>,
}

impl Tally {
    /// Create an empty tally
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
            index: FnvHashMap::default(),
        }
    }

    /// Build a count-only tally, one key per line
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tally = Self::new(Mode::Single);
        for line in lines {
            tally.record(line.as_ref());
        }
        debug!(
            keys = tally.len(),
            total = tally.totals().total_count,
            "single tally built"
        );
        tally
    }

    /// Build a tally from alternating key and duration lines
    ///
    /// Fails without producing a partial tally if the line count is odd or a
    /// duration line is not an integer.
    pub fn from_paired_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        if lines.len() % 2 != 0 {
            return Err(TallyError::OddLineCount { lines: lines.len() });
        }

        let mut tally = Self::new(Mode::Paired);
        for (pair, chunk) in lines.chunks_exact(2).enumerate() {
            let key = chunk[0].as_ref();
            let raw = chunk[1].as_ref();
            let duration = parse_duration(raw).map_err(|source| TallyError::InvalidDuration {
                line: pair * 2 + 2,
                value: raw.to_string(),
                source,
            })?;
            tally.record_timed(key, duration)?;
        }
        debug!(
            keys = tally.len(),
            pairs = lines.len() / 2,
            "paired tally built"
        );
        Ok(tally)
    }

    fn entry_mut(&mut self, key: &str) -> &mut KeyStats {
        let pos = match self.index.get(key) {
            Some(&pos) => pos,
            None => {
                let pos = self.entries.len();
                self.entries.push((key.to_string(), KeyStats::default()));
                self.index.insert(key.to_string(), pos);
                pos
            }
        };
        &mut self.entries[pos].1
    }

    /// Record one occurrence of `key`
    pub fn record(&mut self, key: &str) {
        self.entry_mut(key).count += 1;
    }

    /// Record one occurrence of `key` that took `duration`
    pub fn record_timed(&mut self, key: &str, duration: i64) -> Result<()> {
        let entry = self.entry_mut(key);
        entry.total_duration = entry
            .total_duration
            .checked_add(duration)
            .ok_or_else(|| TallyError::DurationOverflow {
                key: key.to_string(),
            })?;
        entry.count += 1;
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&KeyStats> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Keys in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Key/stats pairs in first-seen order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &KeyStats)> {
        self.entries.iter().map(|(key, stats)| (key.as_str(), stats))
    }

    pub fn totals(&self) -> TallyTotals {
        TallyTotals {
            distinct_keys: self.entries.len(),
            total_count: self.entries.iter().map(|(_, s)| s.count).sum(),
            total_duration: self
                .entries
                .iter()
                .fold(0i64, |acc, (_, s)| acc.saturating_add(s.total_duration)),
        }
    }

    /// Values for one column, in first-seen order
    ///
    /// `Durations` on a single-mode tally yields zeros.
    pub fn column(&self, selector: Selector) -> Vec<String> {
        self.entries
            .iter()
            .map(|(key, stats)| match selector {
                Selector::Keys => key.clone(),
                Selector::Counts => stats.count.to_string(),
                Selector::Durations => stats.total_duration.to_string(),
            })
            .collect()
    }

    /// Write one column, one value per line
    pub fn write_column<W: Write>(&self, out: &mut W, selector: Selector) -> io::Result<()> {
        for value in self.column(selector) {
            writeln!(out, "{}", value)?;
        }
        Ok(())
    }

    /// Write a summary table, sorted by count (descending)
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.entries.is_empty() {
            writeln!(out, "No instructions tallied.")?;
            return Ok(());
        }

        let totals = self.totals();

        // Stable sort keeps first-seen order among equal counts
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.1.count.cmp(&a.1.count));

        writeln!(out, "% time       total    avg/call     calls key")?;
        writeln!(out, "------ ----------- ----------- --------- ----------------")?;

        for (key, stats) in sorted {
            let time_percent = if totals.total_duration > 0 {
                (stats.total_duration as f64 / totals.total_duration as f64) * 100.0
            } else {
                0.0
            };
            let avg = if stats.count > 0 {
                stats.total_duration / stats.count as i64
            } else {
                0
            };

            writeln!(
                out,
                "{:6.2} {:>11} {:>11} {:>9} {}",
                time_percent, stats.total_duration, avg, stats.count, key
            )?;
        }

        writeln!(out, "------ ----------- ----------- --------- ----------------")?;
        let avg = if totals.total_count > 0 {
            totals.total_duration / totals.total_count as i64
        } else {
            0
        };
        writeln!(
            out,
            "100.00 {:>11} {:>11} {:>9} total",
            totals.total_duration, avg, totals.total_count
        )
    }

    /// Print the summary table to stderr
    pub fn print_summary(&self) -> io::Result<()> {
        let stderr = io::stderr();
        let mut out = stderr.lock();
        self.write_summary(&mut out)?;
        out.flush()
    }
}

/// Parse a duration line as a signed decimal integer
///
/// Surrounding whitespace is ignored and single `_` separators between
/// digits are accepted (`1_000`). Values must fit in an `i64`.
fn parse_duration(raw: &str) -> std::result::Result<i64, ParseIntError> {
    let s = raw.trim();
    if !s.contains('_') {
        return s.parse();
    }

    let bytes = s.as_bytes();
    let separators_ok = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    if separators_ok {
        s.replace('_', "").parse()
    } else {
        // Misplaced separators fail the plain parse with InvalidDigit
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(tally: &Tally) -> String {
        let mut buf = Vec::new();
        tally.write_summary(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_single_counts_in_first_seen_order() {
        let tally = Tally::from_lines(["A", "B", "A"]);

        assert_eq!(tally.mode(), Mode::Single);
        assert_eq!(tally.column(Selector::Keys), vec!["A", "B"]);
        assert_eq!(tally.column(Selector::Counts), vec!["2", "1"]);
    }

    #[test]
    fn test_paired_scenario() {
        let tally = Tally::from_paired_lines(&["X", "3", "Y", "5", "X", "2"]).unwrap();

        assert_eq!(tally.column(Selector::Keys), vec!["X", "Y"]);
        assert_eq!(tally.column(Selector::Counts), vec!["2", "1"]);
        assert_eq!(tally.column(Selector::Durations), vec!["5", "5"]);
    }

    #[test]
    fn test_paired_odd_line_count() {
        let err = Tally::from_paired_lines(&["X", "3", "Y"]).unwrap_err();
        assert!(matches!(err, TallyError::OddLineCount { lines: 3 }));
    }

    #[test]
    fn test_paired_invalid_duration_reports_line() {
        let err = Tally::from_paired_lines(&["X", "3", "Y", "fast"]).unwrap_err();
        match err {
            TallyError::InvalidDuration { line, value, .. } => {
                assert_eq!(line, 4);
                assert_eq!(value, "fast");
            }
            other => panic!("Expected InvalidDuration, got {:?}", other),
        }
    }

    #[test]
    fn test_paired_duration_whitespace_and_sign() {
        let tally = Tally::from_paired_lines(&["X", " 7 ", "X", "-2", "X", "+1"]).unwrap();
        let stats = tally.get("X").unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_duration, 6);
    }

    #[test]
    fn test_paired_duration_digit_separators() {
        let tally =
            Tally::from_paired_lines(&["X", "1_000", "X", "-2_500", "X", "+1_0_0"]).unwrap();
        assert_eq!(tally.get("X").unwrap().total_duration, -1_400);
    }

    #[test]
    fn test_paired_duration_misplaced_separators() {
        for bad in ["_1", "1_", "1__0", "+_1", "_"] {
            let err = Tally::from_paired_lines(&["X", bad]).unwrap_err();
            assert!(
                matches!(err, TallyError::InvalidDuration { line: 2, .. }),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_paired_overflow() {
        let max = i64::MAX.to_string();
        let err = Tally::from_paired_lines(&["X", max.as_str(), "X", "1"]).unwrap_err();
        assert!(matches!(err, TallyError::DurationOverflow { ref key } if key == "X"));
    }

    #[test]
    fn test_empty_input() {
        let single = Tally::from_lines(Vec::<String>::new());
        assert!(single.is_empty());

        let paired = Tally::from_paired_lines::<&str>(&[]).unwrap();
        assert!(paired.is_empty());
        assert!(paired.column(Selector::Durations).is_empty());
    }

    #[test]
    fn test_blank_line_is_a_key() {
        let tally = Tally::from_lines(["A", "", "A", ""]);
        assert_eq!(tally.len(), 2);
        assert_eq!(tally.get("").unwrap().count, 2);
    }

    #[test]
    fn test_keys_compared_exactly() {
        let tally = Tally::from_lines(["add", "Add", "add ", "add"]);
        assert_eq!(tally.column(Selector::Keys), vec!["add", "Add", "add "]);
        assert_eq!(tally.get("add").unwrap().count, 2);
    }

    #[test]
    fn test_crlf_lines_tally_like_lf() {
        let crlf = Tally::from_lines(crate::input::split_lines("A\r\nB\r\nA\r\n"));
        let lf = Tally::from_lines(crate::input::split_lines("A\nB\nA\n"));

        assert_eq!(crlf.column(Selector::Keys), vec!["A", "B"]);
        assert_eq!(crlf.column(Selector::Keys), lf.column(Selector::Keys));
        assert_eq!(crlf.column(Selector::Counts), vec!["2", "1"]);
    }

    #[test]
    fn test_single_durations_are_zero() {
        let tally = Tally::from_lines(["A", "B"]);
        assert_eq!(tally.column(Selector::Durations), vec!["0", "0"]);
    }

    #[test]
    fn test_totals() {
        let tally = Tally::from_paired_lines(&["X", "3", "Y", "5", "X", "2"]).unwrap();
        assert_eq!(
            tally.totals(),
            TallyTotals {
                distinct_keys: 2,
                total_count: 3,
                total_duration: 10,
            }
        );
    }

    #[test]
    fn test_write_column() {
        let tally = Tally::from_lines(["A", "B", "A"]);
        let mut buf = Vec::new();
        tally.write_column(&mut buf, Selector::Counts).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "2\n1\n");
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(Selector::parse("1"), Some(Selector::Keys));
        assert_eq!(Selector::parse("2"), Some(Selector::Counts));
        assert_eq!(Selector::parse("3"), Some(Selector::Durations));
        assert_eq!(Selector::parse("4"), None);
        assert_eq!(Selector::parse(" 1"), None);
        assert_eq!(Selector::parse(""), None);
    }

    #[test]
    fn test_summary_sorted_by_count() {
        let tally = Tally::from_paired_lines(&[
            "rare", "10", "common", "20", "common", "30", "common", "40",
        ])
        .unwrap();
        let out = summary(&tally);

        let common = out.find("common").unwrap();
        let rare = out.find("rare").unwrap();
        assert!(common < rare);
        assert!(out.contains("% time"));
        assert!(out.contains("total"));
        assert!(out.contains("100"));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_summary_write_error_propagates() {
        let tally = Tally::from_lines(["A"]);
        let err = tally.write_summary(&mut BrokenPipe).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_print_summary_ok() {
        let tally = Tally::from_lines(["A", "B", "A"]);
        assert!(tally.print_summary().is_ok());
    }

    #[test]
    fn test_summary_empty() {
        let tally = Tally::new(Mode::Single);
        assert_eq!(summary(&tally), "No instructions tallied.\n");
    }

    #[test]
    fn test_summary_zero_time_no_panic() {
        let tally = Tally::from_lines(["A", "A"]);
        let out = summary(&tally);
        assert!(out.contains("  0.00"));
    }

    #[test]
    fn test_idempotent() {
        let lines = ["X", "3", "Y", "5", "X", "2"];
        let a = Tally::from_paired_lines(&lines).unwrap();
        let b = Tally::from_paired_lines(&lines).unwrap();
        for selector in [Selector::Keys, Selector::Counts, Selector::Durations] {
            assert_eq!(a.column(selector), b.column(selector));
        }
    }
}
