//! CSV output format for tallies
//!
//! For spreadsheet analysis of instruction counts and timings.

use crate::tally::{Mode, Tally};

/// CSV formatter over a finished tally
#[derive(Debug)]
pub struct CsvOutput<'a> {
    tally: &'a Tally,
}

impl<'a> CsvOutput<'a> {
    pub fn new(tally: &'a Tally) -> Self {
        Self { tally }
    }

    fn include_duration(&self) -> bool {
        self.tally.mode() == Mode::Paired
    }

    /// Generate CSV header row based on the tally mode
    fn header(&self) -> String {
        let mut headers = vec!["key", "count"];
        if self.include_duration() {
            headers.push("duration");
        }
        headers.join(",")
    }

    /// Escape CSV field (handle commas, quotes, line breaks)
    fn escape_field(field: &str) -> String {
        if field.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.header());
        output.push('\n');

        for (key, stats) in self.tally.entries() {
            output.push_str(&Self::escape_field(key));
            output.push(',');
            output.push_str(&stats.count.to_string());
            if self.include_duration() {
                output.push(',');
                output.push_str(&stats.total_duration.to_string());
            }
            output.push('\n');
        }

        output
    }
}
