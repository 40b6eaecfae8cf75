// Field extraction from captured link-monitor output
// TK Ales, 2022

use std::fs;
use std::io::Write;
use std::path::Path;

use log::{debug, info};
use regex::Regex;

use crate::error::{CalibError, Result};
use crate::writer::write_atomic;

/// Key whose value is a two-decimal temperature instead of an integer.
pub const TEMPERATURE_KEY: &str = "temp";

/// Timestamp generator prepended to every extracted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub seed: i64,
    pub incr: i64,
}

/// One complete record: optional timestamp and one raw value per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: Option<i64>,
    pub values: Vec<String>,
}

/// Pulls named numeric fields out of monitor text, one pattern per key.
#[derive(Debug)]
pub struct FieldExtractor {
    keys: Vec<String>,
    patterns: Vec<Regex>,
}

impl FieldExtractor {
    pub fn new<S: AsRef<str>>(keys: &[S]) -> Result<Self> {
        if keys.is_empty() {
            return Err(CalibError::InsufficientData { needed: 1, got: 0 });
        }

        let mut patterns = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            let pattern = if key == TEMPERATURE_KEY {
                r"temp:.(\d{2}\.\d{2})".to_string()
            } else {
                format!(r"{}:(\d+)", regex::escape(key))
            };
            patterns.push(Regex::new(&pattern)?);
        }

        Ok(FieldExtractor {
            keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
            patterns,
        })
    }

    /// Collect records from `text`.
    ///
    /// Each line is checked against every pattern in key order; captures
    /// accumulate until a record holds one value per key. A trailing
    /// incomplete record is dropped.
    pub fn extract(&self, text: &str, timestamps: Option<Timestamps>) -> Vec<Record> {
        let mut records = Vec::new();
        let mut current = Vec::with_capacity(self.keys.len());
        let mut next_ts = timestamps.map(|ts| ts.seed);

        for line in text.lines() {
            for pattern in &self.patterns {
                let Some(caps) = pattern.captures(line) else {
                    continue;
                };
                current.push(caps[1].to_string());

                if current.len() == self.keys.len() {
                    records.push(Record {
                        timestamp: next_ts,
                        values: std::mem::take(&mut current),
                    });
                    if let (Some(ts), Some(step)) = (next_ts.as_mut(), timestamps) {
                        *ts += step.incr;
                    }
                }
            }
        }

        if !current.is_empty() {
            debug!("Dropping incomplete trailing record with {} values", current.len());
        }
        records
    }

    /// Extract records from `input_file` and write them as a columnar log.
    pub fn extract_file<P, Q>(
        &self,
        input_file: P,
        output_file: Q,
        timestamps: Option<Timestamps>,
    ) -> Result<usize>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let input_file = input_file.as_ref();
        let text = fs::read_to_string(input_file)?;
        let records = self.extract(&text, timestamps);
        let source = input_file.to_string_lossy();

        write_atomic(output_file.as_ref(), |writer| {
            self.write_header(writer, &source, timestamps.is_some())?;
            for record in &records {
                writeln!(writer, "{}", format_record(record))?;
            }
            Ok(())
        })?;

        info!(
            "Extracted {} records from {} into {}",
            records.len(),
            input_file.display(),
            output_file.as_ref().display()
        );
        Ok(records.len())
    }

    fn write_header<W: Write>(&self, writer: &mut W, source: &str, with_ts: bool) -> Result<()> {
        writeln!(writer, "#")?;
        writeln!(writer, "# Parsed output from the '{}' input file", source)?;
        writeln!(writer, "#")?;
        writeln!(writer, "# Columns:")?;
        let mut columns = Vec::with_capacity(self.keys.len() + 1);
        if with_ts {
            columns.push("timestamp");
        }
        columns.extend(self.keys.iter().map(String::as_str));
        writeln!(writer, "# {}", columns.join(" "))?;
        Ok(())
    }
}

/// Format a record as a space separated line without trailing whitespace.
pub fn format_record(record: &Record) -> String {
    let mut fields = Vec::with_capacity(record.values.len() + 1);
    if let Some(ts) = record.timestamp {
        fields.push(ts.to_string());
    }
    fields.extend(record.values.iter().cloned());
    fields.join(" ")
}
