// Tracker log parser
//
// Log layout: HEADER_LINES metadata lines, then one `time x y` sample per
// line. Field separator is `;` or tab depending on the tracker export.

use std::path::Path;
use tracing::debug;

use super::{Sample, Trace, TraceError};
use crate::config::HEADER_LINES;

/// Field separator used in the data lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Delimiter {
    /// `;` if the line contains one, otherwise any run of whitespace
    #[default]
    Auto,
    Semicolon,
    Tab,
}

/// What to do with a data line that is not exactly three numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Abort on the first malformed line
    #[default]
    Strict,
    /// Skip malformed lines
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub delimiter: Delimiter,
    pub mode: ParseMode,
    pub header_lines: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::default(),
            mode: ParseMode::default(),
            header_lines: HEADER_LINES,
        }
    }
}

impl ParseOptions {
    pub fn lenient() -> Self {
        Self {
            mode: ParseMode::Lenient,
            ..Self::default()
        }
    }
}

/// Read a log file and parse it
///
/// Invalid UTF-8 is decoded lossily, so a corrupted data line fails (strict)
/// or is skipped (lenient) like any other malformed line.
pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<Trace, TraceError> {
    let bytes = std::fs::read(path).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Parsing {} ({} bytes)", path.display(), bytes.len());
    parse(String::from_utf8_lossy(&bytes).lines(), options)
}

/// Parse raw log lines (header included) into a trace
pub fn parse<I, S>(lines: I, options: &ParseOptions) -> Result<Trace, TraceError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut samples: Vec<Sample> = Vec::new();

    for (idx, raw) in lines.into_iter().enumerate().skip(options.header_lines) {
        let line_no = idx + 1;
        let line = raw.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        let sample = match parse_line(line, options.delimiter) {
            Ok(sample) => sample,
            Err(reason) => match options.mode {
                ParseMode::Strict => {
                    return Err(TraceError::MalformedLine {
                        line: line_no,
                        reason,
                    });
                }
                ParseMode::Lenient => {
                    debug!("Skipping line {}: {}", line_no, reason);
                    continue;
                }
            },
        };

        if let Some(prev) = samples.last() {
            if sample.time < prev.time {
                match options.mode {
                    ParseMode::Strict => {
                        return Err(TraceError::TimeWentBackwards {
                            line: line_no,
                            previous: prev.time,
                            current: sample.time,
                        });
                    }
                    ParseMode::Lenient => {
                        debug!(
                            "Skipping line {}: time {} before {}",
                            line_no, sample.time, prev.time
                        );
                        continue;
                    }
                }
            }
        }

        samples.push(sample);
    }

    Ok(Trace::from_ordered(samples))
}

fn split_fields(line: &str, delimiter: Delimiter) -> Vec<&str> {
    match delimiter {
        Delimiter::Semicolon => line.split(';').map(str::trim).collect(),
        Delimiter::Tab => line.split('\t').map(str::trim).collect(),
        Delimiter::Auto if line.contains(';') => line.split(';').map(str::trim).collect(),
        Delimiter::Auto => line.split_whitespace().collect(),
    }
}

fn parse_line(line: &str, delimiter: Delimiter) -> Result<Sample, String> {
    let fields = split_fields(line, delimiter);
    if fields.len() != 3 {
        return Err(format!("expected 3 fields, got {}", fields.len()));
    }

    let mut values = [0.0f64; 3];
    for (slot, field) in values.iter_mut().zip(&fields) {
        let value: f64 = field
            .parse()
            .map_err(|_| format!("'{}' is not a number", field))?;
        if !value.is_finite() {
            return Err(format!("'{}' is not a finite number", field));
        }
        *slot = value;
    }

    Ok(Sample::new(values[0], values[1], values[2]))
}
