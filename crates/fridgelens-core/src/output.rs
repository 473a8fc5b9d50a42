//! Per-image result output in JSON or JSON Lines.
//!
//! JSONL streams one [`DetectionResult`] per line as soon as it arrives.
//! JSON buffers the results and writes a single report object, with the
//! aggregate attached, when the batch finishes.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::{AggregatedIngredients, DetectionResult};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One report object
    Json,
    /// One result object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Batch report written in JSON mode.
#[derive(Debug, Serialize)]
pub struct DetectionReport<'a> {
    pub results: &'a [DetectionResult],
    pub summary: &'a AggregatedIngredients,
}

/// Writes detection results to a file, stdout, or any other writer.
pub struct ResultWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    buffered: Vec<DetectionResult>,
    results_written: usize,
}

impl<W: Write> ResultWriter<W> {
    /// `pretty` only affects JSON; JSONL is always one compact object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            buffered: Vec::new(),
            results_written: 0,
        }
    }

    /// Record one result.
    pub fn write_result(&mut self, result: &DetectionResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.buffered.push(result.clone()),
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, result).map_err(io::Error::other)?;
                writeln!(self.writer)?;
                self.writer.flush()?;
            }
        }
        self.results_written += 1;
        Ok(())
    }

    /// Close out the batch. JSON mode writes the buffered report here.
    pub fn finish(mut self, summary: &AggregatedIngredients) -> io::Result<W> {
        if self.format == OutputFormat::Json {
            let report = DetectionReport {
                results: &self.buffered,
                summary,
            };
            write_json(&mut self.writer, &report, self.pretty)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    pub fn results_written(&self) -> usize {
        self.results_written
    }
}

/// Serialize `item` as JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, item: &T, pretty: bool) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, item).map_err(io::Error::other)?;
    } else {
        serde_json::to_writer(&mut *writer, item).map_err(io::Error::other)?;
    }
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::Prediction;

    fn ok_result(image: &str, labels: &[&str]) -> DetectionResult {
        DetectionResult {
            image: image.into(),
            backend: "gemini".into(),
            predictions: labels.iter().map(|l| Prediction::label(*l)).collect(),
            raw: None,
            error: None,
            error_message: None,
            latency_ms: 5,
        }
    }

    #[test]
    fn test_jsonl_streams_each_result() {
        let mut writer = ResultWriter::new(Vec::new(), OutputFormat::JsonLines, true);
        writer.write_result(&ok_result("a.jpg", &["卵"])).unwrap();
        writer
            .write_result(&DetectionResult::degraded(
                "b.jpg",
                "gemini",
                ErrorKind::Timeout,
                "slow",
                None,
            ))
            .unwrap();
        assert_eq!(writer.results_written(), 2);

        let output = String::from_utf8(writer.finish(&AggregatedIngredients::default()).unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"error\":\"timeout\""));
    }

    #[test]
    fn test_json_writes_one_report() {
        let mut writer = ResultWriter::new(Vec::new(), OutputFormat::Json, false);
        writer.write_result(&ok_result("a.jpg", &["卵", "牛乳"])).unwrap();
        let summary = AggregatedIngredients {
            ingredients: vec!["卵".into(), "牛乳".into()],
            succeeded: 1,
            failed: 0,
        };

        let output = String::from_utf8(writer.finish(&summary).unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 1);
        assert_eq!(value["summary"]["ingredients"][1], "牛乳");
        assert_eq!(value["summary"]["succeeded"], 1);
    }

    #[test]
    fn test_write_json_pretty() {
        let mut buf = Vec::new();
        write_json(&mut buf, &serde_json::json!({"ingredients": ["卵"]}), true).unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("\n  \"ingredients\""));
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("jsonl"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("JSONL"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("invalid"), None);
    }
}
