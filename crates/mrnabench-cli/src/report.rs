use crate::error::Result;
use mrnabench::workflows::benchmark::BenchmarkRecord;
use mrnabench::workflows::validate::ValidationReport;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Where benchmark measurements go as they arrive.
pub enum RecordSink {
    Csv(csv::Writer<Box<dyn Write>>),
    Console,
}

impl RecordSink {
    pub fn create(output: Option<&Path>) -> Result<Self> {
        match output {
            Some(path) => {
                debug!("Writing benchmark records to {:?}", path);
                let file: Box<dyn Write> = Box::new(File::create(path)?);
                Ok(Self::csv(file))
            }
            None => Ok(Self::Console),
        }
    }

    pub fn csv(writer: Box<dyn Write>) -> Self {
        Self::Csv(csv::Writer::from_writer(writer))
    }

    pub fn write(&mut self, record: &BenchmarkRecord) -> Result<()> {
        match self {
            Self::Csv(writer) => {
                writer.serialize(record)?;
                // Partial results survive an interrupted sweep.
                writer.flush()?;
            }
            Self::Console => println!("{}", format_record(record)),
        }
        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        if let Self::Csv(mut writer) = self {
            writer.flush()?;
        }
        Ok(())
    }
}

pub fn format_record(record: &BenchmarkRecord) -> String {
    let memory = record
        .peak_memory_bytes
        .map(format_bytes)
        .unwrap_or_else(|| "-".to_string());
    let retries = if record.attempts > 1 {
        format!("  ({} attempts)", record.attempts)
    } else {
        String::new()
    };
    format!(
        "{:>5} aa  {:<12} {:>10.3} s  {:>10}{}",
        record.length, record.engine, record.elapsed_seconds, memory, retries
    )
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

pub fn print_validation_report(report: &ValidationReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "Checked {} sequence(s) with {} engine invocation(s): {} failure(s).",
        report.sequences_checked,
        report.invocations,
        report.failures.len()
    )?;
    for failure in &report.failures {
        writeln!(out, "  {failure}")?;
    }
    if !report.errors.is_empty() {
        writeln!(out, "{} sequence(s) could not be fully checked:", report.errors.len())?;
        for error in &report.errors {
            writeln!(out, "  {error}")?;
        }
    }
    Ok(())
}
