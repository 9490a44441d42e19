//! Rendering of comparison results.

use std::io::{self, Write};

use serde::Serialize;

use foldercmp_analyze::{CompareSummary, ComparisonJob, ComparisonResult, FileDetail, Outcome, Side};

/// Receives the results of each job in order.
pub trait ReportEmitter {
    /// Called before the first result of a job.
    fn begin_job(&mut self, job: &ComparisonJob) -> io::Result<()>;

    /// Called once per result, in sorted path order.
    fn result(&mut self, job: &ComparisonJob, result: &ComparisonResult) -> io::Result<()>;

    /// Called after the last result of a job.
    fn end_job(
        &mut self,
        job: &ComparisonJob,
        summary: &CompareSummary,
        cancelled: bool,
    ) -> io::Result<()>;
}

/// Human-readable report.
pub struct TextReport<W: Write> {
    out: W,
    show_identical: bool,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W, show_identical: bool) -> Self {
        Self {
            out,
            show_identical,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn write_side(&mut self, name: &str, detail: &FileDetail) -> io::Result<()> {
        writeln!(self.out, "   {name}: {}", detail.resolved.display())?;
        writeln!(self.out, "      Digest: {}", detail.digest)?;
        writeln!(self.out, "      Size: {}", size_display(detail.metadata.size))?;
        writeln!(
            self.out,
            "      Modified: {}",
            detail
                .metadata
                .modified_display()
                .unwrap_or_else(|| "unknown".to_string())
        )
    }
}

impl<W: Write> ReportEmitter for TextReport<W> {
    fn begin_job(&mut self, job: &ComparisonJob) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "==== Comparing: {} ({} vs {}) ====",
            job.label, job.name_a, job.name_b
        )
    }

    fn result(&mut self, job: &ComparisonJob, result: &ComparisonResult) -> io::Result<()> {
        match &result.outcome {
            Outcome::Identical => {
                if self.show_identical {
                    writeln!(self.out, "Identical: {}", result.path)?;
                }
                Ok(())
            }
            Outcome::Differing { a, b } => {
                writeln!(self.out, "Differs: {}", result.path)?;
                self.write_side(&job.name_a, a)?;
                self.write_side(&job.name_b, b)
            }
            Outcome::OnlyInA { .. } => writeln!(self.out, "Only in {}: {}", job.name_a, result.path),
            Outcome::OnlyInB { .. } => writeln!(self.out, "Only in {}: {}", job.name_b, result.path),
            Outcome::HashError { side, cause, .. } => {
                let name = match side {
                    Side::A => &job.name_a,
                    Side::B => &job.name_b,
                };
                writeln!(self.out, "Hash error ({name}): {}: {cause}", result.path)
            }
        }
    }

    fn end_job(
        &mut self,
        job: &ComparisonJob,
        summary: &CompareSummary,
        cancelled: bool,
    ) -> io::Result<()> {
        if cancelled {
            writeln!(self.out, "(cancelled before all paths were compared)")?;
        }
        writeln!(
            self.out,
            "==== Finished: {} ({} vs {}): {} identical, {} differing, {} only in {}, {} only in {}, {} hash errors ====",
            job.label,
            job.name_a,
            job.name_b,
            summary.identical,
            summary.differing,
            summary.only_in_a,
            job.name_a,
            summary.only_in_b,
            job.name_b,
            summary.hash_errors,
        )
    }
}

/// One JSON object per line.
pub struct JsonReport<W: Write> {
    out: W,
}

#[derive(Serialize)]
struct ResultRecord<'a> {
    job: &'a str,
    #[serde(flatten)]
    result: &'a ComparisonResult,
}

#[derive(Serialize)]
struct SummaryRecord<'a> {
    job: &'a str,
    name_a: &'a str,
    name_b: &'a str,
    summary: &'a CompareSummary,
    cancelled: bool,
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn write_record(&mut self, record: &impl Serialize) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)
    }
}

impl<W: Write> ReportEmitter for JsonReport<W> {
    fn begin_job(&mut self, _job: &ComparisonJob) -> io::Result<()> {
        Ok(())
    }

    fn result(&mut self, job: &ComparisonJob, result: &ComparisonResult) -> io::Result<()> {
        self.write_record(&ResultRecord {
            job: &job.label,
            result,
        })
    }

    fn end_job(
        &mut self,
        job: &ComparisonJob,
        summary: &CompareSummary,
        cancelled: bool,
    ) -> io::Result<()> {
        self.write_record(&SummaryRecord {
            job: &job.label,
            name_a: &job.name_a,
            name_b: &job.name_b,
            summary,
            cancelled,
        })
    }
}

/// Format a byte count, with a binary-unit form for anything over 1 KiB.
fn size_display(size: Option<u64>) -> String {
    match size {
        None => "unknown".to_string(),
        Some(bytes) if bytes < 1024 => format!("{bytes} bytes"),
        Some(bytes) => format!(
            "{bytes} bytes ({})",
            humansize::format_size(bytes, humansize::BINARY)
        ),
    }
}
