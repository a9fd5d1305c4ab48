use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::document::{DocumentError, Form};
use crate::parser;
use crate::record::Record;

const CHUNK_SIZE: usize = 64;
const EXTENSIONS: &[&str] = &["html", "htm"];

/// A document that could not be read. The batch carries on without it.
#[derive(Debug)]
pub struct Failure {
    pub path: PathBuf,
    pub reason: String,
}

/// Batch outcome: records in file-name order plus the documents that were skipped.
pub struct BatchReport {
    pub total: usize,
    pub records: Vec<Record>,
    pub failures: Vec<Failure>,
}

impl BatchReport {
    pub fn print(&self) {
        println!(
            "Extracted {} of {} documents ({} skipped).",
            self.records.len(),
            self.total,
            self.failures.len(),
        );
        for f in &self.failures {
            println!("  skipped {}: {}", f.path.display(), f.reason);
        }
    }
}

/// HTML files directly inside `dir`, sorted by file name.
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("input folder {} does not exist", dir.display());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        if entry.file_type().is_file() && is_html(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Load, extract and tag one document.
pub fn extract_document(path: &Path) -> Result<Record, DocumentError> {
    let form = Form::load(path)?;
    let mut record = parser::process_document(&form);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    record.tag_source(&name);
    Ok(record)
}

/// Extract every document in `paths`. Per-document failures are logged and skipped;
/// output order follows `paths` regardless of worker scheduling.
pub fn run(paths: &[PathBuf]) -> Result<BatchReport> {
    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut records = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();

    for chunk in paths.chunks(CHUNK_SIZE) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|path| (path, extract_document(path)))
            .collect();

        for (path, result) in results {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    let reason = format!("{:#}", anyhow::Error::new(e));
                    warn!(path = %path.display(), "skipping document: {}", reason);
                    failures.push(Failure {
                        path: path.clone(),
                        reason,
                    });
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!(
        "Extracted {} documents ({} ok, {} skipped)",
        paths.len(),
        records.len(),
        failures.len()
    );

    Ok(BatchReport {
        total: paths.len(),
        records,
        failures,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn seed(dir: &Path) {
        fs::copy("tests/fixtures/complete.html", dir.join("b_complete.html")).unwrap();
        fs::copy("tests/fixtures/partial.html", dir.join("c_partial.HTM")).unwrap();
        fs::write(dir.join("a_broken.html"), [0xff, 0xfe, 0x00, 0x3c]).unwrap();
        fs::write(dir.join("notes.txt"), "not a form").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        fs::copy("tests/fixtures/complete.html", dir.join("nested/skipped.html")).unwrap();
    }

    #[test]
    fn lists_html_files_sorted_top_level_only() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let names: Vec<_> = list_documents(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_broken.html", "b_complete.html", "c_partial.HTM"]);
    }

    #[test]
    fn missing_input_folder_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_documents(&dir.path().join("questionare")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn failures_are_skipped_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        let paths = list_documents(dir.path()).unwrap();
        let report = run(&paths).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("not valid UTF-8"));

        let sources: Vec<_> = report.records.iter().filter_map(Record::source).collect();
        assert_eq!(sources, vec!["b_complete.html", "c_partial.HTM"]);
    }

    #[test]
    fn rerun_produces_identical_artifacts() {
        let input = tempfile::tempdir().unwrap();
        seed(input.path());
        let paths = list_documents(input.path()).unwrap();

        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for out in [first.path(), second.path()] {
            let report = run(&paths).unwrap();
            crate::output::write_artifacts(out, &report.records, true).unwrap();
        }

        for name in [crate::output::JSON_FILE, crate::output::CSV_FILE] {
            let a = fs::read(first.path().join(name)).unwrap();
            let b = fs::read(second.path().join(name)).unwrap();
            assert!(!a.is_empty());
            assert_eq!(a, b, "{name} differs between runs");
        }
    }

    #[test]
    fn empty_folder_gives_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(&list_documents(dir.path()).unwrap()).unwrap();
        assert_eq!(report.total, 0);
        assert!(report.records.is_empty());
    }
}
