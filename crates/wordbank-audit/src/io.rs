//! JSON-lines input and JSON output for the batch builder.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{info, warn};
use wordbank_consensus::{PipelineRun, SourceRow};
use wordbank_types::{ManualDecision, SourceRecord};

/// Manual batch files picked up by intake, in addition to the ones
/// `split_batches` writes.
const BATCH_FILE_PREFIXES: [&str; 2] = ["POS_MANUAL_BATCH_", "POS_MANUAL_CHANGE_BATCH_"];
const BATCH_DIR: &str = "manual_batches";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("{path}:{line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}:{line}: slot number {number} is not an integer")]
    BadSlot {
        path: PathBuf,
        line: usize,
        number: String,
    },
}

/// Parse one JSON value per non-blank line. Malformed lines are returned as
/// errors next to the parsed rows; the 1-based line number comes with each row.
pub fn parse_jsonl<T: DeserializeOwned>(
    path: &Path,
    text: &str,
) -> (Vec<(usize, T)>, Vec<InputError>) {
    let mut rows = Vec::new();
    let mut errors = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(row) => rows.push((idx + 1, row)),
            Err(source) => errors.push(InputError::Malformed {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            }),
        }
    }
    (rows, errors)
}

fn jsonl_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for item in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let path = item.with_context(|| format!("read {}", dir.display()))?.path();
        if path.extension().is_some_and(|ext| ext == "jsonl") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read source rows from a `.jsonl` file or from every `.jsonl` file in a
/// directory. Bad lines are logged and skipped.
pub fn read_sources(path: &Path) -> Result<Vec<SourceRecord>> {
    let files = if path.is_dir() {
        jsonl_files(path)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut records = Vec::new();
    for file in &files {
        let text =
            fs::read_to_string(file).with_context(|| format!("open {}", file.display()))?;
        let (rows, errors) = parse_jsonl::<SourceRow>(file, &text);
        for err in errors {
            warn!("{err}");
        }
        for (line, row) in rows {
            let number = serde_json::to_string(&row.number).unwrap_or_default();
            match row.into_record() {
                Some(record) => records.push(record),
                None => warn!(
                    "{}",
                    InputError::BadSlot {
                        path: file.clone(),
                        line,
                        number,
                    }
                ),
            }
        }
    }
    info!(files = files.len(), records = records.len(), "read source rows");
    Ok(records)
}

fn is_batch_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "jsonl")
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| BATCH_FILE_PREFIXES.iter().any(|p| name.starts_with(p)))
}

/// Read reviewer decisions from the batch files in `dir`, in file-name order.
/// A missing directory means no decisions; unreadable files are skipped.
pub fn read_manual_batches(dir: &Path) -> Result<Vec<ManualDecision>> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "manual batch directory not found");
        return Ok(Vec::new());
    }
    let mut decisions = Vec::new();
    for file in jsonl_files(dir)?.into_iter().filter(|p| is_batch_file(p)) {
        let text = match fs::read_to_string(&file) {
            Ok(text) => text,
            Err(err) => {
                warn!(file = %file.display(), error = %err, "skipping unreadable batch file");
                continue;
            }
        };
        let batch_file = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (rows, errors) = parse_jsonl::<ManualDecision>(&file, &text);
        for err in errors {
            warn!("{err}");
        }
        for (row_index, (_, mut decision)) in rows.into_iter().enumerate() {
            decision.batch_file = batch_file.clone();
            decision.row_index = row_index + 1;
            decisions.push(decision);
        }
    }
    info!(rows = decisions.len(), "read manual batch decisions");
    Ok(decisions)
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value)
        .with_context(|| format!("write {}", path.display()))?;
    out.write_all(b"\n")?;
    out.flush().with_context(|| format!("flush {}", path.display()))
}

pub fn write_jsonl<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for row in rows {
        serde_json::to_writer(&mut out, row)
            .with_context(|| format!("write {}", path.display()))?;
        out.write_all(b"\n")?;
    }
    out.flush().with_context(|| format!("flush {}", path.display()))
}

/// Write every checkpoint of `run` under `out_dir`. Reviewer batches go to
/// `out_dir/manual_batches/`.
pub fn write_outputs(out_dir: &Path, run: &PipelineRun) -> Result<()> {
    let batch_dir = out_dir.join(BATCH_DIR);
    fs::create_dir_all(&batch_dir)
        .with_context(|| format!("create {}", batch_dir.display()))?;

    write_json(&out_dir.join("wordbank.json"), run.final_entries())?;
    write_jsonl(&out_dir.join("wordbank_aggregated.jsonl"), &run.aggregated)?;
    write_jsonl(&out_dir.join("wordbank_high_confirmed.jsonl"), &run.high.entries)?;
    write_jsonl(&out_dir.join("wordbank_medium_confirmed.jsonl"), &run.medium.entries)?;
    write_jsonl(&out_dir.join("wordbank_quickwin_confirmed.jsonl"), &run.quickwin.entries)?;
    write_jsonl(&out_dir.join("pos_review.jsonl"), &run.review)?;
    write_jsonl(&out_dir.join("pos_high_confirmations.jsonl"), &run.high.confirmations)?;
    write_jsonl(&out_dir.join("pos_medium_confirmations.jsonl"), &run.medium.confirmations)?;
    write_jsonl(&out_dir.join("pos_quickwin_confirmations.jsonl"), &run.quickwin.confirmations)?;
    write_jsonl(&out_dir.join("manual_queue.jsonl"), &run.queue.queue)?;
    write_jsonl(&out_dir.join("manual_queue_quickwin.jsonl"), &run.queue.quickwin)?;
    write_jsonl(&out_dir.join("manual_queue_remaining.jsonl"), &run.final_queue)?;
    write_jsonl(&out_dir.join("manual_applied.jsonl"), &run.manual.applied)?;
    write_jsonl(&out_dir.join("manual_ignored.jsonl"), &run.manual.ignored)?;
    write_json(&out_dir.join("integrity.json"), &run.integrity)?;

    let mut summaries = Vec::with_capacity(run.batches.len());
    for batch in &run.batches {
        write_jsonl(&batch_dir.join(format!("{}.jsonl", batch.file_stem)), &batch.rows)?;
        summaries.push(batch.summary());
    }
    write_json(&batch_dir.join("POS_MANUAL_BATCH_SUMMARY.json"), &summaries)?;

    info!(out_dir = %out_dir.display(), batches = run.batches.len(), "wrote outputs");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsonl_reports_bad_lines_and_keeps_good_ones() {
        let text = "{\"book\":\"DUO3.0\",\"number\":1,\"headword\":\"run\",\"gloss\":\"走る\"}\n\nnot json\n";
        let (rows, errors) = parse_jsonl::<SourceRow>(Path::new("rows.jsonl"), text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().starts_with("rows.jsonl:3:"));
    }

    #[test]
    fn batch_file_names() {
        assert!(is_batch_file(Path::new("x/POS_MANUAL_BATCH_01.jsonl")));
        assert!(is_batch_file(Path::new("POS_MANUAL_CHANGE_BATCH_02.jsonl")));
        assert!(!is_batch_file(Path::new("POS_MANUAL_BATCH_SUMMARY.json")));
        assert!(!is_batch_file(Path::new("notes.jsonl")));
    }
}
