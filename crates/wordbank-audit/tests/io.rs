use std::fs;

use wordbank_audit::{read_manual_batches, read_sources, write_outputs};
use wordbank_consensus::{EngineConfig, Pipeline};
use wordbank_types::{Evidence, Pos};

const SOURCES: &str = r#"{"book":"システム英単語 5訂版","number":10,"headword":"drill","gloss":"運動すること"}
{"book":"英単語ターゲット1900","number":11,"headword":"drill","gloss":"運動すること"}
{"book":"DUO3.0","number":"12","headword":"drill","gloss":"運動すること"}
{"book":"必携英単語LEAP","number":13,"headword":"drill","gloss":"明るい"}
{"book":"速読英単語 必修編","number":14.0,"headword":"drill","gloss":"明るい"}
{"book":"英単語Stock4500","number":15,"headword":"drill","gloss":"明るい"}
{"book":"DUO3.0","number":50,"headword":"Crimson","gloss":"深紅"}
{"book":"DUO3.0","number":"n/a","headword":"azure","gloss":"空色"}
not json
"#;

#[test]
fn build_then_review_round() {
    let dir = tempfile::tempdir().unwrap();
    let sources = dir.path().join("rows.jsonl");
    fs::write(&sources, SOURCES).unwrap();
    let out_dir = dir.path().join("out");

    let records = read_sources(&sources).unwrap();
    assert_eq!(records.len(), 7);

    let pipeline = Pipeline::new(EngineConfig::default());
    let run = pipeline.run(&records, &[]);
    write_outputs(&out_dir, &run).unwrap();
    for name in ["wordbank.json", "pos_review.jsonl", "integrity.json"] {
        assert!(out_dir.join(name).is_file(), "{name} missing");
    }

    let batch_dir = out_dir.join("manual_batches");
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(batch_dir.join("POS_MANUAL_BATCH_SUMMARY.json")).unwrap())
            .unwrap();
    assert_eq!(summary[0]["rows"], 1);
    assert_eq!(summary[0]["prefilled"], 1);

    // Prefilled rows stay out of intake until a reviewer marks them done.
    let batch_path = batch_dir.join("POS_MANUAL_BATCH_01.jsonl");
    let pending = read_manual_batches(&batch_dir).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, "todo_prefill");
    assert_eq!(pending[0].batch_file, "POS_MANUAL_BATCH_01.jsonl");
    assert_eq!(pending[0].row_index, 1);
    let unchanged = pipeline.run(&records, &pending);
    assert_eq!(unchanged.integrity.manual_applied, 0);
    assert_eq!(unchanged.integrity.manual_ignored, 1);

    let mut row: serde_json::Value =
        serde_json::from_str(fs::read_to_string(&batch_path).unwrap().trim()).unwrap();
    assert_eq!(row["headword_norm"], "crimson");
    row["decision_pos"] = "adjective".into();
    row["status"] = "done".into();
    row["reviewer"] = "kt".into();
    fs::write(&batch_path, format!("{row}\n")).unwrap();

    let decisions = read_manual_batches(&batch_dir).unwrap();
    let reviewed = pipeline.run(&records, &decisions);
    assert!(reviewed.integrity.passed());
    assert_eq!(reviewed.integrity.manual_applied, 1);
    assert!(reviewed.final_queue.is_empty());

    let crimson = reviewed
        .final_entries()
        .iter()
        .find(|e| e.headword_norm == "crimson")
        .unwrap();
    assert_eq!(crimson.pos, Pos::Adjective);
    assert_eq!(crimson.pos_evidence, Evidence::ManualBatchConfirm);
}

#[test]
fn source_directory_reads_every_jsonl_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("a.jsonl"),
        "{\"book\":\"DUO3.0\",\"number\":1,\"headword\":\"run\",\"gloss\":\"走る\"}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("b.jsonl"),
        "{\"book\":\"DUO3.0\",\"number\":2,\"headword\":\"walk\",\"gloss\":\"歩く\"}\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let records = read_sources(dir.path()).unwrap();
    let headwords: Vec<_> = records.iter().map(|r| r.headword.as_str()).collect();
    assert_eq!(headwords, vec!["run", "walk"]);
}

#[test]
fn missing_batch_directory_means_no_decisions() {
    let dir = tempfile::tempdir().unwrap();
    let decisions = read_manual_batches(&dir.path().join("nope")).unwrap();
    assert!(decisions.is_empty());
    assert!(read_sources(&dir.path().join("nope.jsonl")).is_err());
}
