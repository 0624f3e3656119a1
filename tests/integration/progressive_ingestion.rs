//! Chunked ingestion of a source that is still being written.

use super::test_utils::*;
use scene_replay::engine::TickStatus;
use scene_replay::ingest::jsonl::encode_records;
use scene_replay::ingest::{LoadPhase, SourceDescriptor};
use scene_replay::timeline::StreamKind;
use std::io::Write;
use tempfile::TempDir;

fn full_text() -> String {
    encode_records(&[
        scene_record(),
        stream_record(1, StreamKind::GraphUpdate),
        graph_unit(1, 0, true, &["replace_scene"]),
        graph_unit(1, 300, false, &["insert"]),
        graph_unit(1, 600, false, &["delete"]),
    ])
    .unwrap()
}

#[test]
fn test_growing_file_completes_at_declared_size() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("live.jsonl");
    let text = full_text();
    let split = text.find("\"timing\":300").and_then(|i| text[..i].rfind('\n')).unwrap() + 1;
    std::fs::write(&path, &text[..split]).unwrap();

    let mut engine = engine_with(&progressive_config(), RecordingHost::default());
    engine.open(SourceDescriptor::new(&path, Some(text.len() as u64)), 1);

    let status = engine.tick(1, 0).unwrap();
    assert_eq!(status, TickStatus::Continue { pending: false });
    assert_eq!(engine.phase(), LoadPhase::Idle);
    assert_eq!(engine.host().applied, vec!["replace_scene"]);
    assert_eq!(engine.host().attachments, 1);

    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(text[split..].as_bytes()).unwrap();
    file.flush().unwrap();

    let status = engine.tick(1, 300).unwrap();
    assert_eq!(status, TickStatus::Continue { pending: true });
    assert_eq!(engine.phase(), LoadPhase::Complete);
    assert_eq!(engine.host().applied, vec!["replace_scene", "insert"]);
    assert_eq!(engine.host().duration_ms, Some(600));

    assert_eq!(engine.tick(1, 600).unwrap(), TickStatus::EndOfStream);
    assert_eq!(engine.host().attachments, 1);
}

#[test]
fn test_partial_line_waits_for_rest() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("live.jsonl");
    let text = full_text();
    let cut = text.find("replace_scene").unwrap();
    std::fs::write(&path, &text[..cut]).unwrap();

    let mut engine = engine_with(&progressive_config(), RecordingHost::default());
    engine.open(SourceDescriptor::new(&path, Some(text.len() as u64)), 1);

    engine.tick(1, 0).unwrap();
    assert!(engine.host().applied.is_empty());
    assert_eq!(engine.context().unwrap().stream(1).unwrap().unit_count(), 0);

    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(text[cut..].as_bytes()).unwrap();
    file.flush().unwrap();

    engine.tick(1, 0).unwrap();
    assert_eq!(engine.host().applied, vec!["replace_scene"]);
}

#[test]
fn test_small_chunks_read_whole_file_in_one_tick() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scene.jsonl");
    std::fs::write(&path, full_text()).unwrap();

    let mut config = progressive_config();
    config.loader.chunk_size = 7;
    let mut engine = engine_with(&config, RecordingHost::default());
    engine.open(declared_source(&path), 1);

    engine.tick(1, 0).unwrap();
    assert_eq!(engine.phase(), LoadPhase::Complete);
    assert_eq!(engine.context().unwrap().stream(1).unwrap().unit_count(), 2);
}

#[test]
fn test_unknown_size_never_completes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scene.jsonl");
    std::fs::write(&path, full_text()).unwrap();

    let mut engine = engine_with(&progressive_config(), RecordingHost::default());
    engine.open(SourceDescriptor::new(&path, None), 1);

    for t in [0, 300, 600, 900] {
        assert!(matches!(
            engine.tick(1, t).unwrap(),
            TickStatus::Continue { .. }
        ));
    }
    assert_eq!(engine.phase(), LoadPhase::Idle);
    assert_eq!(
        engine.host().applied,
        vec!["replace_scene", "insert", "delete"]
    );
}

#[test]
fn test_missing_file_is_source_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.jsonl");

    let mut engine = engine_with(&progressive_config(), RecordingHost::default());
    engine.open(SourceDescriptor::new(&path, Some(10)), 1);

    let err = engine.tick(1, 0).unwrap_err();
    assert!(matches!(
        err,
        scene_replay::error::EngineError::Source { .. }
    ));
}
