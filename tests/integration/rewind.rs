//! Seek and rewind on animation streams outside the root descriptor.

use super::test_utils::*;
use scene_replay::engine::{Engine, TickStatus};
use scene_replay::ingest::TimelineRecord;
use scene_replay::timeline::{EsDescriptor, ObjectDescriptor, StreamKind};
use scene_replay::types::SEEK_RESET;
use tempfile::TempDir;

fn root_od() -> TimelineRecord {
    TimelineRecord::RootOd(ObjectDescriptor {
        id: 1,
        url: None,
        es_descriptors: vec![EsDescriptor {
            es_id: 1,
            ..Default::default()
        }],
    })
}

fn animation_engine(dir: &TempDir) -> Engine<RecordingHost> {
    let path = write_timeline(
        dir.path(),
        "anim.jsonl",
        &[
            root_od(),
            stream_record(1, StreamKind::GraphUpdate),
            stream_record(2, StreamKind::GraphUpdate),
            graph_unit(1, 0, true, &["replace_scene"]),
            graph_unit(2, 0, true, &["r0"]),
            graph_unit(2, 100, false, &["a"]),
            graph_unit(2, 200, true, &["r2"]),
            graph_unit(2, 300, false, &["b"]),
        ],
    );
    let mut engine = engine_with(&progressive_config(), RecordingHost::default());
    engine.open(declared_source(&path), 1);
    engine
}

#[test]
fn test_non_root_stream_driven_by_own_id() {
    let dir = TempDir::new().unwrap();
    let mut engine = animation_engine(&dir);

    assert_eq!(engine.tick(1, 0).unwrap(), TickStatus::EndOfStream);
    assert_eq!(engine.host().applied, vec!["replace_scene"]);

    let ctx = engine.context().unwrap();
    assert!(ctx.stream(1).unwrap().in_root_od);
    assert!(!ctx.stream(2).unwrap().in_root_od);
    assert_eq!(ctx.stream(2).unwrap().last_applied_time, 0);
}

#[test]
fn test_first_access_jumps_to_last_rap() {
    let dir = TempDir::new().unwrap();
    let mut engine = animation_engine(&dir);
    engine.tick(1, 0).unwrap();

    assert_eq!(engine.tick(2, 350).unwrap(), TickStatus::EndOfStream);
    assert_eq!(engine.host().applied, vec!["replace_scene", "r2", "b"]);
    // Non-root history is kept for later rewinds.
    assert_eq!(engine.context().unwrap().stream(2).unwrap().unit_count(), 4);
}

#[test]
fn test_rewind_restarts_from_nearest_rap_without_reapplying() {
    let dir = TempDir::new().unwrap();
    let mut engine = animation_engine(&dir);
    engine.tick(1, 0).unwrap();
    engine.tick(2, 350).unwrap();

    let status = engine.tick(2, 150).unwrap();
    assert_eq!(status, TickStatus::Continue { pending: true });
    assert_eq!(
        engine.host().applied,
        vec!["replace_scene", "r2", "b", "r0", "a"]
    );

    engine.tick(2, 150).unwrap();
    assert_eq!(engine.host().applied.len(), 5);

    engine.tick(2, 300).unwrap();
    assert_eq!(
        engine.host().applied,
        vec!["replace_scene", "r2", "b", "r0", "a", "r2", "b"]
    );
}

#[test]
fn test_seek_reset_replays_from_rap() {
    let dir = TempDir::new().unwrap();
    let mut engine = animation_engine(&dir);
    engine.tick(1, 0).unwrap();
    engine.tick(2, 250).unwrap();
    assert_eq!(engine.host().applied, vec!["replace_scene", "r2"]);

    assert_eq!(
        engine.tick(2, SEEK_RESET).unwrap(),
        TickStatus::Continue { pending: true }
    );
    engine.tick(2, 250).unwrap();
    assert_eq!(engine.host().applied, vec!["replace_scene", "r2", "r2"]);
}

#[test]
fn test_steady_advance_applies_each_unit_once() {
    let dir = TempDir::new().unwrap();
    let mut engine = animation_engine(&dir);
    engine.tick(1, 0).unwrap();

    for t in (0..=400).step_by(20) {
        engine.tick(2, t).unwrap();
    }
    assert_eq!(
        engine.host().applied,
        vec!["replace_scene", "r0", "a", "r2", "b"]
    );
}
