//! Descriptor updates whose backing file is produced during playback.

use super::test_utils::*;
use scene_replay::engine::TickStatus;
use scene_replay::ingest::TimelineRecord;
use scene_replay::timeline::{
    Command, DecoderConfig, EsDescriptor, MuxInfo, ObjectDescriptor, StreamKind, StreamType,
};
use std::path::Path;
use tempfile::TempDir;

fn backed_descriptor(id: u16, file: &Path) -> ObjectDescriptor {
    ObjectDescriptor {
        id,
        url: None,
        es_descriptors: vec![EsDescriptor {
            es_id: 20 + id,
            decoder_config: Some(DecoderConfig::new(StreamType::Visual)),
            mux_info: Some(MuxInfo {
                file_name: Some(file.display().to_string()),
                text_node: None,
                delete_file: true,
            }),
            ..Default::default()
        }],
    }
}

#[test]
fn test_update_waits_for_backing_file() {
    let dir = TempDir::new().unwrap();
    let media = dir.path().join("clip.mp4");
    let path = write_timeline(
        dir.path(),
        "scene.jsonl",
        &[
            stream_record(3, StreamKind::ObjectDescriptor),
            command_unit(
                3,
                0,
                vec![Command::ObjectDescriptorUpdate(vec![backed_descriptor(
                    5, &media,
                )])],
            ),
        ],
    );

    let mut engine = engine_with(&progressive_config(), RecordingHost::default());
    engine.open(declared_source(&path), 1);

    for t in [0, 40, 80] {
        assert_eq!(
            engine.tick(1, t).unwrap(),
            TickStatus::Continue { pending: true }
        );
    }
    assert!(engine.host().bound.is_empty());
    assert_eq!(engine.context().unwrap().stream(3).unwrap().last_applied_time, 0);

    std::fs::write(&media, b"media").unwrap();
    assert_eq!(engine.tick(1, 120).unwrap(), TickStatus::EndOfStream);

    let bound = &engine.host().bound;
    assert_eq!(bound.len(), 1);
    assert_eq!(bound[0].id, 5);
    assert_eq!(bound[0].url.as_deref(), Some(media.to_str().unwrap()));
    assert!(engine.pending_deletions().contains(&media));
}

#[test]
fn test_deferral_keeps_descriptor_order() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.mp4");
    let second = dir.path().join("second.mp4");
    std::fs::write(&second, b"ready").unwrap();

    let path = write_timeline(
        dir.path(),
        "scene.jsonl",
        &[
            stream_record(3, StreamKind::ObjectDescriptor),
            command_unit(
                3,
                0,
                vec![Command::ObjectDescriptorUpdate(vec![
                    ObjectDescriptor::redirect(4, "ready.mp4"),
                    backed_descriptor(5, &first),
                    backed_descriptor(6, &second),
                ])],
            ),
        ],
    );

    let mut engine = engine_with(&progressive_config(), RecordingHost::default());
    engine.open(declared_source(&path), 1);

    engine.tick(1, 0).unwrap();
    let ids: Vec<u16> = engine.host().bound.iter().map(|od| od.id).collect();
    assert_eq!(ids, vec![4]);

    std::fs::write(&first, b"ready").unwrap();
    engine.tick(1, 40).unwrap();
    let ids: Vec<u16> = engine.host().bound.iter().map(|od| od.id).collect();
    assert_eq!(ids, vec![4, 5, 6]);
}

#[test]
fn test_deferred_unit_not_skipped_by_later_random_access_unit() {
    let dir = TempDir::new().unwrap();
    let media = dir.path().join("late.mp4");
    let path = write_timeline(
        dir.path(),
        "scene.jsonl",
        &[
            stream_record(3, StreamKind::ObjectDescriptor),
            command_unit(
                3,
                0,
                vec![Command::ObjectDescriptorUpdate(vec![backed_descriptor(
                    5, &media,
                )])],
            ),
            TimelineRecord::Unit {
                stream: 3,
                timing: 1000,
                timing_sec: 0.0,
                rap: true,
                commands: vec![Command::ObjectDescriptorUpdate(vec![
                    ObjectDescriptor::redirect(6, "next.mp4"),
                ])],
            },
        ],
    );

    let mut engine = engine_with(&progressive_config(), RecordingHost::default());
    engine.open(declared_source(&path), 1);

    for t in [0, 1500] {
        assert_eq!(
            engine.tick(1, t).unwrap(),
            TickStatus::Continue { pending: true }
        );
    }
    assert!(engine.host().bound.is_empty());

    std::fs::write(&media, b"media").unwrap();
    assert_eq!(engine.tick(1, 1600).unwrap(), TickStatus::EndOfStream);

    let ids: Vec<u16> = engine.host().bound.iter().map(|od| od.id).collect();
    assert_eq!(ids, vec![5, 6]);
    assert_eq!(engine.context().unwrap().stream(3).unwrap().unit_count(), 0);
}

#[test]
fn test_redirected_files_removed_on_drop() {
    let dir = TempDir::new().unwrap();
    let media = dir.path().join("temp.mp4");
    std::fs::write(&media, b"media").unwrap();
    let path = write_timeline(
        dir.path(),
        "scene.jsonl",
        &[
            stream_record(3, StreamKind::ObjectDescriptor),
            command_unit(
                3,
                0,
                vec![Command::ObjectDescriptorUpdate(vec![backed_descriptor(
                    7, &media,
                )])],
            ),
        ],
    );

    let mut engine = engine_with(&progressive_config(), RecordingHost::default());
    engine.open(declared_source(&path), 1);
    engine.tick(1, 0).unwrap();
    assert!(media.exists());

    drop(engine);
    assert!(!media.exists());
}

#[test]
fn test_scene_descriptor_pinned_to_base_stream() {
    let dir = TempDir::new().unwrap();
    let path = write_timeline(
        dir.path(),
        "scene.jsonl",
        &[
            stream_record(3, StreamKind::ObjectDescriptor),
            command_unit(
                3,
                0,
                vec![Command::ObjectDescriptorUpdate(vec![
                    ObjectDescriptor {
                        id: 8,
                        url: None,
                        es_descriptors: vec![EsDescriptor {
                            es_id: 30,
                            decoder_config: Some(DecoderConfig::new(StreamType::Scene)),
                            ..Default::default()
                        }],
                    },
                    ObjectDescriptor {
                        id: 9,
                        url: None,
                        es_descriptors: vec![EsDescriptor {
                            es_id: 31,
                            decoder_config: Some(DecoderConfig::new(StreamType::Audio)),
                            ..Default::default()
                        }],
                    },
                ])],
            ),
        ],
    );

    let mut engine = engine_with(&progressive_config(), RecordingHost::default());
    engine.open(declared_source(&path), 12);
    engine.tick(12, 0).unwrap();

    let bound = &engine.host().bound;
    assert_eq!(bound.len(), 1);
    let esd = &bound[0].es_descriptors[0];
    assert_eq!(esd.depends_on_es_id, 12);
    assert_eq!(esd.stream_type(), Some(StreamType::PrivateScene));
}
