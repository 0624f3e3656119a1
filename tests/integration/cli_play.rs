//! Play and inspect through the CLI run context.

use super::test_utils::*;
use scene_replay::cli::{Commands, RunContext};
use scene_replay::config::ReplayConfig;
use scene_replay::timeline::{Command, ObjectDescriptor, StreamKind};
use tempfile::TempDir;

fn scene_file(dir: &TempDir) -> std::path::PathBuf {
    write_timeline(
        dir.path(),
        "scene.jsonl",
        &[
            scene_record(),
            stream_record(1, StreamKind::GraphUpdate),
            stream_record(3, StreamKind::ObjectDescriptor),
            graph_unit(1, 0, true, &["replace_scene"]),
            graph_unit(1, 120, false, &["insert"]),
            graph_unit(1, 400, false, &["delete", "insert"]),
            command_unit(
                3,
                0,
                vec![Command::ObjectDescriptorUpdate(vec![ObjectDescriptor::redirect(
                    2, "clip.mp4",
                )])],
            ),
        ],
    )
}

#[test]
fn test_play_runs_to_end_of_stream() {
    let dir = TempDir::new().unwrap();
    let path = scene_file(&dir);
    let run = RunContext::with_config(ReplayConfig::default());

    let summary = run.play(&path, 40, 10_000, false, 1).unwrap();
    assert!(summary.ended);
    assert_eq!(summary.commands_applied, 4);
    assert_eq!(summary.objects_bound, 1);
    assert_eq!(summary.duration_ms, Some(400));
    assert_eq!(summary.stream_time_ms, 400);
}

#[test]
fn test_progressive_play_matches_one_shot() {
    let dir = TempDir::new().unwrap();
    let path = scene_file(&dir);
    let run = RunContext::with_config(ReplayConfig::default());

    let one_shot = run.play(&path, 40, 10_000, false, 1).unwrap();
    let progressive = run.play(&path, 40, 10_000, true, 1).unwrap();
    assert_eq!(progressive.commands_applied, one_shot.commands_applied);
    assert_eq!(progressive.objects_bound, one_shot.objects_bound);
    assert!(progressive.ended);
}

#[test]
fn test_play_stops_at_limit() {
    let dir = TempDir::new().unwrap();
    let path = scene_file(&dir);
    let run = RunContext::with_config(ReplayConfig::default());

    let summary = run.play(&path, 50, 200, false, 1).unwrap();
    assert!(!summary.ended);
    assert_eq!(summary.stream_time_ms, 200);
    assert_eq!(summary.commands_applied, 2);
}

#[test]
fn test_inspect_lists_streams() {
    let dir = TempDir::new().unwrap();
    let path = scene_file(&dir);
    let run = RunContext::with_config(ReplayConfig::default());

    let ctx = run.inspect(&path).unwrap();
    assert_eq!(ctx.streams.len(), 2);
    assert_eq!(ctx.stream(1).unwrap().unit_count(), 3);
    assert_eq!(ctx.max_root_duration_ms(), Some(400));

    let out = run
        .execute(&Commands::Inspect {
            path: path.clone(),
            format: "json".to_string(),
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["duration_ms"], 400);
    assert_eq!(value["streams"].as_array().unwrap().len(), 2);
}

#[test]
fn test_play_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let run = RunContext::with_config(ReplayConfig::default());
    assert!(run
        .play(&dir.path().join("absent.jsonl"), 40, 1000, false, 1)
        .is_err());
}
