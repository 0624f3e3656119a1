//! Property-based tests for timeline ordering and exactly-once replay

use proptest::prelude::*;
use scene_replay::error::ApplyError;
use scene_replay::host::{ObjectHandle, ObjectManager, Presentation, SceneGraph};
use scene_replay::ingest::LoadPhase;
use scene_replay::replay::{dispatch, AttachGuard, DispatchEnv, PendingDeletions};
use scene_replay::timeline::{
    AccessUnit, Context, GraphCommand, ObjectDescriptor, SceneSize, StreamContext, StreamKind,
};
use scene_replay::types::OdId;

#[derive(Default)]
struct CountingHost {
    applied: Vec<String>,
}

impl SceneGraph for CountingHost {
    fn apply_command(&mut self, command: &GraphCommand) -> Result<(), ApplyError> {
        self.applied.push(command.op.clone());
        Ok(())
    }

    fn reset_graph(&mut self) {}

    fn set_scene_size(&mut self, _size: SceneSize) {}
}

impl ObjectManager for CountingHost {
    fn find_object(&self, _id: OdId) -> Option<ObjectHandle> {
        None
    }

    fn disconnect_object(&mut self, _handle: ObjectHandle) {}

    fn setup_object(&mut self, _od: ObjectDescriptor) -> ObjectHandle {
        ObjectHandle(0)
    }
}

impl Presentation for CountingHost {
    fn attach_to_presentation(&mut self, _size: SceneSize) {}
}

fn non_root_context(times: &[u64]) -> Context {
    let mut ctx = Context::new();
    let sc = ctx.add_stream(StreamContext::new(2, StreamKind::GraphUpdate, 1000));
    for t in times {
        sc.insert_unit(AccessUnit::at_ticks(*t).with_command(GraphCommand::new(t.to_string())));
    }
    ctx
}

fn tick(ctx: &mut Context, host: &mut CountingHost, es_id: u16, t: u64) {
    let mut pending = PendingDeletions::new();
    let mut guard = AttachGuard::default();
    let mut env = DispatchEnv {
        host,
        base_stream_id: 1,
        phase: LoadPhase::Complete,
        pending_deletions: &mut pending,
        attach_guard: &mut guard,
    };
    dispatch(ctx, &mut env, es_id, t).unwrap();
}

/// Units stay strictly ordered by timestamp whatever the insertion order
#[test]
fn test_insert_keeps_units_sorted_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(0u64..5_000, 0..64), |times| {
            let mut sc = StreamContext::new(1, StreamKind::GraphUpdate, 1000);
            for t in &times {
                sc.insert_unit(AccessUnit::at_ticks(*t));
            }
            assert!(sc.is_sorted());

            let mut distinct = times.clone();
            distinct.sort_unstable();
            distinct.dedup();
            assert_eq!(sc.unit_count(), distinct.len());
            Ok(())
        })
        .unwrap();
}

/// Monotonic ticks apply every unit exactly once, in timestamp order
#[test]
fn test_forward_ticks_apply_each_unit_once_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                prop::collection::btree_set(0u64..2_000, 1..32),
                prop::collection::vec(1u64..300, 1..40),
            ),
            |(times, steps)| {
                let times: Vec<u64> = times.into_iter().collect();
                let mut ctx = non_root_context(&times);
                let mut host = CountingHost::default();

                // First access seeks to the start, so begin at zero.
                let mut now = 0u64;
                tick(&mut ctx, &mut host, 2, now);
                for step in &steps {
                    now += step;
                    tick(&mut ctx, &mut host, 2, now);
                }

                let expected: Vec<String> = times
                    .iter()
                    .filter(|t| **t <= now)
                    .map(|t| t.to_string())
                    .collect();
                assert_eq!(host.applied, expected);

                let sc = ctx.stream(2).unwrap();
                let max = times.iter().copied().filter(|t| *t <= now).max();
                match max {
                    Some(max) => assert_eq!(sc.last_applied_time, max + 1),
                    None => assert_eq!(sc.last_applied_time, 0),
                }
                Ok(())
            },
        )
        .unwrap();
}

/// A tick never moves the applied mark past the tick time
#[test]
fn test_applied_mark_bounded_by_clock_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                prop::collection::btree_set(0u64..1_000, 1..16),
                prop::collection::vec(0u64..1_200, 1..24),
            ),
            |(times, clock)| {
                let times: Vec<u64> = times.into_iter().collect();
                let mut ctx = non_root_context(&times);
                let mut host = CountingHost::default();

                for t in clock {
                    tick(&mut ctx, &mut host, 2, t);
                    let sc = ctx.stream(2).unwrap();
                    prop_assert!(sc.last_applied_time <= t + 1);
                }
                Ok(())
            },
        )
        .unwrap();
}
