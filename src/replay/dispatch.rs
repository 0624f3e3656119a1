//! Command Dispatcher
//!
//! Walks the due access units of every stream addressed by a tick, applies their
//! commands, and prunes consumed history on root streams.

use crate::error::ApplyError;
use crate::host::SceneHost;
use crate::ingest::LoadPhase;
use crate::replay::remap::{RemapOutcome, Remapper};
use crate::replay::scheduler::{addresses, detect_rewind, resume_index};
use crate::replay::{AttachGuard, PendingDeletions};
use crate::timeline::{Command, Context, StreamKind};
use crate::types::StreamId;
use tracing::{debug, trace};

/// Host and engine state borrowed for one dispatch pass.
pub struct DispatchEnv<'a, H: SceneHost + ?Sized> {
    pub host: &'a mut H,
    pub base_stream_id: StreamId,
    pub phase: LoadPhase,
    pub pending_deletions: &'a mut PendingDeletions,
    pub attach_guard: &'a mut AttachGuard,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Streams with work left: a future unit or a deferred command.
    pub pending_updates: usize,
    pub applied_units: usize,
    pub pruned_units: usize,
}

enum UnitOutcome {
    Applied,
    Deferred,
}

/// Apply everything due at `stream_time` (ms) on streams addressed by `es_id`.
pub fn dispatch<H: SceneHost + ?Sized>(
    ctx: &mut Context,
    env: &mut DispatchEnv<'_, H>,
    es_id: StreamId,
    stream_time: u64,
) -> Result<DispatchReport, ApplyError> {
    let mut report = DispatchReport::default();
    let stream_count = ctx.streams.len();

    for si in 0..stream_count {
        let sc = &mut ctx.streams[si];
        if !addresses(sc, es_id, env.base_stream_id) {
            continue;
        }
        // Descriptor streams wait until the full scene is loaded.
        if sc.kind == StreamKind::ObjectDescriptor && env.phase == LoadPhase::FirstFrame {
            continue;
        }

        detect_rewind(sc, stream_time);
        let consume = sc.in_root_od && env.phase == LoadPhase::Complete;
        let mut index = resume_index(sc, stream_time, consume);

        loop {
            let sc = &mut ctx.streams[si];
            let Some(unit) = sc.units.get(index) else {
                break;
            };
            let unit_time = unit.time_ms(sc.time_scale);

            if unit_time + 1 <= sc.last_applied_time {
                if consume && sc.kind == StreamKind::GraphUpdate {
                    sc.remove_unit(index);
                    report.pruned_units += 1;
                } else {
                    index += 1;
                }
                continue;
            }

            if unit_time > stream_time {
                report.pending_updates += 1;
                break;
            }

            match apply_unit(ctx, env, si, index, consume)? {
                UnitOutcome::Deferred => {
                    ctx.streams[si].cursor = index;
                    ctx.streams[si].deferred_at = Some(index);
                    report.pending_updates += 1;
                    break;
                }
                UnitOutcome::Applied => {}
            }

            let scene = ctx.scene;
            let sc = &mut ctx.streams[si];
            sc.deferred_at = None;
            sc.last_applied_time = unit_time + 1;
            trace!(stream = sc.id, unit_time, "Unit applied");
            report.applied_units += 1;

            env.attach_guard.attach(&mut *env.host, scene);

            if sc.in_root_od && sc.units[index].commands.is_empty() {
                sc.remove_unit(index);
                report.pruned_units += 1;
            } else {
                index += 1;
            }
            sc.cursor = index;
        }
    }

    if report.applied_units > 0 || report.pruned_units > 0 {
        debug!(
            es_id,
            stream_time,
            applied = report.applied_units,
            pruned = report.pruned_units,
            pending = report.pending_updates,
            "Dispatch pass"
        );
    }
    Ok(report)
}

fn apply_unit<H: SceneHost + ?Sized>(
    ctx: &mut Context,
    env: &mut DispatchEnv<'_, H>,
    si: usize,
    index: usize,
    consume: bool,
) -> Result<UnitOutcome, ApplyError> {
    match ctx.streams[si].kind {
        StreamKind::GraphUpdate => {
            apply_graph_unit(ctx, env, si, index, consume)?;
            Ok(UnitOutcome::Applied)
        }
        StreamKind::ObjectDescriptor => Ok(apply_descriptor_unit(ctx, env, si, index)),
        StreamKind::Other => Ok(UnitOutcome::Applied),
    }
}

fn apply_graph_unit<H: SceneHost + ?Sized>(
    ctx: &mut Context,
    env: &mut DispatchEnv<'_, H>,
    si: usize,
    index: usize,
    consume: bool,
) -> Result<(), ApplyError> {
    let commands = &mut ctx.streams[si].units[index].commands;
    let mut k = 0;
    while k < commands.len() {
        if let Command::GraphMutation(cmd) = &commands[k] {
            env.host.apply_command(cmd)?;
        }
        if consume {
            commands.remove(k);
        } else {
            k += 1;
        }
    }
    Ok(())
}

fn apply_descriptor_unit<H: SceneHost + ?Sized>(
    ctx: &mut Context,
    env: &mut DispatchEnv<'_, H>,
    si: usize,
    index: usize,
) -> UnitOutcome {
    while let Some(command) = ctx.streams[si].units[index].commands.pop_front() {
        let mut remapper = Remapper::new(
            &mut *env.host,
            env.base_stream_id,
            &mut *env.pending_deletions,
        );
        match command {
            Command::ObjectDescriptorUpdate(descriptors) => {
                if let RemapOutcome::Deferred(kept) = remapper.update(ctx, descriptors) {
                    ctx.streams[si].units[index]
                        .commands
                        .push_front(Command::ObjectDescriptorUpdate(kept));
                    return UnitOutcome::Deferred;
                }
            }
            Command::ObjectDescriptorRemove(ids) => {
                remapper.remove(&ids);
            }
            Command::GraphMutation(cmd) => {
                debug!(op = %cmd.op, "Graph command on descriptor stream dropped");
            }
        }
    }
    UnitOutcome::Applied
}
