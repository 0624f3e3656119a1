//! Stream Scheduler
//!
//! Maps the host's stream time to a starting index in a stream's access units:
//! seek-to-start on first access or after a rewind, saved cursor otherwise.

use crate::timeline::{Context, StreamContext, StreamKind};
use crate::types::StreamId;
use tracing::debug;

/// Replay state of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing applied yet, or rewound: the next tick seeks.
    Unplayed,
    Playing,
}

impl PlaybackState {
    pub fn of(sc: &StreamContext) -> Self {
        if sc.last_applied_time == 0 {
            PlaybackState::Unplayed
        } else {
            PlaybackState::Playing
        }
    }
}

/// Whether a tick addressed to `es_id` drives `sc`.
///
/// Streams declared in the root descriptor are driven through the base stream id only.
pub fn addresses(sc: &StreamContext, es_id: StreamId, base_stream_id: StreamId) -> bool {
    if sc.in_root_od {
        es_id == base_stream_id
    } else {
        sc.id == es_id
    }
}

/// Clear the replay position of every stream addressed by `es_id`.
pub fn seek_to_start(
    ctx: &mut Context,
    es_id: StreamId,
    base_stream_id: StreamId,
    skip_descriptor_streams: bool,
) -> usize {
    let mut cleared = 0;
    for sc in ctx.streams.iter_mut() {
        if !addresses(sc, es_id, base_stream_id) {
            continue;
        }
        if skip_descriptor_streams && sc.kind == StreamKind::ObjectDescriptor {
            continue;
        }
        sc.last_applied_time = 0;
        sc.cursor = 0;
        sc.deferred_at = None;
        cleared += 1;
    }
    debug!(es_id, cleared, "Seek to start");
    cleared
}

/// Reset the stream when the clock moved back past what was applied.
pub fn detect_rewind(sc: &mut StreamContext, stream_time: u64) -> bool {
    if sc.last_applied_time > stream_time + 1 {
        debug!(
            stream = sc.id,
            last_applied = sc.last_applied_time,
            stream_time,
            "Rewind detected"
        );
        sc.last_applied_time = 0;
        sc.cursor = 0;
        return true;
    }
    false
}

/// Index of the last random-access unit due at `stream_time`, or 0.
pub fn last_rap_index(sc: &StreamContext, stream_time: u64) -> usize {
    let mut last_rap = 0;
    for (index, au) in sc.units.iter().enumerate() {
        if au.time_ms(sc.time_scale) > stream_time {
            break;
        }
        if au.is_rap {
            last_rap = index;
        }
    }
    last_rap
}

/// Where the walk for this tick starts.
///
/// A deferred unit pins the resume point until it is applied. A pruned stream
/// keeps no applied history, so its first retained unit is the resume point.
pub fn resume_index(sc: &StreamContext, stream_time: u64, pruning: bool) -> usize {
    if let Some(deferred) = sc.deferred_at {
        return deferred.min(sc.units.len());
    }
    match PlaybackState::of(sc) {
        PlaybackState::Unplayed => last_rap_index(sc, stream_time),
        PlaybackState::Playing if pruning => 0,
        PlaybackState::Playing => sc.cursor.min(sc.units.len()),
    }
}
