//! Timeline Model
//!
//! Passive containers for a loaded scene description: the context, its per-stream
//! timelines, and the time-stamped access units that carry commands.

pub mod command;
pub mod descriptor;

pub use command::{Command, GraphCommand};
pub use descriptor::{
    DecoderConfig, EsDescriptor, MuxInfo, ObjectDescriptor, StreamType, UiConfig,
};

use crate::types::{StreamId, DEFAULT_TIME_SCALE};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// What a stream's commands act upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    GraphUpdate,
    ObjectDescriptor,
    Other,
}

/// Declared canvas of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSize {
    pub width: u32,
    pub height: u32,
    /// Coordinates are in pixels rather than normalized units.
    pub pixel_metrics: bool,
}

/// A timestamped batch of commands for one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessUnit {
    /// Timestamp in the owning stream's ticks.
    #[serde(default)]
    pub timing: u64,
    /// Timestamp in seconds, used when `timing` is not given.
    #[serde(default)]
    pub timing_sec: f64,
    #[serde(default)]
    pub is_rap: bool,
    #[serde(default)]
    pub commands: VecDeque<Command>,
}

impl AccessUnit {
    pub fn at_ticks(timing: u64) -> Self {
        Self {
            timing,
            timing_sec: 0.0,
            is_rap: false,
            commands: VecDeque::new(),
        }
    }

    pub fn at_seconds(timing_sec: f64) -> Self {
        Self {
            timing: 0,
            timing_sec,
            is_rap: false,
            commands: VecDeque::new(),
        }
    }

    pub fn random_access(mut self) -> Self {
        self.is_rap = true;
        self
    }

    pub fn with_command(mut self, command: impl Into<Command>) -> Self {
        self.commands.push_back(command.into());
        self
    }

    /// Timestamp converted to milliseconds of stream time.
    pub fn time_ms(&self, time_scale: u32) -> u64 {
        // Saturates on absurd tick counts rather than overflowing.
        self.timing.saturating_mul(1000) / u64::from(time_scale.max(1))
    }
}

/// A named timeline of access units sharing a time-scale.
#[derive(Debug, Clone)]
pub struct StreamContext {
    pub id: StreamId,
    pub kind: StreamKind,
    pub time_scale: u32,
    /// Declared in the root object descriptor (or no root descriptor exists).
    pub in_root_od: bool,
    /// Stream time already flushed, in ms + 1. Zero means "seek to start".
    pub last_applied_time: u64,
    pub(crate) units: Vec<AccessUnit>,
    /// Index of the next unit to examine on ordinary forward advance.
    pub(crate) cursor: usize,
    /// Unit holding a deferred descriptor command; the next walk resumes there.
    pub(crate) deferred_at: Option<usize>,
}

impl StreamContext {
    pub fn new(id: StreamId, kind: StreamKind, time_scale: u32) -> Self {
        Self {
            id,
            kind,
            time_scale: if time_scale == 0 {
                DEFAULT_TIME_SCALE
            } else {
                time_scale
            },
            in_root_od: false,
            last_applied_time: 0,
            units: Vec::new(),
            cursor: 0,
            deferred_at: None,
        }
    }

    pub fn units(&self) -> &[AccessUnit] {
        &self.units
    }

    /// Units starting at `index`, in timestamp order.
    pub fn units_from(&self, index: usize) -> impl Iterator<Item = &AccessUnit> {
        self.units.iter().skip(index)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Insert a unit at its timestamp position.
    ///
    /// Seconds-based timestamps are converted to ticks here, once. A unit whose
    /// timestamp is already present is merged into the existing one.
    pub fn insert_unit(&mut self, mut unit: AccessUnit) -> &mut AccessUnit {
        if unit.timing == 0 && unit.timing_sec > 0.0 {
            unit.timing = (f64::from(self.time_scale) * unit.timing_sec) as u64;
        }

        match self.units.binary_search_by_key(&unit.timing, |au| au.timing) {
            Ok(index) => {
                let existing = &mut self.units[index];
                existing.is_rap |= unit.is_rap;
                existing.commands.extend(unit.commands);
                existing
            }
            Err(index) => {
                if index < self.cursor {
                    self.cursor += 1;
                }
                if let Some(deferred) = self.deferred_at.as_mut() {
                    if index <= *deferred {
                        *deferred += 1;
                    }
                }
                self.units.insert(index, unit);
                &mut self.units[index]
            }
        }
    }

    pub fn remove_unit(&mut self, index: usize) -> AccessUnit {
        if index < self.cursor {
            self.cursor -= 1;
        }
        self.deferred_at = match self.deferred_at {
            Some(deferred) if index < deferred => Some(deferred - 1),
            Some(deferred) if index == deferred => None,
            other => other,
        };
        self.units.remove(index)
    }

    /// Timestamp of the last retained unit, in ms.
    pub fn last_time_ms(&self) -> Option<u64> {
        self.units.last().map(|au| au.time_ms(self.time_scale))
    }

    pub fn is_sorted(&self) -> bool {
        self.units.windows(2).all(|w| w[0].timing < w[1].timing)
    }
}

/// All streams of one loaded scene description.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub streams: Vec<StreamContext>,
    pub scene: SceneSize,
    pub root_od: Option<ObjectDescriptor>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stream(&self, id: StreamId) -> Option<&StreamContext> {
        self.streams.iter().find(|sc| sc.id == id)
    }

    pub fn stream_mut(&mut self, id: StreamId) -> Option<&mut StreamContext> {
        self.streams.iter_mut().find(|sc| sc.id == id)
    }

    /// Register a stream, or return the already registered one with the same id.
    pub fn add_stream(&mut self, stream: StreamContext) -> &mut StreamContext {
        let existing = self.streams.iter().position(|sc| sc.id == stream.id);
        match existing {
            Some(index) => &mut self.streams[index],
            None => {
                self.streams.push(stream);
                let last = self.streams.len() - 1;
                &mut self.streams[last]
            }
        }
    }

    /// Whether `es_id` lives inside the root object descriptor.
    ///
    /// Without a root descriptor, or with an empty one, only one stream is
    /// possible and every id is considered part of it.
    pub fn stream_in_root_od(&self, es_id: StreamId) -> bool {
        match &self.root_od {
            None => true,
            Some(od) if od.es_descriptors.is_empty() => true,
            Some(od) => od.declares_stream(es_id),
        }
    }

    /// Flag root streams and compute the root duration in ms.
    pub fn finalize_streams(&mut self) -> Option<u64> {
        for index in 0..self.streams.len() {
            let id = self.streams[index].id;
            if self.stream_in_root_od(id) {
                self.streams[index].in_root_od = true;
            }
        }
        self.max_root_duration_ms()
    }

    pub fn max_root_duration_ms(&self) -> Option<u64> {
        self.streams
            .iter()
            .filter(|sc| sc.in_root_od)
            .filter_map(|sc| sc.last_time_ms())
            .max()
            .filter(|ms| *ms > 0)
    }
}
