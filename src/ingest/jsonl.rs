//! JSON-lines timeline loader
//!
//! Reads a line-oriented dump of the timeline model: one JSON record per line.
//! Blank lines and lines starting with `#` are ignored.
//!
//! ```text
//! {"record":"scene","width":640,"height":480,"pixel_metrics":true}
//! {"record":"stream","id":1,"kind":"graph_update","time_scale":1000}
//! {"record":"unit","stream":1,"timing":0,"rap":true,"commands":[...]}
//! ```

use crate::error::ParseError;
use crate::ingest::loader::{LoadSettings, LoaderKind, SceneLoader};
use crate::timeline::{AccessUnit, Command, Context, ObjectDescriptor, SceneSize, StreamContext, StreamKind};
use crate::types::StreamId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One line of a JSON-lines timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum TimelineRecord {
    Scene(SceneSize),
    RootOd(ObjectDescriptor),
    Stream {
        id: StreamId,
        kind: StreamKind,
        #[serde(default)]
        time_scale: u32,
    },
    Unit {
        stream: StreamId,
        #[serde(default)]
        timing: u64,
        #[serde(default)]
        timing_sec: f64,
        #[serde(default)]
        rap: bool,
        #[serde(default)]
        commands: Vec<Command>,
    },
}

impl TimelineRecord {
    fn is_first_frame(&self) -> bool {
        match self {
            TimelineRecord::Unit {
                timing, timing_sec, ..
            } => *timing == 0 && *timing_sec <= 0.0,
            _ => true,
        }
    }
}

/// Serialize records into JSON-lines text.
pub fn encode_records(records: &[TimelineRecord]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

#[derive(Debug, Default)]
pub struct JsonLinesLoader {
    /// Records after the first frame, held back until `load_run`.
    deferred: Vec<(usize, TimelineRecord)>,
    /// Trailing bytes of an incomplete line (progressive mode).
    partial: Vec<u8>,
    line: usize,
}

impl JsonLinesLoader {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_line(line_no: usize, line: &str) -> Result<Option<TimelineRecord>, ParseError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| ParseError::Syntax {
                line: line_no,
                message: e.to_string(),
            })
    }

    fn apply(ctx: &mut Context, record: TimelineRecord) -> Result<(), ParseError> {
        match record {
            TimelineRecord::Scene(size) => ctx.scene = size,
            TimelineRecord::RootOd(od) => ctx.root_od = Some(od),
            TimelineRecord::Stream {
                id,
                kind,
                time_scale,
            } => {
                ctx.add_stream(StreamContext::new(id, kind, time_scale));
            }
            TimelineRecord::Unit {
                stream,
                timing,
                timing_sec,
                rap,
                commands,
            } => {
                let sc = ctx
                    .stream_mut(stream)
                    .ok_or(ParseError::UnknownStream(stream))?;
                let mut unit = if timing > 0 {
                    AccessUnit::at_ticks(timing)
                } else {
                    AccessUnit::at_seconds(timing_sec)
                };
                unit.is_rap = rap;
                unit.commands.extend(commands);
                sc.insert_unit(unit);
            }
        }
        Ok(())
    }

    fn consume_complete_lines(&mut self, ctx: &mut Context) -> Result<(), ParseError> {
        while let Some(pos) = self.partial.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.partial.drain(..=pos).collect();
            self.line += 1;
            let text = std::str::from_utf8(&raw).map_err(|_| ParseError::Encoding)?;
            if let Some(record) = Self::parse_line(self.line, text)? {
                Self::apply(ctx, record)?;
            }
        }
        Ok(())
    }
}

impl SceneLoader for JsonLinesLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::JsonLines
    }

    fn load_init(&mut self, settings: &LoadSettings, ctx: &mut Context) -> Result<(), ParseError> {
        let text = std::fs::read_to_string(&settings.source_path)?;
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let Some(record) = Self::parse_line(line_no, line)? else {
                continue;
            };
            if record.is_first_frame() {
                Self::apply(ctx, record)?;
            } else {
                self.deferred.push((line_no, record));
            }
        }
        debug!(
            path = %settings.source_path.display(),
            deferred = self.deferred.len(),
            "Initial scene loaded"
        );
        Ok(())
    }

    fn load_run(&mut self, ctx: &mut Context) -> Result<(), ParseError> {
        for (_, record) in std::mem::take(&mut self.deferred) {
            Self::apply(ctx, record)?;
        }
        Ok(())
    }

    fn load_chunk(&mut self, ctx: &mut Context, chunk: &[u8]) -> Result<(), ParseError> {
        self.partial.extend_from_slice(chunk);
        self.consume_complete_lines(ctx)
    }

    fn load_done(&mut self, ctx: &mut Context) -> Result<(), ParseError> {
        if !self.partial.is_empty() {
            self.partial.push(b'\n');
            self.consume_complete_lines(ctx)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.deferred.clear();
        self.partial.clear();
        self.line = 0;
    }
}
