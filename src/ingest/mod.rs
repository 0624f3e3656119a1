//! Ingestion Controller
//!
//! Drives a [`SceneLoader`] into the timeline, either in one shot once the
//! source is completely available, or progressively in bounded per-tick slices.

pub mod jsonl;
pub mod loader;
pub mod readiness;
pub mod source;

pub use jsonl::{JsonLinesLoader, TimelineRecord};
pub use loader::{LoadSettings, LoaderKind, SceneLoader};
pub use readiness::DownloadCheck;
pub use source::SourceDescriptor;

use crate::config::{LoaderConfig, ReadinessConfig};
use crate::error::{EngineError, ParseError};
use crate::timeline::Context;
use source::ChunkReader;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Where ingestion stands for the current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing parsed yet (one-shot), or still streaming (progressive).
    Idle,
    /// One-shot: initial scene parsed, remainder pending.
    FirstFrame,
    Complete,
    /// A parse or apply error tore the context down.
    Failed,
}

/// What one ingestion step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestEvent {
    /// One-shot source not yet fully available.
    NotReady,
    /// One-shot initial scene parsed.
    InitialScene { wall_clock: bool },
    /// Progressive slice consumed; `completed` once the source is exhausted.
    Progressive { completed: bool },
    /// One-shot remainder parsed.
    Completed,
}

pub struct Ingestor {
    loader: Box<dyn SceneLoader>,
    source: Option<SourceDescriptor>,
    settings: LoadSettings,
    phase: LoadPhase,
    progressive: bool,
    progressive_enabled: bool,
    chunk_size: usize,
    max_duration: Option<Duration>,
    reader: Option<ChunkReader>,
    readiness: DownloadCheck,
}

impl Ingestor {
    pub fn new(loader: Box<dyn SceneLoader>, config: &LoaderConfig, readiness: &ReadinessConfig) -> Self {
        Self {
            loader,
            source: None,
            settings: LoadSettings {
                cache_directory: config.cache_directory.clone(),
                for_playback: true,
                ..Default::default()
            },
            phase: LoadPhase::Idle,
            progressive: false,
            progressive_enabled: config.progressive,
            chunk_size: config.chunk_size.max(1),
            max_duration: config.max_parse_duration_ms.map(Duration::from_millis),
            reader: None,
            readiness: DownloadCheck::new(Duration::from_millis(readiness.stability_interval_ms)),
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == LoadPhase::Complete
    }

    pub fn is_progressive(&self) -> bool {
        self.progressive
    }

    pub fn source(&self) -> Option<&SourceDescriptor> {
        self.source.as_ref()
    }

    pub fn loader_kind(&self) -> LoaderKind {
        self.loader.kind()
    }

    /// Point ingestion at a new source and restart from `Idle`.
    pub fn set_source(&mut self, source: SourceDescriptor) {
        self.progressive = self.progressive_enabled && self.loader.supports_progressive();
        self.settings.source_path = source.path.clone();
        info!(
            path = %source.path.display(),
            declared_size = ?source.declared_size,
            progressive = self.progressive,
            loader = self.loader.kind().display_name(),
            "Scene source attached"
        );
        self.source = Some(source);
        self.phase = LoadPhase::Idle;
        self.reader = None;
        self.readiness.reset();
        self.loader.reset();
    }

    /// Forget per-context state. A failed ingestor stays failed.
    pub fn reset(&mut self) {
        self.reader = None;
        self.readiness.reset();
        self.loader.reset();
        if self.phase != LoadPhase::Failed {
            self.phase = LoadPhase::Idle;
        }
    }

    pub(crate) fn mark_failed(&mut self) {
        self.reader = None;
        self.phase = LoadPhase::Failed;
    }

    /// Run one tick worth of ingestion. Must not be called once complete.
    pub fn step(&mut self, ctx: &mut Context) -> Result<IngestEvent, EngineError> {
        let source = self
            .source
            .clone()
            .ok_or_else(|| EngineError::BadParameter("no scene source attached".to_string()))?;

        let result = if self.progressive {
            self.step_progressive(ctx, &source)
        } else {
            self.step_one_shot(ctx, &source)
        };

        match result {
            Ok(event) => Ok(event),
            Err(StepError::Open(err)) => Err(EngineError::Source {
                path: source.path,
                source: err,
            }),
            Err(StepError::Parse(err)) => {
                error!(path = %source.path.display(), error = %err, "Scene parsing failed");
                let _ = self.loader.load_done(ctx);
                self.mark_failed();
                Err(EngineError::Parse(err))
            }
        }
    }

    fn step_one_shot(
        &mut self,
        ctx: &mut Context,
        source: &SourceDescriptor,
    ) -> Result<IngestEvent, StepError> {
        match self.phase {
            LoadPhase::Idle => {
                if !self
                    .readiness
                    .poll(&source.path, source.declared_size, Instant::now())
                {
                    debug!(path = %source.path.display(), "Waiting for complete source");
                    return Ok(IngestEvent::NotReady);
                }
                self.phase = LoadPhase::FirstFrame;
                self.loader.load_init(&self.settings, ctx)?;
                info!(streams = ctx.streams.len(), "Initial scene loaded");
                Ok(IngestEvent::InitialScene {
                    wall_clock: self.loader.kind().uses_wall_clock(),
                })
            }
            LoadPhase::FirstFrame => {
                self.phase = LoadPhase::Complete;
                self.loader.load_run(ctx)?;
                self.loader.load_done(ctx)?;
                info!(streams = ctx.streams.len(), "Scene fully loaded");
                Ok(IngestEvent::Completed)
            }
            LoadPhase::Complete | LoadPhase::Failed => Ok(IngestEvent::Completed),
        }
    }

    fn step_progressive(
        &mut self,
        ctx: &mut Context,
        source: &SourceDescriptor,
    ) -> Result<IngestEvent, StepError> {
        if self.reader.is_none() {
            self.reader = Some(ChunkReader::open(&source.path).map_err(StepError::Open)?);
        }

        let entry = Instant::now();
        let mut buf = vec![0u8; self.chunk_size];
        let mut completed = false;
        let mut consumed = 0usize;

        while let Some(reader) = self.reader.as_mut() {
            let read = reader.read_chunk(&mut buf).map_err(ParseError::Io)?;
            if read == 0 {
                if source.declared_size == Some(reader.position()) {
                    self.reader = None;
                    self.phase = LoadPhase::Complete;
                    self.loader.load_done(ctx)?;
                    completed = true;
                    info!(bytes = source.declared_size, "Progressive load complete");
                }
                break;
            }

            self.loader.load_chunk(ctx, &buf[..read])?;
            consumed += read;

            if let Some(max) = self.max_duration {
                if entry.elapsed() > max {
                    debug!(consumed, "Parse budget exhausted for this tick");
                    break;
                }
            }
        }

        Ok(IngestEvent::Progressive { completed })
    }
}

enum StepError {
    Open(std::io::Error),
    Parse(ParseError),
}

impl From<ParseError> for StepError {
    fn from(err: ParseError) -> Self {
        StepError::Parse(err)
    }
}
