//! Playback engine
//!
//! One [`Engine`] per loaded scene description. The host calls [`Engine::tick`]
//! from its scheduling loop with a stream id and the current stream time.

use crate::conditional::{Activation, ActivationHooks};
use crate::config::ReplayConfig;
use crate::error::EngineError;
use crate::host::{SceneGraph, SceneHost, TimeSource};
use crate::ingest::{IngestEvent, Ingestor, LoadPhase, SceneLoader, SourceDescriptor};
use crate::replay::{dispatch, scheduler, AttachGuard, DispatchEnv, PendingDeletions};
use crate::timeline::{Context, StreamType};
use crate::types::{StreamId, StreamTime, SEEK_RESET};
use tracing::{debug, error, info};

/// Result of a successful tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// More ticks needed; `pending` when some stream still has future work.
    Continue { pending: bool },
    EndOfStream,
}

pub struct Engine<H: SceneHost> {
    host: H,
    ingestor: Ingestor,
    context: Option<Context>,
    base_stream_id: StreamId,
    attached_streams: usize,
    attach_guard: AttachGuard,
    pending_deletions: PendingDeletions,
    wall_clock: bool,
    last_stream_time: StreamTime,
}

impl<H: SceneHost> Engine<H> {
    pub fn new(host: H, loader: Box<dyn SceneLoader>, config: &ReplayConfig) -> Self {
        Self {
            host,
            ingestor: Ingestor::new(loader, &config.loader, &config.readiness),
            context: None,
            base_stream_id: 0,
            attached_streams: 0,
            attach_guard: AttachGuard::default(),
            pending_deletions: PendingDeletions::new(),
            wall_clock: false,
            last_stream_time: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    pub fn phase(&self) -> LoadPhase {
        self.ingestor.phase()
    }

    pub fn base_stream_id(&self) -> StreamId {
        self.base_stream_id
    }

    pub fn attached_streams(&self) -> usize {
        self.attached_streams
    }

    pub fn loader_name(&self) -> &'static str {
        self.ingestor.loader_kind().display_name()
    }

    pub fn pending_deletions(&self) -> &PendingDeletions {
        &self.pending_deletions
    }

    /// Private scene streams carrying a context (1) or LASeR ML (3) payload.
    pub fn can_handle_stream(stream_type: StreamType, object_type: u8) -> bool {
        stream_type == StreamType::PrivateScene && matches!(object_type, 1 | 3)
    }

    /// Start a new scene from `source`, driven through `base_stream_id`.
    pub fn open(&mut self, source: SourceDescriptor, base_stream_id: StreamId) {
        self.ingestor.set_source(source);
        self.base_stream_id = base_stream_id;
        self.attached_streams = 1;
        self.setup_context();
    }

    /// Attach a stream decoded by this engine.
    ///
    /// The first stream carries the source location in `decoder_info`; later
    /// ones must name a stream of the loaded context.
    pub fn attach_stream(
        &mut self,
        es_id: StreamId,
        decoder_info: Option<&[u8]>,
        upstream: bool,
    ) -> Result<(), EngineError> {
        if upstream {
            return Err(EngineError::NotSupported(
                "upstream scene streams".to_string(),
            ));
        }

        if let Some(ctx) = &self.context {
            if ctx.stream(es_id).is_none() {
                return Err(EngineError::NonCompliantStream(es_id));
            }
            self.attached_streams += 1;
            debug!(es_id, attached = self.attached_streams, "Animation stream attached");
            return Ok(());
        }

        let source = decoder_info
            .and_then(SourceDescriptor::parse)
            .ok_or(EngineError::NonCompliantStream(es_id))?;
        self.open(source, es_id);
        Ok(())
    }

    pub fn detach_stream(&mut self, es_id: StreamId) {
        self.attached_streams = self.attached_streams.saturating_sub(1);
        debug!(es_id, attached = self.attached_streams, "Stream detached");
    }

    /// Tear the scene down: context, graph and redirected files.
    pub fn release_scene(&mut self) {
        self.context = None;
        self.host.reset_graph();
        self.ingestor.reset();
        self.attach_guard.reset();
        let removed = self.pending_deletions.drain_and_delete();
        info!(removed_files = removed, "Scene released");
    }

    /// Scene time in seconds as seen by node events.
    pub fn scene_time_seconds(&self) -> f64 {
        if self.wall_clock {
            TimeSource::wall_clock_seconds()
        } else {
            f64::from(self.last_stream_time) / 1000.0
        }
    }

    /// Run a node's activation hook against the live graph.
    pub fn fire_activation(
        &mut self,
        node: &dyn ActivationHooks,
        activation: Activation,
    ) -> Result<(), EngineError> {
        let scene_time = self.scene_time_seconds();
        let graph: &mut dyn SceneGraph = &mut self.host;
        activation.fire(node, graph, scene_time)?;
        Ok(())
    }

    /// Advance playback of `es_id` to `stream_time` (ms), or seek to start on [`SEEK_RESET`].
    pub fn tick(
        &mut self,
        es_id: StreamId,
        stream_time: StreamTime,
    ) -> Result<TickStatus, EngineError> {
        if self.ingestor.phase() == LoadPhase::Failed {
            return Ok(TickStatus::EndOfStream);
        }

        if self.context.is_none() {
            if self.ingestor.source().is_none() {
                return Err(EngineError::BadParameter(
                    "no scene source attached".to_string(),
                ));
            }
            self.setup_context();
        }

        if stream_time == SEEK_RESET {
            let skip_descriptors = self.ingestor.phase() == LoadPhase::FirstFrame;
            if let Some(ctx) = self.context.as_mut() {
                scheduler::seek_to_start(ctx, es_id, self.base_stream_id, skip_descriptors);
            }
            return Ok(TickStatus::Continue { pending: true });
        }
        self.last_stream_time = stream_time;

        if !self.ingestor.is_complete() {
            if let Some(status) = self.ingest()? {
                return Ok(status);
            }
        }

        let Some(ctx) = self.context.as_mut() else {
            return Ok(TickStatus::EndOfStream);
        };
        let mut env = DispatchEnv {
            host: &mut self.host,
            base_stream_id: self.base_stream_id,
            phase: self.ingestor.phase(),
            pending_deletions: &mut self.pending_deletions,
            attach_guard: &mut self.attach_guard,
        };
        let report = match dispatch(ctx, &mut env, es_id, u64::from(stream_time)) {
            Ok(report) => report,
            Err(err) => {
                error!(es_id, stream_time, error = %err, "Command application failed, scene torn down");
                self.fail();
                return Err(EngineError::Apply(err));
            }
        };

        if self.ingestor.is_complete() && report.pending_updates == 0 {
            debug!(es_id, stream_time, "End of stream");
            return Ok(TickStatus::EndOfStream);
        }
        Ok(TickStatus::Continue {
            pending: report.pending_updates > 0,
        })
    }

    /// One ingestion step. Returns a status when the tick must stop here.
    fn ingest(&mut self) -> Result<Option<TickStatus>, EngineError> {
        let Some(ctx) = self.context.as_mut() else {
            return Ok(None);
        };

        let event = match self.ingestor.step(ctx) {
            Ok(event) => event,
            Err(err) => {
                if self.ingestor.phase() == LoadPhase::Failed {
                    self.context = None;
                }
                return Err(err);
            }
        };

        match event {
            IngestEvent::NotReady => return Ok(Some(TickStatus::Continue { pending: true })),
            IngestEvent::Progressive { .. } => {
                ctx.finalize_streams();
                if !self.attach_guard.is_attached() {
                    self.host.set_scene_size(ctx.scene);
                    self.attach_guard.attach(&mut self.host, ctx.scene);
                    Self::report_duration(&mut self.host, ctx);
                }
            }
            IngestEvent::InitialScene { wall_clock } => {
                Self::report_duration(&mut self.host, ctx);
                self.host.set_scene_size(ctx.scene);
                if wall_clock {
                    self.wall_clock = true;
                    self.host.set_time_source(TimeSource::WallClock);
                }
            }
            IngestEvent::Completed => {}
        }

        if self.ingestor.is_complete() {
            Self::report_duration(&mut self.host, ctx);
            if ctx.streams.is_empty() {
                self.attach_guard.attach(&mut self.host, ctx.scene);
            }
        }
        Ok(None)
    }

    fn report_duration(host: &mut H, ctx: &mut Context) {
        if let Some(duration) = ctx.finalize_streams() {
            debug!(duration_ms = duration, "Root duration");
            host.set_duration(duration);
        }
    }

    fn setup_context(&mut self) {
        self.context = Some(Context::new());
        self.attach_guard.reset();
        self.wall_clock = false;
    }

    fn fail(&mut self) {
        self.context = None;
        self.ingestor.mark_failed();
    }
}

impl<H: SceneHost> Drop for Engine<H> {
    fn drop(&mut self) {
        if !self.pending_deletions.is_empty() {
            self.pending_deletions.drain_and_delete();
        }
    }
}
