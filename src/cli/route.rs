//! CLI route: single route table and run context.

use crate::cli::console_host::ConsoleHost;
use crate::cli::help::command_name;
use crate::cli::parse::Commands;
use crate::cli::presentation::{format_play_summary, format_streams, PlaySummary};
use crate::config::{ConfigLoader, ReplayConfig};
use crate::engine::{Engine, TickStatus};
use crate::error::EngineError;
use crate::ingest::{JsonLinesLoader, LoadSettings, SceneLoader, SourceDescriptor};
use crate::timeline::Context;
use crate::types::StreamId;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: the effective configuration.
pub struct RunContext {
    config: ReplayConfig,
}

impl RunContext {
    /// Load configuration from the user file, `config_path` and the environment.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, EngineError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        Ok(Self { config })
    }

    pub fn with_config(config: ReplayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, EngineError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, EngineError> {
        match command {
            Commands::Play {
                path,
                step_ms,
                until_ms,
                progressive,
                stream_id,
                format,
            } => {
                let summary = self.play(path, *step_ms, *until_ms, *progressive, *stream_id)?;
                format_play_summary(&summary, format)
            }
            Commands::Inspect { path, format } => {
                let ctx = self.inspect(path)?;
                format_streams(&ctx, format)
            }
            Commands::Config { path } => {
                if *path {
                    Ok(ConfigLoader::user_config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "no home directory".to_string()))
                } else {
                    self.config.to_toml()
                }
            }
        }
    }

    /// Replay `path` until end-of-stream or `until_ms`.
    pub fn play(
        &self,
        path: &Path,
        step_ms: u32,
        until_ms: u32,
        progressive: bool,
        stream_id: StreamId,
    ) -> Result<PlaySummary, EngineError> {
        let size = std::fs::metadata(path)
            .map_err(|e| EngineError::Source {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();

        let mut config = self.config.clone();
        config.loader.progressive |= progressive;

        let mut engine = Engine::new(
            ConsoleHost::new(),
            Box::new(JsonLinesLoader::new()),
            &config,
        );
        engine.open(SourceDescriptor::new(path, Some(size)), stream_id);

        let step = step_ms.max(1);
        let mut summary = PlaySummary {
            loader: engine.loader_name().to_string(),
            ..Default::default()
        };
        let mut stream_time = 0u32;

        loop {
            let mut ids = vec![stream_id];
            if let Some(ctx) = engine.context() {
                ids.extend(
                    ctx.streams
                        .iter()
                        .filter(|sc| !sc.in_root_od && sc.id != stream_id)
                        .map(|sc| sc.id),
                );
            }

            let mut ended = true;
            for id in ids {
                if let TickStatus::Continue { .. } = engine.tick(id, stream_time)? {
                    ended = false;
                }
            }
            summary.ticks += 1;
            summary.stream_time_ms = stream_time;

            if ended {
                summary.ended = true;
                break;
            }
            if stream_time >= until_ms {
                break;
            }
            stream_time = stream_time.saturating_add(step).min(until_ms);
        }
        debug!(ticks = summary.ticks, ended = summary.ended, "Playback loop done");

        let host = engine.host();
        summary.commands_applied = host.commands_applied;
        summary.objects_bound = host.objects_bound;
        summary.objects_disconnected = host.objects_disconnected;
        summary.duration_ms = host.duration_ms;
        Ok(summary)
    }

    /// Load the whole timeline without replaying it.
    pub fn inspect(&self, path: &Path) -> Result<Context, EngineError> {
        let settings = LoadSettings {
            source_path: path.to_path_buf(),
            cache_directory: self.config.loader.cache_directory.clone(),
            for_playback: false,
        };
        let mut loader = JsonLinesLoader::new();
        let mut ctx = Context::new();
        loader.load_init(&settings, &mut ctx)?;
        loader.load_run(&mut ctx)?;
        loader.load_done(&mut ctx)?;
        ctx.finalize_streams();
        Ok(ctx)
    }
}
