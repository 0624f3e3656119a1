//! Loader contract for the format parsers that populate a [`Context`].

use crate::error::ParseError;
use crate::timeline::Context;
use std::path::PathBuf;

/// Scene description family handled by a loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderKind {
    Bt,
    Vrml,
    X3dv,
    XmtA,
    X3d,
    Swf,
    LaserMl,
    Mp4,
    JsonLines,
    Undetermined,
}

impl LoaderKind {
    pub fn display_name(self) -> &'static str {
        match self {
            LoaderKind::Bt => "MPEG-4 BT Parser",
            LoaderKind::Vrml => "VRML 97 Parser",
            LoaderKind::X3dv => "X3D (VRML Syntax) Parser",
            LoaderKind::XmtA => "XMT-A Parser",
            LoaderKind::X3d => "X3D (XML Syntax) Parser",
            LoaderKind::Swf => "Flash (SWF) Emulator",
            LoaderKind::LaserMl => "LASeRML Loader",
            LoaderKind::Mp4 => "MP4 Memory Loader",
            LoaderKind::JsonLines => "JSON-lines Timeline Loader",
            LoaderKind::Undetermined => "Undetermined",
        }
    }

    /// VRML-family scenes read scene time from the wall clock.
    pub fn uses_wall_clock(self) -> bool {
        matches!(self, LoaderKind::Vrml | LoaderKind::X3dv | LoaderKind::X3d)
    }

    /// Formats with a streaming parser that accepts arbitrary chunks.
    pub fn supports_progressive(self) -> bool {
        matches!(self, LoaderKind::XmtA | LoaderKind::X3d | LoaderKind::JsonLines)
    }
}

/// Per-load parameters handed to the loader.
#[derive(Debug, Clone, Default)]
pub struct LoadSettings {
    pub source_path: PathBuf,
    /// Where imports may write extracted media.
    pub cache_directory: Option<PathBuf>,
    pub for_playback: bool,
}

/// External parser populating the timeline.
///
/// One-shot loading calls `load_init` then, on a later tick, `load_run` and
/// `load_done`. Progressive loading calls `load_chunk` repeatedly with raw
/// bytes and `load_done` once the source is exhausted.
pub trait SceneLoader {
    fn kind(&self) -> LoaderKind;

    fn supports_progressive(&self) -> bool {
        self.kind().supports_progressive()
    }

    /// Parse the initial scene (first frame).
    fn load_init(&mut self, settings: &LoadSettings, ctx: &mut Context) -> Result<(), ParseError>;

    /// Parse everything after the first frame.
    fn load_run(&mut self, ctx: &mut Context) -> Result<(), ParseError>;

    /// Feed one chunk of a growing source.
    fn load_chunk(&mut self, ctx: &mut Context, chunk: &[u8]) -> Result<(), ParseError>;

    fn load_done(&mut self, _ctx: &mut Context) -> Result<(), ParseError> {
        Ok(())
    }

    /// Forget any per-load state before a new context is set up.
    fn reset(&mut self) {}
}
