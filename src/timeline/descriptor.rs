//! Object descriptors carried by object-descriptor update commands.

use crate::types::{OdId, StreamId};
use serde::{Deserialize, Serialize};

/// Declared type of an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    ObjectDescriptor,
    Scene,
    /// Scene stream redirected to the engine that owns the parent scene.
    PrivateScene,
    Interactive,
    Visual,
    Audio,
    Text,
    Other(u8),
}

/// User-interaction sensor configuration carried by interactive streams.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiConfig {
    pub device_name: String,
    #[serde(default)]
    pub term_char: u8,
    #[serde(default)]
    pub del_char: u8,
    #[serde(default)]
    pub ui_data: Vec<u8>,
}

impl UiConfig {
    /// Encode into decoder specific info bytes.
    ///
    /// Layout: one length byte, the device name, then either the string sensor
    /// terminator/delete characters or the opaque device data.
    pub fn encode(&self) -> Vec<u8> {
        let name = self.device_name.as_bytes();
        let len = name.len().min(u8::MAX as usize);
        let mut out = Vec::with_capacity(1 + len + self.ui_data.len());
        out.push(len as u8);
        out.extend_from_slice(&name[..len]);

        if self.device_name.eq_ignore_ascii_case("StringSensor") {
            if self.term_char != 0 {
                out.push(self.term_char);
                if self.del_char != 0 {
                    out.push(self.del_char);
                }
            }
        } else {
            out.extend_from_slice(&self.ui_data);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    pub stream_type: StreamType,
    #[serde(default)]
    pub object_type: u8,
    #[serde(default)]
    pub decoder_specific_info: Option<Vec<u8>>,
    /// Structured UI configuration, re-encoded into `decoder_specific_info` on setup.
    #[serde(default)]
    pub ui_config: Option<UiConfig>,
}

impl DecoderConfig {
    pub fn new(stream_type: StreamType) -> Self {
        Self {
            stream_type,
            object_type: 0,
            decoder_specific_info: None,
            ui_config: None,
        }
    }
}

/// Multiplexing hint: where the stream data lives and how to import it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MuxInfo {
    #[serde(default)]
    pub file_name: Option<String>,
    /// Text node targeted by a subtitle import.
    #[serde(default)]
    pub text_node: Option<String>,
    /// Backing file is produced during playback and removed on teardown.
    #[serde(default)]
    pub delete_file: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EsDescriptor {
    pub es_id: StreamId,
    #[serde(default)]
    pub ocr_es_id: StreamId,
    #[serde(default)]
    pub depends_on_es_id: StreamId,
    #[serde(default)]
    pub decoder_config: Option<DecoderConfig>,
    #[serde(default)]
    pub mux_info: Option<MuxInfo>,
}

impl EsDescriptor {
    pub fn stream_type(&self) -> Option<StreamType> {
        self.decoder_config.as_ref().map(|dc| dc.stream_type)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub id: OdId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub es_descriptors: Vec<EsDescriptor>,
}

impl ObjectDescriptor {
    /// Descriptor that only redirects to a remote location.
    pub fn redirect(id: OdId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: Some(url.into()),
            es_descriptors: Vec::new(),
        }
    }

    pub fn declares_stream(&self, es_id: StreamId) -> bool {
        self.es_descriptors.iter().any(|esd| esd.es_id == es_id)
    }
}
