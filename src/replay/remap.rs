//! Object Descriptor Remapper
//!
//! Rewrites descriptors of object descriptor updates before they are bound by the
//! host object manager: dependency fix-up, private scene pinning, subtitle import
//! and redirection to backing files.

use crate::host::ObjectManager;
use crate::replay::PendingDeletions;
use crate::timeline::{Context, EsDescriptor, ObjectDescriptor, StreamType};
use crate::types::{OdId, StreamId};
use std::path::Path;
use tracing::{debug, warn};

/// Result of processing one update command.
#[derive(Debug, Clone, PartialEq)]
pub enum RemapOutcome {
    /// Every descriptor was bound or discarded.
    Consumed,
    /// A backing file is not there yet; these descriptors remain, head first.
    Deferred(Vec<ObjectDescriptor>),
}

enum Step {
    Done,
    Defer(ObjectDescriptor),
}

pub struct Remapper<'a, M: ObjectManager + ?Sized> {
    objects: &'a mut M,
    base_stream_id: StreamId,
    pending_deletions: &'a mut PendingDeletions,
}

impl<'a, M: ObjectManager + ?Sized> Remapper<'a, M> {
    pub fn new(
        objects: &'a mut M,
        base_stream_id: StreamId,
        pending_deletions: &'a mut PendingDeletions,
    ) -> Self {
        Self {
            objects,
            base_stream_id,
            pending_deletions,
        }
    }

    /// Process descriptors in order, stopping at the first one that must wait.
    pub fn update(&mut self, ctx: &mut Context, descriptors: Vec<ObjectDescriptor>) -> RemapOutcome {
        let mut remaining = descriptors.into_iter();
        while let Some(od) = remaining.next() {
            if let Step::Defer(od) = self.remap_one(ctx, od) {
                let mut kept = vec![od];
                kept.extend(remaining);
                return RemapOutcome::Deferred(kept);
            }
        }
        RemapOutcome::Consumed
    }

    /// Disconnect every live object among `ids`.
    pub fn remove(&mut self, ids: &[OdId]) -> usize {
        let mut removed = 0;
        for id in ids {
            if let Some(handle) = self.objects.find_object(*id) {
                self.objects.disconnect_object(handle);
                removed += 1;
            } else {
                debug!(od_id = id, "Remove for unknown object ignored");
            }
        }
        removed
    }

    fn remap_one(&mut self, ctx: &mut Context, mut od: ObjectDescriptor) -> Step {
        // Only single-stream descriptors are handled.
        if od.es_descriptors.is_empty() {
            if od.url.is_some() {
                self.bind(od);
            } else {
                debug!(od_id = od.id, "Empty descriptor discarded");
            }
            return Step::Done;
        }

        let base = self.base_stream_id;
        {
            let esd = &mut od.es_descriptors[0];
            if esd.ocr_es_id != 0 && ctx.stream_in_root_od(esd.ocr_es_id) {
                esd.ocr_es_id = base;
            }
        }

        if od.url.is_some() {
            warn!(od_id = od.id, "Descriptor with both URL and streams rejected");
            return Step::Done;
        }

        let mux = od.es_descriptors[0]
            .mux_info
            .clone()
            .filter(|mux| mux.file_name.is_some());
        let Some(mux) = mux else {
            self.bind_private_stream(od);
            return Step::Done;
        };

        if mux.text_node.is_some() {
            let esd = od.es_descriptors[0].clone();
            match self.objects.import_subtitle(ctx, &esd, &mux) {
                Ok(()) => {
                    let esd = &mut od.es_descriptors[0];
                    if let Some(dc) = esd.decoder_config.as_mut() {
                        dc.stream_type = StreamType::PrivateScene;
                    }
                    esd.depends_on_es_id = base;
                    self.bind(od);
                }
                Err(e) => {
                    warn!(od_id = od.id, error = %e, "Subtitle import failed, descriptor discarded");
                }
            }
            return Step::Done;
        }

        let Some(file_name) = mux.file_name else {
            return Step::Done;
        };
        if mux.delete_file {
            if !Path::new(&file_name).exists() {
                debug!(od_id = od.id, file = %file_name, "Backing file not ready, deferring");
                return Step::Defer(od);
            }
            self.pending_deletions.insert(&file_name);
        }

        self.bind(ObjectDescriptor::redirect(od.id, file_name));
        Step::Done
    }

    /// Descriptors without a backing file: only scene and interactive streams survive.
    fn bind_private_stream(&mut self, mut od: ObjectDescriptor) {
        let esd: &mut EsDescriptor = &mut od.es_descriptors[0];
        let Some(dc) = esd.decoder_config.as_mut() else {
            debug!(od_id = od.id, "Descriptor without decoder config discarded");
            return;
        };
        match dc.stream_type {
            StreamType::Scene => {}
            StreamType::Interactive => {
                if let Some(ui) = dc.ui_config.take() {
                    dc.decoder_specific_info = Some(ui.encode());
                }
            }
            other => {
                debug!(od_id = od.id, stream_type = ?other, "Unsupported stream type discarded");
                return;
            }
        }
        dc.stream_type = StreamType::PrivateScene;
        esd.depends_on_es_id = self.base_stream_id;
        self.bind(od);
    }

    fn bind(&mut self, od: ObjectDescriptor) {
        if let Some(handle) = self.objects.find_object(od.id) {
            self.objects.disconnect_object(handle);
        }
        debug!(od_id = od.id, url = ?od.url, "Binding object");
        self.objects.setup_object(od);
    }
}
