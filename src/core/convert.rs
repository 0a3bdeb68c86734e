/*!
 * Capture-to-hash conversion engine
 *
 * Wraps an `Extractor` with the artifact bookkeeping: skip work when
 * the hash file already exists, otherwise invoke the tool and judge the
 * outcome purely by what landed on disk. PMKID conversion chains into
 * the repair engine when only a raw record could be extracted.
 */

use crate::core::capture::{CaptureFile, HashFormat};
use crate::core::extract::{ExtractMode, Extractor};
use crate::core::record::ApContext;
use crate::core::repair::{repair_pmkid, RepairOutcome};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Mutex;

/// Outcome of one conversion attempt for one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertStatus {
    /// A new artifact landed on disk
    Created,
    /// The artifact was already there; nothing ran
    AlreadyPresent,
    /// The tool ran but produced no usable artifact
    NotProduced,
}

/// Conversion and repair engine over one extractor.
///
/// One coarse lock serializes everything: a live handshake conversion
/// and a batch sweep never interleave tool invocations or repairs.
pub struct HashEngine<E: Extractor> {
    extractor: E,
    pub(crate) lock: Mutex<()>,
}

impl<E: Extractor> HashEngine<E> {
    pub fn new(extractor: E) -> Self {
        Self {
            extractor,
            lock: Mutex::new(()),
        }
    }

    /// Convert one capture to EAPOL hashes. Lock is held by the caller.
    pub(crate) fn eapol_status(&self, capture: &CaptureFile) -> ConvertStatus {
        if capture.has_artifact(HashFormat::Eapol) {
            return ConvertStatus::AlreadyPresent;
        }
        let artifact = capture.artifact_path(HashFormat::Eapol);
        if let Err(err) = self
            .extractor
            .extract(ExtractMode::Eapol, capture.path(), &artifact)
        {
            warn!(
                "EAPOL extraction failed to run on {}: {:#}",
                capture.file_name(),
                err
            );
        }
        if artifact.is_file() {
            debug!("[+] EAPOL success: {}.2500 created", capture.basename());
            ConvertStatus::Created
        } else {
            ConvertStatus::NotProduced
        }
    }

    /// Convert one capture to PMKID hashes, repairing raw records.
    /// Lock is held by the caller.
    pub(crate) fn pmkid_status(
        &self,
        capture: &CaptureFile,
        context: Option<&ApContext>,
    ) -> ConvertStatus {
        if capture.has_artifact(HashFormat::Pmkid) {
            return ConvertStatus::AlreadyPresent;
        }
        let artifact = capture.artifact_path(HashFormat::Pmkid);

        if let Err(err) =
            self.extractor
                .extract(ExtractMode::PmkidComplete, capture.path(), &artifact)
        {
            warn!(
                "PMKID extraction failed to run on {}: {:#}",
                capture.file_name(),
                err
            );
        }
        if artifact.is_file() {
            debug!("[+] PMKID success: {}.16800 created", capture.basename());
            return ConvertStatus::Created;
        }

        // No complete hash; take a raw dump and try to repair it
        if let Err(err) = self
            .extractor
            .extract(ExtractMode::PmkidRaw, capture.path(), &artifact)
        {
            warn!(
                "Raw PMKID extraction failed to run on {}: {:#}",
                capture.file_name(),
                err
            );
        }
        if !artifact.is_file() {
            debug!(
                "[-] Could not attempt repair of {}, no hashes extracted",
                capture.basename()
            );
            return ConvertStatus::NotProduced;
        }

        match repair_pmkid(&self.extractor, capture, context) {
            RepairOutcome::Repaired => {
                debug!("[+] PMKID success: {}.16800 repaired", capture.basename());
                ConvertStatus::Created
            }
            RepairOutcome::Discarded => {
                debug!(
                    "[-] PMKID fail: {}.16800 could not be repaired",
                    capture.basename()
                );
                ConvertStatus::NotProduced
            }
        }
    }

    /// Live conversion of a single fresh capture.
    ///
    /// Returns human-readable status lines for the hashes that exist
    /// once the call is done, whether created now or already on disk.
    /// Failures stay silent here; a later batch sweep retries them.
    pub fn on_handshake(&self, capture_path: &Path, context: Option<&ApContext>) -> Vec<String> {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let capture = CaptureFile::new(capture_path);
        let name = capture.basename();

        let outcomes = [
            (HashFormat::Eapol, self.eapol_status(&capture)),
            (HashFormat::Pmkid, self.pmkid_status(&capture, context)),
        ];
        let mut status = Vec::new();
        for (format, outcome) in outcomes {
            match outcome {
                ConvertStatus::AlreadyPresent => status.push(format!(
                    "Already have {}.{} ({})",
                    name,
                    format.extension(),
                    format.label()
                )),
                ConvertStatus::Created => status.push(format!(
                    "Created {}.{} ({}) from pcap",
                    name,
                    format.extension(),
                    format.label()
                )),
                ConvertStatus::NotProduced => {}
            }
        }

        if !status.is_empty() {
            info!("Good news:\n\t{}", status.join("\n\t"));
        }
        status
    }
}
