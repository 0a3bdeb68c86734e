/*!
 * Directory-wide batch conversion
 *
 * Sweeps a handshake directory, converts every capture that still lacks
 * hash artifacts, and classifies the ones that yielded nothing as
 * lonely so the geo index can point an operator back at them.
 */

use crate::core::capture::{scan_captures, CaptureFile, HashFormat};
use crate::core::convert::{ConvertStatus, HashEngine};
use crate::core::extract::Extractor;
use crate::core::geo::write_lonely_index;
use anyhow::Result;
use log::{debug, info};
use std::fmt;
use std::path::Path;

/// One conversion attempt in a batch run, tagged the way job lists
/// read in the logs: `2500: net1.pcap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTag {
    pub format: HashFormat,
    pub file_name: String,
}

impl fmt::Display for JobTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.format.extension(), self.file_name)
    }
}

/// Accounting for one batch sweep.
///
/// Captures whose artifacts already existed appear in neither list, so
/// rerunning a sweep over a converted directory reports zero new
/// successes.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Conversions that created a new artifact
    pub successful: Vec<JobTag>,
    /// Conversions that ran and produced nothing
    pub failed: Vec<JobTag>,
    /// Captures left with no artifact in either format
    pub lonely: Vec<CaptureFile>,
}

impl<E: Extractor> HashEngine<E> {
    /// Convert every `.pcap` under `handshake_dir` that still needs it,
    /// then rewrite the lonely-capture index.
    ///
    /// A single capture failing to convert never aborts the sweep; only
    /// an unlistable directory does. Progress is logged every 50 files
    /// and once at the end.
    pub fn process_directory(
        &self,
        handshake_dir: &Path,
        index_file: &Path,
    ) -> Result<BatchReport> {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let captures = scan_captures(handshake_dir)?;
        let total = captures.len();
        let mut report = BatchReport::default();

        for (num, capture) in captures.iter().enumerate() {
            match self.eapol_status(capture) {
                ConvertStatus::Created => report.successful.push(JobTag {
                    format: HashFormat::Eapol,
                    file_name: capture.file_name(),
                }),
                ConvertStatus::NotProduced => report.failed.push(JobTag {
                    format: HashFormat::Eapol,
                    file_name: capture.file_name(),
                }),
                ConvertStatus::AlreadyPresent => {}
            }

            match self.pmkid_status(capture, None) {
                ConvertStatus::Created => report.successful.push(JobTag {
                    format: HashFormat::Pmkid,
                    file_name: capture.file_name(),
                }),
                ConvertStatus::NotProduced => report.failed.push(JobTag {
                    format: HashFormat::Pmkid,
                    file_name: capture.file_name(),
                }),
                ConvertStatus::AlreadyPresent => {}
            }

            if !capture.has_artifact(HashFormat::Eapol)
                && !capture.has_artifact(HashFormat::Pmkid)
            {
                report.lonely.push(capture.clone());
                debug!("Batch job: added {} to lonely list", capture.file_name());
            }

            if (num + 1) % 50 == 0 || num + 1 == total {
                info!(
                    "Batch job: {}/{} done ({} lonely)",
                    num + 1,
                    total,
                    report.lonely.len()
                );
            }
        }

        if !report.successful.is_empty() {
            info!(
                "Batch job: {} new hash files created",
                report.successful.len()
            );
        }
        if !report.lonely.is_empty() {
            info!(
                "Batch job: {} networks without enough packets to create a hash",
                report.lonely.len()
            );
        }

        // Rewritten even when empty so stale entries disappear
        write_lonely_index(&report.lonely, index_file)?;
        Ok(report)
    }
}
