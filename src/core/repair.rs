/*!
 * PMKID record repair
 *
 * hcxpcaptool's raw dump mode (`-K`) recovers records whose SSID never
 * made it into the capture's data frames. The SSID usually did appear
 * in broadcast traffic, so three sources are tried in trust order: the
 * live AP context, the tool's own network-name table, and finally raw
 * broadcast frames. The first identity matching the record's AP MAC
 * completes it; a record nothing can complete is deleted rather than
 * left half-written on disk.
 */

use crate::core::capture::{CaptureFile, HashFormat};
use crate::core::extract::Extractor;
use crate::core::record::{parse_broadcast_table, parse_essid_table, ApContext, PmkidRecord};
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// What became of a raw PMKID artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    /// SSID recovered, artifact rewritten as a complete record
    Repaired,
    /// No usable identity; artifact removed
    Discarded,
}

/// Try to complete the raw `.16800` artifact of `capture`.
///
/// The artifact must exist when this is called. Whatever happens, no
/// incomplete record survives: either the artifact is rewritten as a
/// valid four-field record or it is deleted.
pub(crate) fn repair_pmkid<E: Extractor>(
    extractor: &E,
    capture: &CaptureFile,
    context: Option<&ApContext>,
) -> RepairOutcome {
    let artifact = capture.artifact_path(HashFormat::Pmkid);
    debug!("Repairing {}...", capture.basename());

    let raw = match fs::read_to_string(&artifact) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(
                "Could not read raw PMKID artifact {}: {}",
                artifact.display(),
                err
            );
            return discard(capture, &artifact, "unreadable artifact");
        }
    };

    let record = match PmkidRecord::parse(&raw) {
        Some(record) => record,
        None => return discard(capture, &artifact, "unparseable record"),
    };
    if record.is_complete() {
        // The raw dump carried the SSID after all; nothing to do
        return RepairOutcome::Repaired;
    }

    let mut candidates_tried = 0usize;

    // Highest trust: the AP identity reported at capture time
    if let Some(context) = context {
        candidates_tried += 1;
        let identity = context.identity();
        if identity.matches(record.ap_mac()) {
            if let Some(done) = record.completed(&identity.ssid_hex) {
                return commit(capture, &artifact, &done);
            }
            debug!(
                "Rejected context candidate {} for {}",
                identity.mac,
                capture.basename()
            );
        }
    }

    // Next: the extractor's own network-name table for this capture
    match extractor.essid_table(capture.path()) {
        Ok(table) => {
            for identity in parse_essid_table(&table) {
                candidates_tried += 1;
                if !identity.matches(record.ap_mac()) {
                    continue;
                }
                if let Some(done) = record.completed(&identity.ssid_hex) {
                    return commit(capture, &artifact, &done);
                }
                debug!(
                    "Rejected name-table candidate {} for {}",
                    identity.mac,
                    capture.basename()
                );
            }
        }
        Err(err) => warn!(
            "Network name extraction failed on {}: {:#}",
            capture.file_name(),
            err
        ),
    }

    // Last resort: names broadcast in raw management frames
    match extractor.broadcast_table(capture.path()) {
        Ok(table) => {
            for identity in parse_broadcast_table(&table) {
                candidates_tried += 1;
                if !identity.matches(record.ap_mac()) {
                    continue;
                }
                if let Some(done) = record.completed(&identity.ssid_hex) {
                    return commit(capture, &artifact, &done);
                }
                debug!(
                    "Rejected broadcast candidate {} for {}",
                    identity.mac,
                    capture.basename()
                );
            }
        }
        Err(err) => warn!(
            "Broadcast frame analysis failed on {}: {:#}",
            capture.file_name(),
            err
        ),
    }

    if candidates_tried == 0 {
        discard(capture, &artifact, "no candidates found")
    } else {
        discard(capture, &artifact, "no candidate matched")
    }
}

fn commit(capture: &CaptureFile, artifact: &Path, record: &PmkidRecord) -> RepairOutcome {
    match fs::write(artifact, record.to_line()) {
        Ok(()) => {
            debug!("Repaired: {} ({})", capture.basename(), record);
            RepairOutcome::Repaired
        }
        Err(err) => {
            warn!("Could not rewrite {}: {}", artifact.display(), err);
            discard(capture, artifact, "failed rewrite")
        }
    }
}

fn discard(capture: &CaptureFile, artifact: &Path, reason: &str) -> RepairOutcome {
    debug!("Discarding {}.16800 ({})", capture.basename(), reason);
    if let Err(err) = fs::remove_file(artifact) {
        warn!(
            "Could not remove incomplete artifact {}: {}",
            artifact.display(),
            err
        );
    }
    RepairOutcome::Discarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extract::testing::MockExtractor;
    use crate::core::record::ssid_hex;
    use tempfile::tempdir;

    const RAW_RECORD: &str = "abcd1234:aabbccddeeff:112233445566\n";

    fn raw_capture(dir: &Path) -> CaptureFile {
        let capture = CaptureFile::new(dir.join("net1.pcap"));
        fs::write(capture.path(), b"").unwrap();
        fs::write(capture.artifact_path(HashFormat::Pmkid), RAW_RECORD).unwrap();
        capture
    }

    fn artifact_content(capture: &CaptureFile) -> String {
        fs::read_to_string(capture.artifact_path(HashFormat::Pmkid)).unwrap()
    }

    #[test]
    fn test_context_beats_name_table() {
        let dir = tempdir().unwrap();
        let capture = raw_capture(dir.path());

        let mut mock = MockExtractor::default();
        mock.essids
            .insert("net1".to_string(), "aabbccddeeff:TableNet\n".to_string());
        let context = ApContext {
            mac: "AA:BB:CC:DD:EE:FF".to_string(),
            hostname: "CtxNet".to_string(),
        };

        let outcome = repair_pmkid(&mock, &capture, Some(&context));
        assert_eq!(outcome, RepairOutcome::Repaired);
        assert_eq!(
            artifact_content(&capture),
            format!("abcd1234:aabbccddeeff:112233445566:{}\n", ssid_hex("CtxNet"))
        );
    }

    #[test]
    fn test_mismatched_context_falls_through() {
        let dir = tempdir().unwrap();
        let capture = raw_capture(dir.path());

        let mut mock = MockExtractor::default();
        mock.essids
            .insert("net1".to_string(), "aabbccddeeff:TableNet\n".to_string());
        let context = ApContext {
            mac: "00:11:22:33:44:55".to_string(),
            hostname: "OtherNet".to_string(),
        };

        let outcome = repair_pmkid(&mock, &capture, Some(&context));
        assert_eq!(outcome, RepairOutcome::Repaired);
        assert_eq!(
            artifact_content(&capture),
            format!("abcd1234:aabbccddeeff:112233445566:{}\n", ssid_hex("TableNet"))
        );
    }

    #[test]
    fn test_first_matching_candidate_wins() {
        let dir = tempdir().unwrap();
        let capture = raw_capture(dir.path());

        let mut mock = MockExtractor::default();
        mock.broadcasts.insert(
            "net1".to_string(),
            "aa:bb:cc:dd:ee:ff\tFirstSeen\naa:bb:cc:dd:ee:ff\tSecondSeen\n".to_string(),
        );

        let outcome = repair_pmkid(&mock, &capture, None);
        assert_eq!(outcome, RepairOutcome::Repaired);
        assert!(artifact_content(&capture).ends_with(&format!("{}\n", ssid_hex("FirstSeen"))));
    }

    #[test]
    fn test_broadcast_fallback_after_name_table_misses() {
        let dir = tempdir().unwrap();
        let capture = raw_capture(dir.path());

        let mut mock = MockExtractor::default();
        mock.essids
            .insert("net1".to_string(), "001122334455:WrongNet\n".to_string());
        mock.broadcasts.insert(
            "net1".to_string(),
            "aa:bb:cc:dd:ee:ff\tHomeWifi\n".to_string(),
        );

        let outcome = repair_pmkid(&mock, &capture, None);
        assert_eq!(outcome, RepairOutcome::Repaired);
        assert!(artifact_content(&capture).ends_with(&format!("{}\n", ssid_hex("HomeWifi"))));
    }

    #[test]
    fn test_empty_name_candidate_is_rejected_not_final() {
        let dir = tempdir().unwrap();
        let capture = raw_capture(dir.path());

        // First candidate matches but carries no name; the next one wins
        let mut mock = MockExtractor::default();
        mock.essids.insert(
            "net1".to_string(),
            "aabbccddeeff:\naabbccddeeff:RealName\n".to_string(),
        );

        let outcome = repair_pmkid(&mock, &capture, None);
        assert_eq!(outcome, RepairOutcome::Repaired);
        assert!(artifact_content(&capture).ends_with(&format!("{}\n", ssid_hex("RealName"))));
    }

    #[test]
    fn test_no_match_deletes_artifact() {
        let dir = tempdir().unwrap();
        let capture = raw_capture(dir.path());

        let mut mock = MockExtractor::default();
        mock.essids
            .insert("net1".to_string(), "001122334455:WrongNet\n".to_string());
        mock.broadcasts.insert(
            "net1".to_string(),
            "00:de:ad:be:ef:00\tAlsoWrong\n".to_string(),
        );

        let outcome = repair_pmkid(&mock, &capture, None);
        assert_eq!(outcome, RepairOutcome::Discarded);
        assert!(!capture.has_artifact(HashFormat::Pmkid));
    }

    #[test]
    fn test_no_candidates_deletes_artifact() {
        let dir = tempdir().unwrap();
        let capture = raw_capture(dir.path());

        let mock = MockExtractor::default();
        let outcome = repair_pmkid(&mock, &capture, None);
        assert_eq!(outcome, RepairOutcome::Discarded);
        assert!(!capture.has_artifact(HashFormat::Pmkid));
    }

    #[test]
    fn test_corrupt_record_is_discarded() {
        let dir = tempdir().unwrap();
        let capture = CaptureFile::new(dir.path().join("net1.pcap"));
        fs::write(capture.path(), b"").unwrap();
        fs::write(capture.artifact_path(HashFormat::Pmkid), "garbage without fields\n").unwrap();

        let mut mock = MockExtractor::default();
        mock.broadcasts.insert(
            "net1".to_string(),
            "aa:bb:cc:dd:ee:ff\tHomeWifi\n".to_string(),
        );

        let outcome = repair_pmkid(&mock, &capture, None);
        assert_eq!(outcome, RepairOutcome::Discarded);
        assert!(!capture.has_artifact(HashFormat::Pmkid));
    }

    #[test]
    fn test_already_complete_record_is_kept() {
        let dir = tempdir().unwrap();
        let capture = CaptureFile::new(dir.path().join("net1.pcap"));
        fs::write(capture.path(), b"").unwrap();
        let complete = "abcd1234:aabbccddeeff:112233445566:486f6d6557696669\n";
        fs::write(capture.artifact_path(HashFormat::Pmkid), complete).unwrap();

        let mock = MockExtractor::default();
        let outcome = repair_pmkid(&mock, &capture, None);
        assert_eq!(outcome, RepairOutcome::Repaired);
        assert_eq!(artifact_content(&capture), complete);
    }

    #[test]
    fn test_artifact_sits_next_to_capture() {
        let dir = tempdir().unwrap();
        let capture = raw_capture(dir.path());
        assert_eq!(
            capture.artifact_path(HashFormat::Pmkid),
            dir.path().join("net1.16800")
        );
    }
}
