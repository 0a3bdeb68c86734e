/*!
 * Capture file discovery and hash artifact naming
 *
 * Every capture keeps its hash artifacts alongside it: `net1.pcap`
 * produces `net1.2500` (EAPOL) and/or `net1.16800` (PMKID). Artifact
 * existence is the only success signal the engine trusts, which is what
 * keeps reruns cheap and idempotent.
 */

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Hashcat output formats this engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFormat {
    /// EAPOL 4-way handshake, hashcat mode 2500
    Eapol,
    /// PMKID, hashcat mode 16800
    Pmkid,
}

impl HashFormat {
    /// Artifact file extension (also the hashcat mode number).
    pub fn extension(&self) -> &'static str {
        match self {
            HashFormat::Eapol => "2500",
            HashFormat::Pmkid => "16800",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HashFormat::Eapol => "EAPOL",
            HashFormat::Pmkid => "PMKID",
        }
    }
}

/// A capture file on disk plus the naming scheme for its artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFile {
    path: PathBuf,
}

impl CaptureFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name with extension, as the lonely index records it.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without the trailing extension.
    pub fn basename(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path of the hash artifact for a format, next to the capture.
    pub fn artifact_path(&self, format: HashFormat) -> PathBuf {
        self.path.with_extension(format.extension())
    }

    pub fn has_artifact(&self, format: HashFormat) -> bool {
        self.artifact_path(format).is_file()
    }

    /// Sibling file sharing this capture's stem (`.gps.json` and friends).
    pub fn sidecar(&self, extension: &str) -> PathBuf {
        self.path.with_extension(extension)
    }
}

/// List the `.pcap` files in a directory, in enumeration order.
///
/// An unreadable directory fails the whole run; there is nothing useful
/// to convert without the listing.
pub fn scan_captures(dir: &Path) -> Result<Vec<CaptureFile>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list capture directory {}", dir.display()))?;

    let mut captures = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        let is_pcap = path
            .extension()
            .map(|ext| ext == "pcap")
            .unwrap_or(false);
        if is_pcap && path.is_file() {
            captures.push(CaptureFile::new(path));
        }
    }
    Ok(captures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_artifact_naming() {
        let capture = CaptureFile::new("/tmp/handshakes/net1.pcap");
        assert_eq!(
            capture.artifact_path(HashFormat::Eapol),
            PathBuf::from("/tmp/handshakes/net1.2500")
        );
        assert_eq!(
            capture.artifact_path(HashFormat::Pmkid),
            PathBuf::from("/tmp/handshakes/net1.16800")
        );
        assert_eq!(capture.file_name(), "net1.pcap");
        assert_eq!(capture.basename(), "net1");
    }

    #[test]
    fn test_dotted_names_keep_their_prefix() {
        // Only the final extension is swapped
        let capture = CaptureFile::new("/tmp/net.2021.pcap");
        assert_eq!(
            capture.artifact_path(HashFormat::Eapol),
            PathBuf::from("/tmp/net.2021.2500")
        );
        assert_eq!(capture.sidecar("gps.json"), PathBuf::from("/tmp/net.2021.gps.json"));
        assert_eq!(capture.basename(), "net.2021");
    }

    #[test]
    fn test_scan_filters_non_captures() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.pcap"), b"").unwrap();
        fs::write(dir.path().join("b.txt"), b"").unwrap();
        fs::write(dir.path().join("c.pcap"), b"").unwrap();
        fs::create_dir(dir.path().join("sub.pcap")).unwrap();

        let captures = scan_captures(dir.path()).unwrap();
        let mut names: Vec<String> = captures.iter().map(|c| c.file_name()).collect();
        names.sort();
        assert_eq!(names, vec!["a.pcap", "c.pcap"]);
    }

    #[test]
    fn test_scan_fails_on_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(scan_captures(&missing).is_err());
    }
}
