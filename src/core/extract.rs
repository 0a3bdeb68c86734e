/*!
 * External extraction tools behind a trait seam
 *
 * hcxpcaptool does the heavy lifting here (frame parsing, hash
 * assembly); this engine only orchestrates it and inspects what lands
 * on disk. tcpdump provides the broadcast-frame fallback used during
 * PMKID repair. Keeping both behind `Extractor` lets conversion and
 * repair logic run against a scripted double in tests.
 */

use anyhow::{anyhow, Context, Result};
use log::debug;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

/// hcxpcaptool invocation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// `-o`: EAPOL hashes (2500)
    Eapol,
    /// `-k`: complete PMKID hashes (16800)
    PmkidComplete,
    /// `-K`: raw PMKID dump, SSID possibly missing
    PmkidRaw,
}

impl ExtractMode {
    fn flag(&self) -> &'static str {
        match self {
            ExtractMode::Eapol => "-o",
            ExtractMode::PmkidComplete => "-k",
            ExtractMode::PmkidRaw => "-K",
        }
    }
}

/// Frame-extraction capability the hash engine drives.
///
/// Implementations run a tool and let the caller judge success by the
/// artifacts it can observe; exit codes are deliberately not part of
/// the contract, because the tools sometimes fail while producing a
/// usable file and sometimes succeed producing nothing.
pub trait Extractor {
    /// Run one extraction mode over a capture, writing to `output`.
    fn extract(&self, mode: ExtractMode, capture: &Path, output: &Path) -> Result<()>;

    /// `MAC:NAME` table of network names seen in the capture.
    fn essid_table(&self, capture: &Path) -> Result<String>;

    /// `BSSID<TAB>name` table recovered from broadcast management frames.
    fn broadcast_table(&self, capture: &Path) -> Result<String>;
}

fn find_binary(candidates: &[&str]) -> Option<String> {
    for bin in candidates {
        if Command::new(bin)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
        {
            return Some(bin.to_string());
        }
    }
    None
}

fn find_hcxpcaptool() -> Option<String> {
    find_binary(&[
        "hcxpcaptool",
        "/usr/local/bin/hcxpcaptool",
        "/usr/bin/hcxpcaptool",
        "/opt/homebrew/bin/hcxpcaptool",
    ])
}

fn find_tcpdump() -> Option<String> {
    find_binary(&[
        "tcpdump",
        "/usr/sbin/tcpdump",
        "/usr/bin/tcpdump",
        "/opt/homebrew/bin/tcpdump",
    ])
}

/// Management frames that carry an SSID in the clear.
const BROADCAST_FILTER: &str = "(type mgt subtype beacon) || (type mgt subtype probe-resp) || (type mgt subtype reassoc-resp) || (type mgt subtype assoc-req)";

/// Real tool bindings, discovered on the host.
pub struct HcxTools {
    hcxpcaptool: String,
    tcpdump: String,
}

impl HcxTools {
    /// Probe the usual install locations for both tools.
    pub fn discover() -> Result<Self> {
        let hcxpcaptool = find_hcxpcaptool()
            .ok_or_else(|| anyhow!("hcxpcaptool not found. Please install hcxtools."))?;
        let tcpdump =
            find_tcpdump().ok_or_else(|| anyhow!("tcpdump not found. Please install tcpdump."))?;
        Ok(Self {
            hcxpcaptool,
            tcpdump,
        })
    }
}

impl Extractor for HcxTools {
    fn extract(&self, mode: ExtractMode, capture: &Path, output: &Path) -> Result<()> {
        let status = Command::new(&self.hcxpcaptool)
            .arg(mode.flag())
            .arg(output)
            .arg(capture)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("Failed to run {}", self.hcxpcaptool))?;
        debug!(
            "{} {} on {} exited with {}",
            self.hcxpcaptool,
            mode.flag(),
            capture.display(),
            status
        );
        Ok(())
    }

    fn essid_table(&self, capture: &Path) -> Result<String> {
        let basename = capture
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "capture".to_string());
        let table_path =
            std::env::temp_dir().join(format!("{}-{}.essids", basename, std::process::id()));

        let status = Command::new(&self.hcxpcaptool)
            .arg("-X")
            .arg(&table_path)
            .arg(capture)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("Failed to run {}", self.hcxpcaptool))?;
        debug!(
            "{} -X on {} exited with {}",
            self.hcxpcaptool,
            capture.display(),
            status
        );

        // The tool only writes the table when it found names
        if !table_path.is_file() {
            return Ok(String::new());
        }
        let table = fs::read_to_string(&table_path)
            .with_context(|| format!("Failed to read essid table {}", table_path.display()))?;
        let _ = fs::remove_file(&table_path);
        Ok(table)
    }

    fn broadcast_table(&self, capture: &Path) -> Result<String> {
        let output = Command::new(&self.tcpdump)
            .arg("-ennr")
            .arg(capture)
            .arg(BROADCAST_FILTER)
            .output()
            .with_context(|| format!("Failed to run {}", self.tcpdump))?;
        let dump = String::from_utf8_lossy(&output.stdout);
        beacon_lines_to_table(&dump)
    }
}

/// Reduce tcpdump's verbose frame dump to `BSSID<TAB>name` lines.
pub(crate) fn beacon_lines_to_table(dump: &str) -> Result<String> {
    let re = Regex::new(r"BSSID:([0-9a-fA-F:]{17}).*\((.*)\)")?;
    let mut table = String::new();
    for line in dump.lines() {
        if let Some(caps) = re.captures(line) {
            table.push_str(&caps[1]);
            table.push('\t');
            table.push_str(&caps[2]);
            table.push('\n');
        }
    }
    Ok(table)
}
