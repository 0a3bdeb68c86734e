use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hashie")]
#[command(version = "1.0.1")]
#[command(about = "Convert wireless captures to crackable hash files", long_about = None)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand)]
pub enum Mode {
    /// Convert every pcap in a directory and index the leftovers
    ///
    /// Captures that already have hash artifacts are skipped, so the
    /// sweep is cheap to rerun. Captures that produce no hashes at all
    /// are written to the lonely index for the geo tooling.
    ///
    /// Example: hashie batch /root/handshakes
    Batch {
        /// Directory containing .pcap captures
        #[arg(value_name = "HANDSHAKE_DIR")]
        handshake_dir: PathBuf,

        /// Where to write the lonely-capture index
        #[arg(long, default_value = "/root/.incompletePcaps")]
        index_file: PathBuf,

        /// Also export lonely-capture coordinates as CSV
        #[arg(long, value_name = "PATH")]
        locations_csv: Option<PathBuf>,
    },

    /// Convert a single fresh capture
    ///
    /// Meant to run right after a handshake lands. Supplying the access
    /// point identity improves the odds of repairing a PMKID whose SSID
    /// did not make it into the capture.
    ///
    /// Example: hashie handshake net1.pcap --ap-mac aa:bb:cc:dd:ee:ff --ap-name HomeWifi
    Handshake {
        /// Path to the capture file
        #[arg(value_name = "PCAP")]
        pcap: PathBuf,

        /// Access point MAC address
        #[arg(long, requires = "ap_name")]
        ap_mac: Option<String>,

        /// Access point name
        #[arg(long, requires = "ap_mac")]
        ap_name: Option<String>,
    },
}
