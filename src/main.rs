/*!
 * hashie command line interface
 *
 * Two entry points:
 * - batch: sweep a handshake directory and index the leftovers
 * - handshake: convert a single capture right after it lands
 */

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Mode};
use hashie::{export_locations_csv, ApContext, HashEngine, HcxTools};
use log::info;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let engine = HashEngine::new(HcxTools::discover()?);

    match args.mode {
        Mode::Batch {
            handshake_dir,
            index_file,
            locations_csv,
        } => {
            info!("Starting batch conversion of pcap files...");
            let report = engine.process_directory(&handshake_dir, &index_file)?;
            println!(
                "{} new hash files, {} failed conversions, {} lonely captures",
                report.successful.len(),
                report.failed.len(),
                report.lonely.len()
            );
            if let Some(csv_path) = locations_csv {
                let exported = export_locations_csv(&report.lonely, &csv_path)?;
                if exported != 0 {
                    println!("Wrote {} capture locations to {}", exported, csv_path.display());
                }
            }
        }
        Mode::Handshake {
            pcap,
            ap_mac,
            ap_name,
        } => {
            let context = ap_mac
                .zip(ap_name)
                .map(|(mac, hostname)| ApContext { mac, hostname });
            let status = engine.on_handshake(&pcap, context.as_ref());
            if status.is_empty() {
                println!("No hashes extracted from {}", pcap.display());
            }
            for line in &status {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
