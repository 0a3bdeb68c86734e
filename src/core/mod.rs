// Core library modules
pub mod batch;
pub mod capture;
pub mod convert;
pub mod extract;
pub mod geo;
pub mod record;
pub mod repair;

// Re-exports
pub use batch::{BatchReport, JobTag};
pub use capture::{scan_captures, CaptureFile, HashFormat};
pub use convert::{ConvertStatus, HashEngine};
pub use extract::{ExtractMode, Extractor, HcxTools};
pub use geo::{collect_locations, export_locations_csv, write_lonely_index, CaptureLocation};
pub use record::{
    normalize_mac, parse_broadcast_table, parse_essid_table, ssid_hex, ApContext,
    CandidateIdentity, PmkidRecord,
};
pub use repair::RepairOutcome;
