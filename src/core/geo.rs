/*!
 * Lonely-capture index and location export
 *
 * Captures that produced no hash artifact are still worth revisiting:
 * with more packets they might convert next time. The index file lists
 * them for the geo-mapping collaborator, and the CSV export turns their
 * GPS sidecars into something a mapping app can load directly.
 */

use crate::core::capture::CaptureFile;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Sidecar extensions that may carry coordinates for a capture.
const LOCATION_SIDECARS: [&str; 3] = ["gps.json", "geo.json", "paw-gps.json"];

/// Accuracy assigned to sidecar formats that do not report one.
const DEFAULT_ACCURACY: f64 = 50.0;

/// Overwrite the shared index of captures that have no hash artifact.
///
/// One file name per line, extension kept. The file is rewritten on
/// every sweep, so entries for captures that converted since are gone.
pub fn write_lonely_index(lonely: &[CaptureFile], index_file: &Path) -> Result<()> {
    let mut body = String::new();
    let mut with_location = 0usize;
    for capture in lonely {
        body.push_str(&capture.file_name());
        body.push('\n');
        if LOCATION_SIDECARS
            .iter()
            .any(|ext| capture.sidecar(ext).is_file())
        {
            with_location += 1;
        }
    }
    fs::write(index_file, body)
        .with_context(|| format!("Failed to write lonely index {}", index_file.display()))?;

    if with_location != 0 {
        info!(
            "Found location data for {} lonely networks, go revisit them!",
            with_location
        );
    } else if !lonely.is_empty() {
        info!(
            "Could not find location data for any of the {} lonely networks",
            lonely.len()
        );
    }
    Ok(())
}

// The three sidecar schemas, as their producers write them.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GpsSidecar {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct GeoSidecar {
    location: GeoPoint,
    accuracy: f64,
}

#[derive(Debug, Deserialize)]
struct GeoPoint {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct PawGpsSidecar {
    lat: f64,
    long: f64,
}

/// Coordinates recovered for one lonely capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureLocation {
    pub basename: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

fn read_sidecar<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            debug!("Skipping sidecar {}: {}", path.display(), err);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(data) => Some(data),
        Err(err) => {
            debug!("Skipping sidecar {}: {}", path.display(), err);
            None
        }
    }
}

fn read_location(capture: &CaptureFile) -> Option<CaptureLocation> {
    let basename = capture.basename();

    let gps = capture.sidecar("gps.json");
    if gps.is_file() {
        let data: GpsSidecar = read_sidecar(&gps)?;
        return Some(CaptureLocation {
            basename,
            latitude: data.latitude,
            longitude: data.longitude,
            accuracy: DEFAULT_ACCURACY,
        });
    }

    let geo = capture.sidecar("geo.json");
    if geo.is_file() {
        let data: GeoSidecar = read_sidecar(&geo)?;
        return Some(CaptureLocation {
            basename,
            latitude: data.location.lat,
            longitude: data.location.lng,
            accuracy: data.accuracy,
        });
    }

    let paw = capture.sidecar("paw-gps.json");
    if paw.is_file() {
        let data: PawGpsSidecar = read_sidecar(&paw)?;
        return Some(CaptureLocation {
            basename,
            latitude: data.lat,
            longitude: data.long,
            accuracy: DEFAULT_ACCURACY,
        });
    }

    None
}

/// Collect coordinates for every lonely capture that has a sidecar.
pub fn collect_locations(lonely: &[CaptureFile]) -> Vec<CaptureLocation> {
    lonely.iter().filter_map(read_location).collect()
}

/// Export lonely-capture coordinates as `name,lat,lon,accuracy` lines.
///
/// Nothing is written when no capture has usable location data.
/// Returns the number of exported rows.
pub fn export_locations_csv(lonely: &[CaptureFile], csv_path: &Path) -> Result<usize> {
    let locations = collect_locations(lonely);
    if locations.is_empty() {
        return Ok(0);
    }

    let mut body = String::new();
    for loc in &locations {
        body.push_str(&format!(
            "{},{},{},{}\n",
            loc.basename, loc.latitude, loc.longitude, loc.accuracy
        ));
    }
    fs::write(csv_path, body)
        .with_context(|| format!("Failed to write locations CSV {}", csv_path.display()))?;
    info!(
        "Exported {} capture locations to {}",
        locations.len(),
        csv_path.display()
    );
    Ok(locations.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn capture_in(dir: &Path, name: &str) -> CaptureFile {
        let capture = CaptureFile::new(dir.join(name));
        fs::write(capture.path(), b"").unwrap();
        capture
    }

    #[test]
    fn test_index_lists_file_names_with_extension() {
        let dir = tempdir().unwrap();
        let lonely = vec![
            capture_in(dir.path(), "net1.pcap"),
            capture_in(dir.path(), "net2.pcap"),
        ];
        let index = dir.path().join("index");

        write_lonely_index(&lonely, &index).unwrap();
        assert_eq!(
            fs::read_to_string(&index).unwrap(),
            "net1.pcap\nnet2.pcap\n"
        );
    }

    #[test]
    fn test_index_overwrite_purges_stale_entries() {
        let dir = tempdir().unwrap();
        let index = dir.path().join("index");
        fs::write(&index, "ghost.pcap\n").unwrap();

        write_lonely_index(&[], &index).unwrap();
        assert_eq!(fs::read_to_string(&index).unwrap(), "");
    }

    #[test]
    fn test_csv_reads_all_three_sidecar_schemas() {
        let dir = tempdir().unwrap();
        let a = capture_in(dir.path(), "a.pcap");
        let b = capture_in(dir.path(), "b.pcap");
        let c = capture_in(dir.path(), "c.pcap");
        fs::write(
            a.sidecar("gps.json"),
            r#"{"Latitude": 52.5, "Longitude": 13.4, "FixQuality": 1}"#,
        )
        .unwrap();
        fs::write(
            b.sidecar("geo.json"),
            r#"{"location": {"lat": 48.8, "lng": 2.3}, "accuracy": 12.5}"#,
        )
        .unwrap();
        fs::write(c.sidecar("paw-gps.json"), r#"{"lat": 40.7, "long": -74.0}"#).unwrap();

        let csv = dir.path().join("locations.csv");
        let exported = export_locations_csv(&[a, b, c], &csv).unwrap();
        assert_eq!(exported, 3);
        assert_eq!(
            fs::read_to_string(&csv).unwrap(),
            "a,52.5,13.4,50\nb,48.8,2.3,12.5\nc,40.7,-74,50\n"
        );
    }

    #[test]
    fn test_csv_skips_malformed_sidecars() {
        let dir = tempdir().unwrap();
        let a = capture_in(dir.path(), "a.pcap");
        let b = capture_in(dir.path(), "b.pcap");
        fs::write(a.sidecar("gps.json"), "not json at all").unwrap();
        fs::write(
            b.sidecar("gps.json"),
            r#"{"Latitude": 1.0, "Longitude": 2.0}"#,
        )
        .unwrap();

        let csv = dir.path().join("locations.csv");
        let exported = export_locations_csv(&[a, b], &csv).unwrap();
        assert_eq!(exported, 1);
        assert_eq!(fs::read_to_string(&csv).unwrap(), "b,1,2,50\n");
    }

    #[test]
    fn test_csv_not_written_without_locations() {
        let dir = tempdir().unwrap();
        let a = capture_in(dir.path(), "a.pcap");
        let csv = dir.path().join("locations.csv");

        let exported = export_locations_csv(&[a], &csv).unwrap();
        assert_eq!(exported, 0);
        assert!(!csv.exists());
    }

    #[test]
    fn test_gps_sidecar_takes_priority() {
        let dir = tempdir().unwrap();
        let a = capture_in(dir.path(), "a.pcap");
        fs::write(
            a.sidecar("gps.json"),
            r#"{"Latitude": 1.0, "Longitude": 2.0}"#,
        )
        .unwrap();
        fs::write(
            a.sidecar("geo.json"),
            r#"{"location": {"lat": 9.0, "lng": 9.0}, "accuracy": 1.0}"#,
        )
        .unwrap();

        let locations = collect_locations(&[a]);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].latitude, 1.0);
        assert_eq!(locations[0].accuracy, DEFAULT_ACCURACY);
    }
}
