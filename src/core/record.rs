/*!
 * PMKID hash records and the identities used to repair them
 *
 * A PMKID record in hashcat 16800 format is colon-delimited:
 * `PMKID:AP-MAC:Client-MAC:SSID-hex`. Extraction tools sometimes emit
 * only the first three fields when the SSID never appeared in the
 * capture's data frames; the repair engine completes such records from
 * identities recovered elsewhere.
 */

use std::fmt;

/// Lowercase a MAC address and strip separators so addresses from
/// different sources (`AA:BB:..`, `aa-bb-..`, raw hex) compare equal.
pub fn normalize_mac(mac: &str) -> String {
    mac.to_lowercase().replace([':', '-', '.'], "")
}

/// Hex-encode an SSID's raw bytes, lowercase, as the 16800 format expects.
pub fn ssid_hex(name: &str) -> String {
    name.bytes().map(|b| format!("{:02x}", b)).collect()
}

/// Access point identity reported by the capture stack at handshake time.
///
/// Highest-trust repair source: the MAC and hostname come straight from
/// the AP that produced the capture, not from frame parsing.
#[derive(Debug, Clone)]
pub struct ApContext {
    pub mac: String,
    pub hostname: String,
}

impl ApContext {
    /// Candidate identity carrying this AP's name.
    pub fn identity(&self) -> CandidateIdentity {
        CandidateIdentity::new(&self.mac, &self.hostname)
    }
}

/// A network identity ready to complete a raw PMKID record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateIdentity {
    /// Normalized AP MAC (lowercase, no separators)
    pub mac: String,
    /// Hex-encoded SSID
    pub ssid_hex: String,
}

impl CandidateIdentity {
    pub fn new(mac: &str, ssid: &str) -> Self {
        Self {
            mac: normalize_mac(mac),
            ssid_hex: ssid_hex(ssid),
        }
    }

    /// True when this identity belongs to the given AP MAC.
    pub fn matches(&self, ap_mac: &str) -> bool {
        self.mac == normalize_mac(ap_mac)
    }
}

/// One hashcat 16800 record, split into its colon-delimited fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmkidRecord {
    fields: Vec<String>,
}

impl PmkidRecord {
    /// Parse raw extractor output into a record.
    ///
    /// Returns `None` for output no candidate could ever complete:
    /// empty files, multi-record dumps, records without an AP MAC field.
    pub fn parse(raw: &str) -> Option<Self> {
        let line = raw.trim();
        if line.is_empty() || line.contains('\n') {
            return None;
        }
        let fields: Vec<String> = line.split(':').map(str::to_string).collect();
        if fields.len() < 2 {
            return None;
        }
        Some(Self { fields })
    }

    /// Complete iff all four fields are present and the SSID is non-empty.
    pub fn is_complete(&self) -> bool {
        self.fields.len() == 4 && !self.fields[3].is_empty()
    }

    /// AP MAC field as the extractor wrote it.
    pub fn ap_mac(&self) -> &str {
        &self.fields[1]
    }

    /// Append an SSID and return the completed record, or `None` when
    /// the result would not be a valid four-field record.
    pub fn completed(&self, ssid_hex: &str) -> Option<Self> {
        let mut fields = self.fields.clone();
        fields.push(ssid_hex.to_string());
        let record = Self { fields };
        if record.is_complete() {
            Some(record)
        } else {
            None
        }
    }

    /// Serialized line as stored in a `.16800` artifact.
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for PmkidRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join(":"))
    }
}

/// Parse the extractor's `MAC:NAME` table. The name is everything after
/// the first colon, so SSIDs containing colons survive intact.
pub fn parse_essid_table(table: &str) -> Vec<CandidateIdentity> {
    table
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(mac, name)| CandidateIdentity::new(mac, name))
        .collect()
}

/// Parse the broadcast-frame table (`BSSID<TAB>name` per line).
///
/// Lines without a tab are noise from the frame dump and are skipped.
pub fn parse_broadcast_table(table: &str) -> Vec<CandidateIdentity> {
    table
        .lines()
        .filter_map(|line| line.split_once('\t'))
        .map(|(mac, name)| CandidateIdentity::new(mac, name))
        .collect()
}
