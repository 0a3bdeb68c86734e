/*!
 * hashie: convert wireless captures into crackable hash files
 *
 * EAPOL handshakes become `.2500` files and PMKIDs become `.16800`
 * files, stored next to the captures that produced them. Raw PMKID
 * records missing their SSID are repaired from broadcast traffic, and
 * captures that yield nothing are indexed so the operator can revisit
 * them with location data.
 */

pub mod core;

pub use self::core::*;
