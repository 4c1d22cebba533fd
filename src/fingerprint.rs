/// Cache fingerprint derivation
///
/// Builds the deterministic keys shared by the ephemeral and durable cache
/// tiers. Coordinates are rounded to 2 decimal places before key
/// construction, which coalesces requests within a ~1.1 km grid into a
/// single entry. Free-text parts (queries, addresses) are embedded verbatim,
/// so distinct casing or whitespace produces distinct keys.
use sha2::{Digest, Sha256};

/// Maximum key length accepted by the durable store's key column
pub const MAX_KEY_LEN: usize = 64;

/// Fingerprint for a coordinate-based forecast lookup
pub fn forecast_key(lat: f64, lng: f64) -> String {
    clamp(format!("weather:{:.2}:{:.2}", lat, lng))
}

/// Fingerprint for a place text search
pub fn search_key(query: &str) -> String {
    clamp(format!("maps:search:{}", query))
}

/// Fingerprint for a forward geocode lookup
pub fn geocode_key(address: &str) -> String {
    clamp(format!("maps:geocode:{}", address))
}

/// Replace keys that would overflow the durable key column with a hashed
/// form. The namespace prefix is kept readable; the remainder is the SHA-256
/// of the full key, truncated so the result still fits MAX_KEY_LEN.
fn clamp(key: String) -> String {
    if key.len() <= MAX_KEY_LEN {
        return key;
    }

    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    let namespace: String = key.split(':').take(2).collect::<Vec<_>>().join(":");

    // namespace + ':' + as much of the digest as fits
    let remaining = MAX_KEY_LEN.saturating_sub(namespace.len() + 1);
    format!("{}:{}", namespace, &digest[..remaining.min(digest.len())])
}
