/// Place normalization
///
/// Maps a raw provider place record onto the gateway's PlaceRecord schema.
/// Pure and total: every optional field is defaulted individually, so any
/// deserializable provider record normalizes without error.
use crate::places::{provider::RawPlace, PlaceRecord};

pub fn normalize_place(raw: &RawPlace) -> PlaceRecord {
    let address = raw.formatted_address.clone().unwrap_or_default();

    PlaceRecord {
        external_ref: raw.place_id.clone(),
        // Prefer the display name, fall back to the formatted address
        name: raw.name.clone().unwrap_or_else(|| address.clone()),
        lat: raw.geometry.location.lat,
        lng: raw.geometry.location.lng,
        address,
        // Absent, not zero, when the provider omits it
        rating: raw.rating,
        categories: raw.types.clone().unwrap_or_default(),
        photo_ref: raw
            .photos
            .as_ref()
            .and_then(|photos| photos.first())
            .map(|p| p.photo_reference.clone()),
    }
}
