//! Stable content hashing over normalized DNA.
//!
//! The hash feeds seed derivation and doubles as a diagnostic id, so it
//! must be independent of serialization key order and formatting. It is
//! computed over an explicit field-ordered byte encoding rather than a
//! JSON dump.

use sha2::{Digest, Sha256};

use archgen_types::dna::DesignDna;

/// Hex-encoded SHA-256 over the canonical encoding of a normalized DNA.
///
/// Stable across processes and restarts: identical normalized DNA always
/// yields the identical hash.
pub fn dna_hash(dna: &DesignDna) -> String {
    let mut hasher = Sha256::new();
    write_canonical(dna, &mut hasher);
    hex_encode(&hasher.finalize())
}

/// Short diagnostic form: `sha256:<first 16 hex chars>`.
pub fn short_hash(dna: &DesignDna) -> String {
    let full = dna_hash(dna);
    format!("sha256:{}", &full[..16])
}

/// Feed every semantically significant field in a fixed order.
///
/// Floats are encoded as their bit patterns; field tags keep adjacent
/// values from colliding ("ab" + "c" vs "a" + "bc").
fn write_canonical(dna: &DesignDna, hasher: &mut Sha256) {
    tag(hasher, "project_id", dna.project_id.as_bytes());
    tag(hasher, "seed", &dna.seed.to_le_bytes());

    tag(hasher, "length_m", &dna.dimensions.length_m.to_bits().to_le_bytes());
    tag(hasher, "width_m", &dna.dimensions.width_m.to_bits().to_le_bytes());
    tag(hasher, "height_m", &dna.dimensions.height_m.to_bits().to_le_bytes());
    tag(hasher, "floor_count", &dna.dimensions.floor_count.to_le_bytes());

    for material in &dna.materials {
        tag(hasher, "material.element", material.element.as_bytes());
        tag(hasher, "material.name", material.name.as_bytes());
        tag(hasher, "material.hex", material.hex.as_bytes());
    }

    for (facade, count) in &dna.openings.windows_per_facade {
        tag(hasher, "windows.facade", facade.as_bytes());
        tag(hasher, "windows.count", &count.to_le_bytes());
    }
    tag(hasher, "door_count", &dna.openings.door_count.to_le_bytes());

    tag(hasher, "roof.kind", dna.roof.kind.to_string().as_bytes());
    tag(hasher, "roof.pitch_deg", &dna.roof.pitch_deg.to_bits().to_le_bytes());
    tag(hasher, "roof.material", dna.roof.material.as_bytes());

    for room in &dna.rooms {
        tag(hasher, "room.name", room.name.as_bytes());
        tag(hasher, "room.area_m2", &room.area_m2.to_bits().to_le_bytes());
        tag(hasher, "room.floor", &room.floor.to_le_bytes());
    }

    for rule in &dna.consistency_rules {
        tag(hasher, "rule", rule.as_bytes());
    }
}

fn tag(hasher: &mut Sha256, name: &str, value: &[u8]) {
    hasher.update((name.len() as u32).to_le_bytes());
    hasher.update(name.as_bytes());
    hasher.update((value.len() as u32).to_le_bytes());
    hasher.update(value);
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
