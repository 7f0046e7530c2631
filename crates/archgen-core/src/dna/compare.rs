//! Structural DNA comparison.
//!
//! Diffs two normalized DNAs over the named field groups (dimensions,
//! materials, roof, openings) rather than as generic JSON, so unrelated
//! metadata (project id, room list ordering) never registers as drift.

use archgen_types::dna::{DesignDna, DnaDiff, FieldPath};

const EPSILON: f64 = 1e-9;

/// Structural diff between two normalized DNAs.
///
/// Every compared path lands in exactly one of `changed` / `unchanged`.
pub fn compare(a: &DesignDna, b: &DesignDna) -> DnaDiff {
    let mut diff = DnaDiff::default();

    numeric(&mut diff, "dimensions.length_m", a.dimensions.length_m, b.dimensions.length_m);
    numeric(&mut diff, "dimensions.width_m", a.dimensions.width_m, b.dimensions.width_m);
    numeric(&mut diff, "dimensions.height_m", a.dimensions.height_m, b.dimensions.height_m);
    record(
        &mut diff,
        "dimensions.floor_count",
        a.dimensions.floor_count == b.dimensions.floor_count,
    );

    compare_materials(&mut diff, a, b);

    for facade in a
        .openings
        .windows_per_facade
        .keys()
        .chain(b.openings.windows_per_facade.keys())
        .collect::<std::collections::BTreeSet<_>>()
    {
        let equal = a.openings.windows_per_facade.get(facade)
            == b.openings.windows_per_facade.get(facade);
        record(&mut diff, &format!("openings.windows.{facade}"), equal);
    }
    record(&mut diff, "openings.door_count", a.openings.door_count == b.openings.door_count);

    record(&mut diff, "roof.kind", a.roof.kind == b.roof.kind);
    numeric(&mut diff, "roof.pitch_deg", a.roof.pitch_deg, b.roof.pitch_deg);
    record(&mut diff, "roof.material", a.roof.material == b.roof.material);

    diff
}

fn compare_materials(diff: &mut DnaDiff, a: &DesignDna, b: &DesignDna) {
    let elements: std::collections::BTreeSet<&str> = a
        .materials
        .iter()
        .chain(b.materials.iter())
        .map(|m| m.element.as_str())
        .collect();

    for element in elements {
        let ma = a.materials.iter().find(|m| m.element == element);
        let mb = b.materials.iter().find(|m| m.element == element);
        let equal = match (ma, mb) {
            (Some(x), Some(y)) => x.name == y.name && x.hex == y.hex,
            _ => false,
        };
        record(diff, &format!("materials.{element}"), equal);
    }
}

fn numeric(diff: &mut DnaDiff, path: &str, a: f64, b: f64) {
    record(diff, path, (a - b).abs() < EPSILON);
}

fn record(diff: &mut DnaDiff, path: &str, equal: bool) {
    let path = FieldPath::new(path);
    if equal {
        diff.unchanged.push(path);
    } else {
        diff.changed.push(path);
    }
}
