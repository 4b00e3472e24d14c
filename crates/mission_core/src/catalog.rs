use rand::Rng;

use crate::{DebrisId, DebrisObject, Material, MissionParameters};

const MASS_RANGE_KG: (f64, f64) = (50.0, 1000.0);
const ALTITUDE_RANGE_KM: (f64, f64) = (400.0, 1000.0);
const DISTANCE_RANGE: (f64, f64) = (1000.0, 6000.0);

/// Draw `num_debris` objects and order them by descending priority.
///
/// Value is fixed with the collection efficiency in effect now; a later
/// reconfiguration regenerates the whole catalog. Ties keep generation
/// order (stable sort).
pub fn generate(params: &MissionParameters, rng: &mut impl Rng) -> Vec<DebrisObject> {
    let mut catalog: Vec<DebrisObject> = (0..params.num_debris as usize)
        .map(|index| draw_debris(index, params, rng))
        .collect();

    catalog.sort_by(|a, b| b.priority.total_cmp(&a.priority));

    tracing::debug!(
        count = catalog.len(),
        top = catalog.first().map(|d| d.id.0.as_str()),
        "catalog generated"
    );
    catalog
}

fn draw_debris(index: usize, params: &MissionParameters, rng: &mut impl Rng) -> DebrisObject {
    let material = Material::ALL[rng.gen_range(0..Material::ALL.len())];
    let mass = uniform(rng, MASS_RANGE_KG);
    let altitude = uniform(rng, ALTITUDE_RANGE_KM);
    let threat_level: f64 = rng.gen();
    let accessibility: f64 = rng.gen();
    let distance = uniform(rng, DISTANCE_RANGE);

    let value = mass * material.unit_price() * params.collection_efficiency;
    let priority = params.scoring.score(threat_level, value, accessibility);

    DebrisObject {
        id: DebrisId::from_ordinal(index),
        altitude,
        mass,
        material,
        distance,
        threat_level,
        accessibility,
        value,
        priority,
    }
}

fn uniform(rng: &mut impl Rng, (min, max): (f64, f64)) -> f64 {
    min + rng.gen::<f64>() * (max - min)
}
