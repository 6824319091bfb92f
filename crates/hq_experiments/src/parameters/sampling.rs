use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{Zone, ZoneDesign};

/// Draw `count` distinct random partitions of `atom_ids` into `n_zones`
/// zones of near-equal size.
///
/// Atoms are shuffled and cut into contiguous chunks; the first
/// `len % n_zones` zones get one extra atom. Partitions that only differ by
/// zone order or atom order within a zone count as duplicates. Sampling stops
/// early when no new partition turns up, so fewer than `count` designs can
/// come back for small regions.
pub fn sample_random_designs(
    atom_ids: &[String],
    n_zones: usize,
    count: usize,
    seed: u64,
) -> Vec<ZoneDesign> {
    const MAX_ATTEMPTS: usize = 10000;

    if n_zones == 0 || n_zones > atom_ids.len() {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut designs = Vec::new();
    let mut seen = HashSet::new();
    let mut attempts = 0;

    while designs.len() < count && attempts < MAX_ATTEMPTS {
        attempts += 1;
        let mut shuffled = atom_ids.to_vec();
        shuffled.shuffle(&mut rng);

        let zones = split_even(shuffled, n_zones);
        if seen.insert(canonical(&zones)) {
            let zones = zones
                .into_iter()
                .enumerate()
                .map(|(index, atoms)| Zone::new(format!("zone_{index}"), atoms))
                .collect();
            designs.push(ZoneDesign::new(format!("design_{}", designs.len()), zones));
        }
    }

    designs
}

fn split_even(atoms: Vec<String>, n_zones: usize) -> Vec<Vec<String>> {
    let base = atoms.len() / n_zones;
    let extra = atoms.len() % n_zones;
    let mut iter = atoms.into_iter();
    (0..n_zones)
        .map(|zone| {
            let size = base + usize::from(zone < extra);
            iter.by_ref().take(size).collect()
        })
        .collect()
}

fn canonical(zones: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut key: Vec<Vec<String>> = zones
        .iter()
        .map(|zone| {
            let mut atoms = zone.clone();
            atoms.sort();
            atoms
        })
        .collect();
    key.sort();
    key
}
