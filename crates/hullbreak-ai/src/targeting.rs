//! Target selection over a pre-filtered candidate list.

use glam::DVec2;
use rand::Rng;

use hullbreak_core::enums::Faction;
use hullbreak_core::types::ObjectId;

/// A ship that might be attacked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetCandidate {
    pub id: ObjectId,
    pub faction: Faction,
    pub position: DVec2,
    pub velocity: DVec2,
    pub invulnerable: bool,
}

/// The ship doing the looking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seeker {
    pub id: ObjectId,
    pub faction: Faction,
    pub position: DVec2,
}

fn hostile_in_range<'a>(
    seeker: Seeker,
    range: f64,
    candidates: &'a [TargetCandidate],
) -> impl Iterator<Item = (&'a TargetCandidate, f64)> + 'a {
    candidates.iter().filter_map(move |c| {
        if seeker.faction == Faction::Neutral
            || c.id == seeker.id
            || c.faction == seeker.faction
            || c.faction == Faction::Neutral
            || c.invulnerable
        {
            return None;
        }
        let dist = seeker.position.distance(c.position);
        (dist <= range).then_some((c, dist))
    })
}

/// Closest hostile ship within `range`.
pub fn find_nearest_target<'a>(
    seeker: &Seeker,
    range: f64,
    candidates: &'a [TargetCandidate],
) -> Option<&'a TargetCandidate> {
    hostile_in_range(*seeker, range, candidates)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

/// Farthest hostile ship within `range`.
pub fn find_farthest_target<'a>(
    seeker: &Seeker,
    range: f64,
    candidates: &'a [TargetCandidate],
) -> Option<&'a TargetCandidate> {
    hostile_in_range(*seeker, range, candidates)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

/// Uniformly random hostile ship within `range`.
pub fn find_random_target<'a, R: Rng + ?Sized>(
    seeker: &Seeker,
    range: f64,
    candidates: &'a [TargetCandidate],
    rng: &mut R,
) -> Option<&'a TargetCandidate> {
    let valid: Vec<&TargetCandidate> = hostile_in_range(*seeker, range, candidates)
        .map(|(c, _)| c)
        .collect();
    if valid.is_empty() {
        return None;
    }
    Some(valid[rng.gen_range(0..valid.len())])
}
