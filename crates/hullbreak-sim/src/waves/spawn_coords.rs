//! Picks where wave ships appear.

use glam::DVec2;
use rand::Rng;

use hullbreak_core::constants::*;
use hullbreak_core::enums::SpawnDistribution;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnCoordinateResolver {
    world_half_size: f64,
}

impl SpawnCoordinateResolver {
    pub fn new(world_size: f64) -> Self {
        Self {
            world_half_size: world_size * 0.5,
        }
    }

    /// A spawn point for `distribution`. `AroundPlayer` without a player
    /// falls back to the world center.
    pub fn coords<R: Rng + ?Sized>(
        &self,
        distribution: SpawnDistribution,
        player: Option<DVec2>,
        rng: &mut R,
    ) -> DVec2 {
        match distribution {
            SpawnDistribution::Random => self.anywhere(rng),
            SpawnDistribution::Outer => self.outside_forbidden(rng),
            SpawnDistribution::Inner => self.inside_forbidden(rng),
            SpawnDistribution::AroundPlayer => match player {
                Some(p) => {
                    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                    let radius =
                        SPAWN_PLAYER_RING_MIN + rng.gen::<f64>() * SPAWN_PLAYER_RING_WIDTH;
                    p + DVec2::new(angle.cos(), angle.sin()) * radius
                }
                None => DVec2::ZERO,
            },
            SpawnDistribution::Center => DVec2::ZERO,
        }
    }

    fn anywhere<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec2 {
        let h = self.world_half_size;
        DVec2::new(rng.gen_range(-h..=h), rng.gen_range(-h..=h))
    }

    fn inside_forbidden<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec2 {
        let h = SPAWN_FORBIDDEN_HALF_EXTENT;
        DVec2::new(rng.gen_range(-h..h), rng.gen_range(-h..h))
    }

    fn outside_forbidden<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec2 {
        for _ in 0..SPAWN_MAX_ATTEMPTS {
            let p = self.anywhere(rng);
            if is_outside_forbidden(p) {
                return p;
            }
        }
        let edge = |rng: &mut R| {
            let offset = SPAWN_FORBIDDEN_HALF_EXTENT
                + SPAWN_OUTER_FALLBACK_PADDING
                + rng.gen::<f64>() * SPAWN_OUTER_FALLBACK_PADDING;
            if rng.gen_bool(0.5) {
                -offset
            } else {
                offset
            }
        };
        let x = edge(rng);
        let y = edge(rng);
        DVec2::new(x, y)
    }
}

pub fn is_outside_forbidden(p: DVec2) -> bool {
    p.x.abs() > SPAWN_FORBIDDEN_HALF_EXTENT || p.y.abs() > SPAWN_FORBIDDEN_HALF_EXTENT
}
