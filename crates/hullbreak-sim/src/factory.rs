//! Builds ships and formations from blueprints into the sector.

use glam::DVec2;
use rand::Rng;

use hullbreak_ai::formation_registry::Formation;
use hullbreak_core::affixes::ShipAffixes;
use hullbreak_core::blocks::BlockCatalog;
use hullbreak_core::constants::FORMATION_SPAWN_JITTER;
use hullbreak_core::enums::Faction;
use hullbreak_core::types::{ObjectId, Transform};
use hullbreak_core::waves::ShipFormationEntry;
use hullbreak_core::{Error, Result};

use crate::ai_controller::AiController;
use crate::blueprints::ShipBlueprints;
use crate::context::SimContext;
use crate::sector::Sector;
use crate::ship::{ShipFlags, ShipSystems};

/// Everything needed to place one ship.
#[derive(Debug, Clone)]
pub struct ShipSpawn {
    pub blueprint: String,
    pub faction: Faction,
    pub position: DVec2,
    pub rotation: f64,
    pub flags: ShipFlags,
    pub affixes: ShipAffixes,
}

impl ShipSpawn {
    pub fn new(blueprint: &str, faction: Faction, position: DVec2) -> Self {
        Self {
            blueprint: blueprint.to_string(),
            faction,
            position,
            rotation: 0.0,
            flags: ShipFlags::default(),
            affixes: ShipAffixes::default(),
        }
    }

    pub fn with_flags(mut self, flags: ShipFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_affixes(mut self, affixes: ShipAffixes) -> Self {
        self.affixes = affixes;
        self
    }
}

/// Spawn a ship. Unknown blueprints or block types fail before anything is
/// added to the sector.
pub fn spawn_ship(
    sector: &mut Sector,
    catalog: &BlockCatalog,
    blueprints: &ShipBlueprints,
    spawn: &ShipSpawn,
) -> Result<ObjectId> {
    let layout = blueprints.get(&spawn.blueprint)?;
    let mut blocks = Vec::with_capacity(layout.blocks.len());
    for b in &layout.blocks {
        let block_type = catalog
            .get(&b.id)
            .ok_or_else(|| Error::UnknownBlockType(b.id.clone()))?;
        blocks.push((b.coord, block_type, b.rotation));
    }

    let mut systems = ShipSystems::new(&spawn.blueprint, spawn.flags);
    systems.affixes = spawn.affixes;
    let transform = Transform {
        rotation: spawn.rotation,
        ..Transform::at(spawn.position)
    };
    let id = sector.create_ship(spawn.faction, transform, systems);

    for (coord, block_type, rotation) in blocks {
        if let Err(e) = sector.place_block(id, coord, block_type, rotation) {
            sector.remove_object(id);
            return Err(e);
        }
    }

    log::debug!(
        "spawned {} {} ({:?}) at ({:.0}, {:.0})",
        spawn.blueprint,
        id,
        spawn.faction,
        spawn.position.x,
        spawn.position.y
    );
    Ok(id)
}

/// Spawn an AI ship and register its controller.
pub fn spawn_ai_ship(ctx: &mut SimContext, spawn: &ShipSpawn) -> Result<ObjectId> {
    let id = spawn_ship(ctx.sector, ctx.catalog, ctx.blueprints, spawn)?;
    if let Some(ship) = ctx.sector.get(id) {
        let controller = AiController::for_ship(ship);
        if spawn.flags.uncullable {
            ctx.ai.add_uncullable(controller);
        } else {
            ctx.ai.add(controller);
        }
    }
    Ok(id)
}

/// Spawn one instance of a formation template near `(x, y)`.
///
/// The leader goes at a jittered origin and each follower at the origin plus
/// its slot offset. The formation is registered before any controller, and
/// the leader's controller is added first. Returns leader then followers.
pub fn spawn_formation(
    ctx: &mut SimContext,
    entry: &ShipFormationEntry,
    faction: Faction,
    x: f64,
    y: f64,
) -> Result<Vec<ObjectId>> {
    if entry.layout.len() < entry.followers.len() {
        return Err(Error::FormationArity {
            layout: entry.layout_kind.tag().to_string(),
            expected: entry.layout.len(),
            got: entry.followers.len(),
        });
    }

    let jitter = FORMATION_SPAWN_JITTER;
    let origin = DVec2::new(
        x + ctx.rng.gen_range(-jitter..jitter),
        y + ctx.rng.gen_range(-jitter..jitter),
    );
    let formation_id = ctx.ai.formations_mut().allocate_id(&entry.formation_id);

    let leader_spawn = ShipSpawn::new(&entry.leader.ship_id, faction, origin)
        .with_flags(ShipFlags {
            hunter: entry.leader.hunter,
            uncullable: entry.un_cullable,
            behavior: entry.leader.behavior.unwrap_or_default(),
            ..Default::default()
        })
        .with_affixes(entry.leader.affixes);
    let leader = spawn_ship(ctx.sector, ctx.catalog, ctx.blueprints, &leader_spawn)?;

    let mut members = Vec::with_capacity(entry.followers.len());
    for (follower, offset) in entry.followers.iter().zip(&entry.layout) {
        let spawn = ShipSpawn::new(&follower.ship_id, faction, origin + *offset)
            .with_flags(ShipFlags {
                uncullable: entry.un_cullable,
                behavior: follower.behavior.unwrap_or_default(),
                ..Default::default()
            })
            .with_affixes(follower.affixes);
        match spawn_ship(ctx.sector, ctx.catalog, ctx.blueprints, &spawn) {
            Ok(id) => members.push((id, *offset)),
            Err(e) => {
                ctx.sector.remove_object(leader);
                for (id, _) in &members {
                    ctx.sector.remove_object(*id);
                }
                return Err(e);
            }
        }
    }

    ctx.ai.formations_mut().register(Formation {
        formation_id: formation_id.clone(),
        leader_id: leader,
        members: members.clone(),
    });

    let mut spawned = Vec::with_capacity(members.len() + 1);
    let roster = std::iter::once((leader, false)).chain(members.iter().map(|(id, _)| (*id, true)));
    for (id, follower) in roster {
        let Some(ship) = ctx.sector.get(id) else {
            continue;
        };
        let mut controller = AiController::for_ship(ship);
        if follower {
            controller = controller.with_formation(&formation_id);
        }
        if entry.un_cullable {
            ctx.ai.add_uncullable(controller);
        } else {
            ctx.ai.add(controller);
        }
        spawned.push(id);
    }
    log::info!(
        "formation {formation_id} spawned with {} ships at ({:.0}, {:.0})",
        spawned.len(),
        origin.x,
        origin.y
    );
    Ok(spawned)
}
