//! Battle setups: the map and the units that start on it.

use squad_core::enums::Team;
use squad_core::error::CoreError;
use squad_core::flags::AiFlags;
use squad_core::inventory::Inventory;
use squad_core::types::TilePos;
use squad_core::unit::{Stats, Unit};
use squad_core::weapon::{Item, ItemCatalog};
use squad_terrain::grid::TileMap;
use squad_terrain::storage::Storage;

use crate::error::ScenarioError;

/// A battle before placement. Units may come in any order; placement sorts them
/// into team buckets.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub map: TileMap,
    pub units: Vec<Unit>,
}

const SKIRMISH_LAYOUT: [&str; 16] = [
    "........................",
    ".LLL...........#####D###",
    ".LLL...........#.......#",
    ".LLL.....F.....#...s...#",
    "...............#.......#",
    "...............D.......#",
    ".....ww........#########",
    ".....ww.................",
    "........................",
    "..........#####.........",
    "..........#...#.....F...",
    "..........D.s.#.........",
    "..........#####.........",
    "........................",
    "....F...................",
    "........................",
];

fn soldier_stats() -> Stats {
    Stats {
        accuracy: 0.6,
        reaction: 0.6,
        total_hp: 40,
        total_tu: 24.0,
        armor: 0.1,
    }
}

fn alien_stats() -> Stats {
    Stats {
        accuracy: 0.5,
        reaction: 0.5,
        total_hp: 35,
        total_tu: 22.0,
        armor: 0.2,
    }
}

fn civilian_stats() -> Stats {
    Stats {
        accuracy: 0.0,
        reaction: 0.0,
        total_hp: 20,
        total_tu: 18.0,
        armor: 0.0,
    }
}

/// A weapon with full clips of the given kinds.
pub fn armed(catalog: &ItemCatalog, weapon: &str, clips: &[&str]) -> Result<Inventory, CoreError> {
    let weapon = catalog.weapon(weapon)?.clone();
    let clips = clips
        .iter()
        .map(|kind| {
            catalog
                .full_clip(kind)
                .ok_or_else(|| CoreError::Catalog(format!("unknown clip kind '{kind}'")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Inventory::armed(weapon, clips))
}

fn stocked_storage(catalog: &ItemCatalog, weapons: &[&str], clips: &[&str]) -> Result<Storage, CoreError> {
    let mut items = Vec::new();
    for name in weapons {
        items.push(Item::Weapon(catalog.weapon(name)?.clone()));
    }
    for kind in clips {
        let clip = catalog
            .full_clip(kind)
            .ok_or_else(|| CoreError::Catalog(format!("unknown clip kind '{kind}'")))?;
        items.push(Item::Clip(clip));
    }
    Ok(Storage::with_items(items))
}

/// Walled compounds, a wood fence, fuel tanks, and two caches, with a lander in
/// the north-west corner.
pub fn skirmish(catalog: &ItemCatalog) -> Result<Scenario, ScenarioError> {
    let mut map = TileMap::from_layout(&SKIRMISH_LAYOUT)?;
    map.add_storage(
        TilePos::new(19, 3),
        stocked_storage(catalog, &["Plasma Rifle"], &["plasma_pack", "plasma_pack", "cell"])?,
    );
    map.add_storage(
        TilePos::new(12, 11),
        stocked_storage(catalog, &[], &["rifle_clip", "rifle_clip", "grenade"])?,
    );

    let rifle = || armed(catalog, "Assault Rifle", &["rifle_clip", "rifle_clip", "grenade"]);
    let mut units = vec![
        Unit::new(Team::Terran, "Sgt. Okafor", TilePos::new(1, 1), soldier_stats(), rifle()?),
        Unit::new(Team::Terran, "Cpl. Lindqvist", TilePos::new(3, 1), soldier_stats(), rifle()?),
        Unit::new(Team::Terran, "Pvt. Mendes", TilePos::new(1, 3), soldier_stats(), rifle()?),
        Unit::new(
            Team::Terran,
            "Pvt. Haddad",
            TilePos::new(3, 3),
            soldier_stats(),
            armed(catalog, "Laser Carbine", &["cell", "cell"])?,
        ),
    ];
    for unit in &mut units {
        unit.rotation = 90.0;
    }

    for (name, pos) in [("Farmer", (8, 8)), ("Trader", (13, 14)), ("Child", (20, 8))] {
        units.push(
            Unit::new(
                Team::Civilian,
                name,
                TilePos::new(pos.0, pos.1),
                civilian_stats(),
                Inventory::new(),
            )
            .with_ai_flags(AiFlags::WANDER),
        );
    }

    let plasma = || armed(catalog, "Plasma Rifle", &["plasma_pack", "plasma_pack"]);
    units.extend([
        Unit::new(Team::Alien, "Sectoid A", TilePos::new(18, 3), alien_stats(), plasma()?)
            .with_ai_flags(AiFlags::GUARD)
            .with_rotation(270.0),
        Unit::new(Team::Alien, "Sectoid B", TilePos::new(17, 10), alien_stats(), plasma()?).with_rotation(270.0),
        Unit::new(
            Team::Alien,
            "Sectoid C",
            TilePos::new(12, 10),
            alien_stats(),
            armed(catalog, "Laser Carbine", &["cell"])?,
        )
        .with_ai_flags(AiFlags::GUARD)
        .with_rotation(180.0),
        Unit::new(
            Team::Alien,
            "Floater",
            TilePos::new(22, 14),
            alien_stats(),
            armed(catalog, "Rocket Launcher", &["rocket"])?,
        )
        .with_ai_flags(AiFlags::WANDER),
        Unit::new(Team::Alien, "Sectoid D", TilePos::new(21, 7), alien_stats(), plasma()?)
            .with_ai_flags(AiFlags::TRAVEL)
            .with_rotation(270.0),
    ]);

    Ok(Scenario { map, units })
}
