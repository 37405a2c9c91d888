// Save format and two-phase load reconstruction.
//
// A save is a flat `SaveGame` record: ledger scalars and stacks, UI flags,
// the soil tiers in grid order, one `PlantRecord` per live plant, one
// `AutomationRecord` per automation, and the caller's `AudioSettings`. It
// holds no derived state: no soil-plot indices, names, targets or animation
// frames.
//
// Loading is reconstruction, not deserialization in place:
//
//   1. parse: `serde_path_to_error` reports the JSON path of a bad field.
//   2. validate: version, grid size, tier range, stage/age agreement,
//      varieties known to the config, plant footprints inside the garden
//      and not overlapping, automations inside the area they can walk.
//      Fails with a field path.
//   3. fresh graph: `SimState::with_config(seed, config)` builds a default
//      garden with every derived structure initialized.
//   4. soil: tiers copied onto the fresh grid.
//   5. ledger: cash, score, stacks, then tick and UI flags.
//   6. plants: each record inserted; its soil plot is looked up again from
//      its position, which is why soil precedes plants.
//   7. automations: each respawned through the purchase path (fresh unique
//      name, fresh target) and patched with its saved counters.
//   8. rng: restored last, since step 7 draws from it.
//
// `from_json` returns a new `LoadedGame`; the caller's live state is never
// touched, so a failed load leaves the running garden as it was. A missing
// save file is the caller's concern (see the headless driver).
//
// See also: `sim.rs` for `restore_plant`/`spawn_automation`, `error.rs` for
// `SaveError`/`LoadError`.

use crate::automation::animation_frame;
use crate::command::{Mode, Selection};
use crate::config::GameConfig;
use crate::error::{LoadError, SaveError};
use crate::ledger::ConsumableStack;
use crate::settings::AudioSettings;
use crate::sim::SimState;
use crate::soil::{Fertility, SoilGrid};
use crate::types::{AutomationKind, Footprint, PlotIndex, Point, Rect, Stage, Variety};
use idle_garden_prng::GameRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::{info, warn};

pub const SAVE_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    pub seed: u64,
    pub tick: u64,
    pub ledger: LedgerRecord,
    pub paused: bool,
    pub mode: Mode,
    pub selection: Selection,
    pub soil: SoilRecord,
    pub plants: Vec<PlantRecord>,
    pub automations: Vec<AutomationRecord>,
    pub rng: GameRng,
    pub audio: AudioSettings,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub cash: i64,
    pub score: i64,
    pub seeds: BTreeMap<Variety, ConsumableStack>,
    pub harvested: BTreeMap<Variety, ConsumableStack>,
    pub fertilizer: ConsumableStack,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilRecord {
    pub columns: u32,
    pub rows: u32,
    pub tiers: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub variety: Variety,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub age: u64,
    pub stage: Stage,
    pub alive: bool,
    pub frame: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationRecord {
    pub kind: AutomationKind,
    pub x: i32,
    pub y: i32,
    pub cooldown: u32,
    pub work_completed: u64,
    pub counter: u64,
}

/// A reconstructed garden plus the settings saved alongside it.
#[derive(Debug)]
pub struct LoadedGame {
    pub state: SimState,
    pub audio: AudioSettings,
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

/// Flatten the persisted fields of `state` into a `SaveGame`.
pub fn snapshot(state: &SimState, audio: &AudioSettings) -> SaveGame {
    let (columns, rows) = state.soil.dimensions();
    SaveGame {
        version: SAVE_VERSION,
        seed: state.seed,
        tick: state.tick,
        ledger: LedgerRecord {
            cash: state.ledger.cash,
            score: state.ledger.score,
            seeds: state.ledger.seed_stacks().clone(),
            harvested: state.ledger.harvest_stacks().clone(),
            fertilizer: state.ledger.fertilizer_stack(),
        },
        paused: state.paused,
        mode: state.mode,
        selection: state.selection,
        soil: SoilRecord {
            columns,
            rows,
            tiers: state.soil.tiers().collect(),
        },
        plants: state
            .plants
            .values()
            .filter(|p| p.alive)
            .map(|p| PlantRecord {
                variety: p.variety,
                x: p.position.x,
                y: p.position.y,
                w: p.footprint.w,
                h: p.footprint.h,
                age: p.age,
                stage: p.stage,
                alive: p.alive,
                frame: p.frame,
            })
            .collect(),
        automations: state
            .automations
            .values()
            .map(|a| AutomationRecord {
                kind: a.kind(),
                x: a.position.x,
                y: a.position.y,
                cooldown: a.cooldown,
                work_completed: a.work_completed,
                counter: a.counter,
            })
            .collect(),
        rng: state.rng.clone(),
        audio: *audio,
    }
}

/// Serialize a garden and the caller's audio settings to JSON.
pub fn to_json(state: &SimState, audio: &AudioSettings) -> Result<String, SaveError> {
    let json = serde_json::to_string_pretty(&snapshot(state, audio))?;
    info!(tick = state.tick, bytes = json.len(), "game saved");
    Ok(json)
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Parse, validate and reconstruct a garden from JSON under `config`.
pub fn from_json(json: &str, config: GameConfig) -> Result<LoadedGame, LoadError> {
    let save = parse(json).inspect_err(|err| warn!(%err, "save rejected"))?;
    load(save, config)
}

/// Validate and reconstruct a garden from an already-parsed `SaveGame`.
pub fn load(save: SaveGame, config: GameConfig) -> Result<LoadedGame, LoadError> {
    validate(&save, &config).inspect_err(|err| warn!(%err, "save rejected"))?;
    let audio = save.audio.sanitized();
    let state = reconstruct(save, config);
    info!(
        tick = state.tick,
        plants = state.plants.len(),
        automations = state.automations.len(),
        "game loaded"
    );
    Ok(LoadedGame { state, audio })
}

fn parse(json: &str) -> Result<SaveGame, LoadError> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize::<_, SaveGame>(&mut deserializer).map_err(|err| {
        LoadError::Parse {
            path: err.path().to_string(),
            source: err.into_inner(),
        }
    })
}

fn expected_actual(path: impl Into<String>, expected: impl Display, actual: impl Display) -> LoadError {
    LoadError::invalid(path, format!("expected {expected}, got {actual}"))
}

fn validate(save: &SaveGame, config: &GameConfig) -> Result<(), LoadError> {
    if save.version != SAVE_VERSION {
        return Err(LoadError::UnsupportedVersion {
            found: save.version,
            expected: SAVE_VERSION,
        });
    }

    let (columns, rows) = SoilGrid::dimensions_for(config.garden, config.soil_cell_size);
    if save.soil.columns != columns || save.soil.rows != rows {
        return Err(expected_actual(
            "soil",
            format!("{columns}x{rows} grid"),
            format!("{}x{}", save.soil.columns, save.soil.rows),
        ));
    }
    let expected_len = columns as usize * rows as usize;
    if save.soil.tiers.len() != expected_len {
        return Err(expected_actual(
            "soil.tiers",
            format!("{expected_len} tiers"),
            save.soil.tiers.len(),
        ));
    }
    if let Some((i, tier)) = save
        .soil
        .tiers
        .iter()
        .enumerate()
        .find(|(_, t)| Fertility::new(**t).is_none())
    {
        return Err(expected_actual(
            format!("soil.tiers[{i}]"),
            format!("tier at most {}", Fertility::MAX.tier()),
            tier,
        ));
    }

    for (name, stacks) in [("seeds", &save.ledger.seeds), ("harvested", &save.ledger.harvested)] {
        if let Some(variety) = stacks.keys().find(|v| config.variety(**v).is_none()) {
            return Err(LoadError::invalid(
                format!("ledger.{name}"),
                format!("variety {variety:?} is not configured"),
            ));
        }
    }
    if let Selection::Seed(variety) = save.selection {
        if config.variety(variety).is_none() {
            return Err(LoadError::invalid(
                "selection",
                format!("variety {variety:?} is not configured"),
            ));
        }
    }

    for (i, p) in save.plants.iter().enumerate() {
        let Some(data) = config.variety(p.variety) else {
            return Err(LoadError::invalid(
                format!("plants[{i}].variety"),
                format!("variety {:?} is not configured", p.variety),
            ));
        };
        if p.w <= 0 || p.h <= 0 {
            return Err(expected_actual(
                format!("plants[{i}]"),
                "positive footprint",
                format!("{}x{}", p.w, p.h),
            ));
        }
        let derived = data.stage_for_age(p.age);
        if p.stage != derived {
            return Err(expected_actual(
                format!("plants[{i}].stage"),
                format!("{derived:?} for age {}", p.age),
                format!("{:?}", p.stage),
            ));
        }
        if p.alive && p.stage == Stage::Dead {
            return Err(LoadError::invalid(
                format!("plants[{i}].alive"),
                "a dead plant cannot be alive",
            ));
        }
        if !fits_in(config.garden, p) {
            let g = config.garden;
            return Err(expected_actual(
                format!("plants[{i}]"),
                format!("footprint inside garden {}x{} at ({}, {})", g.w, g.h, g.x, g.y),
                format!("{}x{} at ({}, {})", p.w, p.h, p.x, p.y),
            ));
        }
    }

    // Every record is inside the garden now, so rect arithmetic is safe.
    let rects: Vec<(usize, Rect)> = save
        .plants
        .iter()
        .enumerate()
        .filter(|(_, p)| p.alive)
        .map(|(i, p)| (i, Rect::new(p.x, p.y, p.w, p.h)))
        .collect();
    for (n, (j, b)) in rects.iter().enumerate() {
        if let Some((i, _)) = rects[..n].iter().find(|(_, a)| a.intersects(b)) {
            return Err(LoadError::invalid(
                format!("plants[{j}]"),
                format!("overlaps plants[{i}]"),
            ));
        }
    }

    let (min_x, min_y, max_x, max_y) = roaming_bounds(config);
    for (i, a) in save.automations.iter().enumerate() {
        let (x, y) = (i64::from(a.x), i64::from(a.y));
        if !(min_x..=max_x).contains(&x) || !(min_y..=max_y).contains(&y) {
            return Err(expected_actual(
                format!("automations[{i}]"),
                format!("position within ({min_x}, {min_y})..=({max_x}, {max_y})"),
                format!("({}, {})", a.x, a.y),
            ));
        }
    }
    Ok(())
}

/// Plant footprint lies inside `garden`. Widened so hostile coordinates
/// cannot overflow.
fn fits_in(garden: Rect, p: &PlantRecord) -> bool {
    let (x, y, w, h) = (i64::from(p.x), i64::from(p.y), i64::from(p.w), i64::from(p.h));
    let (gx, gy) = (i64::from(garden.x), i64::from(garden.y));
    x >= gx
        && y >= gy
        && x + w <= gx + i64::from(garden.w)
        && y + h <= gy + i64::from(garden.h)
}

/// Inclusive box every automation can reach: the garden plus the spawn
/// point and the seller's two stops. Movement is a per-axis step toward a
/// target inside this box, so it never leaves it.
fn roaming_bounds(config: &GameConfig) -> (i64, i64, i64, i64) {
    let g = config.garden;
    let mut min = (i64::from(g.x), i64::from(g.y));
    let mut max = (min.0 + i64::from(g.w), min.1 + i64::from(g.h));
    for p in [config.automation_spawn, config.seller_depot, config.seller_dropoff] {
        min = (min.0.min(i64::from(p.x)), min.1.min(i64::from(p.y)));
        max = (max.0.max(i64::from(p.x)), max.1.max(i64::from(p.y)));
    }
    (min.0, min.1, max.0, max.1)
}

fn reconstruct(save: SaveGame, config: GameConfig) -> SimState {
    let mut state = SimState::with_config(save.seed, config);

    for (i, tier) in save.soil.tiers.iter().enumerate() {
        state
            .soil
            .set(PlotIndex(i as u32), Fertility::clamped(*tier));
    }

    let ledger = save.ledger;
    state.ledger.restore(
        ledger.cash,
        ledger.score,
        ledger.seeds,
        ledger.harvested,
        ledger.fertilizer,
    );
    state.tick = save.tick;
    state.paused = save.paused;
    state.mode = save.mode;
    state.selection = save.selection;

    for p in save.plants.iter().filter(|p| p.alive) {
        let frame = match state
            .config
            .variety(p.variety)
            .and_then(|d| d.frames.for_stage(p.stage))
        {
            Some(range) => range.clamp(p.frame),
            None => p.frame,
        };
        state.restore_plant(
            p.variety,
            Point::new(p.x, p.y),
            Footprint::new(p.w, p.h),
            p.age,
            p.stage,
            frame,
        );
    }

    let (period, frames) = (state.config.animation_period_ticks, state.config.animation_frames);
    for a in &save.automations {
        let role = state.initial_role(a.kind);
        let id = state.spawn_automation(role, Point::new(a.x, a.y), a.cooldown);
        if let Some(live) = state.automations.get_mut(&id) {
            live.work_completed = a.work_completed;
            live.counter = a.counter;
            live.frame = animation_frame(a.counter, period, frames);
        }
    }

    state.rng = save.rng;
    state
}
