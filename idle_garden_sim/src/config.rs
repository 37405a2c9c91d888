// Data-driven game configuration.
//
// All tunable simulation parameters live here in `GameConfig`. The sim never
// uses magic numbers; it reads from the config. `GameConfig::default()` holds
// the shipped balance, and `GameConfig::from_json()` lets a partial JSON file
// override any subset of fields (`#[serde(default)]` fills in the rest).
//
// Per-variety economy and growth data lives in `VarietyData` entries keyed
// by `Variety` in the `varieties` map. Growth thresholds are the ages at
// which a plant enters `Growing`, `FullGrown`, `ReadyToHarvest`, `Withered`
// and `Dead`; `Seed` is implicit from age 0. Each living stage also owns a
// contiguous range of visual frames.
//
// Two historically ambiguous rules are exposed as policies rather than fixed
// behavior: `WitheredSoilPolicy` (does clearing a withered plant wear the
// soil or give back what it took?) and `DebtReliefScope` (which stocks must
// be empty before the bailout fires?).
//
// See also: `sim.rs` which owns the `GameConfig` as part of `SimState`,
// `plant.rs` for `stage_for_age` and frame advance, `soil.rs` for the grid
// built from `garden` and `soil_cell_size`.
//
// **Critical constraint: determinism.** Config values feed directly into
// simulation logic. A save replays identically only under the same config.

use crate::error::ConfigError;
use crate::soil::Fertility;
use crate::types::{AutomationKind, Footprint, Point, Rect, Stage, Variety};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Per-variety data
// ---------------------------------------------------------------------------

/// Inclusive range of visual frame indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub first: u32,
    pub last: u32,
}

impl FrameRange {
    pub const fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    pub fn clamp(&self, frame: u32) -> u32 {
        frame.clamp(self.first, self.last)
    }
}

/// Frame ranges for each stage that has a sprite. `Dead` plants are swept
/// before they are drawn and have none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFrames {
    pub seed: FrameRange,
    pub growing: FrameRange,
    pub full_grown: FrameRange,
    pub ready_to_harvest: FrameRange,
    pub withered: FrameRange,
}

impl StageFrames {
    pub fn for_stage(&self, stage: Stage) -> Option<FrameRange> {
        match stage {
            Stage::Seed => Some(self.seed),
            Stage::Growing => Some(self.growing),
            Stage::FullGrown => Some(self.full_grown),
            Stage::ReadyToHarvest => Some(self.ready_to_harvest),
            Stage::Withered => Some(self.withered),
            Stage::Dead => None,
        }
    }

    fn all(&self) -> [(&'static str, FrameRange); 5] {
        [
            ("seed", self.seed),
            ("growing", self.growing),
            ("full_grown", self.full_grown),
            ("ready_to_harvest", self.ready_to_harvest),
            ("withered", self.withered),
        ]
    }
}

impl Default for StageFrames {
    fn default() -> Self {
        Self {
            seed: FrameRange::new(0, 10),
            growing: FrameRange::new(11, 20),
            full_grown: FrameRange::new(21, 35),
            ready_to_harvest: FrameRange::new(36, 40),
            withered: FrameRange::new(41, 55),
        }
    }
}

/// Economy and growth table for one plant variety.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarietyData {
    /// Cash debited per seed bought in the shop.
    pub seed_cost: i64,
    /// Cash credited per harvested unit sold.
    pub sell_price: i64,
    /// Ages (ticks) at which the plant enters Growing, FullGrown,
    /// ReadyToHarvest, Withered and Dead. Strictly increasing.
    pub growth_thresholds: [u64; 5],
    pub frames: StageFrames,
}

impl VarietyData {
    /// The stage a plant of this variety is in at `age`. Pure and monotonic
    /// in `age`.
    pub fn stage_for_age(&self, age: u64) -> Stage {
        let [growing, full_grown, ready, withered, death] = self.growth_thresholds;
        if age >= death {
            Stage::Dead
        } else if age >= withered {
            Stage::Withered
        } else if age >= ready {
            Stage::ReadyToHarvest
        } else if age >= full_grown {
            Stage::FullGrown
        } else if age >= growing {
            Stage::Growing
        } else {
            Stage::Seed
        }
    }

    /// Age at which the plant dies and is swept.
    pub fn death_age(&self) -> u64 {
        self.growth_thresholds[4]
    }
}

// ---------------------------------------------------------------------------
// Automations
// ---------------------------------------------------------------------------

/// Shop and scheduling data for one automation role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationData {
    pub price: i64,
    /// Cooldown a freshly bought automation starts with. After each action
    /// the cooldown is rerolled from `cooldown_reroll_max` instead.
    pub initial_cooldown: u32,
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// What clearing a withered plant does to the soil under it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WitheredSoilPolicy {
    /// Every harvest wears the soil by one tier.
    #[default]
    Degrade,
    /// A withered plant rots back into the soil: one tier is restored.
    Restore,
}

/// Which stocks must be empty for the debt-relief bailout to fire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtReliefScope {
    /// Seeds and harvest of every variety, plus fertilizer.
    #[default]
    AllTracked,
    /// Only the default variety's seed and harvest stacks.
    DefaultVarietyOnly,
}

/// What the developer key combo grants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevGrant {
    pub cash: i64,
    pub seeds: u32,
    pub score: i64,
}

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Top-level configuration. All fields have defaults (see `Default` impl).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // Starting economy.
    pub starting_cash: i64,
    pub starting_seeds: u32,
    pub starting_fertilizer: u32,
    /// Variety the player starts with, and the one debt relief and the dev
    /// grant pay out in.
    pub default_variety: Variety,

    pub varieties: BTreeMap<Variety, VarietyData>,
    pub fertilizer_cost: i64,

    // Garden geometry.
    pub garden: Rect,
    /// Side length of a square soil plot, in pixels.
    pub soil_cell_size: i32,
    /// Fertility tier every plot starts at (0..=2).
    pub initial_fertility: u8,
    pub plant_footprint: Footprint,

    // Plant lifecycle.
    /// Ticks between visual frame advances within a stage.
    pub frame_period_ticks: u64,
    /// Give the soil one tier back when a plant dies of old age.
    pub improve_soil_on_death: bool,
    pub withered_soil_policy: WitheredSoilPolicy,
    /// A cleared withered plant yields `roll(1..=max) * (tier + 1)` seeds.
    pub withered_seed_roll_max: u32,

    // Scoring.
    pub harvest_score: i64,
    pub withered_score: i64,
    pub sale_score_per_unit: i64,
    /// Extra cash per accumulated fertility bonus point at sale time.
    pub bonus_cash_per_point: i64,

    // Automations.
    pub automations: BTreeMap<AutomationKind, AutomationData>,
    /// Cooldowns are rerolled uniformly from `0..cooldown_reroll_max`.
    pub cooldown_reroll_max: u32,
    pub automation_spawn: Point,
    pub automation_footprint: Footprint,
    pub seller_depot: Point,
    pub seller_dropoff: Point,
    pub animation_period_ticks: u64,
    pub animation_frames: u32,

    // Debt relief.
    pub debt_relief_seeds: u32,
    pub debt_relief_penalty: i64,
    pub debt_relief_scope: DebtReliefScope,

    pub dev_grant: DevGrant,
}

impl Default for GameConfig {
    fn default() -> Self {
        let mut varieties = BTreeMap::new();
        varieties.insert(
            Variety::FlowerRed,
            VarietyData {
                seed_cost: 5,
                sell_price: 10,
                growth_thresholds: [200, 400, 600, 8000, 10_000],
                frames: StageFrames::default(),
            },
        );
        varieties.insert(
            Variety::FlowerBlue,
            VarietyData {
                seed_cost: 8,
                sell_price: 16,
                growth_thresholds: [250, 500, 750, 9000, 11_000],
                frames: StageFrames::default(),
            },
        );

        let mut automations = BTreeMap::new();
        automations.insert(
            AutomationKind::Harvester,
            AutomationData {
                price: 250,
                initial_cooldown: 300,
            },
        );
        automations.insert(
            AutomationKind::Planter,
            AutomationData {
                price: 150,
                initial_cooldown: 200,
            },
        );
        automations.insert(
            AutomationKind::Seller,
            AutomationData {
                price: 350,
                initial_cooldown: 500,
            },
        );

        Self {
            starting_cash: 5,
            starting_seeds: 5,
            starting_fertilizer: 0,
            default_variety: Variety::FlowerRed,
            varieties,
            fertilizer_cost: 20,
            garden: Rect::new(250, 50, 980, 620),
            soil_cell_size: 10,
            initial_fertility: 1,
            plant_footprint: Footprint::new(20, 20),
            frame_period_ticks: 100,
            improve_soil_on_death: true,
            withered_soil_policy: WitheredSoilPolicy::Degrade,
            withered_seed_roll_max: 2,
            harvest_score: 2,
            withered_score: 1,
            sale_score_per_unit: 10,
            bonus_cash_per_point: 1,
            automations,
            cooldown_reroll_max: 1000,
            automation_spawn: Point::new(250, 50),
            automation_footprint: Footprint::new(32, 32),
            seller_depot: Point::new(75, 175),
            seller_dropoff: Point::new(150, 720),
            animation_period_ticks: 10,
            animation_frames: 4,
            debt_relief_seeds: 5,
            debt_relief_penalty: 30,
            debt_relief_scope: DebtReliefScope::AllTracked,
            dev_grant: DevGrant {
                cash: 1000,
                seeds: 500,
                score: 9000,
            },
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON, filling unspecified fields from the
    /// defaults, then validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let de = &mut serde_json::Deserializer::from_str(json);
        let config: GameConfig =
            serde_path_to_error::deserialize(de).map_err(|err| ConfigError::Parse {
                path: err.path().to_string(),
                source: err.into_inner(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Growth and price table for a variety.
    pub fn variety(&self, variety: Variety) -> Option<&VarietyData> {
        self.varieties.get(&variety)
    }

    pub fn automation(&self, kind: AutomationKind) -> Option<&AutomationData> {
        self.automations.get(&kind)
    }

    /// Reject configs the sim cannot run consistently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !self.varieties.contains_key(&self.default_variety) {
            return invalid(format!(
                "default_variety {:?} has no entry in varieties",
                self.default_variety
            ));
        }
        for (variety, data) in &self.varieties {
            let t = &data.growth_thresholds;
            if t[0] == 0 || t.windows(2).any(|w| w[0] >= w[1]) {
                return invalid(format!(
                    "varieties.{variety:?}.growth_thresholds must be positive and strictly increasing, got {t:?}"
                ));
            }
            if data.seed_cost < 0 || data.sell_price < 0 {
                return invalid(format!("varieties.{variety:?} has a negative price"));
            }
            for (stage, range) in data.frames.all() {
                if range.first > range.last {
                    return invalid(format!(
                        "varieties.{variety:?}.frames.{stage} is empty ({}..={})",
                        range.first, range.last
                    ));
                }
            }
        }
        for kind in AutomationKind::ALL {
            match self.automations.get(&kind) {
                Some(data) if data.price < 0 => {
                    return invalid(format!("automations.{kind} has a negative price"));
                }
                Some(_) => {}
                None => return invalid(format!("automations.{kind} is missing")),
            }
        }
        if self.garden.w <= 0 || self.garden.h <= 0 {
            return invalid(format!("garden must have positive size, got {:?}", self.garden));
        }
        if self.soil_cell_size <= 0 {
            return invalid(format!(
                "soil_cell_size must be positive, got {}",
                self.soil_cell_size
            ));
        }
        if self.initial_fertility > Fertility::MAX.tier() {
            return invalid(format!(
                "initial_fertility must be at most {}, got {}",
                Fertility::MAX.tier(),
                self.initial_fertility
            ));
        }
        if self.plant_footprint.w <= 0 || self.plant_footprint.h <= 0 {
            return invalid("plant_footprint must have positive size".to_string());
        }
        if self.frame_period_ticks == 0 || self.animation_period_ticks == 0 {
            return invalid("frame and animation periods must be positive".to_string());
        }
        if self.animation_frames == 0 {
            return invalid("animation_frames must be positive".to_string());
        }
        if self.fertilizer_cost < 0 || self.debt_relief_penalty < 0 {
            return invalid("fertilizer_cost and debt_relief_penalty must not be negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn stage_for_age_walks_thresholds() {
        let config = GameConfig::default();
        let red = config.variety(Variety::FlowerRed).unwrap();
        assert_eq!(red.stage_for_age(0), Stage::Seed);
        assert_eq!(red.stage_for_age(199), Stage::Seed);
        assert_eq!(red.stage_for_age(200), Stage::Growing);
        assert_eq!(red.stage_for_age(400), Stage::FullGrown);
        assert_eq!(red.stage_for_age(600), Stage::ReadyToHarvest);
        assert_eq!(red.stage_for_age(7999), Stage::ReadyToHarvest);
        assert_eq!(red.stage_for_age(8000), Stage::Withered);
        assert_eq!(red.stage_for_age(10_000), Stage::Dead);
        assert_eq!(red.stage_for_age(u64::MAX), Stage::Dead);
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let config = GameConfig::from_json(r#"{"starting_cash": 500, "withered_soil_policy": "restore"}"#)
            .unwrap();
        assert_eq!(config.starting_cash, 500);
        assert_eq!(config.withered_soil_policy, WitheredSoilPolicy::Restore);
        assert_eq!(config.starting_seeds, 5);
        assert_eq!(config.varieties.len(), 2);
    }

    #[test]
    fn parse_error_reports_path() {
        let err = GameConfig::from_json(r#"{"garden": {"x": 1, "y": 2, "w": "wide", "h": 3}}"#)
            .unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, "garden.w"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_monotonic_thresholds() {
        let mut config = GameConfig::default();
        config
            .varieties
            .get_mut(&Variety::FlowerBlue)
            .unwrap()
            .growth_thresholds = [100, 100, 300, 400, 500];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_missing_default_variety() {
        let mut config = GameConfig::default();
        config.varieties.remove(&Variety::FlowerRed);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_fertility_and_empty_garden() {
        let mut config = GameConfig::default();
        config.initial_fertility = 3;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.garden.w = 0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.soil_cell_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_missing_automation_price() {
        let mut config = GameConfig::default();
        config.automations.remove(&AutomationKind::Seller);
        assert!(config.validate().is_err());
    }

    #[test]
    fn frame_range_clamps() {
        let range = FrameRange::new(11, 20);
        assert_eq!(range.clamp(3), 11);
        assert_eq!(range.clamp(15), 15);
        assert_eq!(range.clamp(40), 20);
    }
}
