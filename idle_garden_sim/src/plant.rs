// Plant entity and growth stage machine.
//
// A plant's stage is a pure function of its age through the variety's
// growth thresholds (`VarietyData::stage_for_age`). `grow()` adds exactly one
// tick of age, recomputes the stage, and advances the visual frame. The frame
// steps once every `frame_period_ticks` within the current stage's frame
// range and saturates at the range's last frame; it never crosses into the
// next stage on its own. On a stage change the frame is pulled up to the new
// range's first frame.
//
// Plants are created by `SimState::attempt_place` and removed by the
// per-tick sweep once `alive` is false (harvested or dead of old age). A
// removed plant is never resurrected.
//
// The owning soil plot is a lookup index (`plot`), not ownership. It is
// derived from the plant's center at placement and recomputed on load.
//
// See also: `sim.rs` for placement, harvest and the sweep, `config.rs` for
// `VarietyData`.

use crate::config::{StageFrames, VarietyData};
use crate::types::{Footprint, PlantId, PlotIndex, Point, Rect, Stage, Variety};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plant {
    pub id: PlantId,
    pub variety: Variety,
    /// Bottom-left corner of the footprint.
    pub position: Point,
    pub footprint: Footprint,
    pub age: u64,
    pub stage: Stage,
    pub alive: bool,
    pub frame: u32,
    /// Soil plot under the footprint's center. Derived, not persisted.
    pub plot: Option<PlotIndex>,
}

impl Plant {
    /// A fresh `Seed`-stage plant.
    pub fn new(
        id: PlantId,
        variety: Variety,
        position: Point,
        footprint: Footprint,
        plot: Option<PlotIndex>,
        frames: &StageFrames,
    ) -> Self {
        Self {
            id,
            variety,
            position,
            footprint,
            age: 0,
            stage: Stage::Seed,
            alive: true,
            frame: frames.seed.first,
            plot,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.position, self.footprint)
    }

    /// Point used for the soil lookup.
    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Age one tick. Returns the new stage if it changed.
    pub fn grow(&mut self, data: &VarietyData, frame_period: u64) -> Option<Stage> {
        self.age = self.age.saturating_add(1);
        let stage = data.stage_for_age(self.age);
        let changed = stage != self.stage;
        if changed {
            self.stage = stage;
            if stage == Stage::Dead {
                self.alive = false;
            }
        }
        if let Some(range) = data.frames.for_stage(self.stage) {
            if changed {
                self.frame = range.clamp(self.frame);
            } else if frame_period > 0 && self.age % frame_period == 0 {
                self.frame = range.clamp(self.frame + 1);
            }
        }
        changed.then_some(stage)
    }
}

/// Result of a placement attempt that did not create a plant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// A modal is open, or the spot holds a plant that is not harvestable.
    Blocked,
    /// The footprint does not fit inside the garden.
    OutOfBounds,
    /// No seed of the selected variety in stock.
    NoSeeds,
    /// The spot held a harvestable plant, which was harvested instead.
    Harvested(HarvestOutcome),
}

/// Result of harvesting a plant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HarvestOutcome {
    /// A ripe plant went into the harvest stack with this fertility bonus.
    Harvested { variety: Variety, bonus: u32 },
    /// A withered plant was cleared and yielded seeds.
    Cleared { variety: Variety, seeds: u32 },
    /// The plant is not in a harvestable stage. Nothing changed.
    NotReady,
    /// No live plant with that id.
    NotFound,
}

impl HarvestOutcome {
    pub fn succeeded(self) -> bool {
        matches!(
            self,
            HarvestOutcome::Harvested { .. } | HarvestOutcome::Cleared { .. }
        )
    }
}
