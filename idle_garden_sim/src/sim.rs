// Core simulation state and tick loop.
//
// `SimState` is the single source of truth for a garden. It owns the ledger,
// the soil grid, every plant and automation, the PRNG, and the game config.
// The sim is a pure function: `(state, input, actions) -> (new_state, events)`.
//
// ## Tick order
//
// `tick()` advances everything exactly once, synchronously:
//
//   1. `TogglePause` actions. If the garden is (still) paused, nothing else
//      runs this tick; other actions are dropped. The tick clock itself
//      always advances so tick-stamped commands keep flowing.
//   2. Remaining player actions (shop, selection, shed), then the click, if
//      any. A click on an automation inspects it and suppresses the garden
//      click for that tick.
//   3. Automations, in id order.
//   4. Plant growth.
//   5. Sweep of harvested and dead plants.
//   6. Debt-relief check.
//   7. Developer key combo.
//
// Harvest and death only clear a plant's `alive` flag; the plant stays in
// the map until step 5, so nothing removes from `plants` while iterating it.
//
// ## Automations
//
// Each automation is taken out of the map, updated, and put back, so its
// policy can call `attempt_place`/`harvest` (which borrow `self` mutably)
// while holding the automation by value.
//
//   Harvester: with no target, pick a uniformly random harvestable plant and
//     target its position. Walk. On arrival with the cooldown at zero, harvest
//     whatever live plant sits at exactly that position (it may be gone,
//     harvested by the player or another harvester). Every arrival rerolls
//     the cooldown and clears the target, hit or miss, so a harvester that
//     finds nothing rests before it scans again.
//   Planter: walk to a random point in the garden. On arrival with the
//     cooldown at zero and any seed in stock, place a random stocked variety
//     through the same `attempt_place` the player uses, then pick a new
//     target. Landing on a ripe plant harvests it instead.
//   Seller: wait on the depot leg until harvest is in stock and the cooldown
//     is at zero, walk to the dropoff, sell every harvested stack there, and
//     head home.
//
// ## Save/load
//
// `SimState` is not serialized directly. `save.rs` writes a flat record of
// the persisted fields and rebuilds a fresh `SimState` on load, then patches
// those fields in. Derived fields (plant soil plots, automation names and
// targets, animation frames, the name registry) are recomputed.
//
// See also: `plant.rs`, `automation.rs`, `soil.rs`, `ledger.rs` for the
// components, `command.rs` for `SimAction`, `event.rs` for the output, and
// `save.rs` for persistence.
//
// **Critical constraint: determinism.** All state mutations flow through
// `tick()` (or `step()`). All randomness comes from `self.rng`, consumed in
// a fixed order: player click, automations in id order. No `HashMap`
// iteration, no system time.

use crate::automation::{self, Automation, Role, SellerLeg};
use crate::command::{Mode, Selection, SimAction, SimCommand};
use crate::config::{GameConfig, WitheredSoilPolicy};
use crate::error::{FertilizeError, PurchaseError};
use crate::event::{AlertColor, EventSink, SimEvent, SoundCue};
use crate::input::TickInput;
use crate::ledger::Ledger;
use crate::plant::{HarvestOutcome, PlacementOutcome, Plant};
use crate::soil::{Fertility, SoilGrid};
use crate::types::{
    AutomationId, AutomationKind, Footprint, PlantId, PlotIndex, Point, Rect, Stage, Variety,
};
use idle_garden_names::{NamePool, default_pool, pick_unique_name};
use idle_garden_prng::GameRng;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// The complete state of one garden.
#[derive(Clone, Debug)]
pub struct SimState {
    /// Ticks elapsed since the garden was created.
    pub tick: u64,
    /// Seed the garden was created with.
    pub seed: u64,
    pub rng: GameRng,
    pub config: GameConfig,
    pub paused: bool,
    pub mode: Mode,
    pub selection: Selection,
    pub ledger: Ledger,
    pub soil: SoilGrid,
    pub plants: BTreeMap<PlantId, Plant>,
    pub automations: BTreeMap<AutomationId, Automation>,
    next_plant_id: u64,
    next_automation_id: u64,
    /// Names of all automations, for uniqueness. Membership only.
    name_registry: FxHashSet<String>,
    name_pool: NamePool,
}

/// The result of advancing the simulation.
#[derive(Clone, Debug, Default)]
pub struct StepResult {
    /// Narrative events emitted during this step, for the UI / audio layer.
    pub events: Vec<SimEvent>,
}

impl SimState {
    /// Create a new garden with default config and the given seed.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, GameConfig::default())
    }

    /// Create a new garden with the given seed and config.
    pub fn with_config(seed: u64, config: GameConfig) -> Self {
        let soil = SoilGrid::new(
            config.garden,
            config.soil_cell_size,
            Fertility::clamped(config.initial_fertility),
        );
        let ledger = Ledger::new(&config);
        let selection = Selection::Seed(config.default_variety);
        Self {
            tick: 0,
            seed,
            rng: GameRng::new(seed),
            config,
            paused: false,
            mode: Mode::Normal,
            selection,
            ledger,
            soil,
            plants: BTreeMap::new(),
            automations: BTreeMap::new(),
            next_plant_id: 0,
            next_automation_id: 0,
            name_registry: FxHashSet::default(),
            name_pool: default_pool(),
        }
    }

    /// Swap in a different name pool (e.g. a localized one).
    pub fn with_name_pool(mut self, pool: NamePool) -> Self {
        self.name_pool = pool;
        self
    }

    // -----------------------------------------------------------------------
    // Tick loop
    // -----------------------------------------------------------------------

    /// Advance the garden by one tick.
    pub fn tick(&mut self, input: &TickInput, actions: &[SimAction]) -> StepResult {
        let mut events = Vec::new();
        let mut sink = EventSink::new(self.tick, &mut events);

        for action in actions {
            if matches!(action, SimAction::TogglePause) {
                self.paused = !self.paused;
                info!(tick = self.tick, paused = self.paused, "pause toggled");
                sink.sound(SoundCue::ButtonClick);
            }
        }

        if self.paused {
            for action in actions {
                if !matches!(action, SimAction::TogglePause) {
                    debug!(?action, "action ignored while paused");
                }
            }
        } else {
            for action in actions {
                self.apply_action(action, &mut sink);
            }
            if input.click {
                self.handle_click(input.pointer, &mut sink);
            }
            self.update_automations(&mut sink);
            self.grow_plants();
            self.sweep_plants();
            self.check_debt_relief(&mut sink);
            if input.keys.dev_combo() {
                self.apply_dev_grant(&mut sink);
            }
        }

        self.tick += 1;
        StepResult { events }
    }

    /// Apply a batch of commands and advance the sim to `target_tick` with
    /// idle pointer input.
    ///
    /// Commands must be sorted by tick. A command stamped with an already
    /// elapsed tick applies on the next tick; commands past `target_tick`
    /// are ignored (caller error).
    pub fn step(&mut self, commands: &[SimCommand], target_tick: u64) -> StepResult {
        let mut events = Vec::new();
        let mut cmd_idx = 0;
        let idle = TickInput::idle();

        while self.tick < target_tick {
            let start = cmd_idx;
            while cmd_idx < commands.len() && commands[cmd_idx].tick <= self.tick {
                cmd_idx += 1;
            }
            let actions: SmallVec<[SimAction; 4]> = commands[start..cmd_idx]
                .iter()
                .map(|c| c.action.clone())
                .collect();
            let result = self.tick(&idle, &actions);
            events.extend(result.events);
        }

        StepResult { events }
    }

    // -----------------------------------------------------------------------
    // Player actions
    // -----------------------------------------------------------------------

    fn apply_action(&mut self, action: &SimAction, sink: &mut EventSink<'_>) {
        match action {
            SimAction::Select { selection } => {
                self.selection = *selection;
                sink.sound(SoundCue::ButtonClick);
            }
            SimAction::BuySeed { variety } => {
                if self.ledger.buy(*variety) {
                    sink.sound(SoundCue::ButtonClick);
                } else {
                    sink.reject(format!("You cannot afford a {} seed", variety.label()));
                }
            }
            SimAction::BuyFertilizer => {
                if self.ledger.buy_fertilizer() {
                    sink.sound(SoundCue::ButtonClick);
                } else {
                    sink.reject("You cannot afford fertilizer");
                }
            }
            SimAction::SellHarvest { variety } => {
                if self.ledger.harvest_count(*variety) == 0 {
                    sink.reject(format!("You have no {}s to sell", variety.label()));
                } else {
                    let amount = self.ledger.sell_all(*variety);
                    info!(?variety, amount, cash = self.ledger.cash, "harvest sold");
                    sink.sound(SoundCue::ButtonClick);
                }
            }
            SimAction::BuyAutomation { kind } => {
                // Refusals are reported to the player inside buy_automation.
                let _ = self.buy_automation(*kind, sink);
            }
            SimAction::ToggleShed => {
                self.mode = self.mode.toggled();
                debug!(mode = ?self.mode, "shed toggled");
                sink.sound(SoundCue::ButtonClick);
            }
            SimAction::TogglePause => {}
        }
    }

    /// A click at `point`: inspect an automation if one is there, otherwise
    /// use the selected tool on the garden.
    fn handle_click(&mut self, point: Point, sink: &mut EventSink<'_>) {
        if self.mode == Mode::Normal {
            if let Some(id) = self.automation_at(point) {
                self.inspect_automation(id, sink);
                return;
            }
        }

        match self.selection {
            Selection::Seed(variety) => match self.attempt_place(point, variety, self.mode, sink) {
                Ok(_) | Err(PlacementOutcome::Harvested(_)) => {}
                Err(PlacementOutcome::NoSeeds) => {
                    sink.reject(format!("You are out of {} seeds!", variety.label()));
                }
                Err(outcome) => debug!(?outcome, %point, "click placed nothing"),
            },
            Selection::Fertilizer => match self.apply_fertilizer(point, sink) {
                Ok(_) => {}
                Err(FertilizeError::NoFertilizer) => sink.reject("You are out of fertilizer!"),
                Err(err) => debug!(%err, %point, "fertilizer not applied"),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Placement and harvest
    // -----------------------------------------------------------------------

    /// Plant a seed of `variety` centered on `point`, or harvest the plant
    /// already there if it is ripe or withered.
    ///
    /// Checks, in order: modal mode, garden bounds, overlap with live plants
    /// (harvestable → harvest, otherwise blocked), then seed stock.
    pub fn attempt_place(
        &mut self,
        point: Point,
        variety: Variety,
        mode: Mode,
        sink: &mut EventSink<'_>,
    ) -> Result<PlantId, PlacementOutcome> {
        if mode == Mode::ModalOpen {
            return Err(PlacementOutcome::Blocked);
        }

        let footprint = self.config.plant_footprint;
        let rect = footprint_at(point, footprint);
        if !self.config.garden.contains_rect(&rect) {
            return Err(PlacementOutcome::OutOfBounds);
        }

        let hit = self
            .plants
            .values()
            .find(|p| p.alive && p.rect().intersects(&rect))
            .map(|p| (p.id, p.stage));
        if let Some((plant_id, stage)) = hit {
            if stage.is_harvestable() {
                let outcome = self.harvest(plant_id, sink);
                return Err(PlacementOutcome::Harvested(outcome));
            }
            return Err(PlacementOutcome::Blocked);
        }

        let Some(data) = self.config.varieties.get(&variety) else {
            warn!(?variety, "placement of unconfigured variety");
            return Err(PlacementOutcome::NoSeeds);
        };
        if !self.ledger.take_seed(variety) {
            return Err(PlacementOutcome::NoSeeds);
        }

        let id = PlantId(self.next_plant_id);
        self.next_plant_id += 1;
        let plot = self.soil.find_plot(rect.center());
        let plant = Plant::new(id, variety, rect.origin(), footprint, plot, &data.frames);
        self.plants.insert(id, plant);
        debug!(plant = %id, ?variety, at = %rect.origin(), "planted");
        Ok(id)
    }

    /// Harvest a ripe plant or clear a withered one. Any other stage is a
    /// no-op returning `NotReady`.
    pub fn harvest(&mut self, plant_id: PlantId, sink: &mut EventSink<'_>) -> HarvestOutcome {
        let Some(plant) = self.plants.get_mut(&plant_id).filter(|p| p.alive) else {
            return HarvestOutcome::NotFound;
        };
        let variety = plant.variety;
        let plot = plant.plot;
        let tier = plot
            .and_then(|p| self.soil.fertility(p))
            .unwrap_or(Fertility::LOW)
            .tier();

        match plant.stage {
            Stage::ReadyToHarvest => {
                plant.alive = false;
                let bonus = u32::from(tier);
                self.ledger.record_harvest(variety, bonus);
                self.ledger.award(self.config.harvest_score);
                if let Some(plot) = plot {
                    self.soil.degrade(plot);
                }
                sink.sound(SoundCue::HarvestPlant);
                debug!(plant = %plant_id, ?variety, bonus, "harvested");
                HarvestOutcome::Harvested { variety, bonus }
            }
            Stage::Withered => {
                plant.alive = false;
                let roll = self
                    .rng
                    .range_u32_inclusive(1, self.config.withered_seed_roll_max.max(1));
                let seeds = roll * (u32::from(tier) + 1);
                self.ledger.add_seeds(variety, seeds);
                self.ledger.award(self.config.withered_score);
                if let Some(plot) = plot {
                    match self.config.withered_soil_policy {
                        WitheredSoilPolicy::Degrade => self.soil.degrade(plot),
                        WitheredSoilPolicy::Restore => self.soil.improve(plot),
                    };
                }
                sink.sound(SoundCue::HarvestWithered);
                debug!(plant = %plant_id, ?variety, seeds, "cleared withered plant");
                HarvestOutcome::Cleared { variety, seeds }
            }
            _ => HarvestOutcome::NotReady,
        }
    }

    /// Spend one fertilizer to raise the fertility of the plot at `point`.
    pub fn apply_fertilizer(
        &mut self,
        point: Point,
        sink: &mut EventSink<'_>,
    ) -> Result<PlotIndex, FertilizeError> {
        if self.mode == Mode::ModalOpen {
            return Err(FertilizeError::Blocked);
        }
        let plot = self
            .soil
            .find_plot(point)
            .ok_or(FertilizeError::OutsideGarden)?;
        if !self.ledger.take_fertilizer() {
            return Err(FertilizeError::NoFertilizer);
        }
        let tier = self.soil.improve(plot);
        sink.sound(SoundCue::ButtonClick);
        debug!(plot = plot.0, ?tier, "fertilized");
        Ok(plot)
    }

    // -----------------------------------------------------------------------
    // Automations
    // -----------------------------------------------------------------------

    /// Buy an automation of `kind`. Cash is debited and the automation
    /// created together, or neither happens.
    pub fn buy_automation(
        &mut self,
        kind: AutomationKind,
        sink: &mut EventSink<'_>,
    ) -> Result<AutomationId, PurchaseError> {
        let Some(data) = self.config.automation(kind).copied() else {
            sink.reject(format!("{kind}s are not for sale"));
            return Err(PurchaseError::NotForSale(kind));
        };
        if !self.ledger.spend(data.price) {
            sink.reject(format!("You cannot afford a {kind} (${})", data.price));
            return Err(PurchaseError::InsufficientFunds {
                kind,
                cost: data.price,
                cash: self.ledger.cash,
            });
        }

        let role = self.initial_role(kind);
        let id = self.spawn_automation(role, self.config.automation_spawn, data.initial_cooldown);
        if let Some(a) = self.automations.get(&id) {
            sink.alert(a.announcement(), None);
            info!(automation = %a.name, %kind, cash = self.ledger.cash, "automation bought");
        }
        sink.sound(automation::sound_cue(kind));
        Ok(id)
    }

    /// Report an automation's lifetime work. Emits an alert and its sound;
    /// changes no counters.
    pub fn inspect_automation(&self, id: AutomationId, sink: &mut EventSink<'_>) -> Option<String> {
        let a = self.automations.get(&id)?;
        let report = a.report();
        sink.alert(report.clone(), Some(AlertColor::Blue));
        sink.sound(automation::sound_cue(a.kind()));
        Some(report)
    }

    /// The first automation (in id order) whose sprite covers `point`.
    pub fn automation_at(&self, point: Point) -> Option<AutomationId> {
        let footprint = self.config.automation_footprint;
        self.automations
            .values()
            .find(|a| a.rect(footprint).contains(point))
            .map(|a| a.id)
    }

    /// Create an automation with a fresh unique name. Shared by purchase and
    /// load.
    pub(crate) fn spawn_automation(&mut self, role: Role, position: Point, cooldown: u32) -> AutomationId {
        let kind = role.kind();
        let registry = &self.name_registry;
        let name = pick_unique_name(&self.name_pool, kind.name_category(), &mut self.rng, |n| {
            registry.contains(n)
        });
        self.name_registry.insert(name.clone());

        let id = AutomationId(self.next_automation_id);
        self.next_automation_id += 1;
        self.automations
            .insert(id, Automation::new(id, name, role, position, cooldown));
        id
    }

    pub(crate) fn initial_role(&mut self, kind: AutomationKind) -> Role {
        match kind {
            AutomationKind::Harvester => Role::Harvester { target: None },
            AutomationKind::Planter => Role::Planter {
                target: self.random_plant_point(),
            },
            AutomationKind::Seller => Role::Seller {
                leg: SellerLeg::Depot,
            },
        }
    }

    fn update_automations(&mut self, sink: &mut EventSink<'_>) {
        let ids: SmallVec<[AutomationId; 8]> = self.automations.keys().copied().collect();
        for id in ids {
            let Some(mut a) = self.automations.remove(&id) else {
                continue;
            };
            self.update_automation(&mut a, sink);
            self.automations.insert(id, a);
        }
    }

    fn update_automation(&mut self, a: &mut Automation, sink: &mut EventSink<'_>) {
        a.tick_clock(
            self.config.animation_period_ticks,
            self.config.animation_frames,
        );
        match a.role {
            Role::Harvester { target } => self.run_harvester(a, target, sink),
            Role::Planter { target } => self.run_planter(a, target, sink),
            Role::Seller { leg } => self.run_seller(a, leg),
        }
    }

    fn run_harvester(&mut self, a: &mut Automation, target: Option<Point>, sink: &mut EventSink<'_>) {
        let target = match target {
            Some(t) => t,
            None => {
                let candidates: SmallVec<[Point; 16]> = self
                    .plants
                    .values()
                    .filter(|p| p.alive && p.stage.is_harvestable())
                    .map(|p| p.position)
                    .collect();
                let Some(idx) = self.rng.pick_index(candidates.len()) else {
                    return;
                };
                a.role = Role::Harvester {
                    target: Some(candidates[idx]),
                };
                candidates[idx]
            }
        };

        if !a.walk_toward(target) || !a.ready() {
            return;
        }
        let found = self
            .plants
            .values()
            .find(|p| p.alive && p.position == target)
            .map(|p| p.id);
        match found {
            Some(plant_id) => {
                let outcome = self.harvest(plant_id, sink);
                if outcome.succeeded() {
                    a.work_completed += 1;
                    debug!(automation = %a.name, ?outcome, "harvester worked");
                }
            }
            None => debug!(automation = %a.name, %target, "harvester target gone"),
        }
        a.cooldown = self.reroll_cooldown();
        a.role = Role::Harvester { target: None };
    }

    fn run_planter(&mut self, a: &mut Automation, target: Point, sink: &mut EventSink<'_>) {
        if !a.walk_toward(target) || !a.ready() || self.ledger.total_seeds() == 0 {
            return;
        }
        let stocked: SmallVec<[Variety; 4]> = self.ledger.stocked_varieties().collect();
        let Some(idx) = self.rng.pick_index(stocked.len()) else {
            return;
        };
        let variety = stocked[idx];
        match self.attempt_place(a.position, variety, Mode::Normal, sink) {
            Ok(plant_id) => {
                a.work_completed += 1;
                a.cooldown = self.reroll_cooldown();
                debug!(automation = %a.name, plant = %plant_id, ?variety, "planter worked");
            }
            Err(PlacementOutcome::Harvested(outcome)) => {
                a.cooldown = self.reroll_cooldown();
                debug!(automation = %a.name, ?outcome, "planter harvested instead");
            }
            Err(outcome) => debug!(automation = %a.name, ?outcome, "planter moved on"),
        }
        a.role = Role::Planter {
            target: self.random_plant_point(),
        };
    }

    fn run_seller(&mut self, a: &mut Automation, leg: SellerLeg) {
        match leg {
            SellerLeg::Depot => {
                a.walk_toward(self.config.seller_depot);
                if a.ready() && self.ledger.total_harvested() > 0 {
                    a.role = Role::Seller {
                        leg: SellerLeg::Dropoff,
                    };
                }
            }
            SellerLeg::Dropoff => {
                if !a.walk_toward(self.config.seller_dropoff) {
                    return;
                }
                let profit = self.ledger.sell_everything();
                a.work_completed += u64::try_from(profit).unwrap_or(0);
                a.cooldown = self.reroll_cooldown();
                a.role = Role::Seller {
                    leg: SellerLeg::Depot,
                };
                debug!(automation = %a.name, profit, cash = self.ledger.cash, "seller sold harvest");
            }
        }
    }

    fn reroll_cooldown(&mut self) -> u32 {
        self.rng.range_u32(0, self.config.cooldown_reroll_max)
    }

    /// A random point where a plant footprint centered on it fits inside the
    /// garden.
    fn random_plant_point(&mut self) -> Point {
        let garden = self.config.garden;
        let fp = self.config.plant_footprint;
        let (half_w, half_h) = (fp.w / 2, fp.h / 2);
        let x = self
            .rng
            .range_i32(garden.x + half_w, garden.right() - (fp.w - half_w) + 1);
        let y = self
            .rng
            .range_i32(garden.y + half_h, garden.top() - (fp.h - half_h) + 1);
        Point::new(x, y)
    }

    // -----------------------------------------------------------------------
    // Growth, sweep, debt relief
    // -----------------------------------------------------------------------

    fn grow_plants(&mut self) {
        let period = self.config.frame_period_ticks;
        for plant in self.plants.values_mut() {
            if !plant.alive {
                continue;
            }
            let Some(data) = self.config.varieties.get(&plant.variety) else {
                warn!(plant = %plant.id, variety = ?plant.variety, "plant of unconfigured variety removed");
                plant.alive = false;
                continue;
            };
            if plant.grow(data, period) == Some(Stage::Dead) {
                if self.config.improve_soil_on_death {
                    if let Some(plot) = plant.plot {
                        self.soil.improve(plot);
                    }
                }
                debug!(plant = %plant.id, "plant died of old age");
            }
        }
    }

    fn sweep_plants(&mut self) {
        self.plants.retain(|_, p| p.alive);
    }

    fn check_debt_relief(&mut self, sink: &mut EventSink<'_>) {
        let live = self.plants.values().filter(|p| p.alive).count();
        if !self.ledger.needs_debt_relief(
            live,
            self.config.debt_relief_scope,
            self.config.default_variety,
        ) {
            return;
        }
        let seeds = self.config.debt_relief_seeds;
        let penalty = self.config.debt_relief_penalty;
        self.ledger
            .apply_debt_relief(self.config.default_variety, seeds, penalty);
        sink.alert(
            format!("You have been given {seeds} seeds. You have incurred a debt of ${penalty}."),
            Some(AlertColor::Pink),
        );
    }

    fn apply_dev_grant(&mut self, sink: &mut EventSink<'_>) {
        let grant = self.config.dev_grant;
        self.ledger.cash = self.ledger.cash.saturating_add(grant.cash);
        self.ledger.add_seeds(self.config.default_variety, grant.seeds);
        self.ledger.award(grant.score);
        info!(cash = self.ledger.cash, "dev grant applied");
        sink.alert("Dev Mode Activated!", None);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The live plant whose footprint covers `point`.
    pub fn plant_at(&self, point: Point) -> Option<&Plant> {
        self.plants
            .values()
            .find(|p| p.alive && p.rect().contains(point))
    }

    pub fn live_plant_count(&self) -> usize {
        self.plants.values().filter(|p| p.alive).count()
    }

    pub fn automation_count(&self, kind: AutomationKind) -> usize {
        self.automations.values().filter(|a| a.kind() == kind).count()
    }

    // -----------------------------------------------------------------------
    // Reconstruction hooks for save.rs
    // -----------------------------------------------------------------------

    /// Insert a plant from saved fields, re-deriving its soil plot.
    pub(crate) fn restore_plant(
        &mut self,
        variety: Variety,
        position: Point,
        footprint: Footprint,
        age: u64,
        stage: Stage,
        frame: u32,
    ) -> PlantId {
        let id = PlantId(self.next_plant_id);
        self.next_plant_id += 1;
        let center = Rect::at(position, footprint).center();
        let plot = self.soil.find_plot(center);
        self.plants.insert(
            id,
            Plant {
                id,
                variety,
                position,
                footprint,
                age,
                stage,
                alive: true,
                frame,
                plot,
            },
        );
        id
    }
}

/// The footprint rectangle centered on `point`.
fn footprint_at(point: Point, footprint: Footprint) -> Rect {
    Rect::at(
        Point::new(point.x - footprint.w / 2, point.y - footprint.h / 2),
        footprint,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SimEventKind;
    use crate::input::KeyState;

    fn with_sink<R>(sim: &mut SimState, f: impl FnOnce(&mut SimState, &mut EventSink<'_>) -> R) -> (R, Vec<SimEvent>) {
        let mut events = Vec::new();
        let tick = sim.tick;
        let mut sink = EventSink::new(tick, &mut events);
        let r = f(sim, &mut sink);
        (r, events)
    }

    fn place(sim: &mut SimState, point: Point) -> Result<PlantId, PlacementOutcome> {
        with_sink(sim, |s, sink| s.attempt_place(point, Variety::FlowerRed, Mode::Normal, sink)).0
    }

    fn age_plant(sim: &mut SimState, id: PlantId, age: u64) {
        let data = sim.config.variety(Variety::FlowerRed).unwrap().clone();
        let plant = sim.plants.get_mut(&id).unwrap();
        plant.age = age;
        plant.stage = data.stage_for_age(age);
    }

    fn has_sound(events: &[SimEvent], cue: SoundCue) -> bool {
        events
            .iter()
            .any(|e| e.kind == SimEventKind::Sound { cue })
    }

    #[test]
    fn new_garden_starting_state() {
        let sim = SimState::new(42);
        assert_eq!(sim.tick, 0);
        assert_eq!(sim.ledger.cash, 5);
        assert_eq!(sim.ledger.seed_count(Variety::FlowerRed), 5);
        assert!(sim.plants.is_empty());
        assert!(sim.automations.is_empty());
        assert_eq!(sim.selection, Selection::Seed(Variety::FlowerRed));
        assert_eq!(sim.soil.len(), 98 * 62);
    }

    #[test]
    fn step_advances_tick() {
        let mut sim = SimState::new(42);
        sim.step(&[], 100);
        assert_eq!(sim.tick, 100);
    }

    #[test]
    fn placement_consumes_seed_and_records_plot() {
        let mut sim = SimState::new(1);
        let id = place(&mut sim, Point::new(500, 300)).unwrap();
        let plant = &sim.plants[&id];
        assert_eq!(plant.stage, Stage::Seed);
        assert_eq!(plant.position, Point::new(490, 290));
        assert_eq!(plant.plot, sim.soil.find_plot(Point::new(500, 300)));
        assert_eq!(sim.ledger.seed_count(Variety::FlowerRed), 4);
    }

    #[test]
    fn overlapping_placement_is_blocked() {
        let mut sim = SimState::new(1);
        place(&mut sim, Point::new(500, 300)).unwrap();
        assert_eq!(
            place(&mut sim, Point::new(510, 310)),
            Err(PlacementOutcome::Blocked)
        );
        assert_eq!(sim.ledger.seed_count(Variety::FlowerRed), 4);
        // Edge-adjacent is fine.
        place(&mut sim, Point::new(520, 300)).unwrap();
    }

    #[test]
    fn placement_outside_garden_is_rejected() {
        let mut sim = SimState::new(1);
        assert_eq!(
            place(&mut sim, Point::new(100, 300)),
            Err(PlacementOutcome::OutOfBounds)
        );
        assert_eq!(
            place(&mut sim, Point::new(255, 300)),
            Err(PlacementOutcome::OutOfBounds)
        );
        assert_eq!(sim.ledger.seed_count(Variety::FlowerRed), 5);
    }

    #[test]
    fn modal_mode_blocks_before_anything_else() {
        let mut sim = SimState::new(1);
        let (r, _) = with_sink(&mut sim, |s, sink| {
            s.attempt_place(Point::new(500, 300), Variety::FlowerRed, Mode::ModalOpen, sink)
        });
        assert_eq!(r, Err(PlacementOutcome::Blocked));
        assert!(sim.plants.is_empty());
    }

    #[test]
    fn no_seeds_is_reported() {
        let mut sim = SimState::new(1);
        let (r, _) = with_sink(&mut sim, |s, sink| {
            s.attempt_place(Point::new(500, 300), Variety::FlowerBlue, Mode::Normal, sink)
        });
        assert_eq!(r, Err(PlacementOutcome::NoSeeds));
    }

    #[test]
    fn clicking_ripe_plant_harvests_it() {
        let mut sim = SimState::new(1);
        let id = place(&mut sim, Point::new(500, 300)).unwrap();
        age_plant(&mut sim, id, 650);
        let plot = sim.plants[&id].plot.unwrap();
        let before = sim.soil.fertility(plot).unwrap();

        let (r, events) = with_sink(&mut sim, |s, sink| {
            s.attempt_place(Point::new(500, 300), Variety::FlowerRed, Mode::Normal, sink)
        });
        assert_eq!(
            r,
            Err(PlacementOutcome::Harvested(HarvestOutcome::Harvested {
                variety: Variety::FlowerRed,
                bonus: u32::from(before.tier()),
            }))
        );
        assert!(has_sound(&events, SoundCue::HarvestPlant));
        assert_eq!(sim.ledger.harvest_count(Variety::FlowerRed), 1);
        assert_eq!(sim.ledger.seed_count(Variety::FlowerRed), 4);
        assert_eq!(sim.ledger.score, 2);
        assert_eq!(sim.soil.fertility(plot), Some(before.degraded()));
        assert!(!sim.plants[&id].alive);
    }

    #[test]
    fn harvest_of_unripe_plant_changes_nothing() {
        let mut sim = SimState::new(1);
        let id = place(&mut sim, Point::new(500, 300)).unwrap();
        age_plant(&mut sim, id, 450);
        let ledger = sim.ledger.clone();
        let soil: Vec<u8> = sim.soil.tiers().collect();
        let (outcome, events) = with_sink(&mut sim, |s, sink| s.harvest(id, sink));
        assert_eq!(outcome, HarvestOutcome::NotReady);
        assert!(events.is_empty());
        assert_eq!(sim.ledger, ledger);
        assert_eq!(sim.soil.tiers().collect::<Vec<_>>(), soil);
        assert!(sim.plants[&id].alive);
    }

    #[test]
    fn withered_clear_yields_scaled_seeds() {
        let mut sim = SimState::new(9);
        let id = place(&mut sim, Point::new(500, 300)).unwrap();
        age_plant(&mut sim, id, 8500);
        let plot = sim.plants[&id].plot.unwrap();
        sim.soil.set(plot, Fertility::HIGH);

        let (outcome, events) = with_sink(&mut sim, |s, sink| s.harvest(id, sink));
        let HarvestOutcome::Cleared { seeds, .. } = outcome else {
            panic!("expected a cleared plant, got {outcome:?}");
        };
        assert!(seeds == 3 || seeds == 6, "roll of 1..=2 times tier+1, got {seeds}");
        assert_eq!(sim.ledger.seed_count(Variety::FlowerRed), 4 + seeds);
        assert_eq!(sim.ledger.score, 1);
        assert_eq!(sim.soil.fertility(plot), Some(Fertility::MEDIUM));
        assert!(has_sound(&events, SoundCue::HarvestWithered));
    }

    #[test]
    fn restore_policy_gives_soil_back() {
        let mut config = GameConfig::default();
        config.withered_soil_policy = WitheredSoilPolicy::Restore;
        let mut sim = SimState::with_config(9, config);
        let id = place(&mut sim, Point::new(500, 300)).unwrap();
        age_plant(&mut sim, id, 8500);
        let plot = sim.plants[&id].plot.unwrap();
        with_sink(&mut sim, |s, sink| s.harvest(id, sink));
        assert_eq!(sim.soil.fertility(plot), Some(Fertility::HIGH));
    }

    #[test]
    fn harvested_plants_are_swept_at_end_of_tick() {
        let mut sim = SimState::new(1);
        let id = place(&mut sim, Point::new(500, 300)).unwrap();
        age_plant(&mut sim, id, 650);
        sim.tick(&TickInput::click_at(Point::new(505, 305)), &[]);
        assert!(sim.plants.is_empty());
        assert_eq!(sim.ledger.harvest_count(Variety::FlowerRed), 1);
    }

    #[test]
    fn plants_die_and_improve_soil() {
        let mut sim = SimState::new(1);
        let id = place(&mut sim, Point::new(500, 300)).unwrap();
        let plot = sim.plants[&id].plot.unwrap();
        age_plant(&mut sim, id, 9_999);
        sim.tick(&TickInput::idle(), &[]);
        assert!(sim.plants.is_empty());
        assert_eq!(sim.soil.fertility(plot), Some(Fertility::HIGH));
    }

    #[test]
    fn fertilizer_improves_plot() {
        let mut sim = SimState::new(1);
        sim.ledger.add_fertilizer(1);
        let (r, _) = with_sink(&mut sim, |s, sink| s.apply_fertilizer(Point::new(600, 400), sink));
        let plot = r.unwrap();
        assert_eq!(sim.soil.fertility(plot), Some(Fertility::HIGH));
        assert_eq!(sim.ledger.fertilizer_count(), 0);
        let (r, _) = with_sink(&mut sim, |s, sink| s.apply_fertilizer(Point::new(600, 400), sink));
        assert_eq!(r, Err(FertilizeError::NoFertilizer));
        let (r, _) = with_sink(&mut sim, |s, sink| s.apply_fertilizer(Point::new(10, 10), sink));
        assert_eq!(r, Err(FertilizeError::OutsideGarden));
    }

    #[test]
    fn fertilizer_selection_routes_clicks() {
        let mut sim = SimState::new(1);
        sim.ledger.add_fertilizer(2);
        sim.tick(
            &TickInput::click_at(Point::new(600, 400)),
            &[SimAction::Select {
                selection: Selection::Fertilizer,
            }],
        );
        assert_eq!(sim.ledger.fertilizer_count(), 1);
        assert!(sim.plants.is_empty());
    }

    #[test]
    fn unaffordable_automation_changes_nothing() {
        let mut sim = SimState::new(1);
        let (r, events) = with_sink(&mut sim, |s, sink| s.buy_automation(AutomationKind::Harvester, sink));
        assert_eq!(
            r,
            Err(PurchaseError::InsufficientFunds {
                kind: AutomationKind::Harvester,
                cost: 250,
                cash: 5
            })
        );
        assert_eq!(sim.ledger.cash, 5);
        assert!(sim.automations.is_empty());
        assert!(has_sound(&events, SoundCue::ButtonReject));
    }

    #[test]
    fn bought_automations_get_unique_names() {
        let mut sim = SimState::new(3);
        sim.ledger.cash = 100_000;
        let mut names = std::collections::BTreeSet::new();
        for _ in 0..20 {
            let (id, events) = with_sink(&mut sim, |s, sink| s.buy_automation(AutomationKind::Planter, sink));
            let id = id.unwrap();
            assert!(names.insert(sim.automations[&id].name.clone()));
            assert!(has_sound(&events, SoundCue::Planter));
        }
        assert_eq!(sim.ledger.cash, 100_000 - 20 * 150);
        assert_eq!(sim.automation_count(AutomationKind::Planter), 20);
    }

    #[test]
    fn clicking_automation_inspects_instead_of_planting() {
        let mut sim = SimState::new(3);
        sim.ledger.cash = 1000;
        let (id, _) = with_sink(&mut sim, |s, sink| s.buy_automation(AutomationKind::Seller, sink));
        let id = id.unwrap();
        let pos = sim.automations[&id].position;
        let result = sim.tick(&TickInput::click_at(Point::new(pos.x + 1, pos.y + 1)), &[]);
        assert!(sim.plants.is_empty());
        assert_eq!(sim.ledger.seed_count(Variety::FlowerRed), 5);
        assert!(result.events.iter().any(|e| matches!(
            &e.kind,
            SimEventKind::Alert { color: Some(AlertColor::Blue), text } if text.contains("has made $0")
        )));
    }

    #[test]
    fn harvester_harvests_ripe_plant() {
        let mut sim = SimState::new(5);
        sim.ledger.cash = 250;
        let id = place(&mut sim, Point::new(300, 100)).unwrap();
        age_plant(&mut sim, id, 650);
        let (hid, _) = with_sink(&mut sim, |s, sink| s.buy_automation(AutomationKind::Harvester, sink));
        let hid = hid.unwrap();
        for _ in 0..400 {
            sim.tick(&TickInput::idle(), &[]);
        }
        assert!(sim.plants.is_empty());
        assert_eq!(sim.ledger.harvest_count(Variety::FlowerRed), 1);
        assert_eq!(sim.automations[&hid].work_completed, 1);
    }

    #[test]
    fn harvester_tolerates_vanished_target() {
        let mut sim = SimState::new(5);
        sim.ledger.cash = 250;
        let id = place(&mut sim, Point::new(600, 400)).unwrap();
        age_plant(&mut sim, id, 650);
        let (hid, _) = with_sink(&mut sim, |s, sink| s.buy_automation(AutomationKind::Harvester, sink));
        let hid = hid.unwrap();
        sim.tick(&TickInput::idle(), &[]);
        assert!(matches!(
            sim.automations[&hid].role,
            Role::Harvester { target: Some(_) }
        ));
        // The player gets there first.
        sim.tick(&TickInput::click_at(Point::new(600, 400)), &[]);
        assert!(sim.plants.is_empty());
        for _ in 0..600 {
            sim.tick(&TickInput::idle(), &[]);
        }
        assert_eq!(sim.automations[&hid].work_completed, 0);
        assert_eq!(
            sim.automations[&hid].role,
            Role::Harvester { target: None }
        );
    }

    #[test]
    fn harvester_rests_after_a_miss() {
        let mut sim = SimState::new(8);
        let spot = Point::new(500, 300);
        let hid = sim.spawn_automation(Role::Harvester { target: Some(spot) }, spot, 0);
        let mut expected = sim.rng.clone();
        let cooldown = expected.range_u32(0, sim.config.cooldown_reroll_max);

        sim.tick(&TickInput::idle(), &[]);
        let harvester = &sim.automations[&hid];
        assert_eq!(harvester.role, Role::Harvester { target: None });
        assert_eq!(harvester.cooldown, cooldown);
        assert_eq!(harvester.work_completed, 0);
        assert_eq!(sim.rng, expected);
    }

    #[test]
    fn planter_plants_seeds() {
        let mut sim = SimState::new(11);
        sim.ledger.cash = 150;
        let (pid, _) = with_sink(&mut sim, |s, sink| s.buy_automation(AutomationKind::Planter, sink));
        let pid = pid.unwrap();
        // Far enough to cross the garden and wait out the longest cooldown.
        for _ in 0..3000 {
            sim.tick(&TickInput::idle(), &[]);
        }
        let planted = sim.automations[&pid].work_completed;
        assert!(planted >= 1, "planter never planted");
        assert_eq!(u64::from(sim.ledger.seed_count(Variety::FlowerRed)), 5 - planted);
        assert!(sim.live_plant_count() >= 1);
    }

    #[test]
    fn seller_sells_everything_at_dropoff() {
        let mut sim = SimState::new(2);
        sim.ledger.cash = 350;
        let (sid, _) = with_sink(&mut sim, |s, sink| s.buy_automation(AutomationKind::Seller, sink));
        let sid = sid.unwrap();
        assert_eq!(sim.ledger.cash, 0);
        sim.ledger.record_harvest(Variety::FlowerRed, 0);
        sim.ledger.record_harvest(Variety::FlowerBlue, 1);
        for _ in 0..3000 {
            sim.tick(&TickInput::idle(), &[]);
        }
        assert_eq!(sim.ledger.total_harvested(), 0);
        assert_eq!(sim.ledger.cash, 10 + 16 + 1);
        assert_eq!(sim.automations[&sid].work_completed, 27);
    }

    #[test]
    fn seller_waits_without_harvest() {
        let mut sim = SimState::new(2);
        sim.ledger.cash = 350;
        let (sid, _) = with_sink(&mut sim, |s, sink| s.buy_automation(AutomationKind::Seller, sink));
        let sid = sid.unwrap();
        for _ in 0..2000 {
            sim.tick(&TickInput::idle(), &[]);
        }
        let seller = &sim.automations[&sid];
        assert_eq!(seller.position, sim.config.seller_depot);
        assert_eq!(seller.role, Role::Seller { leg: SellerLeg::Depot });
    }

    #[test]
    fn debt_relief_fires_once() {
        let mut sim = SimState::new(1);
        sim.ledger.cash = 0;
        for _ in 0..5 {
            sim.ledger.take_seed(Variety::FlowerRed);
        }
        let result = sim.tick(&TickInput::idle(), &[]);
        assert_eq!(sim.ledger.cash, -30);
        assert_eq!(sim.ledger.seed_count(Variety::FlowerRed), 5);
        assert!(result.events.iter().any(|e| matches!(
            &e.kind,
            SimEventKind::Alert { color: Some(AlertColor::Pink), .. }
        )));
        sim.tick(&TickInput::idle(), &[]);
        assert_eq!(sim.ledger.cash, -30);
    }

    #[test]
    fn pause_freezes_everything_but_the_clock() {
        let mut sim = SimState::new(1);
        let id = place(&mut sim, Point::new(500, 300)).unwrap();
        sim.tick(&TickInput::idle(), &[SimAction::TogglePause]);
        assert!(sim.paused);
        let age = sim.plants[&id].age;
        sim.tick(
            &TickInput::click_at(Point::new(700, 300)),
            &[SimAction::BuySeed {
                variety: Variety::FlowerRed,
            }],
        );
        assert_eq!(sim.plants[&id].age, age);
        assert_eq!(sim.ledger.cash, 5);
        assert_eq!(sim.plants.len(), 1);
        sim.tick(&TickInput::idle(), &[SimAction::TogglePause]);
        assert!(!sim.paused);
        assert_eq!(sim.plants[&id].age, age + 1);
        assert_eq!(sim.tick, 3);
    }

    #[test]
    fn shed_blocks_garden_clicks() {
        let mut sim = SimState::new(1);
        sim.tick(&TickInput::idle(), &[SimAction::ToggleShed]);
        assert_eq!(sim.mode, Mode::ModalOpen);
        sim.tick(&TickInput::click_at(Point::new(500, 300)), &[]);
        assert!(sim.plants.is_empty());
        sim.tick(&TickInput::click_at(Point::new(500, 300)), &[SimAction::ToggleShed]);
        assert_eq!(sim.plants.len(), 1);
    }

    #[test]
    fn shop_actions() {
        let mut sim = SimState::new(1);
        sim.ledger.cash = 100;
        let result = sim.tick(
            &TickInput::idle(),
            &[
                SimAction::BuySeed {
                    variety: Variety::FlowerBlue,
                },
                SimAction::BuyFertilizer,
            ],
        );
        assert_eq!(sim.ledger.cash, 100 - 8 - 20);
        assert_eq!(sim.ledger.seed_count(Variety::FlowerBlue), 1);
        assert_eq!(sim.ledger.fertilizer_count(), 1);
        assert!(has_sound(&result.events, SoundCue::ButtonClick));

        sim.ledger.record_harvest(Variety::FlowerRed, 0);
        sim.tick(
            &TickInput::idle(),
            &[SimAction::SellHarvest {
                variety: Variety::FlowerRed,
            }],
        );
        assert_eq!(sim.ledger.cash, 72 + 10);
        assert_eq!(sim.ledger.score, 10);

        let result = sim.tick(
            &TickInput::idle(),
            &[SimAction::SellHarvest {
                variety: Variety::FlowerRed,
            }],
        );
        assert!(has_sound(&result.events, SoundCue::ButtonReject));
    }

    #[test]
    fn dev_combo_grants_resources() {
        let mut sim = SimState::new(1);
        let input = TickInput {
            keys: KeyState {
                d_held: true,
                e_held: true,
                v_pressed: true,
            },
            ..TickInput::idle()
        };
        sim.tick(&input, &[]);
        assert_eq!(sim.ledger.cash, 1005);
        assert_eq!(sim.ledger.seed_count(Variety::FlowerRed), 505);
        assert_eq!(sim.ledger.score, 9000);
    }

    #[test]
    fn step_applies_commands_at_their_tick() {
        let mut sim = SimState::new(1);
        let commands = [
            SimCommand {
                tick: 3,
                action: SimAction::BuySeed {
                    variety: Variety::FlowerRed,
                },
            },
            SimCommand {
                tick: 5,
                action: SimAction::TogglePause,
            },
        ];
        sim.step(&commands, 4);
        assert_eq!(sim.ledger.seed_count(Variety::FlowerRed), 6);
        assert!(!sim.paused);
        sim.step(&commands[1..], 10);
        assert!(sim.paused);
        assert_eq!(sim.tick, 10);
    }

    #[test]
    fn determinism_same_seed_same_garden() {
        let run = |seed| {
            let mut sim = SimState::new(seed);
            sim.ledger.cash = 10_000;
            sim.ledger.add_seeds(Variety::FlowerBlue, 20);
            for kind in AutomationKind::ALL {
                sim.tick(&TickInput::idle(), &[SimAction::BuyAutomation { kind }]);
            }
            sim.step(&[], 5000);
            (
                sim.ledger.clone(),
                sim.plants
                    .values()
                    .map(|p| (p.position, p.age))
                    .collect::<Vec<_>>(),
                sim.automations
                    .values()
                    .map(|a| (a.name.clone(), a.position, a.work_completed))
                    .collect::<Vec<_>>(),
            )
        };
        assert_eq!(run(77), run(77));
    }
}
