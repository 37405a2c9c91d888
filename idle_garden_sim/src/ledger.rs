// Resource ledger: cash, score, and typed consumable stacks.
//
// The ledger is plain data behind guarded mutators. Every spend checks
// affordability first, every withdrawal checks stock first, so quantities
// never go negative and cash only goes below zero through the debt-relief
// bailout. Stacks are `BTreeMap` entries created lazily on first acquisition
// and zeroed (not removed) when emptied.
//
// Prices are copied out of `GameConfig` at construction into a `PriceTable`
// and never change during play.
//
// Debt relief: `needs_debt_relief` is evaluated once per tick by `sim.rs`
// after the dead-plant sweep. When cash is at or below zero, no plants are
// alive, and every tracked stock is empty, the player is handed seeds and
// charged a penalty so the game can never soft-lock.
//
// See also: `sim.rs` for the per-tick debt check and the shop actions,
// `config.rs` for `DebtReliefScope`.

use crate::config::{DebtReliefScope, GameConfig};
use crate::types::Variety;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A quantity of one consumable plus its accumulated fertility bonus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumableStack {
    pub quantity: u32,
    pub bonus: u32,
}

impl ConsumableStack {
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    fn add(&mut self, n: u32) {
        self.quantity = self.quantity.saturating_add(n);
    }

    /// Remove one unit. False (and no change) if the stack is empty.
    fn take_one(&mut self) -> bool {
        if self.quantity == 0 {
            return false;
        }
        self.quantity -= 1;
        true
    }
}

/// Fixed prices, read from config at game start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceTable {
    pub seed_cost: BTreeMap<Variety, i64>,
    pub sell_price: BTreeMap<Variety, i64>,
    pub fertilizer_cost: i64,
    pub bonus_cash_per_point: i64,
    pub sale_score_per_unit: i64,
}

impl PriceTable {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            seed_cost: config
                .varieties
                .iter()
                .map(|(v, d)| (*v, d.seed_cost))
                .collect(),
            sell_price: config
                .varieties
                .iter()
                .map(|(v, d)| (*v, d.sell_price))
                .collect(),
            fertilizer_cost: config.fertilizer_cost,
            bonus_cash_per_point: config.bonus_cash_per_point,
            sale_score_per_unit: config.sale_score_per_unit,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    pub cash: i64,
    pub score: i64,
    seeds: BTreeMap<Variety, ConsumableStack>,
    harvested: BTreeMap<Variety, ConsumableStack>,
    fertilizer: ConsumableStack,
    prices: PriceTable,
}

impl Ledger {
    /// Starting balance and stock from config.
    pub fn new(config: &GameConfig) -> Self {
        let mut seeds = BTreeMap::new();
        if config.starting_seeds > 0 {
            seeds.insert(
                config.default_variety,
                ConsumableStack {
                    quantity: config.starting_seeds,
                    bonus: 0,
                },
            );
        }
        Self {
            cash: config.starting_cash,
            score: 0,
            seeds,
            harvested: BTreeMap::new(),
            fertilizer: ConsumableStack {
                quantity: config.starting_fertilizer,
                bonus: 0,
            },
            prices: PriceTable::from_config(config),
        }
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn can_afford(&self, cost: i64) -> bool {
        self.cash >= cost
    }

    /// Debit `cost` if affordable.
    pub fn spend(&mut self, cost: i64) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.cash -= cost;
        true
    }

    /// Buy one seed of `variety`. False if unaffordable or not sold.
    pub fn buy(&mut self, variety: Variety) -> bool {
        let Some(&cost) = self.prices.seed_cost.get(&variety) else {
            return false;
        };
        if !self.spend(cost) {
            return false;
        }
        self.add_seeds(variety, 1);
        debug!(?variety, cash = self.cash, "bought seed");
        true
    }

    pub fn buy_fertilizer(&mut self) -> bool {
        if !self.spend(self.prices.fertilizer_cost) {
            return false;
        }
        self.fertilizer.add(1);
        debug!(cash = self.cash, "bought fertilizer");
        true
    }

    /// Sell the whole harvested stack of `variety`. Returns the cash earned.
    pub fn sell_all(&mut self, variety: Variety) -> i64 {
        let Some(stack) = self.harvested.get_mut(&variety) else {
            return 0;
        };
        let stack = std::mem::take(stack);
        if stack.is_empty() {
            return 0;
        }
        let price = self.prices.sell_price.get(&variety).copied().unwrap_or(0);
        let qty = i64::from(stack.quantity);
        let amount = price * qty + i64::from(stack.bonus) * self.prices.bonus_cash_per_point;
        self.cash = self.cash.saturating_add(amount);
        self.score = self
            .score
            .saturating_add(self.prices.sale_score_per_unit * qty);
        debug!(?variety, qty, amount, "sold harvest");
        amount
    }

    /// Sell every harvested stack, in variety order. Returns the total.
    pub fn sell_everything(&mut self) -> i64 {
        Variety::ALL.into_iter().map(|v| self.sell_all(v)).sum()
    }

    pub fn award(&mut self, points: i64) {
        self.score = self.score.saturating_add(points);
    }

    // -- Stock accessors ----------------------------------------------------

    pub fn seed_count(&self, variety: Variety) -> u32 {
        self.seeds.get(&variety).map_or(0, |s| s.quantity)
    }

    pub fn harvest_stack(&self, variety: Variety) -> ConsumableStack {
        self.harvested.get(&variety).copied().unwrap_or_default()
    }

    pub fn harvest_count(&self, variety: Variety) -> u32 {
        self.harvest_stack(variety).quantity
    }

    pub fn total_seeds(&self) -> u32 {
        self.seeds.values().map(|s| s.quantity).sum()
    }

    pub fn total_harvested(&self) -> u32 {
        self.harvested.values().map(|s| s.quantity).sum()
    }

    pub fn fertilizer_count(&self) -> u32 {
        self.fertilizer.quantity
    }

    /// Varieties with at least one seed, in variety order.
    pub fn stocked_varieties(&self) -> impl Iterator<Item = Variety> + '_ {
        self.seeds
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(v, _)| *v)
    }

    // -- Stock mutators -----------------------------------------------------

    pub fn add_seeds(&mut self, variety: Variety, n: u32) {
        self.seeds.entry(variety).or_default().add(n);
    }

    /// Consume one seed. False if none are in stock.
    pub fn take_seed(&mut self, variety: Variety) -> bool {
        self.seeds
            .get_mut(&variety)
            .is_some_and(ConsumableStack::take_one)
    }

    /// Credit one harvested unit with a fertility bonus.
    pub fn record_harvest(&mut self, variety: Variety, bonus: u32) {
        let stack = self.harvested.entry(variety).or_default();
        stack.add(1);
        stack.bonus = stack.bonus.saturating_add(bonus);
    }

    pub fn add_fertilizer(&mut self, n: u32) {
        self.fertilizer.add(n);
    }

    pub fn take_fertilizer(&mut self) -> bool {
        self.fertilizer.take_one()
    }

    // -- Debt relief --------------------------------------------------------

    /// True when the player is broke with nothing left to grow or sell.
    pub fn needs_debt_relief(
        &self,
        live_plants: usize,
        scope: DebtReliefScope,
        default_variety: Variety,
    ) -> bool {
        if self.cash > 0 || live_plants > 0 {
            return false;
        }
        match scope {
            DebtReliefScope::AllTracked => {
                self.total_seeds() == 0
                    && self.total_harvested() == 0
                    && self.fertilizer.is_empty()
            }
            DebtReliefScope::DefaultVarietyOnly => {
                self.seed_count(default_variety) == 0 && self.harvest_count(default_variety) == 0
            }
        }
    }

    /// Grant `seeds` of `variety` and charge `penalty`, which may take cash
    /// negative.
    pub fn apply_debt_relief(&mut self, variety: Variety, seeds: u32, penalty: i64) {
        self.add_seeds(variety, seeds);
        self.cash = self.cash.saturating_sub(penalty);
        info!(cash = self.cash, seeds, "debt relief granted");
    }

    // -- Persistence --------------------------------------------------------

    pub fn seed_stacks(&self) -> &BTreeMap<Variety, ConsumableStack> {
        &self.seeds
    }

    pub fn harvest_stacks(&self) -> &BTreeMap<Variety, ConsumableStack> {
        &self.harvested
    }

    pub fn fertilizer_stack(&self) -> ConsumableStack {
        self.fertilizer
    }

    /// Overwrite the persisted fields. Prices stay as configured.
    pub(crate) fn restore(
        &mut self,
        cash: i64,
        score: i64,
        seeds: BTreeMap<Variety, ConsumableStack>,
        harvested: BTreeMap<Variety, ConsumableStack>,
        fertilizer: ConsumableStack,
    ) {
        self.cash = cash;
        self.score = score;
        self.seeds = seeds;
        self.harvested = harvested;
        self.fertilizer = fertilizer;
    }
}
