// Commands that mutate simulation state.
//
// Apart from the per-tick pointer/keyboard snapshot (`input.rs`), all
// player-driven mutations go through `SimAction`. The UI collaborator turns
// button presses into actions and hands them to `SimState::tick()`, or wraps
// them in tick-stamped `SimCommand`s for the batch driver `SimState::step()`.
//
// Current actions:
// - `Select`: choose the tool a garden click uses (a seed variety or
//   fertilizer).
// - `BuySeed` / `BuyFertilizer`: shop purchases debited from cash.
// - `SellHarvest`: manual sale of one variety's harvested stack.
// - `BuyAutomation`: purchase a harvester, planter or seller.
// - `ToggleShed`: open or close the shed modal (`Mode`).
// - `TogglePause`: pause or resume; the only action honoured while paused.
//
// See also: `sim.rs` for `apply_action()` which dispatches these,
// `input.rs` for the click/keyboard snapshot.

use crate::types::{AutomationKind, Variety};
use serde::{Deserialize, Serialize};

/// A player action targeting a specific simulation tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimCommand {
    pub tick: u64,
    pub action: SimAction,
}

/// The specific action a command performs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimAction {
    Select { selection: Selection },
    BuySeed { variety: Variety },
    BuyFertilizer,
    SellHarvest { variety: Variety },
    BuyAutomation { kind: AutomationKind },
    ToggleShed,
    TogglePause,
}

/// The tool a click in the garden uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    Seed(Variety),
    Fertilizer,
}

/// UI mode threaded into placement. While a modal (the shed) is open, garden
/// clicks are blocked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Normal,
    ModalOpen,
}

impl Mode {
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Normal => Mode::ModalOpen,
            Mode::ModalOpen => Mode::Normal,
        }
    }
}
