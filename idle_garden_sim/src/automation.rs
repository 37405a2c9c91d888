// Automation entity: a bought worker that acts on its own every tick.
//
// All three roles share one `Automation` struct; the role and its target
// state live in the `Role` enum, so each role's behavior is an exhaustive
// match in `sim.rs` rather than a lookup by name. A harvester or planter
// chases a single target point; a seller only ever shuttles between two
// fixed points, so its state is which leg it is on.
//
// Movement is one unit per axis per tick toward the current target, with no
// obstacle avoidance. The cooldown counts down every tick and gates the
// role's action, not its movement.
//
// `counter` is the automation's lifetime tick count. It drives the 4-frame
// walk animation and is persisted; `frame` is recomputed from it.
//
// See also: `sim.rs` for the per-role policies (`update_automation`),
// `types.rs` for `AutomationKind`, the role tag used by pricing and saves.

use crate::config::GameConfig;
use crate::event::SoundCue;
use crate::types::{AutomationId, AutomationKind, Footprint, Point, Rect};

/// Which of its two fixed points a seller is heading for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SellerLeg {
    /// Waiting at home for harvest to sell.
    Depot,
    /// Carrying harvest off the garden to sell it.
    Dropoff,
}

/// Role plus per-role target state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Harvester { target: Option<Point> },
    Planter { target: Point },
    Seller { leg: SellerLeg },
}

impl Role {
    pub fn kind(&self) -> AutomationKind {
        match self {
            Role::Harvester { .. } => AutomationKind::Harvester,
            Role::Planter { .. } => AutomationKind::Planter,
            Role::Seller { .. } => AutomationKind::Seller,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Automation {
    pub id: AutomationId,
    /// Display name, unique among this garden's automations.
    pub name: String,
    pub role: Role,
    pub position: Point,
    pub cooldown: u32,
    /// Plants harvested, seeds planted, or cash earned, by role.
    pub work_completed: u64,
    /// Lifetime ticks, drives the animation.
    pub counter: u64,
    /// Animation frame, derived from `counter`.
    pub frame: u32,
}

impl Automation {
    pub fn new(id: AutomationId, name: String, role: Role, position: Point, cooldown: u32) -> Self {
        Self {
            id,
            name,
            role,
            position,
            cooldown,
            work_completed: 0,
            counter: 0,
            frame: 0,
        }
    }

    pub fn kind(&self) -> AutomationKind {
        self.role.kind()
    }

    /// Where the automation is walking to, if anywhere.
    pub fn target(&self, config: &GameConfig) -> Option<Point> {
        match self.role {
            Role::Harvester { target } => target,
            Role::Planter { target } => Some(target),
            Role::Seller { leg: SellerLeg::Depot } => Some(config.seller_depot),
            Role::Seller {
                leg: SellerLeg::Dropoff,
            } => Some(config.seller_dropoff),
        }
    }

    /// Sprite rectangle used for click inspection.
    pub fn rect(&self, footprint: Footprint) -> Rect {
        Rect::at(self.position, footprint)
    }

    pub fn ready(&self) -> bool {
        self.cooldown == 0
    }

    /// Count down the cooldown and advance the animation clock.
    pub fn tick_clock(&mut self, animation_period: u64, animation_frames: u32) {
        self.cooldown = self.cooldown.saturating_sub(1);
        self.counter = self.counter.saturating_add(1);
        self.frame = animation_frame(self.counter, animation_period, animation_frames);
    }

    /// One movement step toward `target`. Returns true once there.
    pub fn walk_toward(&mut self, target: Point) -> bool {
        self.position = self.position.step_toward(target);
        self.position == target
    }

    /// The inspection summary shown when the player clicks the automation.
    pub fn report(&self) -> String {
        match self.kind() {
            AutomationKind::Harvester => format!(
                "{} has harvested {} plants from the garden",
                self.name, self.work_completed
            ),
            AutomationKind::Planter => format!(
                "{} has planted {} seeds in the garden",
                self.name, self.work_completed
            ),
            AutomationKind::Seller => format!(
                "{} has made ${} from the garden",
                self.name, self.work_completed
            ),
        }
    }

    /// The alert shown when the automation is bought.
    pub fn announcement(&self) -> String {
        match self.kind() {
            AutomationKind::Seller => format!("{} is helping to sell your harvest!", self.name),
            AutomationKind::Harvester | AutomationKind::Planter => {
                format!("{} is helping in the garden!", self.name)
            }
        }
    }
}

/// Sound played when an automation of this kind is bought or inspected.
pub fn sound_cue(kind: AutomationKind) -> SoundCue {
    match kind {
        AutomationKind::Harvester => SoundCue::Harvester,
        AutomationKind::Planter => SoundCue::Planter,
        AutomationKind::Seller => SoundCue::Seller,
    }
}

pub fn animation_frame(counter: u64, period: u64, frames: u32) -> u32 {
    if period == 0 || frames == 0 {
        return 0;
    }
    ((counter / period) % u64::from(frames)) as u32
}
