// Core types shared across the simulation.
//
// Defines garden-space geometry (`Point`, `Rect`, `Footprint`), entity
// identifiers (strongly-typed `u64` counters), and the closed enums the rest
// of the sim matches on: `Variety`, `Stage`, `AutomationKind`. All types
// derive `Serialize` and `Deserialize` for save/load and config.
//
// Garden space is integer pixels with the origin at the bottom-left of the
// screen, x growing right and y growing up. Rectangles are anchored at their
// bottom-left corner.
//
// **Critical constraint: determinism.** Entity IDs are handed out by a
// monotonic counter on `SimState`, never by hashing or OS entropy.

use idle_garden_names::NameCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position in garden space, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// One movement step toward `target`: each axis moves by the sign of its
    /// delta, so diagonal travel is as fast as straight travel.
    pub fn step_toward(self, target: Point) -> Point {
        Point {
            x: self.x + (target.x - self.x).signum(),
            y: self.y + (target.y - self.y).signum(),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height of an axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub w: i32,
    pub h: i32,
}

impl Footprint {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }
}

/// Axis-aligned rectangle anchored at its bottom-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn at(origin: Point, size: Footprint) -> Self {
        Self::new(origin.x, origin.y, size.w, size.h)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn top(&self) -> i32 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Strict overlap test: rectangles that only share an edge do not
    /// intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.top()
            && other.y < self.top()
    }

    /// Half-open containment: the left and bottom edges are inside, the right
    /// and top edges are not.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.top()
    }

    /// True if `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.top() <= self.top()
    }
}

// ---------------------------------------------------------------------------
// Strongly-typed entity ID wrappers
// ---------------------------------------------------------------------------

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

entity_id!(/// Unique identifier for a plant in the garden.
PlantId);
entity_id!(/// Unique identifier for a purchased automation.
AutomationId);

/// Index of a soil plot in the dense fertility grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlotIndex(pub u32);

// ---------------------------------------------------------------------------
// Simulation enums
// ---------------------------------------------------------------------------

/// A plant species. Selects the growth-rate and price table in `GameConfig`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variety {
    FlowerRed,
    FlowerBlue,
}

impl Variety {
    pub const ALL: [Variety; 2] = [Variety::FlowerRed, Variety::FlowerBlue];

    /// Player-facing name used in alerts.
    pub fn label(self) -> &'static str {
        match self {
            Variety::FlowerRed => "red flower",
            Variety::FlowerBlue => "blue flower",
        }
    }
}

/// Growth stage of a plant, in strictly increasing age order. The derived
/// `Ord` follows declaration order and is relied on by the monotonic staging
/// checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Seed,
    Growing,
    FullGrown,
    ReadyToHarvest,
    Withered,
    Dead,
}

impl Stage {
    /// Stages a placement click or a harvester can harvest.
    pub fn is_harvestable(self) -> bool {
        matches!(self, Stage::ReadyToHarvest | Stage::Withered)
    }
}

/// Role tag of an automation, without role state. Used for pricing, naming
/// and persistence; the live role with its target state is
/// `automation::Role`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationKind {
    Harvester,
    Planter,
    Seller,
}

impl AutomationKind {
    pub const ALL: [AutomationKind; 3] = [
        AutomationKind::Harvester,
        AutomationKind::Planter,
        AutomationKind::Seller,
    ];

    pub fn name_category(self) -> NameCategory {
        match self {
            AutomationKind::Harvester => NameCategory::Harvester,
            AutomationKind::Planter => NameCategory::Planter,
            AutomationKind::Seller => NameCategory::Seller,
        }
    }
}

impl fmt::Display for AutomationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AutomationKind::Harvester => "harvester",
            AutomationKind::Planter => "planter",
            AutomationKind::Seller => "seller",
        };
        f.write_str(s)
    }
}
