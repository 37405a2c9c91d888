// Narrative events emitted by the simulation.
//
// The sim never draws or plays anything. Instead each tick returns a list of
// `SimEvent`s for the UI and audio collaborators: free-text alerts with an
// optional color tag, and typed sound cues. Both are fire-and-forget; the sim
// never waits for them to be shown or heard.
//
// See also: `sim.rs` for where events are emitted, `settings.rs` for the
// audio gains the caller applies when playing cues.

use serde::{Deserialize, Serialize};

/// A narrative event emitted by the simulation for the UI / audio layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: u64,
    pub kind: SimEventKind,
}

/// Types of narrative events visible (or audible) to the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEventKind {
    /// A message for the alert banner.
    Alert {
        text: String,
        color: Option<AlertColor>,
    },
    /// A sound effect to play once.
    Sound { cue: SoundCue },
}

/// Color tag for an alert. `None` on the alert means the banner default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertColor {
    /// Automation reports.
    Blue,
    /// Debt relief.
    Pink,
    /// Refusals.
    Red,
}

/// Which sound effect to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    ButtonClick,
    ButtonReject,
    HarvestPlant,
    HarvestWithered,
    Harvester,
    Planter,
    Seller,
}

/// Accumulates events for one tick, stamping each with the tick number.
#[derive(Debug)]
pub struct EventSink<'a> {
    tick: u64,
    events: &'a mut Vec<SimEvent>,
}

impl<'a> EventSink<'a> {
    pub fn new(tick: u64, events: &'a mut Vec<SimEvent>) -> Self {
        Self { tick, events }
    }

    pub fn alert(&mut self, text: impl Into<String>, color: Option<AlertColor>) {
        self.events.push(SimEvent {
            tick: self.tick,
            kind: SimEventKind::Alert {
                text: text.into(),
                color,
            },
        });
    }

    pub fn sound(&mut self, cue: SoundCue) {
        self.events.push(SimEvent {
            tick: self.tick,
            kind: SimEventKind::Sound { cue },
        });
    }

    /// Alert in red with the reject sound, for refused player actions.
    pub fn reject(&mut self, text: impl Into<String>) {
        self.alert(text, Some(AlertColor::Red));
        self.sound(SoundCue::ButtonReject);
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
}
