// Audio settings written and read with the save but owned by the caller.
//
// The sim never consults these; `save::to_json` takes them as a separate
// argument and `save::from_json` hands them back in `LoadedGame`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_GAIN: f32 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    pub sfx_gain: f32,
    pub music_gain: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sfx_gain: DEFAULT_GAIN,
            music_gain: DEFAULT_GAIN,
        }
    }
}

impl AudioSettings {
    /// Mute if audible, otherwise restore the default gain.
    pub fn toggle_sfx(&mut self) {
        self.sfx_gain = toggled(self.sfx_gain);
    }

    pub fn toggle_music(&mut self) {
        self.music_gain = toggled(self.music_gain);
    }

    /// Gains outside `0.0..=1.0` (or NaN) are clamped back into range.
    pub fn sanitized(self) -> Self {
        Self {
            sfx_gain: clamp_gain(self.sfx_gain),
            music_gain: clamp_gain(self.music_gain),
        }
    }
}

fn toggled(gain: f32) -> f32 {
    if gain > 0.0 { 0.0 } else { DEFAULT_GAIN }
}

fn clamp_gain(gain: f32) -> f32 {
    if gain.is_nan() { DEFAULT_GAIN } else { gain.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mute_toggle_round_trips() {
        let mut audio = AudioSettings::default();
        audio.toggle_sfx();
        assert_eq!(audio.sfx_gain, 0.0);
        assert_eq!(audio.music_gain, DEFAULT_GAIN);
        audio.toggle_sfx();
        assert_eq!(audio.sfx_gain, DEFAULT_GAIN);
        audio.toggle_music();
        assert_eq!(audio.music_gain, 0.0);
    }

    #[test]
    fn sanitized_clamps() {
        let audio = AudioSettings {
            sfx_gain: 4.0,
            music_gain: f32::NAN,
        }
        .sanitized();
        assert_eq!(audio.sfx_gain, 1.0);
        assert_eq!(audio.music_gain, DEFAULT_GAIN);
    }
}
