//! # Voicing Strategies
//!
//! Turn resolved [`ChordSpec`]s into voiced chords (absolute pitches, bass
//! first, strictly ascending, inside the register).
//!
//! ## Sub-modules
//! - `close` - root-position stacking near the target register
//! - `open` - spread voicings ordered by slash role
//! - `voice_led` - minimum-motion search over inversions and octaves
//!
//! Every strategy threads the previous chord forward so slash basses (and, for
//! voice-led, every voice) move as little as possible.

mod close;
mod open;
mod voice_led;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chord::ChordSpec;
use crate::error::TriadError;
use crate::pitch::RegisterBounds;
use crate::slash::BassReference;
use crate::spacing::SpacingRules;

pub use close::voice_close;
pub use open::voice_open;
pub use voice_led::{motion_cost, voice_led};

/// Default bass-motion weight.
pub const DEFAULT_BASS_WEIGHT: f64 = 1.2;

/// Largest accepted bass-motion weight.
pub const MAX_BASS_WEIGHT: f64 = 3.0;

/// Fraction of the register below the fixed slash-bass target.
const TARGET_BASS_FRACTION: f64 = 0.20;

/// Voicing strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoicingMode {
    #[default]
    Close,
    Open,
    #[serde(rename = "voicelead")]
    VoiceLead,
}

impl VoicingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            VoicingMode::Close => "close",
            VoicingMode::Open => "open",
            VoicingMode::VoiceLead => "voicelead",
        }
    }
}

impl fmt::Display for VoicingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoicingMode {
    type Err = TriadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "close" => Ok(VoicingMode::Close),
            "open" => Ok(VoicingMode::Open),
            "voicelead" => Ok(VoicingMode::VoiceLead),
            other => Err(TriadError::SettingsError(format!(
                "unknown voicing mode '{}' (expected close, open, or voicelead)",
                other
            ))),
        }
    }
}

/// Register, spacing, and bass-motion settings shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoicingContext {
    pub bounds: RegisterBounds,
    pub bass_weight: f64,
    pub rules: SpacingRules,
}

impl VoicingContext {
    /// Build a context, clamping the bass weight to `[0, 3]`.
    pub fn new(bounds: RegisterBounds, bass_weight: f64) -> Self {
        let bass_weight = if bass_weight.is_finite() {
            bass_weight.clamp(0.0, MAX_BASS_WEIGHT)
        } else {
            DEFAULT_BASS_WEIGHT
        };
        Self {
            bounds,
            bass_weight,
            rules: SpacingRules::default(),
        }
    }

    /// Fixed slash-bass target: 20% of the way up the register.
    pub fn target_bass(&self) -> i32 {
        let (lo, hi) = (self.bounds.lo(), self.bounds.hi());
        lo + (TARGET_BASS_FRACTION * (hi - lo) as f64).round() as i32
    }

    pub(crate) fn bass_reference(&self, target: i32, previous: Option<i32>) -> BassReference {
        BassReference {
            target,
            previous,
            weight: self.bass_weight,
        }
    }
}

/// Voice a single chord with the given strategy.
pub fn voice_chord(
    mode: VoicingMode,
    spec: &ChordSpec,
    previous: Option<&[i32]>,
    ctx: &VoicingContext,
) -> Vec<i32> {
    let previous_bass = previous.and_then(|chord| chord.first().copied());
    match mode {
        VoicingMode::Close => voice_close(spec, previous_bass, ctx),
        VoicingMode::Open => voice_open(spec, previous_bass, ctx),
        VoicingMode::VoiceLead => voice_led(spec, previous, ctx),
    }
}

/// Voice a whole progression left to right, carrying the previous chord.
pub fn voice_progression(
    specs: &[ChordSpec],
    mode: VoicingMode,
    ctx: &VoicingContext,
) -> Vec<Vec<i32>> {
    let mut voiced: Vec<Vec<i32>> = Vec::with_capacity(specs.len());
    for spec in specs {
        let chord = voice_chord(mode, spec, voiced.last().map(Vec::as_slice), ctx);
        log::trace!(target: "triad::voicing", "{} {} -> {:?}", mode, spec.symbol, chord);
        voiced.push(chord);
    }
    voiced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::{parse_progression, ChordSpec};
    use crate::pitch::pitch_class;

    fn specs(text: &str) -> Vec<ChordSpec> {
        parse_progression(text)
            .unwrap()
            .iter()
            .map(|symbol| ChordSpec::resolve(symbol, 60))
            .collect()
    }

    #[test]
    fn test_mode_names() {
        assert_eq!("close".parse::<VoicingMode>().unwrap(), VoicingMode::Close);
        assert_eq!("Open".parse::<VoicingMode>().unwrap(), VoicingMode::Open);
        assert_eq!("voicelead".parse::<VoicingMode>().unwrap(), VoicingMode::VoiceLead);
        assert!("drop2".parse::<VoicingMode>().is_err());
        assert_eq!(VoicingMode::VoiceLead.to_string(), "voicelead");
    }

    #[test]
    fn test_context_clamps_weight() {
        let bounds = RegisterBounds::default();
        assert_eq!(VoicingContext::new(bounds, 7.0).bass_weight, 3.0);
        assert_eq!(VoicingContext::new(bounds, -1.0).bass_weight, 0.0);
        assert_eq!(VoicingContext::new(bounds, f64::NAN).bass_weight, DEFAULT_BASS_WEIGHT);
    }

    #[test]
    fn test_target_bass() {
        let ctx = VoicingContext::new(RegisterBounds::default(), 1.2);
        assert_eq!(ctx.target_bass(), 46);
    }

    #[test]
    fn test_every_mode_keeps_invariants() {
        let progression = specs("Am F G C/E Dm/F Bb/C E G#m/B Cb/Fb");
        for bounds in [
            RegisterBounds::default(),
            RegisterBounds::new(48, 72).unwrap(),
            RegisterBounds::new(60, 84).unwrap(),
            RegisterBounds::new(0, 127).unwrap(),
        ] {
            let ctx = VoicingContext::new(bounds, 1.2);
            for mode in [VoicingMode::Close, VoicingMode::Open, VoicingMode::VoiceLead] {
                for chord in voice_progression(&progression, mode, &ctx) {
                    assert!(!chord.is_empty());
                    assert!(
                        chord.windows(2).all(|pair| pair[0] < pair[1]),
                        "{} {:?}: {:?}",
                        mode,
                        bounds,
                        chord
                    );
                    assert!(chord.iter().all(|p| bounds.contains(*p)), "{:?}", chord);
                }
            }
        }
    }

    #[test]
    fn test_slash_bass_in_every_mode() {
        let ctx = VoicingContext::new(RegisterBounds::default(), 1.2);
        for mode in [VoicingMode::Close, VoicingMode::Open, VoicingMode::VoiceLead] {
            let voiced = voice_progression(&specs("C/E C/D"), mode, &ctx);

            let c_over_e = &voiced[0];
            assert_eq!(c_over_e.len(), 3, "{}", mode);
            assert_eq!(pitch_class(c_over_e[0]), 4, "{}", mode);

            let c_over_d = &voiced[1];
            assert_eq!(c_over_d.len(), 4, "{}", mode);
            assert_eq!(pitch_class(c_over_d[0]), 2, "{}", mode);
        }
    }
}
