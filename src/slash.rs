//! Slash-bass resolution
//!
//! Realizes `X/Y` chords. When `Y` is already a chord tone the chord is
//! re-inverted so that tone is the bass (no note is added). Otherwise a new
//! bass note is placed under the chord.

use crate::pitch::{nearest_pitch_for_class, pitch_class, RegisterBounds, MAX_OCTAVE_PASSES};
use crate::spacing::{enforce_spacing, SpacingRules};

/// Where the bass should land.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BassReference {
    /// Fallback bass position when there is no previous chord.
    pub target: i32,
    /// Bass of the previous chord in the progression.
    pub previous: Option<i32>,
    /// Cost per semitone of bass motion.
    pub weight: f64,
}

impl BassReference {
    fn anchor(&self) -> i32 {
        self.previous.unwrap_or(self.target)
    }

    fn cost(&self, bass: i32) -> f64 {
        match self.previous {
            Some(previous) => self.weight * (bass - previous).abs() as f64,
            None => 0.0,
        }
    }
}

/// Highest pitch (exclusive) the bass may occupy.
fn bass_zone_top(bounds: RegisterBounds, rules: &SpacingRules) -> i32 {
    if bounds.lo() < rules.bass_ceiling {
        rules.bass_ceiling.min(bounds.hi() + 1)
    } else {
        bounds.hi() + 1
    }
}

/// Stack `tones` in order above `bass`, raising each by octaves as needed.
fn stack_above(bass: i32, tones: impl Iterator<Item = i32>) -> Vec<i32> {
    let mut stacked = vec![bass];
    for tone in tones {
        let below = stacked[stacked.len() - 1];
        let mut pitch = tone;
        for _ in 0..MAX_OCTAVE_PASSES {
            if pitch > below {
                break;
            }
            pitch += 12;
        }
        stacked.push(pitch);
    }
    stacked
}

/// Re-invert so a tone of pitch class `slash` becomes the bass.
///
/// Every matching tone is tried at every octave of the bass zone. The
/// cheapest candidate by bass motion wins; ties keep the lowest. A candidate
/// whose spaced bass is not of class `slash` is skipped.
fn reinvert(
    chord: &[i32],
    slash: u8,
    bass: BassReference,
    bounds: RegisterBounds,
    rules: &SpacingRules,
) -> Vec<i32> {
    let zone_top = bass_zone_top(bounds, rules);
    let mut best: Option<(f64, Vec<i32>)> = None;

    for (index, &tone) in chord.iter().enumerate() {
        if pitch_class(tone) != slash {
            continue;
        }

        let mut placement = tone;
        for _ in 0..MAX_OCTAVE_PASSES {
            if placement - 12 < bounds.lo() {
                break;
            }
            placement -= 12;
        }
        for _ in 0..MAX_OCTAVE_PASSES {
            if placement >= bounds.lo() {
                break;
            }
            placement += 12;
        }

        for _ in 0..MAX_OCTAVE_PASSES {
            let others = chord
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, &pitch)| pitch);
            let candidate = enforce_spacing(&stack_above(placement, others), bounds, rules);
            if candidate.first().is_some_and(|&low| pitch_class(low) == slash) {
                let score = bass.cost(candidate[0]);
                if best.as_ref().map_or(true, |(lowest, _)| score < *lowest) {
                    best = Some((score, candidate));
                }
            }

            placement += 12;
            if placement >= zone_top {
                break;
            }
        }
    }

    best.map(|(_, chord)| chord).unwrap_or_else(|| chord.to_vec())
}

/// Put a new bass note of pitch class `slash` under the chord.
fn add_bass(
    chord: &[i32],
    slash: u8,
    bass: BassReference,
    bounds: RegisterBounds,
    rules: &SpacingRules,
) -> Vec<i32> {
    let lo = bounds.lo();
    let mut added = nearest_pitch_for_class(slash, bass.anchor());

    if lo < rules.bass_ceiling {
        for _ in 0..MAX_OCTAVE_PASSES {
            if added < rules.bass_ceiling || added - 12 < lo {
                break;
            }
            added -= 12;
        }
    }
    if let Some(&lowest) = chord.iter().min() {
        for _ in 0..MAX_OCTAVE_PASSES {
            if added < lowest || added - 12 < lo {
                break;
            }
            added -= 12;
        }
    }
    for _ in 0..MAX_OCTAVE_PASSES {
        if added >= lo {
            break;
        }
        added += 12;
    }

    let mut stacked = Vec::with_capacity(chord.len() + 1);
    stacked.push(added);
    stacked.extend_from_slice(chord);
    enforce_spacing(&stacked, bounds, rules)
}

/// Apply a slash bass to a voiced chord.
///
/// - `None`: the chord is returned unchanged.
/// - A pitch class already in the chord: the chord is re-inverted with that
///   tone in the bass and keeps its size.
/// - Any other pitch class: one bass note is added below the chord.
///
/// In any accepted register the result starts with a note of class `slash`
/// and still holds every class of the chord.
///
/// # Example
/// ```
/// use triad::pitch::{pitch_class, RegisterBounds};
/// use triad::slash::{apply_slash_bass, BassReference};
/// use triad::spacing::SpacingRules;
///
/// let bass = BassReference { target: 46, previous: None, weight: 1.2 };
/// let rules = SpacingRules::default();
/// let bounds = RegisterBounds::default();
///
/// let c_over_e = apply_slash_bass(&[48, 76, 79], Some(4), bass, bounds, &rules);
/// assert_eq!(c_over_e.len(), 3);
/// assert_eq!(pitch_class(c_over_e[0]), 4);
///
/// let c_over_d = apply_slash_bass(&[48, 76, 79], Some(2), bass, bounds, &rules);
/// assert_eq!(c_over_d.len(), 4);
/// assert_eq!(pitch_class(c_over_d[0]), 2);
/// ```
pub fn apply_slash_bass(
    chord: &[i32],
    slash: Option<u8>,
    bass: BassReference,
    bounds: RegisterBounds,
    rules: &SpacingRules,
) -> Vec<i32> {
    let Some(slash) = slash.map(|pc| pc % 12) else {
        return chord.to_vec();
    };

    if chord.iter().any(|&tone| pitch_class(tone) == slash) {
        reinvert(chord, slash, bass, bounds, rules)
    } else {
        add_bass(chord, slash, bass, bounds, rules)
    }
}
