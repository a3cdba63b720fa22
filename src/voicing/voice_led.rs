//! Voice-led voicing
//!
//! Brute-force search over the 15 voicings formed by three inversions and
//! five octave shifts around middle C. Each candidate is range-fitted,
//! slash-resolved, and spaced, then scored against the previous chord:
//!
//! `cost = Σ |voice_i - previous_i| + bass_weight × |bass - previous_bass|`
//!
//! The upper sum only covers the voices both chords have. The first
//! lowest-cost candidate in enumeration order (inversion outer, shift inner,
//! -2 to +2) wins, so the first chord of a progression always takes the root
//! inversion two octaves down before repair.

use crate::chord::ChordSpec;
use crate::pitch::{nearest_pitch_for_class, MIDDLE_C};
use crate::slash::apply_slash_bass;
use crate::spacing::{enforce_spacing, fit_to_range, reascend};
use crate::triad::triad_pitch_classes;

use super::{voice_close, VoicingContext};

const OCTAVE_SHIFTS: [i32; 5] = [-2, -1, 0, 1, 2];

/// Inversion `n` of a triad stacked upward from the pitch nearest `centre`.
fn stack_inversion(triad: [u8; 3], inversion: usize, centre: i32) -> Vec<i32> {
    let mut stacked: Vec<i32> = (0..3)
        .map(|i| {
            let pc = triad[(inversion + i) % 3];
            nearest_pitch_for_class(pc, centre)
        })
        .collect();
    reascend(&mut stacked, 1);
    stacked
}

/// Motion from `previous` to `candidate`. Zero when there is no previous chord.
pub fn motion_cost(candidate: &[i32], previous: Option<&[i32]>, bass_weight: f64) -> f64 {
    let Some(previous) = previous else {
        return 0.0;
    };
    let voices: i32 = candidate
        .iter()
        .zip(previous)
        .map(|(now, before)| (now - before).abs())
        .sum();
    let bass = match (candidate.first(), previous.first()) {
        (Some(now), Some(before)) => (now - before).abs(),
        _ => 0,
    };
    voices as f64 + bass_weight * bass as f64
}

/// Voice a chord to move as little as possible from `previous`.
pub fn voice_led(spec: &ChordSpec, previous: Option<&[i32]>, ctx: &VoicingContext) -> Vec<i32> {
    let triad = triad_pitch_classes(spec.root, spec.quality);
    let previous_bass = previous.and_then(|chord| chord.first().copied());
    let reference = ctx.bass_reference(previous_bass.unwrap_or(ctx.target_bass()), previous_bass);

    let mut best: Option<(f64, Vec<i32>)> = None;
    for inversion in 0..3 {
        let stacked = stack_inversion(triad, inversion, MIDDLE_C);
        for shift in OCTAVE_SHIFTS {
            let shifted: Vec<i32> = stacked.iter().map(|pitch| pitch + 12 * shift).collect();
            let fitted = fit_to_range(&shifted, ctx.bounds);
            let resolved = apply_slash_bass(&fitted, spec.slash, reference, ctx.bounds, &ctx.rules);
            let candidate = enforce_spacing(&resolved, ctx.bounds, &ctx.rules);

            let score = motion_cost(&candidate, previous, ctx.bass_weight);
            if best.as_ref().map_or(true, |(lowest, _)| score < *lowest) {
                best = Some((score, candidate));
            }
        }
    }

    match best {
        Some((score, chord)) => {
            log::trace!(target: "triad::voicing", "{} voice-led cost {:.2}", spec.symbol, score);
            chord
        }
        None => voice_close(spec, previous_bass, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::parse_chord_token;
    use crate::pitch::RegisterBounds;
    use pretty_assertions::assert_eq;

    fn spec(symbol: &str) -> ChordSpec {
        ChordSpec::resolve(&parse_chord_token(symbol).unwrap(), 60)
    }

    #[test]
    fn test_inversions_stack_upward() {
        let c_major = [0, 4, 7];
        assert_eq!(stack_inversion(c_major, 0, 60), vec![60, 64, 67]);
        assert_eq!(stack_inversion(c_major, 1, 60), vec![64, 67, 72]);
        assert_eq!(stack_inversion(c_major, 2, 60), vec![55, 60, 64]);
    }

    #[test]
    fn test_motion_cost() {
        assert_eq!(motion_cost(&[36, 52, 57], None, 1.2), 0.0);
        assert_eq!(motion_cost(&[36, 52, 57], Some(&[36, 52, 55]), 1.2), 2.0);
        // Only overlapping voices count; bass motion is weighted on top
        assert_eq!(motion_cost(&[38, 48, 52, 55], Some(&[40, 48, 55]), 0.5), 6.0);
    }

    #[test]
    fn test_first_chord_takes_first_candidate() {
        let ctx = VoicingContext::new(RegisterBounds::default(), 1.2);
        assert_eq!(voice_led(&spec("C"), None, &ctx), vec![36, 52, 55]);
    }

    #[test]
    fn test_follows_previous_chord() {
        let ctx = VoicingContext::new(RegisterBounds::default(), 0.0);
        let previous = vec![36, 52, 55];
        assert_eq!(voice_led(&spec("Am"), Some(&previous), &ctx), vec![36, 52, 57]);
    }
}
