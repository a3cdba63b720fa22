//! Open voicing
//!
//! Three voices built bottom-up with an explicit pitch-class order chosen by
//! the slash bass role:
//!
//! | Slash            | Bottom | Middle | Top   |
//! |------------------|--------|--------|-------|
//! | none / root      | root   | fifth  | third |
//! | third            | third  | root   | fifth |
//! | fifth            | fifth  | third  | root  |
//!
//! A slash bass outside the triad is added underneath afterwards.

use crate::chord::ChordSpec;
use crate::pitch::{nearest_pitch_for_class, MAX_OCTAVE_PASSES};
use crate::slash::apply_slash_bass;
use crate::spacing::enforce_spacing;
use crate::triad::{triad_pitch_classes, triad_role, TriadRole};

use super::VoicingContext;

/// Bass reference for the first chord (A3).
const DEFAULT_OPEN_BASS: i32 = 57;

/// Minimum distance from bass to middle voice.
const PERFECT_FIFTH: i32 = 7;

/// Spread the top voice aims for.
const PREFERRED_SPREAD: i32 = 16;

/// Top voices above this pitch are penalised.
const HIGH_TOP: i32 = 72;
const HIGH_TOP_PENALTY: f64 = 0.5;

/// Lowest pitch of class `pc` strictly above `floor`, starting near `target`.
fn above(pc: u8, target: i32, floor: i32) -> i32 {
    let mut pitch = nearest_pitch_for_class(pc, target);
    for _ in 0..MAX_OCTAVE_PASSES {
        if pitch > floor {
            break;
        }
        pitch += 12;
    }
    pitch
}

fn top_score(bass: i32, top: i32) -> f64 {
    let excess = (top - bass - PREFERRED_SPREAD).max(0) as f64;
    let height = (top - HIGH_TOP).max(0) as f64 * HIGH_TOP_PENALTY;
    excess + height
}

/// Choose between a tight and a wide placement of the top voice.
fn choose_top(pc: u8, bass: i32, middle: i32) -> i32 {
    let tight = above(pc, middle + 4, middle);
    let wide = above(pc, middle + 16, middle);
    if top_score(bass, wide) < top_score(bass, tight) {
        wide
    } else {
        tight
    }
}

/// Voice a chord in open position.
pub fn voice_open(spec: &ChordSpec, previous_bass: Option<i32>, ctx: &VoicingContext) -> Vec<i32> {
    let triad = triad_pitch_classes(spec.root, spec.quality);
    let [root, third, fifth] = triad;
    let role = spec.slash.and_then(|pc| triad_role(triad, pc));
    let order = match role {
        Some(TriadRole::Third) => [third, root, fifth],
        Some(TriadRole::Fifth) => [fifth, third, root],
        _ => [root, fifth, third],
    };

    let lo = ctx.bounds.lo();
    let ceiling = ctx.rules.bass_ceiling;
    let mut bass = nearest_pitch_for_class(order[0], previous_bass.unwrap_or(DEFAULT_OPEN_BASS));
    if lo < ceiling {
        for _ in 0..MAX_OCTAVE_PASSES {
            if bass < ceiling || bass - 12 < lo {
                break;
            }
            bass -= 12;
        }
    }
    for _ in 0..MAX_OCTAVE_PASSES {
        if bass >= lo {
            break;
        }
        bass += 12;
    }

    let middle = above(order[1], bass + PERFECT_FIFTH, bass + PERFECT_FIFTH - 1);
    let top = choose_top(order[2], bass, middle);
    let spaced = enforce_spacing(&[bass, middle, top], ctx.bounds, &ctx.rules);

    match (spec.slash, role) {
        (Some(_), None) => {
            let reference = ctx.bass_reference(ctx.target_bass(), previous_bass);
            apply_slash_bass(&spaced, spec.slash, reference, ctx.bounds, &ctx.rules)
        }
        _ => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::parse_chord_token;
    use crate::pitch::RegisterBounds;
    use pretty_assertions::assert_eq;

    fn open(symbol: &str, previous_bass: Option<i32>) -> Vec<i32> {
        let ctx = VoicingContext::new(RegisterBounds::default(), 1.2);
        let spec = ChordSpec::resolve(&parse_chord_token(symbol).unwrap(), 60);
        voice_open(&spec, previous_bass, &ctx)
    }

    #[test]
    fn test_open_root_position() {
        // C3 G3 E4
        assert_eq!(open("C", None), vec![48, 55, 64]);
    }

    #[test]
    fn test_open_orders_by_slash_role() {
        // Third in the bass: E3 C4 G4
        assert_eq!(open("C/E", None), vec![52, 60, 67]);
        // Fifth in the bass: G3 E4 C5
        assert_eq!(open("C/G", None), vec![55, 64, 72]);
        // Root as slash is plain root position
        assert_eq!(open("C/C", None), open("C", None));
    }

    #[test]
    fn test_open_non_chord_tone_slash() {
        assert_eq!(open("C/D", Some(40)), vec![38, 48, 55, 64]);
    }

    #[test]
    fn test_open_bass_follows_previous() {
        let voiced = open("F", Some(43));
        assert_eq!(voiced[0], 41);
    }

    #[test]
    fn test_top_prefers_compact_spread() {
        assert_eq!(choose_top(4, 48, 55), 64);
        assert!(top_score(48, 76) > top_score(48, 64));
    }
}
