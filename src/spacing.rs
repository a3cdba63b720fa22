//! Range and spacing repair
//!
//! Every voicing strategy funnels its candidate notes through here. The
//! functions take notes in voice order (bass first) and return a strictly
//! ascending set inside the register.
//!
//! All octave searches are bounded by [`MAX_OCTAVE_PASSES`] or
//! [`MAX_SPREAD_PASSES`]. When a cap is reached the result is the best found
//! so far; that is never an error.

use crate::pitch::{RegisterBounds, MAX_OCTAVE_PASSES, MIDDLE_C};

/// Passes of the spread-tightening loop.
pub const MAX_SPREAD_PASSES: usize = 8;

/// Spacing preferences applied after range fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpacingRules {
    /// Minimum distance between the two lowest voices.
    pub min_bottom_interval: i32,
    /// Preferred maximum distance from bass to top voice.
    pub max_spread: i32,
    /// The bass is pulled below this pitch when the register allows it.
    pub bass_ceiling: i32,
}

impl Default for SpacingRules {
    fn default() -> Self {
        Self {
            min_bottom_interval: 7,
            max_spread: 19,
            bass_ceiling: MIDDLE_C,
        }
    }
}

fn spread(pitches: &[i32]) -> i32 {
    match (pitches.first(), pitches.last()) {
        (Some(low), Some(high)) => high - low,
        _ => 0,
    }
}

fn is_strictly_ascending(pitches: &[i32]) -> bool {
    pitches.windows(2).all(|pair| pair[0] < pair[1])
}

/// Raise every voice from `from` upward by octaves until it sits above the
/// voice below it.
pub(crate) fn reascend(pitches: &mut [i32], from: usize) {
    for i in from.max(1)..pitches.len() {
        for _ in 0..MAX_OCTAVE_PASSES {
            if pitches[i] > pitches[i - 1] {
                break;
            }
            pitches[i] += 12;
        }
    }
}

/// Shift the whole set by octaves so it fits, when a single shift can do it.
fn shift_uniformly(pitches: &mut [i32], lo: i32, hi: i32) {
    let (Some(&min), Some(&max)) = (pitches.iter().min(), pitches.iter().max()) else {
        return;
    };
    if (min >= lo && max <= hi) || max - min > hi - lo {
        return;
    }

    let mut shift = 0;
    for _ in 0..MAX_OCTAVE_PASSES {
        if min + shift < lo {
            shift += 12;
        } else if max + shift > hi {
            shift -= 12;
        } else {
            break;
        }
    }

    if min + shift >= lo && max + shift <= hi {
        for pitch in pitches.iter_mut() {
            *pitch += shift;
        }
    }
}

/// Last line of defence when the per-note repair ran out of room.
///
/// Voice 0 stays the bass: it is folded into the lowest octave of the
/// register. Every other voice takes the lowest pitch of its class above the
/// bass, then the upper voices are sorted and exact duplicates dropped. Pitch
/// classes survive whenever the register spans [`MIN_RANGE_WIDTH`]; a voice
/// with no room above the bass is left out.
///
/// [`MIN_RANGE_WIDTH`]: crate::pitch::MIN_RANGE_WIDTH
fn confirm_in_range(pitches: &mut Vec<i32>, lo: i32, hi: i32) {
    if pitches.iter().all(|p| (lo..=hi).contains(p)) && is_strictly_ascending(pitches) {
        return;
    }
    let Some(&first) = pitches.first() else {
        return;
    };
    log::debug!(target: "triad::spacing", "folding {:?} into {}..={}", pitches, lo, hi);

    let bass = (lo + (first - lo).rem_euclid(12)).min(hi);
    let mut upper: Vec<i32> = pitches[1..]
        .iter()
        .map(|&pitch| bass + 1 + (pitch - bass - 1).rem_euclid(12))
        .filter(|&pitch| pitch <= hi)
        .collect();
    upper.sort_unstable();
    upper.dedup();

    pitches.clear();
    pitches.push(bass);
    pitches.extend(upper);
}

/// Fit notes into `[lo, hi]` as a strictly ascending set.
///
/// The first note stays the bass and keeps its pitch class. First tries a
/// single octave shift of the whole set. Then each note in turn is raised
/// by octaves while it is below `lo` or not above its predecessor, and
/// lowered by octaves while it is above `hi` and the lowered note would
/// still clear both `lo` and the predecessor.
///
/// # Example
/// ```
/// use triad::pitch::RegisterBounds;
/// use triad::spacing::fit_to_range;
///
/// let bounds = RegisterBounds::new(48, 72).unwrap();
/// assert_eq!(fit_to_range(&[36, 40, 43], bounds), vec![48, 52, 55]);
/// assert_eq!(fit_to_range(&[60, 55, 69], bounds), vec![60, 67, 69]);
/// ```
pub fn fit_to_range(pitches: &[i32], bounds: RegisterBounds) -> Vec<i32> {
    let (lo, hi) = (bounds.lo(), bounds.hi());
    let mut fitted = pitches.to_vec();
    if fitted.is_empty() {
        return fitted;
    }

    shift_uniformly(&mut fitted, lo, hi);

    for i in 0..fitted.len() {
        let floor = if i == 0 { None } else { Some(fitted[i - 1]) };
        let mut pitch = fitted[i];

        for _ in 0..MAX_OCTAVE_PASSES {
            let too_low = pitch < lo || floor.is_some_and(|f| pitch <= f);
            if !too_low {
                break;
            }
            pitch += 12;
        }
        for _ in 0..MAX_OCTAVE_PASSES {
            let lowered = pitch - 12;
            if pitch <= hi || lowered < lo || floor.is_some_and(|f| lowered <= f) {
                break;
            }
            pitch = lowered;
        }

        fitted[i] = pitch;
    }

    confirm_in_range(&mut fitted, lo, hi);
    fitted
}

/// Move the bass below `ceiling` when the register reaches below it.
///
/// The bass drops by octaves until it is under the ceiling, then climbs back
/// if that overshot `lo`. Upper voices are re-stacked above it and the result
/// is re-fitted. With `lo >= ceiling` this only re-fits.
pub fn pull_bass_below_ceiling(pitches: &[i32], bounds: RegisterBounds, ceiling: i32) -> Vec<i32> {
    let mut pulled = pitches.to_vec();
    if pulled.is_empty() {
        return pulled;
    }

    if bounds.lo() < ceiling {
        for _ in 0..MAX_OCTAVE_PASSES {
            if pulled[0] < ceiling {
                break;
            }
            pulled[0] -= 12;
        }
        for _ in 0..MAX_OCTAVE_PASSES {
            if pulled[0] >= bounds.lo() {
                break;
            }
            pulled[0] += 12;
        }
        reascend(&mut pulled, 1);
    }

    fit_to_range(&pulled, bounds)
}

/// Push the second voice up until it clears the bass by the minimum interval.
fn separate_bottom_voices(pitches: &mut [i32], hi: i32, min_interval: i32) {
    for _ in 0..MAX_OCTAVE_PASSES {
        if pitches[1] - pitches[0] >= min_interval || pitches[1] + 12 > hi {
            break;
        }
        pitches[1] += 12;
    }
    reascend(pitches, 2);
}

/// Drop upper voices by octaves, top first, while the spread is too wide.
fn tighten_spread(pitches: &mut [i32], lo: i32, rules: &SpacingRules) {
    for _ in 0..MAX_SPREAD_PASSES {
        if spread(pitches) <= rules.max_spread {
            break;
        }
        let mut changed = false;
        for i in (1..pitches.len()).rev() {
            if spread(pitches) <= rules.max_spread {
                break;
            }
            let lowered = pitches[i] - 12;
            if lowered <= pitches[i - 1] || lowered < lo {
                continue;
            }
            if i == 1 && lowered - pitches[0] < rules.min_bottom_interval {
                continue;
            }
            pitches[i] = lowered;
            changed = true;
        }
        if !changed {
            break;
        }
    }
}

/// Enforce playable spacing on a voiced chord.
///
/// 1. The two lowest voices are at least `min_bottom_interval` apart.
/// 2. The spread is tightened toward `max_spread`.
/// 3. The bass is pulled below the ceiling.
/// 4. A spread still more than an octave past `max_spread` gets its top voice
///    dropped once.
///
/// The result is always re-fitted to the register.
pub fn enforce_spacing(pitches: &[i32], bounds: RegisterBounds, rules: &SpacingRules) -> Vec<i32> {
    let mut voiced = fit_to_range(pitches, bounds);
    if voiced.len() < 2 {
        return voiced;
    }

    separate_bottom_voices(&mut voiced, bounds.hi(), rules.min_bottom_interval);
    tighten_spread(&mut voiced, bounds.lo(), rules);
    voiced = pull_bass_below_ceiling(&voiced, bounds, rules.bass_ceiling);

    if voiced.len() >= 2 && spread(&voiced) > rules.max_spread + 12 {
        let top = voiced.len() - 1;
        let lowered = voiced[top] - 12;
        if lowered > voiced[top - 1] {
            voiced[top] = lowered;
        }
    }

    fit_to_range(&voiced, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bounds(lo: i32, hi: i32) -> RegisterBounds {
        RegisterBounds::new(lo, hi).unwrap()
    }

    fn assert_voiced(pitches: &[i32], register: RegisterBounds) {
        assert!(is_strictly_ascending(pitches), "not ascending: {:?}", pitches);
        assert!(
            pitches.iter().all(|p| register.contains(*p)),
            "out of range: {:?}",
            pitches
        );
    }

    #[test]
    fn test_fit_uniform_shift() {
        assert_eq!(fit_to_range(&[24, 28, 31], bounds(36, 84)), vec![36, 40, 43]);
        assert_eq!(fit_to_range(&[96, 100, 103], bounds(36, 84)), vec![72, 76, 79]);
        // Already fits: untouched
        assert_eq!(fit_to_range(&[48, 76, 79], bounds(36, 84)), vec![48, 76, 79]);
    }

    #[test]
    fn test_fit_repairs_order() {
        assert_eq!(fit_to_range(&[60, 55, 69], bounds(48, 72)), vec![60, 67, 69]);
        assert_eq!(fit_to_range(&[38, 36, 40, 43], bounds(36, 84)), vec![38, 48, 52, 55]);
    }

    #[test]
    fn test_fit_lowers_overshooting_notes() {
        // No single shift fits both notes; 88 drops an octave on its own
        assert_eq!(fit_to_range(&[40, 88], bounds(36, 84)), vec![40, 76]);
    }

    #[test]
    fn test_fold_keeps_the_bass() {
        // Per-note repair leaves 76 above the register, so the set is folded
        // down with B still at the bottom
        let register = bounds(48, 72);
        assert_eq!(fit_to_range(&[71, 48, 52], register), vec![59, 60, 64]);
        assert_eq!(fit_to_range(&[64, 48, 55], register), vec![52, 55, 60]);
    }

    #[test]
    fn test_fold_keeps_every_pitch_class_in_two_octaves() {
        for lo in [0, 17, 41, 60, 103] {
            let register = bounds(lo, lo + 24);
            for bass in 0..12 {
                let input = [bass + 96, 60, 64, 67];
                let fitted = fit_to_range(&input, register);
                assert_voiced(&fitted, register);
                assert_eq!(fitted.len(), 4, "{:?} in {:?}", input, register);
                assert_eq!(fitted[0].rem_euclid(12), bass, "{:?}", fitted);

                let mut classes: Vec<i32> = fitted[1..].iter().map(|p| p.rem_euclid(12)).collect();
                classes.sort_unstable();
                assert_eq!(classes, vec![0, 4, 7], "{:?}", fitted);
            }
        }
    }

    #[test]
    fn test_fit_is_idempotent() {
        let inputs: [&[i32]; 5] = [
            &[60, 64, 67],
            &[30, 20, 100, 5],
            &[127, 0, 64],
            &[59, 48, 52],
            &[40, 41, 42, 43],
        ];
        for register in [bounds(36, 84), bounds(48, 72), bounds(0, 127), bounds(60, 84)] {
            for input in inputs {
                let once = fit_to_range(input, register);
                assert_eq!(fit_to_range(&once, register), once, "input {:?}", input);
            }
        }
    }

    #[test]
    fn test_pull_bass_below_ceiling() {
        assert_eq!(pull_bass_below_ceiling(&[60, 76, 79], bounds(36, 84), 60), vec![48, 76, 79]);
        // Register floor above the ceiling: only re-fit
        assert_eq!(pull_bass_below_ceiling(&[62, 66, 69], bounds(60, 84), 60), vec![62, 66, 69]);
        // Dropping below lo climbs back up
        assert_eq!(pull_bass_below_ceiling(&[62, 66, 69], bounds(55, 84), 60), vec![62, 66, 69]);
    }

    #[test]
    fn test_enforce_spacing_close_triad() {
        let rules = SpacingRules::default();
        assert_eq!(enforce_spacing(&[60, 64, 67], bounds(36, 84), &rules), vec![48, 76, 79]);
        assert_eq!(enforce_spacing(&[57, 60, 64], bounds(36, 84), &rules), vec![57, 72, 76]);
    }

    #[test]
    fn test_enforce_spacing_tightens_spread() {
        let rules = SpacingRules::default();
        assert_eq!(enforce_spacing(&[40, 48, 79], bounds(36, 84), &rules), vec![40, 48, 55]);
        assert_eq!(
            enforce_spacing(&[38, 48, 76, 79], bounds(36, 84), &rules),
            vec![38, 48, 52, 55]
        );
    }

    #[test]
    fn test_enforce_spacing_stays_in_narrow_range() {
        let rules = SpacingRules::default();
        let register = bounds(60, 84);
        let spaced = enforce_spacing(&[64, 60, 67], register, &rules);
        assert_voiced(&spaced, register);
        assert_eq!(spaced.len(), 3);
        assert_eq!(spaced[0].rem_euclid(12), 4);

        assert_eq!(enforce_spacing(&[52, 60, 67], bounds(36, 60), &rules), vec![40, 48, 55]);
    }

    #[test]
    fn test_single_note_passes_through() {
        let rules = SpacingRules::default();
        assert_eq!(enforce_spacing(&[100], bounds(36, 84), &rules), vec![76]);
    }
}
