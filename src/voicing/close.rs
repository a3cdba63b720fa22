//! Close voicing: root, third, and fifth stacked from the target root.

use crate::chord::ChordSpec;
use crate::pitch::nearest_pitch_for_class;
use crate::slash::apply_slash_bass;
use crate::spacing::{enforce_spacing, reascend};
use crate::triad::triad_pitch_classes;

use super::VoicingContext;

/// Voice a chord in close position, then apply spacing and the slash bass.
pub fn voice_close(spec: &ChordSpec, previous_bass: Option<i32>, ctx: &VoicingContext) -> Vec<i32> {
    let [_, third_pc, fifth_pc] = triad_pitch_classes(spec.root, spec.quality);
    let root = spec.target_root;

    let mut tones = vec![
        root,
        nearest_pitch_for_class(third_pc, root + 4),
        nearest_pitch_for_class(fifth_pc, root + 7),
    ];
    tones.sort_unstable();
    reascend(&mut tones, 1);

    let spaced = enforce_spacing(&tones, ctx.bounds, &ctx.rules);
    let bass = ctx.bass_reference(ctx.target_bass(), previous_bass);
    apply_slash_bass(&spaced, spec.slash, bass, ctx.bounds, &ctx.rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::parse_chord_token;
    use crate::pitch::RegisterBounds;
    use pretty_assertions::assert_eq;

    fn close(symbol: &str, previous_bass: Option<i32>) -> Vec<i32> {
        let ctx = VoicingContext::new(RegisterBounds::default(), 1.2);
        let spec = ChordSpec::resolve(&parse_chord_token(symbol).unwrap(), 60);
        voice_close(&spec, previous_bass, &ctx)
    }

    #[test]
    fn test_close_triads() {
        assert_eq!(close("C", None), vec![48, 76, 79]);
        assert_eq!(close("Am", None), vec![57, 72, 76]);
    }

    #[test]
    fn test_close_slash_chords() {
        assert_eq!(close("C/E", None), vec![40, 48, 55]);
        assert_eq!(close("C/D", None), vec![38, 48, 52, 55]);
        // The added bass always goes under the chord, whatever the previous bass
        assert_eq!(close("C/D", Some(51)), vec![38, 48, 52, 55]);
    }
}
