//! Generation pipeline
//!
//! parse progression → resolve chord specs → voice chord by chord → emit.
//!
//! Generation is a pure function of its inputs. The only state is the
//! previous chord carried from left to right within one call; the caller
//! holds the returned [`Progression`].

use serde::Serialize;

use crate::chord::{parse_progression, ChordSpec, ChordSymbol};
use crate::error::TriadError;
use crate::pitch::{pitch_name, RegisterBounds};
use crate::voicing::{voice_progression, VoicingContext, VoicingMode, DEFAULT_BASS_WEIGHT};

/// Inputs to a generation run besides the progression text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub bounds: RegisterBounds,
    pub mode: VoicingMode,
    pub bass_weight: f64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            bounds: RegisterBounds::default(),
            mode: VoicingMode::default(),
            bass_weight: DEFAULT_BASS_WEIGHT,
        }
    }
}

/// One chord of the output: its symbol and ascending MIDI pitches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicedChord {
    pub symbol: String,
    pub pitches: Vec<u8>,
}

impl VoicedChord {
    pub fn bass(&self) -> Option<u8> {
        self.pitches.first().copied()
    }

    /// Note names with octave, bass first.
    pub fn note_names(&self) -> Vec<String> {
        self.pitches.iter().map(|&p| pitch_name(p as i32)).collect()
    }

    /// Caption for chord `index` (0-based), e.g. `#2 Am: A2 C4 E4`.
    pub fn describe(&self, index: usize) -> String {
        format!("#{} {}: {}", index + 1, self.symbol, self.note_names().join(" "))
    }
}

/// Result of a generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    pub chords: Vec<VoicedChord>,
    pub bounds: RegisterBounds,
    pub mode: VoicingMode,
    pub bass_weight: f64,
}

/// Place every chord symbol's root near the middle of the register.
pub fn resolve_specs(symbols: &[ChordSymbol], bounds: RegisterBounds) -> Vec<ChordSpec> {
    let centre = bounds.centre();
    symbols
        .iter()
        .map(|symbol| ChordSpec::resolve(symbol, centre))
        .collect()
}

/// Voice already-parsed chord symbols.
pub fn voice_symbols(symbols: &[ChordSymbol], options: &GenerateOptions) -> Progression {
    let ctx = VoicingContext::new(options.bounds, options.bass_weight);
    let specs = resolve_specs(symbols, options.bounds);
    let voiced = voice_progression(&specs, options.mode, &ctx);

    let chords = specs
        .iter()
        .zip(voiced)
        .map(|(spec, pitches)| VoicedChord {
            symbol: spec.symbol.clone(),
            pitches: pitches.into_iter().map(|p| p.clamp(0, 127) as u8).collect(),
        })
        .collect();

    Progression {
        chords,
        bounds: options.bounds,
        mode: options.mode,
        bass_weight: ctx.bass_weight,
    }
}

/// Parse and voice a progression.
///
/// # Example
/// ```
/// use triad::pipeline::{generate, GenerateOptions};
/// use triad::voicing::VoicingMode;
///
/// let options = GenerateOptions { mode: VoicingMode::Open, ..Default::default() };
/// let progression = generate("Am, F, G, C/E", &options).unwrap();
///
/// assert_eq!(progression.chords.len(), 4);
/// assert_eq!(progression.chords[3].pitches[0] % 12, 4); // E in the bass
/// ```
pub fn generate(text: &str, options: &GenerateOptions) -> Result<Progression, TriadError> {
    let symbols = parse_progression(text)?;
    log::debug!(
        target: "triad::pipeline",
        "voicing {} chords ({}, {}..={})",
        symbols.len(),
        options.mode,
        options.bounds.lo(),
        options.bounds.hi()
    );
    Ok(voice_symbols(&symbols, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generate_close() {
        let progression = generate("C, Am", &GenerateOptions::default()).unwrap();
        let pitches: Vec<_> = progression.chords.iter().map(|c| c.pitches.clone()).collect();
        assert_eq!(pitches, vec![vec![48, 76, 79], vec![57, 72, 76]]);
        assert_eq!(progression.chords[1].symbol, "Am");
    }

    #[test]
    fn test_generate_errors_leave_nothing() {
        assert_eq!(
            generate("", &GenerateOptions::default()),
            Err(TriadError::EmptyProgression)
        );
        assert!(matches!(
            generate("C G Hm", &GenerateOptions::default()),
            Err(TriadError::ChordError { .. })
        ));
    }

    #[test]
    fn test_describe() {
        let chord = VoicedChord {
            symbol: "Am".to_string(),
            pitches: vec![45, 60, 64],
        };
        assert_eq!(chord.describe(1), "#2 Am: A2 C4 E4");
        assert_eq!(chord.bass(), Some(45));
    }

    #[test]
    fn test_specs_follow_register_centre() {
        let symbols = parse_progression("C").unwrap();
        let high = RegisterBounds::new(72, 96).unwrap();
        assert_eq!(resolve_specs(&symbols, high)[0].target_root, 84);
    }
}
