//! # Public API
//!
//! Main entry points of the triad library.
//!
//! ## Functions
//!
//! - [`generate_progression()`] - Voice progression text with explicit options
//! - [`compile()`] - Document (frontmatter + progression) to MIDI bytes
//! - [`compile_document()`] - Same, also returning the voiced progression
//! - [`lookup_triads()`] - Major/minor triads containing a note
//! - [`append_chord()`] - Add a chord symbol to progression text
//!
//! ## Typical Usage
//!
//! ```rust
//! use triad::compile;
//!
//! let source = r#"---
//! mode: voicelead
//! bpm: 90
//! ---
//! Am, F, G, C/E
//! "#;
//!
//! let midi = compile(source)?;
//! assert_eq!(&midi[0..4], b"MThd");
//! # Ok::<(), triad::TriadError>(())
//! ```

use crate::chord::parse_chord_token;
use crate::error::TriadError;
use crate::midi::export_midi;
use crate::pipeline::{generate, GenerateOptions, Progression};
use crate::settings::{parse_document, RawSettings, Settings};
use crate::triad::{triads_containing_note, TriadLookup};

/// Voice progression text.
///
/// # Example
/// ```rust
/// use triad::{generate_progression, GenerateOptions};
///
/// let progression = generate_progression("C, Am", &GenerateOptions::default())?;
/// assert_eq!(progression.chords[0].pitches, vec![48, 76, 79]);
/// # Ok::<(), triad::TriadError>(())
/// ```
///
/// # Errors
/// Returns [`TriadError`] if the text is empty or a chord token is invalid.
pub fn generate_progression(
    text: &str,
    options: &GenerateOptions,
) -> Result<Progression, TriadError> {
    generate(text, options)
}

/// Compile a progression document to Standard MIDI File bytes.
///
/// # Pipeline
/// 1. Split off and validate the frontmatter
/// 2. Parse and voice the progression
/// 3. Encode MIDI
pub fn compile(source: &str) -> Result<Vec<u8>, TriadError> {
    compile_document(source).map(|(_, midi)| midi)
}

/// Compile a document, returning the voiced progression with the bytes.
pub fn compile_document(source: &str) -> Result<(Progression, Vec<u8>), TriadError> {
    compile_document_with(source, RawSettings::default())
}

/// Compile a document with settings that take precedence over its
/// frontmatter (command-line flags, UI controls).
pub fn compile_document_with(
    source: &str,
    overrides: RawSettings,
) -> Result<(Progression, Vec<u8>), TriadError> {
    let document = parse_document(source)?;
    let settings = Settings::from_raw(&document.raw.merge(overrides))?;

    let progression = generate(&document.progression, &settings.generate)?;
    let midi = export_midi(&progression.chords, &settings.export)?;
    Ok((progression, midi))
}

/// Major and minor triads containing a note (`C`, `F#`, `Bb`).
pub fn lookup_triads(note: &str) -> Result<TriadLookup, TriadError> {
    triads_containing_note(note)
}

/// Append a chord symbol to progression text, as when a lookup result is
/// picked.
///
/// # Example
/// ```rust
/// use triad::append_chord;
///
/// assert_eq!(append_chord("Am, F", "Db")?, "Am, F, Db");
/// assert_eq!(append_chord("  ", "Cm")?, "Cm");
/// # Ok::<(), triad::TriadError>(())
/// ```
pub fn append_chord(progression: &str, symbol: &str) -> Result<String, TriadError> {
    let symbol = symbol.trim();
    parse_chord_token(symbol)?;

    let existing = progression.trim_end().trim_end_matches(',').trim_end();
    if existing.trim().is_empty() {
        Ok(symbol.to_string())
    } else {
        Ok(format!("{}, {}", existing, symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voicing::VoicingMode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compile_document() {
        let (progression, midi) = compile_document("---\nmode: open\n---\nAm F G C/E").unwrap();
        assert_eq!(progression.mode, VoicingMode::Open);
        assert_eq!(progression.chords.len(), 4);
        assert_eq!(&midi[0..4], b"MThd");
    }

    #[test]
    fn test_overrides_win() {
        let overrides = RawSettings {
            mode: Some("voicelead".to_string()),
            ..Default::default()
        };
        let (progression, _) =
            compile_document_with("---\nmode: open\n---\nC Am", overrides).unwrap();
        assert_eq!(progression.mode, VoicingMode::VoiceLead);
    }

    #[test]
    fn test_compile_errors() {
        assert_eq!(compile("---\nmode: close\n---\n"), Err(TriadError::EmptyProgression));
        assert!(compile("C Xm").is_err());
    }

    #[test]
    fn test_append_chord() {
        assert_eq!(append_chord("Am, F,", "G").unwrap(), "Am, F, G");
        assert_eq!(append_chord("", "Ebm").unwrap(), "Ebm");
        assert!(append_chord("Am", "Hm").is_err());
    }

    #[test]
    fn test_lookup_triads() {
        let lookup = lookup_triads("e").unwrap();
        assert_eq!(lookup.major, vec!["A", "C", "E"]);
        assert_eq!(lookup.minor, vec!["Am", "Dbm", "Em"]);
    }
}
