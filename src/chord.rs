//! Chord symbol parsing
//!
//! Parses progression text ("Am, F, G, C/E") into [`ChordSymbol`]s and resolves
//! them to [`ChordSpec`]s with a concrete target register.
//!
//! # Token Grammar
//! `<A-G|a-g><#|b>? (m|maj)? (/ <A-G|a-g><#|b>?)?`
//!
//! - **Major**: `C`, `Cmaj` → root, major 3rd, perfect 5th
//! - **Minor**: `Cm` → root, minor 3rd, perfect 5th
//! - **Slash bass**: `C/E`, `Am/G` → required bass pitch class

use serde::Serialize;

use crate::error::TriadError;
use crate::pitch::{nearest_pitch_for_class, parse_pitch_class, split_spelling};

/// Triad quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Major,
    Minor,
}

impl Quality {
    /// Semitones from root to third.
    pub fn third_offset(self) -> u8 {
        match self {
            Quality::Major => 4,
            Quality::Minor => 3,
        }
    }

    /// Suffix used in chord names (`""` or `"m"`).
    pub fn suffix(self) -> &'static str {
        match self {
            Quality::Major => "",
            Quality::Minor => "m",
        }
    }
}

/// One parsed chord token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordSymbol {
    pub symbol: String,
    pub root: u8,
    pub quality: Quality,
    pub slash: Option<u8>,
}

/// A chord symbol placed at a concrete root pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordSpec {
    pub symbol: String,
    pub root: u8,
    pub target_root: i32,
    pub quality: Quality,
    pub slash: Option<u8>,
}

impl ChordSpec {
    /// Place the chord's root at the pitch nearest `reference`.
    pub fn resolve(symbol: &ChordSymbol, reference: i32) -> Self {
        Self {
            symbol: symbol.symbol.clone(),
            root: symbol.root,
            target_root: nearest_pitch_for_class(symbol.root, reference),
            quality: symbol.quality,
            slash: symbol.slash,
        }
    }
}

fn chord_error(token: &str, message: impl Into<String>) -> TriadError {
    TriadError::ChordError {
        token: token.to_string(),
        message: message.into(),
    }
}

/// Parse a single chord token.
///
/// # Examples
/// ```
/// use triad::chord::{parse_chord_token, Quality};
///
/// let chord = parse_chord_token("Am/E").unwrap();
/// assert_eq!(chord.root, 9);
/// assert_eq!(chord.quality, Quality::Minor);
/// assert_eq!(chord.slash, Some(4));
///
/// assert!(parse_chord_token("Xm").is_err());
/// assert!(parse_chord_token("Am/H").is_err());
/// ```
pub fn parse_chord_token(token: &str) -> Result<ChordSymbol, TriadError> {
    let (body, slash_text) = match token.split_once('/') {
        Some((body, slash)) => (body, Some(slash)),
        None => (token, None),
    };

    let (offset, suffix) = split_spelling(body)
        .ok_or_else(|| chord_error(token, format!("unknown root note in '{}'", body)))?;

    let quality = match suffix {
        "" | "maj" => Quality::Major,
        "m" => Quality::Minor,
        other => {
            return Err(chord_error(
                token,
                format!("unsupported chord quality '{}' (use m or maj)", other),
            ))
        }
    };

    let slash = match slash_text {
        Some(text) => Some(
            parse_pitch_class(text)
                .ok_or_else(|| chord_error(token, format!("invalid slash bass note '{}'", text)))?,
        ),
        None => None,
    };

    Ok(ChordSymbol {
        symbol: token.to_string(),
        root: offset.rem_euclid(12) as u8,
        quality,
        slash,
    })
}

/// Parse progression text, split on whitespace and/or commas.
///
/// # Example
/// ```
/// use triad::chord::parse_progression;
///
/// let chords = parse_progression("Am, F G,C/E").unwrap();
/// let symbols: Vec<_> = chords.iter().map(|c| c.symbol.as_str()).collect();
/// assert_eq!(symbols, vec!["Am", "F", "G", "C/E"]);
/// ```
pub fn parse_progression(text: &str) -> Result<Vec<ChordSymbol>, TriadError> {
    let chords = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(parse_chord_token)
        .collect::<Result<Vec<_>, _>>()?;

    if chords.is_empty() {
        return Err(TriadError::EmptyProgression);
    }
    Ok(chords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_parsing() {
        let c = parse_chord_token("C").unwrap();
        assert_eq!((c.root, c.quality, c.slash), (0, Quality::Major, None));

        let am_e = parse_chord_token("Am/E").unwrap();
        assert_eq!((am_e.root, am_e.quality, am_e.slash), (9, Quality::Minor, Some(4)));

        let f_sharp_minor = parse_chord_token("F#m").unwrap();
        assert_eq!((f_sharp_minor.root, f_sharp_minor.quality), (6, Quality::Minor));

        let b_flat = parse_chord_token("Bbmaj").unwrap();
        assert_eq!((b_flat.root, b_flat.quality), (10, Quality::Major));

        // Lowercase letters are accepted
        let e_flat_minor = parse_chord_token("ebm").unwrap();
        assert_eq!((e_flat_minor.root, e_flat_minor.quality), (3, Quality::Minor));

        let cb = parse_chord_token("Cb/Fb").unwrap();
        assert_eq!((cb.root, cb.slash), (11, Some(4)));
    }

    #[test]
    fn test_chord_errors_name_token() {
        match parse_chord_token("Xm") {
            Err(TriadError::ChordError { token, .. }) => assert_eq!(token, "Xm"),
            other => panic!("expected chord error, got {:?}", other),
        }
        assert!(parse_chord_token("C7").is_err());
        assert!(parse_chord_token("Cmin").is_err());
        assert!(parse_chord_token("CM").is_err());
        assert!(parse_chord_token("").is_err());
    }

    #[test]
    fn test_malformed_slash_fails_with_valid_body() {
        assert!(parse_chord_token("Am/H").is_err());
        assert!(parse_chord_token("C/").is_err());
        assert!(parse_chord_token("C/E/G").is_err());
        assert!(parse_chord_token("C/Em").is_err());
    }

    #[test]
    fn test_progression_splitting() {
        let chords = parse_progression(" Am,,F\tG\n C/E ,").unwrap();
        assert_eq!(chords.len(), 4);
        assert_eq!(chords[3].slash, Some(4));

        assert_eq!(parse_progression(""), Err(TriadError::EmptyProgression));
        assert_eq!(parse_progression(" , ,"), Err(TriadError::EmptyProgression));

        match parse_progression("C, Hm, G") {
            Err(TriadError::ChordError { token, .. }) => assert_eq!(token, "Hm"),
            other => panic!("expected chord error, got {:?}", other),
        }
    }

    #[test]
    fn test_spec_resolution() {
        let symbol = parse_chord_token("Am").unwrap();
        let spec = ChordSpec::resolve(&symbol, 60);
        assert_eq!(spec.target_root, 57);
        assert_eq!(spec.symbol, "Am");
    }
}
