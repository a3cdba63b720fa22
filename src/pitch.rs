//! Pitch utilities
//!
//! Semitone/note-name conversion, nearest-pitch-class search, and the register
//! bounds every voicing is confined to. All voicing math runs in absolute
//! semitones (`i32`, 60 = C4) so intermediate octave shifts may leave the MIDI
//! range before being repaired.

use serde::Serialize;

use crate::error::TriadError;

/// Middle C (C4).
pub const MIDDLE_C: i32 = 60;

/// Highest MIDI note number.
pub const MAX_PITCH: i32 = 127;

/// Smallest accepted register width in semitones (two octaves).
///
/// A bass folded into the lowest octave of the register still has a full
/// octave above it, so every voice keeps its pitch class when repaired.
pub const MIN_RANGE_WIDTH: i32 = 24;

/// Octave numbers that can name a MIDI note (`C-1` to `G9`).
const MIN_OCTAVE: i32 = -1;
const MAX_OCTAVE: i32 = 9;

/// Cap on octave-shift iterations in every repair loop.
pub const MAX_OCTAVE_PASSES: usize = 24;

/// Pitch-class display names. Black keys use flat spellings.
pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Pitch class (0-11) of an absolute pitch.
pub fn pitch_class(pitch: i32) -> u8 {
    pitch.rem_euclid(12) as u8
}

/// Clamp a pitch into the MIDI range.
pub fn clamp_pitch(pitch: i32) -> i32 {
    pitch.clamp(0, MAX_PITCH)
}

/// Display name of a pitch class, e.g. `Eb` for 3.
pub fn pitch_class_name(pc: u8) -> &'static str {
    PITCH_CLASS_NAMES[(pc % 12) as usize]
}

/// Note name with octave, e.g. `C4` for 60 and `Eb3` for 51.
pub fn pitch_name(pitch: i32) -> String {
    let octave = pitch.div_euclid(12) - 1;
    format!("{}{}", pitch_class_name(pitch_class(pitch)), octave)
}

/// Semitone offset from C for a letter and optional accidental.
///
/// The offset is not reduced mod 12, so `Cb` is -1 and `B#` is 12. This keeps
/// octave arithmetic right for spellings that cross the octave boundary
/// (`Cb4` is B3, `B#3` is C4).
fn spelled_offset(letter: char, accidental: Option<char>) -> Option<i32> {
    let base = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let shift = match accidental {
        None => 0,
        Some('#') => 1,
        Some('b') => -1,
        Some(_) => return None,
    };
    Some(base + shift)
}

/// Split a leading note spelling (`A`, `f#`, `Bb`) off the front of `text`.
///
/// Returns the signed semitone offset and the rest of the string.
pub(crate) fn split_spelling(text: &str) -> Option<(i32, &str)> {
    let mut chars = text.chars();
    let letter = chars.next()?;
    let rest = chars.as_str();
    let accidental = rest.chars().next().filter(|c| *c == '#' || *c == 'b');
    let offset = spelled_offset(letter, accidental)?;
    let consumed = letter.len_utf8() + accidental.map_or(0, |_| 1);
    Some((offset, &text[consumed..]))
}

/// Parse a pitch-class name without octave (`C`, `F#`, `Bb`, `E#`, `Cb`).
///
/// # Example
/// ```
/// use triad::pitch::parse_pitch_class;
///
/// assert_eq!(parse_pitch_class("Bb"), Some(10));
/// assert_eq!(parse_pitch_class("Cb"), Some(11));
/// assert_eq!(parse_pitch_class("H"), None);
/// ```
pub fn parse_pitch_class(name: &str) -> Option<u8> {
    match split_spelling(name)? {
        (offset, "") => Some(offset.rem_euclid(12) as u8),
        _ => None,
    }
}

/// Parse a register bound: a note name with octave (`C2`, `Bb-1`) or a bare
/// MIDI number (`36`).
///
/// # Example
/// ```
/// use triad::pitch::parse_pitch;
///
/// assert_eq!(parse_pitch("C2").unwrap(), 36);
/// assert_eq!(parse_pitch("36").unwrap(), 36);
/// assert!(parse_pitch("H2").is_err());
/// ```
pub fn parse_pitch(text: &str) -> Result<i32, TriadError> {
    let trimmed = text.trim();
    let pitch = if let Ok(number) = trimmed.parse::<i32>() {
        number
    } else {
        let (offset, octave_text) = split_spelling(trimmed)
            .ok_or_else(|| TriadError::RangeError(format!("cannot read note '{}'", trimmed)))?;
        let octave: i32 = octave_text.parse().map_err(|_| {
            TriadError::RangeError(format!("note '{}' needs an octave number", trimmed))
        })?;
        if !(MIN_OCTAVE..=MAX_OCTAVE).contains(&octave) {
            return Err(TriadError::RangeError(format!(
                "note '{}' is outside MIDI range 0-127",
                trimmed
            )));
        }
        (octave + 1) * 12 + offset
    };

    if !(0..=MAX_PITCH).contains(&pitch) {
        return Err(TriadError::RangeError(format!(
            "note '{}' is outside MIDI range 0-127",
            trimmed
        )));
    }
    Ok(pitch)
}

/// Nearest pitch with the given pitch class to `target`.
///
/// Searches the octaves from two below to two above the target's octave and
/// keeps the in-range candidate closest to the target. Ties go to the lower
/// candidate. Falls back to the clamped target when no candidate is in range.
///
/// # Example
/// ```
/// use triad::pitch::nearest_pitch_for_class;
///
/// assert_eq!(nearest_pitch_for_class(9, 60), 57); // A3, not A4
/// assert_eq!(nearest_pitch_for_class(6, 60), 54); // tritone tie: lower wins
/// ```
pub fn nearest_pitch_for_class(pc: u8, target: i32) -> i32 {
    let octave = target.div_euclid(12);
    let mut best: Option<i32> = None;

    for candidate_octave in (octave - 2)..=(octave + 2) {
        let candidate = candidate_octave * 12 + (pc % 12) as i32;
        if !(0..=MAX_PITCH).contains(&candidate) {
            continue;
        }
        let closer = match best {
            Some(current) => (candidate - target).abs() < (current - target).abs(),
            None => true,
        };
        if closer {
            best = Some(candidate);
        }
    }

    best.unwrap_or_else(|| clamp_pitch(target))
}

/// The register a voicing must stay within, `lo < hi`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBounds {
    lo: i32,
    hi: i32,
}

impl RegisterBounds {
    /// Validate a register. Requires both ends in MIDI range, `lo < hi`, and
    /// at least [`MIN_RANGE_WIDTH`] semitones between them.
    pub fn new(lo: i32, hi: i32) -> Result<Self, TriadError> {
        for pitch in [lo, hi] {
            if !(0..=MAX_PITCH).contains(&pitch) {
                return Err(TriadError::RangeError(format!(
                    "{} is outside MIDI range 0-127",
                    pitch
                )));
            }
        }
        if lo >= hi {
            return Err(TriadError::RangeError(format!(
                "low note {} must be below high note {}",
                pitch_name(lo),
                pitch_name(hi)
            )));
        }
        if hi - lo < MIN_RANGE_WIDTH {
            return Err(TriadError::RangeError(format!(
                "{} to {} is narrower than two octaves",
                pitch_name(lo),
                pitch_name(hi)
            )));
        }
        Ok(Self { lo, hi })
    }

    /// Parse both bounds from user text (note names or MIDI numbers).
    pub fn parse(low: &str, high: &str) -> Result<Self, TriadError> {
        Self::new(parse_pitch(low)?, parse_pitch(high)?)
    }

    pub fn lo(&self) -> i32 {
        self.lo
    }

    pub fn hi(&self) -> i32 {
        self.hi
    }

    pub fn contains(&self, pitch: i32) -> bool {
        (self.lo..=self.hi).contains(&pitch)
    }

    /// Midpoint of the register, rounded down.
    pub fn centre(&self) -> i32 {
        (self.lo + self.hi) / 2
    }
}

impl Default for RegisterBounds {
    /// C2 to C6.
    fn default() -> Self {
        Self { lo: 36, hi: 84 }
    }
}
