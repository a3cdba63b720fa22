//! Triad model
//!
//! Pitch classes of major/minor triads and the reverse lookup of which triads
//! contain a given pitch class.

use serde::Serialize;

use crate::chord::Quality;
use crate::error::TriadError;
use crate::pitch::{parse_pitch_class, pitch_class_name};

/// Perfect fifth in semitones.
pub const FIFTH_OFFSET: u8 = 7;

/// Degree a pitch class occupies within a triad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriadRole {
    Root,
    Third,
    Fifth,
}

/// `[root, third, fifth]` pitch classes of a triad.
///
/// # Example
/// ```
/// use triad::chord::Quality;
/// use triad::triad::triad_pitch_classes;
///
/// assert_eq!(triad_pitch_classes(0, Quality::Major), [0, 4, 7]);
/// assert_eq!(triad_pitch_classes(9, Quality::Minor), [9, 0, 4]);
/// ```
pub fn triad_pitch_classes(root: u8, quality: Quality) -> [u8; 3] {
    let root = root % 12;
    [
        root,
        (root + quality.third_offset()) % 12,
        (root + FIFTH_OFFSET) % 12,
    ]
}

/// Role of `pc` within the triad, if it is a chord tone.
pub fn triad_role(triad: [u8; 3], pc: u8) -> Option<TriadRole> {
    match triad.iter().position(|&tone| tone == pc % 12)? {
        0 => Some(TriadRole::Root),
        1 => Some(TriadRole::Third),
        _ => Some(TriadRole::Fifth),
    }
}

/// Display name of a triad, e.g. `Ab` or `F#m` spelled as `Gbm`.
pub fn triad_name(root: u8, quality: Quality) -> String {
    format!("{}{}", pitch_class_name(root), quality.suffix())
}

/// Major and minor triads containing a pitch class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriadLookup {
    pub major: Vec<String>,
    pub minor: Vec<String>,
}

fn containing(pc: u8, quality: Quality) -> Vec<String> {
    let pc = pc % 12;
    let offsets = [0, quality.third_offset(), FIFTH_OFFSET];
    let mut names: Vec<String> = offsets
        .iter()
        .map(|offset| triad_name((pc + 12 - offset) % 12, quality))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Triads in which `pc` is the root, third, or fifth.
///
/// # Example
/// ```
/// use triad::triad::triads_containing_pitch_class;
///
/// let lookup = triads_containing_pitch_class(0);
/// assert_eq!(lookup.major, vec!["Ab", "C", "F"]);
/// assert_eq!(lookup.minor, vec!["Am", "Cm", "Fm"]);
/// ```
pub fn triads_containing_pitch_class(pc: u8) -> TriadLookup {
    TriadLookup {
        major: containing(pc, Quality::Major),
        minor: containing(pc, Quality::Minor),
    }
}

/// Note-query form of [`triads_containing_pitch_class`]: accepts `[A-Ga-g][#b]?`.
pub fn triads_containing_note(note: &str) -> Result<TriadLookup, TriadError> {
    let trimmed = note.trim();
    let pc = parse_pitch_class(trimmed).ok_or_else(|| {
        TriadError::NoteError(format!("'{}' is not a note name (expected e.g. C, F#, Bb)", trimmed))
    })?;
    Ok(triads_containing_pitch_class(pc))
}
