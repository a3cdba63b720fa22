//! Progression documents
//!
//! A document is progression text with an optional YAML frontmatter block:
//!
//! ```text
//! ---
//! low: C2
//! high: C6
//! mode: open
//! bpm: 90
//! ---
//! Am, F, G, C/E
//! ```
//!
//! Every key is optional. Unknown keys are rejected so typos don't go
//! unnoticed.

use serde::Deserialize;

use crate::error::TriadError;
use crate::midi::{MidiOptions, NoteStyle};
use crate::pipeline::GenerateOptions;
use crate::pitch::{parse_pitch, RegisterBounds};
use crate::voicing::VoicingMode;

/// Register bound as written: `C2` or `36`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum PitchValue {
    Number(i64),
    Name(String),
}

impl PitchValue {
    fn resolve(&self) -> Result<i32, TriadError> {
        match self {
            PitchValue::Number(n) => parse_pitch(&n.to_string()),
            PitchValue::Name(name) => parse_pitch(name),
        }
    }
}

/// Frontmatter as deserialized, before validation.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawSettings {
    pub low: Option<PitchValue>,
    pub high: Option<PitchValue>,
    pub mode: Option<String>,
    pub bass_weight: Option<f64>,
    pub bpm: Option<f64>,
    pub style: Option<String>,
    pub duration: Option<f64>,
    pub ticks_per_beat: Option<u16>,
    pub program: Option<u8>,
    pub velocity: Option<u8>,
}

impl RawSettings {
    /// Values from `overrides` win where present.
    pub fn merge(self, overrides: RawSettings) -> RawSettings {
        RawSettings {
            low: overrides.low.or(self.low),
            high: overrides.high.or(self.high),
            mode: overrides.mode.or(self.mode),
            bass_weight: overrides.bass_weight.or(self.bass_weight),
            bpm: overrides.bpm.or(self.bpm),
            style: overrides.style.or(self.style),
            duration: overrides.duration.or(self.duration),
            ticks_per_beat: overrides.ticks_per_beat.or(self.ticks_per_beat),
            program: overrides.program.or(self.program),
            velocity: overrides.velocity.or(self.velocity),
        }
    }
}

/// Validated generation and export settings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Settings {
    pub generate: GenerateOptions,
    pub export: MidiOptions,
}

impl Settings {
    pub fn from_raw(raw: &RawSettings) -> Result<Self, TriadError> {
        let mut generate = GenerateOptions::default();
        let mut export = MidiOptions::default();

        if raw.low.is_some() || raw.high.is_some() {
            let lo = match &raw.low {
                Some(value) => value.resolve()?,
                None => generate.bounds.lo(),
            };
            let hi = match &raw.high {
                Some(value) => value.resolve()?,
                None => generate.bounds.hi(),
            };
            generate.bounds = RegisterBounds::new(lo, hi)?;
        }
        if let Some(mode) = &raw.mode {
            generate.mode = mode.parse::<VoicingMode>()?;
        }
        if let Some(weight) = raw.bass_weight {
            generate.bass_weight = weight;
        }

        if let Some(bpm) = raw.bpm {
            if !bpm.is_finite() || bpm <= 0.0 {
                return Err(TriadError::SettingsError(format!(
                    "bpm must be a positive number, got {}",
                    bpm
                )));
            }
            export.bpm = bpm;
        }
        if let Some(style) = &raw.style {
            export.style = style.parse::<NoteStyle>()?;
        }
        if let Some(duration) = raw.duration {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(TriadError::SettingsError(format!(
                    "duration must be a positive number of beats, got {}",
                    duration
                )));
            }
            export.duration_beats = duration;
        }
        if let Some(ticks) = raw.ticks_per_beat {
            if ticks == 0 || ticks > 0x7FFF {
                return Err(TriadError::SettingsError(format!(
                    "ticks-per-beat must be between 1 and 32767, got {}",
                    ticks
                )));
            }
            export.ticks_per_beat = ticks;
        }
        if let Some(program) = raw.program {
            if program > 127 {
                return Err(TriadError::SettingsError(format!(
                    "program must be between 0 and 127, got {}",
                    program
                )));
            }
            export.program = program;
        }
        if let Some(velocity) = raw.velocity {
            export.velocity = velocity.min(127);
        }

        Ok(Settings { generate, export })
    }
}

/// A parsed document: settings plus the progression text.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub settings: Settings,
    pub raw: RawSettings,
    pub progression: String,
}

/// Split the frontmatter block (between the first two `---` lines) from
/// the rest of the source.
pub(crate) fn extract_frontmatter(source: &str) -> (Option<String>, String) {
    let lines: Vec<&str> = source.lines().collect();
    let mut markers = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim() == "---")
        .map(|(i, _)| i);

    match (markers.next(), markers.next()) {
        (Some(start), Some(end)) => {
            let content = lines[start + 1..end].join("\n");
            let remaining: Vec<&str> = lines[..start]
                .iter()
                .chain(lines[end + 1..].iter())
                .copied()
                .collect();
            (Some(content), remaining.join("\n"))
        }
        _ => (None, source.to_string()),
    }
}

/// Parse frontmatter YAML into raw settings.
pub fn parse_raw_settings(content: &str) -> Result<RawSettings, TriadError> {
    if content.trim().is_empty() {
        return Ok(RawSettings::default());
    }
    serde_yaml::from_str(content).map_err(|e| TriadError::SettingsError(e.to_string()))
}

/// Parse a progression document.
///
/// # Example
/// ```
/// use triad::settings::parse_document;
/// use triad::voicing::VoicingMode;
///
/// let document = parse_document("---\nmode: voicelead\nbpm: 90\n---\nC, Am").unwrap();
/// assert_eq!(document.settings.generate.mode, VoicingMode::VoiceLead);
/// assert_eq!(document.settings.export.bpm, 90.0);
/// assert_eq!(document.progression.trim(), "C, Am");
/// ```
pub fn parse_document(source: &str) -> Result<Document, TriadError> {
    let (frontmatter, progression) = extract_frontmatter(source);
    let raw = match frontmatter {
        Some(content) => parse_raw_settings(&content)?,
        None => RawSettings::default(),
    };
    let settings = Settings::from_raw(&raw)?;
    Ok(Document {
        settings,
        raw,
        progression,
    })
}
