//! MIDI export
//!
//! Writes a voiced progression as a format 0 Standard MIDI File: one track
//! holding tempo, time signature, program change, note events and
//! end-of-track. Uses the `midly` crate for encoding.

use std::path::Path;
use std::str::FromStr;

use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use serde::{Deserialize, Serialize};

use crate::error::TriadError;
use crate::pipeline::VoicedChord;

/// Suggested download name for exported files.
pub const FILE_NAME: &str = "triad-progression.mid";

/// MIME type of exported files.
pub const MIME_TYPE: &str = "audio/midi";

/// Velocity cap for single-note chords.
const SINGLE_NOTE_VELOCITY_CAP: u8 = 52;

const MAX_TEMPO: u32 = 0xFF_FFFF;

/// Longest duration, step or rest accepted, in beats.
pub const MAX_LENGTH_BEATS: f64 = 1024.0;

/// Largest delta time a track event can carry.
const MAX_DELTA: u32 = 0x0FFF_FFFF;

/// How the notes of each chord are laid out in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteStyle {
    /// All notes start together and last `duration_beats`.
    #[default]
    Block,
    /// Notes play one at a time, lowest first.
    ArpUp,
}

impl FromStr for NoteStyle {
    type Err = TriadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "block" => Ok(NoteStyle::Block),
            "arpUp" | "arpup" | "arp-up" => Ok(NoteStyle::ArpUp),
            other => Err(TriadError::SettingsError(format!(
                "unknown note style '{}' (expected block or arpUp)",
                other
            ))),
        }
    }
}

/// Export parameters. Lengths are in beats (quarter notes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidiOptions {
    pub bpm: f64,
    pub style: NoteStyle,
    pub duration_beats: f64,
    pub ticks_per_beat: u16,
    pub program: u8,
    pub velocity: u8,
    pub min_velocity: u8,
    pub step_beats: f64,
    pub gate: f64,
    pub rest_beats: f64,
}

impl Default for MidiOptions {
    fn default() -> Self {
        Self {
            bpm: 100.0,
            style: NoteStyle::Block,
            duration_beats: 2.0,
            ticks_per_beat: 480,
            program: 0,
            velocity: 75,
            min_velocity: 30,
            step_beats: 0.25,
            gate: 0.85,
            rest_beats: 0.5,
        }
    }
}

impl MidiOptions {
    fn validate(&self) -> Result<(), TriadError> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(TriadError::ExportError(format!(
                "tempo must be a positive number of beats per minute, got {}",
                self.bpm
            )));
        }
        if self.ticks_per_beat == 0 || self.ticks_per_beat > 0x7FFF {
            return Err(TriadError::ExportError(format!(
                "ticks per beat must be between 1 and 32767, got {}",
                self.ticks_per_beat
            )));
        }
        for (name, value) in [
            ("duration", self.duration_beats),
            ("step", self.step_beats),
        ] {
            if !value.is_finite() || value <= 0.0 || value > MAX_LENGTH_BEATS {
                return Err(TriadError::ExportError(format!(
                    "{} must be more than 0 and at most {} beats, got {}",
                    name, MAX_LENGTH_BEATS, value
                )));
            }
        }
        if !self.rest_beats.is_finite()
            || self.rest_beats < 0.0
            || self.rest_beats > MAX_LENGTH_BEATS
        {
            return Err(TriadError::ExportError(format!(
                "rest must be between 0 and {} beats, got {}",
                MAX_LENGTH_BEATS, self.rest_beats
            )));
        }
        if !(self.gate > 0.0 && self.gate <= 1.0) {
            return Err(TriadError::ExportError(format!(
                "gate must be in (0, 1], got {}",
                self.gate
            )));
        }
        Ok(())
    }

    fn ticks(&self, beats: f64) -> u32 {
        (beats * self.ticks_per_beat as f64).round() as u32
    }

    /// Microseconds per quarter note.
    fn tempo(&self) -> u32 {
        ((60_000_000.0 / self.bpm).round() as u32).clamp(1, MAX_TEMPO)
    }
}

/// Per-note velocity for a chord of `note_count` notes.
///
/// # Example
/// ```
/// use triad::midi::chord_velocity;
///
/// assert_eq!(chord_velocity(75, 30, 3), 43);
/// assert_eq!(chord_velocity(75, 30, 1), 52);
/// ```
pub fn chord_velocity(base: u8, min_velocity: u8, note_count: usize) -> u8 {
    let count = note_count.max(1) as f64;
    let raw = (base as f64 / count.sqrt()).round();
    let velocity = raw.clamp(min_velocity.min(127) as f64, 127.0) as u8;
    if note_count == 1 {
        velocity.min(SINGLE_NOTE_VELOCITY_CAP)
    } else {
        velocity
    }
}

/// A note event at an absolute tick.
struct Timed {
    tick: u32,
    key: u8,
    velocity: Option<u8>,
}

fn advance(tick: u32, by: u32) -> Result<u32, TriadError> {
    tick.checked_add(by).ok_or_else(|| {
        TriadError::ExportError("progression is too long for a MIDI file".to_string())
    })
}

fn note_events(chords: &[VoicedChord], options: &MidiOptions) -> Result<Vec<Timed>, TriadError> {
    let mut events = Vec::new();
    let mut start = 0u32;

    for chord in chords {
        let velocity = chord_velocity(options.velocity, options.min_velocity, chord.pitches.len());
        match options.style {
            NoteStyle::Block => {
                let end = advance(start, options.ticks(options.duration_beats))?;
                events.extend(chord.pitches.iter().map(|&key| Timed {
                    tick: start,
                    key,
                    velocity: Some(velocity),
                }));
                events.extend(chord.pitches.iter().map(|&key| Timed {
                    tick: end,
                    key,
                    velocity: None,
                }));
                start = end;
            }
            NoteStyle::ArpUp => {
                let step = options.ticks(options.step_beats);
                let held = options.ticks(options.step_beats * options.gate).max(1);
                let mut tick = start;
                for &key in &chord.pitches {
                    events.push(Timed {
                        tick,
                        key,
                        velocity: Some(velocity),
                    });
                    events.push(Timed {
                        tick: advance(tick, held)?,
                        key,
                        velocity: None,
                    });
                    tick = advance(tick, step.max(held))?;
                }
                start = advance(tick, options.ticks(options.rest_beats))?;
            }
        }
    }
    Ok(events)
}

/// Build the in-memory SMF for a voiced progression.
pub fn progression_to_smf(
    chords: &[VoicedChord],
    options: &MidiOptions,
) -> Result<Smf<'static>, TriadError> {
    options.validate()?;

    let channel = u4::new(0);
    let mut track: Track<'static> = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(options.tempo()))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(options.program.min(127)),
                },
            },
        },
    ];

    let mut last_tick = 0u32;
    for event in note_events(chords, options)? {
        let key = u7::new(event.key.min(127));
        let message = match event.velocity {
            Some(velocity) => MidiMessage::NoteOn {
                key,
                vel: u7::new(velocity.min(127)),
            },
            None => MidiMessage::NoteOff {
                key,
                vel: u7::new(0),
            },
        };
        let delta = event
            .tick
            .checked_sub(last_tick)
            .filter(|&delta| delta <= MAX_DELTA)
            .ok_or_else(|| {
                TriadError::ExportError(format!(
                    "gap of {} ticks does not fit a MIDI delta time",
                    event.tick.saturating_sub(last_tick)
                ))
            })?;
        track.push(TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi { channel, message },
        });
        last_tick = event.tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(options.ticks_per_beat)),
    ));
    smf.tracks.push(track);
    Ok(smf)
}

/// Encode a voiced progression as Standard MIDI File bytes.
///
/// # Errors
/// [`TriadError::ExportError`] when there is nothing to export or the
/// options are out of range.
pub fn export_midi(chords: &[VoicedChord], options: &MidiOptions) -> Result<Vec<u8>, TriadError> {
    if chords.is_empty() {
        return Err(TriadError::ExportError(
            "nothing to export; generate a progression first".to_string(),
        ));
    }

    let smf = progression_to_smf(chords, options)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)
        .map_err(|e| TriadError::ExportError(e.to_string()))?;

    log::debug!(
        target: "triad::midi",
        "exported {} chords ({:?}, {} bpm, {} bytes)",
        chords.len(),
        options.style,
        options.bpm,
        buf.len()
    );
    Ok(buf)
}

/// Export and write to `path`.
pub fn write_midi(
    chords: &[VoicedChord],
    options: &MidiOptions,
    path: &Path,
) -> Result<(), TriadError> {
    let bytes = export_midi(chords, options)?;
    std::fs::write(path, bytes)
        .map_err(|e| TriadError::ExportError(format!("{}: {}", path.display(), e)))
}
