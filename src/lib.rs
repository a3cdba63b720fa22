pub mod api;
pub mod chord;
pub mod error;
pub mod midi;
pub mod pipeline;
pub mod pitch;
pub mod settings;
pub mod slash;
pub mod spacing;
pub mod triad;
pub mod voicing;

pub use api::{
    append_chord, compile, compile_document, compile_document_with, generate_progression,
    lookup_triads,
};
pub use chord::{parse_progression, ChordSpec, ChordSymbol, Quality};
pub use error::*;
pub use midi::{export_midi, write_midi, MidiOptions, NoteStyle};
pub use pipeline::{GenerateOptions, Progression, VoicedChord};
pub use pitch::{pitch_name, RegisterBounds};
pub use settings::{parse_document, RawSettings, Settings};
pub use triad::TriadLookup;
pub use voicing::VoicingMode;
