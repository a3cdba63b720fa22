//! # Error Types
//!
//! This module defines all error types for the triad engine.
//!
//! Every error carries enough context (the offending token, note, or value) for a
//! user to fix the input and generate again. Nothing is retried automatically.
//!
//! ## Error Types
//! - `EmptyProgression` - The progression text contained no chord tokens
//! - `ChordError` - A chord token did not match the chord grammar
//! - `NoteError` - A pitch-class name (note query) could not be read
//! - `RangeError` - Register bounds were unreadable or inconsistent
//! - `SettingsError` - Invalid YAML frontmatter or option names
//! - `ExportError` - MIDI export failed or had nothing to export
//!
//! ## Usage
//! ```rust
//! use triad::{generate_progression, GenerateOptions, TriadError};
//!
//! match generate_progression("Am, X", &GenerateOptions::default()) {
//!     Ok(progression) => println!("{} chords", progression.chords.len()),
//!     Err(TriadError::ChordError { token, message }) => {
//!         eprintln!("Bad chord {}: {}", token, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriadError {
    /// The progression text is empty or holds only separators.
    ///
    /// # Example
    /// ```
    /// # use triad::TriadError;
    /// assert_eq!(TriadError::EmptyProgression.to_string(), "No chords found in progression");
    /// ```
    #[error("No chords found in progression")]
    EmptyProgression,

    /// A chord token failed to parse.
    ///
    /// # Example
    /// ```
    /// # use triad::TriadError;
    /// let err = TriadError::ChordError {
    ///     token: "Am/H".to_string(),
    ///     message: "invalid slash bass note 'H'".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid chord 'Am/H': invalid slash bass note 'H'");
    /// ```
    #[error("Invalid chord '{token}': {message}")]
    ChordError { token: String, message: String },

    /// A note name without octave could not be read.
    #[error("Invalid note: {0}")]
    NoteError(String),

    /// Register bounds are unreadable, out of MIDI range, inverted, or too narrow.
    ///
    /// # Example
    /// ```
    /// # use triad::TriadError;
    /// let err = TriadError::RangeError("low note C6 must be below high note C2".to_string());
    /// assert_eq!(err.to_string(), "Invalid range: low note C6 must be below high note C2");
    /// ```
    #[error("Invalid range: {0}")]
    RangeError(String),

    /// Invalid document frontmatter or option values.
    #[error("Invalid settings: {0}")]
    SettingsError(String),

    /// MIDI export failed.
    #[error("Export error: {0}")]
    ExportError(String),
}
