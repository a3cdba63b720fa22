use serde::Serialize;
use triad::{GenerateOptions, MidiOptions, NoteStyle, RegisterBounds, TriadError, VoicingMode};
use wasm_bindgen::prelude::*;

pub const MIDI_FILE_NAME: &str = triad::midi::FILE_NAME;
pub const MIDI_MIME_TYPE: &str = triad::midi::MIME_TYPE;

#[derive(Serialize)]
struct ErrorReport {
    message: String,
    token: Option<String>,
}

fn to_js_error(e: TriadError) -> JsValue {
    let report = match &e {
        TriadError::ChordError { token, .. } => ErrorReport {
            message: e.to_string(),
            token: Some(token.clone()),
        },
        _ => ErrorReport {
            message: e.to_string(),
            token: None,
        },
    };
    let json = serde_json::to_string(&report).unwrap_or_else(|_| report.message.clone());
    JsValue::from_str(&json)
}

fn generate_options(
    mode: &str,
    low: &str,
    high: &str,
    bass_weight: f64,
) -> Result<GenerateOptions, TriadError> {
    Ok(GenerateOptions {
        bounds: RegisterBounds::parse(low, high)?,
        mode: mode.parse::<VoicingMode>()?,
        bass_weight,
    })
}

fn generate_json(
    text: &str,
    mode: &str,
    low: &str,
    high: &str,
    bass_weight: f64,
) -> Result<String, TriadError> {
    let options = generate_options(mode, low, high, bass_weight)?;
    let progression = triad::generate_progression(text, &options)?;
    serde_json::to_string(&progression).map_err(|e| TriadError::ExportError(e.to_string()))
}

fn export_bytes(
    text: &str,
    mode: &str,
    low: &str,
    high: &str,
    bass_weight: f64,
    bpm: f64,
    style: &str,
) -> Result<Vec<u8>, TriadError> {
    let options = generate_options(mode, low, high, bass_weight)?;
    let progression = triad::generate_progression(text, &options)?;
    let midi = MidiOptions {
        bpm,
        style: style.parse::<NoteStyle>()?,
        ..Default::default()
    };
    triad::export_midi(&progression.chords, &midi)
}

fn lookup_json(note: &str) -> Result<String, TriadError> {
    let lookup = triad::lookup_triads(note)?;
    serde_json::to_string(&lookup).map_err(|e| TriadError::ExportError(e.to_string()))
}

/// Voice a progression; returns the progression as JSON
#[wasm_bindgen]
pub fn generate(
    text: &str,
    mode: &str,
    low: &str,
    high: &str,
    bass_weight: f64,
) -> Result<String, JsValue> {
    generate_json(text, mode, low, high, bass_weight).map_err(to_js_error)
}

/// Voice a progression and encode it as MIDI file bytes
#[wasm_bindgen]
pub fn export_midi(
    text: &str,
    mode: &str,
    low: &str,
    high: &str,
    bass_weight: f64,
    bpm: f64,
    style: &str,
) -> Result<Vec<u8>, JsValue> {
    export_bytes(text, mode, low, high, bass_weight, bpm, style).map_err(to_js_error)
}

/// Compile a progression document (frontmatter + chords) to MIDI file bytes
#[wasm_bindgen]
pub fn compile(source: &str) -> Result<Vec<u8>, JsValue> {
    triad::compile(source).map_err(to_js_error)
}

/// Major and minor triads containing a note, as `{"major": [...], "minor": [...]}`
#[wasm_bindgen]
pub fn triads_containing(note: &str) -> Result<String, JsValue> {
    lookup_json(note).map_err(to_js_error)
}

#[wasm_bindgen]
pub fn append_chord(progression: &str, symbol: &str) -> Result<String, JsValue> {
    triad::append_chord(progression, symbol).map_err(to_js_error)
}

#[wasm_bindgen]
pub fn midi_file_name() -> String {
    MIDI_FILE_NAME.to_string()
}

#[wasm_bindgen]
pub fn midi_mime_type() -> String {
    MIDI_MIME_TYPE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_json() {
        let json = generate_json("C, Am", "close", "C2", "C6", 1.2).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["chords"][0]["symbol"], "C");
        assert_eq!(value["chords"][0]["pitches"], serde_json::json!([48, 76, 79]));
        assert_eq!(value["mode"], "close");
        assert_eq!(value["bounds"]["lo"], 36);
        assert_eq!(value["bassWeight"], 1.2);
    }

    #[test]
    fn test_generate_rejects_bad_input() {
        assert!(generate_json("C", "close", "C6", "C2", 1.2).is_err());
        assert!(generate_json("C", "stacked", "C2", "C6", 1.2).is_err());
        assert!(generate_json("", "close", "C2", "C6", 1.2).is_err());
    }

    #[test]
    fn test_export_bytes() {
        let bytes = export_bytes("Am F G C/E", "open", "36", "84", 1.2, 100.0, "arpUp").unwrap();
        assert_eq!(&bytes[0..4], b"MThd");
        assert!(export_bytes("C", "open", "36", "84", 1.2, 0.0, "block").is_err());
    }

    #[test]
    fn test_lookup_json() {
        assert_eq!(
            lookup_json("C").unwrap(),
            r#"{"major":["Ab","C","F"],"minor":["Am","Cm","Fm"]}"#
        );
    }
}
