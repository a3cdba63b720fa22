use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use triad::midi::FILE_NAME;
use triad::settings::PitchValue;
use triad::{
    generate_progression, lookup_triads, parse_document, write_midi, RawSettings, Settings,
};

#[derive(Parser)]
#[command(name = "triad", about = "Voice a chord progression and export it as MIDI")]
struct Args {
    /// Progression text, e.g. "Am, F, G, C/E"
    #[arg(conflicts_with = "file")]
    progression: Option<String>,

    /// Read a progression document (optional YAML frontmatter) from a file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Voicing strategy: close, open, or voicelead
    #[arg(short, long)]
    mode: Option<String>,

    /// Lowest allowed note (C2 or 36)
    #[arg(long)]
    low: Option<String>,

    /// Highest allowed note (C6 or 84)
    #[arg(long)]
    high: Option<String>,

    /// Bass motion weight, 0 to 3
    #[arg(long)]
    bass_weight: Option<f64>,

    #[arg(long)]
    bpm: Option<f64>,

    /// Note layout: block or arpUp
    #[arg(long)]
    style: Option<String>,

    /// Beats per chord in block style
    #[arg(long)]
    duration: Option<f64>,

    /// Where to write the MIDI file
    #[arg(short, long, default_value = FILE_NAME)]
    output: PathBuf,

    /// Print the voiced progression as JSON instead of writing MIDI
    #[arg(long)]
    json: bool,

    /// List the major and minor triads containing NOTE, then exit
    #[arg(long, value_name = "NOTE")]
    lookup: Option<String>,
}

impl Args {
    fn overrides(&self) -> RawSettings {
        RawSettings {
            low: self.low.clone().map(PitchValue::Name),
            high: self.high.clone().map(PitchValue::Name),
            mode: self.mode.clone(),
            bass_weight: self.bass_weight,
            bpm: self.bpm,
            style: self.style.clone(),
            duration: self.duration,
            ..Default::default()
        }
    }
}

fn fail(error: impl Display) -> ! {
    eprintln!("Error: {}", error);
    process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if let Some(note) = &args.lookup {
        let lookup = lookup_triads(note).unwrap_or_else(|e| fail(e));
        println!("major: {}", lookup.major.join(" "));
        println!("minor: {}", lookup.minor.join(" "));
        return;
    }

    let source = match (&args.file, &args.progression) {
        (Some(path), _) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        (None, Some(text)) => text.clone(),
        (None, None) => {
            eprintln!("Usage: triad \"Am, F, G, C/E\" [--mode open] [-o out.mid]");
            eprintln!("       triad --file progression.txt");
            eprintln!("       triad --lookup C");
            process::exit(1);
        }
    };

    let document = parse_document(&source).unwrap_or_else(|e| fail(e));
    let settings =
        Settings::from_raw(&document.raw.merge(args.overrides())).unwrap_or_else(|e| fail(e));
    let progression = generate_progression(&document.progression, &settings.generate)
        .unwrap_or_else(|e| fail(e));

    if args.json {
        let json = serde_json::to_string_pretty(&progression).unwrap_or_else(|e| fail(e));
        println!("{}", json);
        return;
    }

    for (index, chord) in progression.chords.iter().enumerate() {
        println!("{}", chord.describe(index));
    }

    if let Err(e) = write_midi(&progression.chords, &settings.export, &args.output) {
        fail(e);
    }
    eprintln!("Wrote MIDI to {}", args.output.display());
}
