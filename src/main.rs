use std::env;
use std::fs;
use std::process;

use tabmidi::ConvertOptions;

const USAGE: &str = "Usage: tabmidi [--config options.yaml] <input.musicxml> [output.yaml]";

fn main() {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    // Parse flags
    let mut config_path: Option<String> = None;
    if let Some(pos) = args.iter().position(|arg| arg == "--config") {
        if pos + 1 >= args.len() {
            eprintln!("{}", USAGE);
            process::exit(1);
        }
        config_path = Some(args.remove(pos + 1));
        args.remove(pos);
    }

    if args.is_empty() || args.len() > 2 {
        eprintln!("{}", USAGE);
        process::exit(1);
    }
    let input_path = &args[0];
    let output_path = args.get(1);

    let options = match &config_path {
        Some(path) => {
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading config '{}': {}", path, e);
                    process::exit(1);
                }
            };
            match ConvertOptions::from_yaml(&content) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("{}", e);
                    process::exit(1);
                }
            }
        }
        None => ConvertOptions::default(),
    };

    // Read input file
    let source = match fs::read_to_string(input_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", input_path, e);
            process::exit(1);
        }
    };

    let tracks = match tabmidi::convert_with_options(&source, &options) {
        Ok(tracks) => tracks,
        Err(e) => {
            eprintln!("Conversion error: {}", e);
            process::exit(1);
        }
    };

    let yaml = match serde_yaml::to_string(&tracks) {
        Ok(yaml) => yaml,
        Err(e) => {
            eprintln!("Error serializing tracks: {}", e);
            process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &yaml) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote {} tracks to {}", tracks.len(), path);
        }
        None => {
            print!("{}", yaml);
        }
    }
}
