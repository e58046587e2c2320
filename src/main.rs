// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use keysheet::config::{AppConfig, DEFAULT_CONFIG_FILE};
use keysheet::input::KeyPress;
use keysheet::library::{load_sheet, LibraryWatcher, SheetLibrary};
use keysheet::playback::{Matcher, SheetLine};
use keysheet::session::{Session, SessionEvent};
use keysheet::sheet::SheetDraft;
use keysheet::ui::App;

fn print_usage() {
    println!("keysheet - Chord sheet viewer with keyboard follow mode");
    println!();
    println!("Usage: keysheet [--config <FILE>] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  play [--library <DIR>] [SHEET]  Open the library in the terminal UI");
    println!("  list [--library <DIR>]          List folders and sheets");
    println!("  inspect <SHEET>                 Show how a sheet is tokenized");
    println!("  replay <SHEET> <TEXT>           Type TEXT into a sheet and print the final state");
    println!("  new [--library <DIR>] --title <TITLE> [--artist <A>] [--creator <C>] <BODY>");
    println!("                                  Create a sheet from a notes file (- for stdin)");
    println!("  edit <SHEET> [--title <TITLE>] [--artist <A>] [--creator <C>] [BODY]");
    println!("                                  Change a sheet's header or notes");
    println!("  delete <SHEET>                  Remove a sheet file");
    println!();
    println!("Options:");
    println!("  --config <FILE>                 Config file (default: {})", DEFAULT_CONFIG_FILE);
    println!("  --help                          Show this help message");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=debug) for log output.");
}

fn init_logging(to_stderr: bool) {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    if to_stderr {
        builder.with_writer(io::stderr).init();
    } else {
        // The terminal UI owns the screen
        builder.with_writer(io::sink).init();
    }
}

/// Take `--flag <value>` out of the argument list
fn take_option(args: &mut Vec<String>, flag: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        bail!("{} requires a value", flag);
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}

fn open_library(config: &AppConfig, root: Option<String>) -> Result<SheetLibrary> {
    let root = root
        .map(PathBuf::from)
        .unwrap_or_else(|| config.library.root.clone());
    fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create library folder: {:?}", root))?;
    let root = fs::canonicalize(&root)
        .with_context(|| format!("Failed to resolve library folder: {:?}", root))?;
    SheetLibrary::open(root, &config.library.extension)
}

fn play(config: &AppConfig, mut args: Vec<String>) -> Result<()> {
    let library = open_library(config, take_option(&mut args, "--library")?)?;
    let watcher = if config.library.watch {
        Some(LibraryWatcher::new(
            library.root(),
            library.extension(),
            Some(config.library.debounce_ms),
        )?)
    } else {
        None
    };

    let mut session = Session::new(library, config.matcher_options());
    if let Some(sheet) = args.first() {
        let path = fs::canonicalize(sheet).with_context(|| format!("No such sheet: {}", sheet))?;
        session.open(&path);
    }

    info!(root = %session.library().root().display(), "starting terminal UI");
    let mut app = App::new(config.keyboard_controller())?;
    app.run(&mut session, watcher)
}

fn list(config: &AppConfig, mut args: Vec<String>) -> Result<()> {
    let library = open_library(config, take_option(&mut args, "--library")?)?;

    for folder in library.folders() {
        println!("{}/", folder.name());
        for sheet in &folder.sheets {
            let by = if sheet.artist.is_empty() {
                String::new()
            } else {
                format!(" - {}", sheet.artist)
            };
            println!("  {}{} ({} notes)", sheet.title, by, sheet.note_count());
        }
    }
    if library.is_empty() {
        println!("No .{} sheets in {}", library.extension(), library.root().display());
    }
    Ok(())
}

fn sheet_arg(args: &[String], command: &str) -> Result<PathBuf> {
    args.first()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("{} requires a sheet file", command))
}

fn existing_sheet(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("No such sheet: {}", path.display());
    }
    Ok(())
}

fn inspect(args: Vec<String>) -> Result<()> {
    let path = sheet_arg(&args, "inspect")?;
    existing_sheet(&path)?;
    let sheet = load_sheet(&path);

    println!("title:   {}", sheet.title);
    if !sheet.artist.is_empty() {
        println!("artist:  {}", sheet.artist);
    }
    if !sheet.creator.is_empty() {
        println!("creator: {}", sheet.creator);
    }
    println!("notes:   {}", sheet.note_count());
    println!();

    for (i, raw) in sheet.notes.iter().enumerate() {
        match SheetLine::classify(raw) {
            SheetLine::Directive { value, .. } => println!("{:4}  transpose {:+}", i, value),
            SheetLine::Notes { tokens, .. } => {
                let shown: Vec<String> = tokens
                    .iter()
                    .filter(|t| !t.is_skippable())
                    .map(|t| t.literal())
                    .collect();
                println!("{:4}  {}", i, shown.join(" "));
            }
        }
    }
    Ok(())
}

fn replay(config: &AppConfig, args: Vec<String>) -> Result<()> {
    let path = sheet_arg(&args, "replay")?;
    existing_sheet(&path)?;
    let text = args
        .get(1)
        .ok_or_else(|| anyhow!("replay requires the text to type"))?;

    let mut matcher = Matcher::new(config.matcher_options());
    matcher.load(&load_sheet(&path));
    for c in text.chars() {
        matcher.press(&KeyPress::from_char(c));
    }

    let yaml = serde_yaml::to_string(&matcher.snapshot()).context("Failed to format snapshot")?;
    print!("{}", yaml);
    Ok(())
}

/// Notes text from a file, or stdin for `-`
fn read_body(source: &str) -> Result<String> {
    if source == "-" {
        let mut body = String::new();
        io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read notes from stdin")?;
        Ok(body)
    } else {
        fs::read_to_string(source).with_context(|| format!("Failed to read notes file: {}", source))
    }
}

/// Session over the library that holds `sheet`, or the configured one
fn session_for(config: &AppConfig, sheet: Option<&Path>, library: Option<String>) -> Result<Session> {
    let root = library.or_else(|| {
        sheet
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_string_lossy().into_owned())
    });
    Ok(Session::new(open_library(config, root)?, config.matcher_options()))
}

fn new_sheet(config: &AppConfig, mut args: Vec<String>) -> Result<()> {
    let library = take_option(&mut args, "--library")?;
    let title = take_option(&mut args, "--title")?.ok_or_else(|| anyhow!("new requires --title"))?;
    let draft = SheetDraft {
        title,
        artist: take_option(&mut args, "--artist")?.unwrap_or_default(),
        creator: take_option(&mut args, "--creator")?.unwrap_or_default(),
        body: read_body(args.first().ok_or_else(|| anyhow!("new requires a notes file"))?)?,
    };

    let mut session = session_for(config, None, library)?;
    let path = session.save_sheet(&draft, None)?;
    println!("Created {} ({} notes)", path.display(), draft.note_count());
    Ok(())
}

fn edit_sheet(config: &AppConfig, mut args: Vec<String>) -> Result<()> {
    let title = take_option(&mut args, "--title")?;
    let artist = take_option(&mut args, "--artist")?;
    let creator = take_option(&mut args, "--creator")?;
    let path = fs::canonicalize(sheet_arg(&args, "edit")?).context("No such sheet")?;

    let mut draft = SheetDraft::from_sheet(&load_sheet(&path));
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(artist) = artist {
        draft.artist = artist;
    }
    if let Some(creator) = creator {
        draft.creator = creator;
    }
    if let Some(source) = args.get(1) {
        draft.body = read_body(source)?;
    }

    let mut session = session_for(config, Some(&path), None)?;
    session.handle(SessionEvent::Save {
        draft,
        existing: Some(path.clone()),
    })?;
    println!("Saved {}", path.display());
    Ok(())
}

fn delete_sheet(config: &AppConfig, args: Vec<String>) -> Result<()> {
    let path = fs::canonicalize(sheet_arg(&args, "delete")?).context("No such sheet")?;
    let mut session = session_for(config, Some(&path), None)?;
    session.handle(SessionEvent::Delete(path.clone()))?;
    println!("Deleted {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        println!("keysheet - Chord sheet viewer with keyboard follow mode");
        println!("Run with --help for usage information");
        return Ok(());
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let config = match take_option(&mut args, "--config")? {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_or_default(DEFAULT_CONFIG_FILE)?,
    };

    if args.is_empty() {
        print_usage();
        std::process::exit(1);
    }
    let command = args.remove(0);
    init_logging(command != "play");

    match command.as_str() {
        "play" => play(&config, args),
        "list" => list(&config, args),
        "inspect" => inspect(args),
        "replay" => replay(&config, args),
        "new" => new_sheet(&config, args),
        "edit" => edit_sheet(&config, args),
        "delete" => delete_sheet(&config, args),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }
}
