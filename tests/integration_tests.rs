// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for keysheet
//!
//! These tests verify that multiple components work together correctly.

use std::collections::BTreeSet;
use std::fs;
use std::thread;

use keysheet::config::AppConfig;
use keysheet::control::ControlAction;
use keysheet::input::{normalize_key, Key, KeyPress};
use keysheet::library::{load_sheet, scan, LibraryEvent, SheetLibrary};
use keysheet::playback::{Matcher, MatcherOptions, PlayerStatus, TransposeMode};
use keysheet::session::{Session, SessionEvent};
use keysheet::sheet::{detect_transpose, render, tokenize, Sheet, SheetDraft, Token};
use tempfile::tempdir;

fn matcher_for(text: &str) -> Matcher {
    let sheet = Sheet::parse(text, "Untitled");
    let mut matcher = Matcher::new(MatcherOptions::default());
    matcher.load(&sheet);
    matcher
}

fn type_keys(matcher: &mut Matcher, keys: &str) {
    for c in keys.chars() {
        matcher.press(&KeyPress::from_char(c));
    }
}

/// Sheet text to finished song, one key at a time
#[test]
fn test_end_to_end_single_line() {
    let sheet = Sheet::parse("title=Test\nab[cd]\n", "Untitled");
    assert_eq!(sheet.title, "Test");
    assert_eq!(sheet.notes, vec!["ab[cd]"]);
    assert_eq!(
        tokenize(&sheet.notes[0]),
        vec![Token::Char('a'), Token::Char('b'), Token::chord("cd")]
    );

    let mut matcher = Matcher::new(MatcherOptions::default());
    let snapshot = matcher.load(&sheet);
    assert_eq!(snapshot.status, PlayerStatus::AwaitingToken);
    assert_eq!(snapshot.state.current_token, 0);

    let mut positions = Vec::new();
    for c in "abcd".chars() {
        let outcome = matcher.press(&KeyPress::from_char(c));
        positions.push((outcome.advanced, outcome.snapshot.state.current_token));
    }

    assert_eq!(positions[0], (true, 1));
    assert_eq!(positions[1], (true, 2));
    assert_eq!(positions[2], (false, 2));
    assert!(positions[3].0);
    assert_eq!(matcher.status(), PlayerStatus::End);
}

#[test]
fn test_tokenize_round_trip() {
    for line in ["ab [cd] e-f", "  [qwe] | t'y  ", "[]x", "plain"] {
        assert_eq!(render(&tokenize(line)), line.trim_end_matches(['\r', '\n']));
    }
}

#[test]
fn test_transpose_examples() {
    assert_eq!(detect_transpose("+5"), Some(5));
    assert_eq!(detect_transpose("-3 (octave)"), Some(-3));
    assert_eq!(detect_transpose("Transpose"), Some(0));
    assert_eq!(detect_transpose("Hello 5 there"), None);
}

#[test]
fn test_chord_orders_and_duplicates() {
    for keys in ["adg", "gda", "dag", "aadg"] {
        let mut matcher = matcher_for("[ad-g]\nz");
        type_keys(&mut matcher, keys);
        assert_eq!(matcher.state().current_line, 1, "keys {}", keys);
    }

    let mut matcher = matcher_for("[ad-g]\nz");
    type_keys(&mut matcher, "ad");
    assert_eq!(matcher.state().current_line, 0);
    let pending: String = matcher.remaining_chord_notes().unwrap().iter().collect();
    assert_eq!(pending, "g");
}

#[test]
fn test_empty_chord_never_stalls() {
    let mut matcher = matcher_for("a[]b\n[]\n[] c");
    type_keys(&mut matcher, "a");
    assert_eq!(matcher.current_token(), Some(&Token::Char('b')));
    type_keys(&mut matcher, "b");
    assert_eq!(matcher.state().current_line, 2);
    assert_eq!(matcher.current_token(), Some(&Token::Char('c')));
}

#[test]
fn test_seek_matches_replay_in_both_modes() {
    let text = "+2\nab\ntranspose -1\ncd\n+3\nef\ngh";
    for mode in [TransposeMode::Cumulative, TransposeMode::Absolute] {
        let options = MatcherOptions {
            noob_mode: false,
            transpose_mode: mode,
        };
        let sheet = Sheet::parse(text, "x");

        for target in 0..=sheet.notes.len() {
            let mut stepped = Matcher::new(options);
            stepped.load(&sheet);
            while stepped.state().current_line < target && stepped.status() != PlayerStatus::End {
                let next = match stepped.current_token() {
                    Some(Token::Char(c)) => *c,
                    _ => break,
                };
                stepped.on_key(&[next.to_string()]);
            }

            let mut seeked = Matcher::new(options);
            seeked.load(&sheet);
            seeked.seek(target, 0);

            assert_eq!(
                seeked.state().transpose,
                stepped.state().transpose,
                "{:?} line {}",
                mode,
                target
            );
        }
    }
}

#[test]
fn test_directives_only_sheet_ends_immediately() {
    let matcher = matcher_for("title=Empty\n+1\n- - -\ntranspose 2\n' '\n");
    assert_eq!(matcher.status(), PlayerStatus::End);
    assert_eq!(matcher.state().transpose, 3);
}

#[test]
fn test_switching_sheets_discards_chords() {
    let mut matcher = matcher_for("[abc]");
    type_keys(&mut matcher, "a");
    assert!(!matcher.state().active_chord.is_empty());

    matcher.load(&Sheet::parse("[abc]", "other"));
    assert!(matcher.state().active_chord.is_empty());
    type_keys(&mut matcher, "bc");
    assert_eq!(matcher.status(), PlayerStatus::AwaitingToken);
    type_keys(&mut matcher, "a");
    assert_eq!(matcher.status(), PlayerStatus::End);
}

#[test]
fn test_noob_mode_normalization() {
    assert_eq!(normalize_key(&Key::Letter('A'), false, false), vec!["a"]);
    assert_eq!(normalize_key(&Key::Letter('A'), true, false), vec!["A"]);
    assert_eq!(normalize_key(&Key::Digit(1), false, true), vec!["1", "!"]);

    let mut matcher = Matcher::new(MatcherOptions {
        noob_mode: true,
        transpose_mode: TransposeMode::Cumulative,
    });
    matcher.load(&Sheet::parse("A[Bc]", "x"));
    type_keys(&mut matcher, "abC");
    assert_eq!(matcher.status(), PlayerStatus::End);
}

#[test]
fn test_library_scan_and_save() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("Sheets");
    fs::create_dir_all(root.join("Classics")).unwrap();
    fs::create_dir_all(root.join("Empty")).unwrap();
    fs::write(root.join("Classics").join("fur.txt"), "title=Fur Elise\nartist=Beethoven\nty ty\n").unwrap();
    fs::write(root.join("notes.md"), "not a sheet").unwrap();

    let folders = scan(&root, "txt").unwrap();
    assert_eq!(folders.len(), 3);
    assert_eq!(folders[0].path, root);
    assert!(folders[0].sheets.is_empty());
    assert_eq!(folders[1].name(), "Classics");
    assert_eq!(folders[1].sheets[0].artist, "Beethoven");
    assert_eq!(folders[2].name(), "Empty");

    let mut library = SheetLibrary::open(&root, "txt").unwrap();
    let draft = SheetDraft {
        title: "Ode: Joy?".to_string(),
        artist: String::new(),
        creator: "me".to_string(),
        body: "\nee fg\n\n gf ed\n".to_string(),
    };
    let path = library.save(&draft, None).unwrap();
    assert_eq!(path, root.join("Ode_ Joy_.txt"));

    let saved = load_sheet(&path);
    assert_eq!(saved.title, "Ode: Joy?");
    assert_eq!(saved.creator, "me");
    assert_eq!(saved.notes, vec!["ee fg", "gf ed"]);
    assert_eq!(library.sheets().count(), 2);

    library.delete(&path).unwrap();
    assert_eq!(library.sheets().count(), 1);
}

#[test]
fn test_session_follows_file_changes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("song.txt");
    fs::write(&path, "title=Song\n+1\nqw\ner\n").unwrap();

    let config = AppConfig::from_toml("[playback]\nnoob_mode = false\n").unwrap();
    let library = SheetLibrary::open(dir.path(), &config.library.extension).unwrap();
    let mut session = Session::new(library, config.matcher_options());
    let tx = session.channel();

    let producer = {
        let tx = tx.clone();
        let path = path.clone();
        thread::spawn(move || {
            tx.send(SessionEvent::Open(path)).unwrap();
            tx.send(SessionEvent::Action(ControlAction::TogglePlay)).unwrap();
            for c in "qwe".chars() {
                tx.send(SessionEvent::Key(KeyPress::from_char(c))).unwrap();
            }
        })
    };
    producer.join().unwrap();
    session.drain();

    assert_eq!(session.matcher().state().current_line, 2);
    assert_eq!(session.matcher().state().current_token, 1);
    assert_eq!(session.matcher().state().transpose, 1);

    fs::write(&path, "title=Song\n+4\nzx\n").unwrap();
    tx.send(SessionEvent::LibraryChanged(LibraryEvent::Changed(path.clone())))
        .unwrap();
    session.drain();

    let state = session.matcher().state();
    assert_eq!((state.current_line, state.current_token), (1, 0));
    assert_eq!(state.transpose, 4);
    assert_eq!(session.snapshot().status, PlayerStatus::AwaitingToken);
}

#[test]
fn test_editing_open_sheet_resets_playback() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("song.txt");
    fs::write(&path, "title=Song\nqw\ner\n").unwrap();

    let config = AppConfig::from_toml("[playback]\nnoob_mode = false\n").unwrap();
    let library = SheetLibrary::open(dir.path(), &config.library.extension).unwrap();
    let mut session = Session::new(library, config.matcher_options());
    let tx = session.channel();

    tx.send(SessionEvent::Open(path.clone())).unwrap();
    tx.send(SessionEvent::Action(ControlAction::TogglePlay)).unwrap();
    for c in "qwe".chars() {
        tx.send(SessionEvent::Key(KeyPress::from_char(c))).unwrap();
    }
    session.drain();
    assert_eq!(session.matcher().state().current_line, 1);
    assert!(session.is_playing());

    let mut draft = SheetDraft::from_sheet(session.sheet().unwrap());
    draft.title = "Song (edit)".to_string();
    draft.body = "-1\nzx\ner\n".to_string();
    tx.send(SessionEvent::Save {
        draft,
        existing: Some(path.clone()),
    })
    .unwrap();
    session.drain();

    let sheet = session.sheet().unwrap();
    assert_eq!(sheet.title, "Song (edit)");
    assert_eq!(sheet.notes, vec!["-1", "zx", "er"]);
    let state = session.matcher().state();
    assert_eq!((state.current_line, state.current_token), (1, 0));
    assert_eq!(state.transpose, -1);
    assert!(!session.is_playing());

    tx.send(SessionEvent::Delete(path.clone())).unwrap();
    session.drain();
    assert!(!path.exists());
    assert!(session.sheet().is_none());
    assert_eq!(session.library().sheets().count(), 0);
}

#[test]
fn test_snapshot_serializes() {
    let mut matcher = matcher_for("+2\n[ab]c");
    type_keys(&mut matcher, "a");
    let yaml = serde_yaml::to_string(&matcher.snapshot()).unwrap();
    assert!(yaml.contains("status: AwaitingToken"));
    assert!(yaml.contains("transpose: 2"));

    let pending: BTreeSet<char> = matcher.remaining_chord_notes().unwrap().clone();
    assert_eq!(pending, BTreeSet::from(['b']));
}
