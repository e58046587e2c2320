// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for keysheet
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Line tokenizing
//! - Transpose directive detection
//! - Key press matching throughput
//! - Seeking in long sheets

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use keysheet::input::KeyPress;
use keysheet::playback::{Matcher, MatcherOptions};
use keysheet::sheet::{detect_transpose, tokenize, Sheet, Token};

const LINE: &str = "[tu] y [ew] t-r e [qe] w | t'y [ip] o i u [yo] t r e w";

/// A sheet of `lines` note lines with a directive every tenth line
fn long_sheet(lines: usize) -> Sheet {
    let text: String = (0..lines)
        .map(|i| if i % 10 == 9 { "+1\n".to_string() } else { format!("{}\n", LINE) })
        .collect();
    Sheet::parse(&text, "bench")
}

/// Key presses that play `sheet` from start to end
fn solution(sheet: &Sheet) -> Vec<KeyPress> {
    sheet
        .notes
        .iter()
        .flat_map(|line| tokenize(line))
        .flat_map(|token| match token {
            Token::Char(c) => vec![c],
            Token::Chord { notes, .. } => notes.into_iter().collect(),
            Token::Filler(_) => Vec::new(),
        })
        .map(KeyPress::from_char)
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_line", |b| b.iter(|| tokenize(black_box(LINE))));
}

fn bench_detect_transpose(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_transpose");

    for line in ["+5", "-3 (octave)", "Transpose up 2", LINE] {
        group.bench_with_input(BenchmarkId::from_parameter(line.len()), line, |b, line| {
            b.iter(|| detect_transpose(black_box(line)))
        });
    }

    group.finish();
}

fn bench_play_sheet(c: &mut Criterion) {
    let mut group = c.benchmark_group("play_sheet");

    for size in [10, 100, 1000].iter() {
        let sheet = long_sheet(*size);
        let keys = solution(&sheet);

        group.bench_with_input(BenchmarkId::new("keys", size), &keys, |b, keys| {
            b.iter_batched(
                || {
                    let mut matcher = Matcher::new(MatcherOptions::default());
                    matcher.load(&sheet);
                    matcher
                },
                |mut matcher| {
                    for key in keys {
                        matcher.press(key);
                    }
                    black_box(matcher.status())
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_seek(c: &mut Criterion) {
    let sheet = long_sheet(1000);
    let mut matcher = Matcher::new(MatcherOptions::default());
    matcher.load(&sheet);

    c.bench_function("seek_1000_lines", |b| {
        let mut line = 0;
        b.iter(|| {
            line = (line + 97) % 1000;
            black_box(matcher.seek(line, 3))
        })
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_detect_transpose,
    bench_play_sheet,
    bench_seek
);
criterion_main!(benches);
