// SPDX-License-Identifier: MIT
//
// kup — a small terminal text editor.
//
// This is the binary that wires the two crates together:
//
//   kup-term   → raw mode, key decoding, event loop, escape sequences
//   kup-editor → rows, syntax highlighting, search, screen composition
//
// kup-editor's Editor implements kup-term's App trait. Each keypress flows
// through:
//
//   stdin → parser → on_key → prompt or command handler → document
//   paint → draw rows, status bar, message bar → one write to stdout
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text rows                    │  ← rows - 2
//   ├──────────────────────────────┤
//   │ status bar (INVERSE)         │  ← 1 row
//   ├──────────────────────────────┤
//   │ message bar                  │  ← 1 row
//   └──────────────────────────────┘

mod cli;
mod logging;

use std::process;

use clap::Parser;
use kup_editor::document::Document;
use kup_editor::editor::Editor;
use kup_term::event_loop::EventLoop;
use tracing::{error, info};

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        if let Err(e) = logging::init(path) {
            eprintln!("kup: failed to open log file: {e}");
            process::exit(1);
        }
    }

    let options = cli.options().unwrap_or_else(|e| {
        eprintln!("kup: {e}");
        process::exit(1);
    });

    let document = match &cli.file {
        Some(path) => Document::open(path, options.tab_stop).unwrap_or_else(|e| {
            error!(path = %path.display(), error = %e, "failed to open file");
            eprintln!("kup: {}: {e}", path.display());
            process::exit(1);
        }),
        None => Document::new(options.tab_stop),
    };

    let mut event_loop = EventLoop::new().unwrap_or_else(|e| {
        eprintln!("kup: failed to initialize terminal: {e}");
        process::exit(1);
    });

    info!(version = kup_editor::VERSION, "starting");
    let mut editor = Editor::new(document, options, event_loop.size());

    if let Err(e) = event_loop.run(&mut editor) {
        error!(error = %e, "event loop failed");
        eprintln!("kup: {e}");
        process::exit(1);
    }
    info!("exiting");
}
