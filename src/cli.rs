// SPDX-License-Identifier: MIT
//
// Command-line arguments.
//
//   kup [FILE] [--tab-stop N] [--quit-times N] [--log-file PATH]
//       [--set name=value]...
//
// Dedicated flags are applied after `--set` overrides, so `--tab-stop 8
// --set ts=2` ends with a tab stop of 8.

use std::path::PathBuf;

use clap::Parser;
use kup_editor::options::{OptionError, Options};

/// A small terminal text editor
#[derive(Parser, Debug)]
#[command(name = "kup", version, about = "A small terminal text editor")]
pub struct Cli {
    /// File to open
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Tab stop width in columns
    #[arg(long, value_name = "N")]
    pub tab_stop: Option<usize>,

    /// Extra Ctrl-Q presses needed to quit with unsaved changes
    #[arg(long, value_name = "N")]
    pub quit_times: Option<u32>,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long, value_name = "PATH", env = "KUP_LOG")]
    pub log_file: Option<PathBuf>,

    /// Set an option, e.g. `--set tabstop=8`
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,
}

impl Cli {
    /// Build the editor options from the flags.
    ///
    /// # Errors
    ///
    /// Returns the first `--set` override that does not apply.
    pub fn options(&self) -> Result<Options, OptionError> {
        let mut options = Options::default();
        for arg in &self.set {
            options.apply(arg)?;
        }
        if let Some(tab_stop) = self.tab_stop {
            options.tab_stop = tab_stop.max(1);
        }
        if let Some(quit_times) = self.quit_times {
            options.quit_times = quit_times;
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("kup").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn no_arguments() {
        let cli = parse(&[]);
        assert_eq!(cli.file, None);
        assert_eq!(cli.options().unwrap(), Options::default());
    }

    #[test]
    fn file_and_flags() {
        let cli = parse(&["main.c", "--tab-stop", "8", "--quit-times", "1"]);
        assert_eq!(cli.file, Some(PathBuf::from("main.c")));
        let options = cli.options().unwrap();
        assert_eq!(options.tab_stop, 8);
        assert_eq!(options.quit_times, 1);
    }

    #[test]
    fn set_overrides_are_applied() {
        let cli = parse(&["--set", "ts=2", "--set", "mt=10"]);
        let options = cli.options().unwrap();
        assert_eq!(options.tab_stop, 2);
        assert_eq!(options.message_timeout.as_secs(), 10);
    }

    #[test]
    fn dedicated_flag_wins_over_set() {
        let cli = parse(&["--set", "tabstop=2", "--tab-stop", "8"]);
        assert_eq!(cli.options().unwrap().tab_stop, 8);
    }

    #[test]
    fn zero_tab_stop_becomes_one() {
        let cli = parse(&["--tab-stop", "0"]);
        assert_eq!(cli.options().unwrap().tab_stop, 1);
    }

    #[test]
    fn bad_set_is_reported() {
        let cli = parse(&["--set", "bogus=1"]);
        assert_eq!(
            cli.options(),
            Err(OptionError::Unknown("bogus".to_string()))
        );
    }

    #[test]
    fn non_numeric_tab_stop_is_rejected() {
        assert!(Cli::try_parse_from(["kup", "--tab-stop", "wide"]).is_err());
    }

    #[test]
    fn log_file_flag() {
        let cli = parse(&["--log-file", "/tmp/kup.log"]);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/kup.log")));
    }
}
