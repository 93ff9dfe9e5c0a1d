//! Editor options and `name=value` overrides.
//!
//! Options are plain values owned by the [`Editor`](crate::editor::Editor).
//! They are set from the command line, either through dedicated flags or
//! through generic `name=value` pairs parsed here.
//!
//! | Full name        | Abbrev | Type    | Default |
//! |------------------|--------|---------|---------|
//! | `tabstop`        | `ts`   | integer | 4       |
//! | `quittimes`      | `qt`   | integer | 3       |
//! | `messagetimeout` | `mt`   | seconds | 5       |

use std::time::Duration;

use thiserror::Error;

use crate::render::DEFAULT_TAB_STOP;

/// Extra Ctrl-Q presses required to quit with unsaved changes.
pub const DEFAULT_QUIT_TIMES: u32 = 3;

/// How long a status message stays on screen.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// A rejected `name=value` override.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("expected name=value, got '{0}'")]
    MissingValue(String),

    #[error("unknown option '{0}'")]
    Unknown(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },
}

/// Runtime options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Tab stop width in columns. Always at least 1.
    pub tab_stop: usize,
    /// Extra Ctrl-Q presses needed to quit a dirty document.
    pub quit_times: u32,
    /// Lifetime of a status message.
    pub message_timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            quit_times: DEFAULT_QUIT_TIMES,
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
        }
    }
}

/// Returns `true` if `name` is a known option (full name or abbreviation).
#[must_use]
pub fn is_known_option(name: &str) -> bool {
    matches!(
        name,
        "tabstop" | "ts" | "quittimes" | "qt" | "messagetimeout" | "mt"
    )
}

impl Options {
    /// Apply one `name=value` override.
    ///
    /// A tab stop of 0 is stored as 1.
    ///
    /// # Errors
    ///
    /// Returns an error if `arg` has no `=`, names an unknown option, or
    /// carries a value that is not a non-negative integer. The options are
    /// unchanged on error.
    pub fn apply(&mut self, arg: &str) -> Result<(), OptionError> {
        let (name, value) = arg
            .split_once('=')
            .ok_or_else(|| OptionError::MissingValue(arg.to_string()))?;
        let name = name.trim();
        let value = value.trim();

        if !is_known_option(name) {
            return Err(OptionError::Unknown(name.to_string()));
        }

        let invalid = || OptionError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        let number: u64 = value.parse().map_err(|_| invalid())?;

        match name {
            "tabstop" | "ts" => {
                self.tab_stop = usize::try_from(number).map_err(|_| invalid())?.max(1);
            }
            "quittimes" | "qt" => {
                self.quit_times = u32::try_from(number).map_err(|_| invalid())?;
            }
            _ => self.message_timeout = Duration::from_secs(number),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
