//! Nice `latsym` output formatting.

use std::fmt;

use log;
use serde::{Deserialize, Serialize};

const LATSYM_BANNER_LENGTH: usize = 79;

/// Logs an error to the `latsym-output` logger.
macro_rules! latsym_error {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::error!($fmt, $($($arg)*)?);
        log::error!(target: "latsym-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a warning to the `latsym-output` logger.
macro_rules! latsym_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::warn!(target: "latsym-output", $fmt, $($($arg)*)?); }
}

/// Logs a main output line to the `latsym-output` logger.
macro_rules! latsym_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "latsym-output", $fmt, $($($arg)*)?); }
}

pub(crate) use latsym_output;

/// Logs a nicely formatted section title to the `latsym-output` logger.
pub(crate) fn log_title(title: &str) {
    let length = title.chars().count().max(LATSYM_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    latsym_output!("┌──{bar}──┐");
    latsym_output!("│§ {title:^length$} §│");
    latsym_output!("└──{bar}──┘");
}

/// Writes a nicely formatted subtitle.
pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, subtitle: &str) -> fmt::Result {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    writeln!(f, "{subtitle}")?;
    writeln!(f, "{bar}")?;
    Ok(())
}

/// Logs a nicely formatted subtitle to the `latsym-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    latsym_output!("{}", subtitle);
    latsym_output!("{}", bar);
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// A trait for logging `latsym` outputs nicely.
pub(crate) trait LatsymOutput: fmt::Debug + fmt::Display {
    /// Logs display output nicely.
    fn log_output_display(&self) {
        let lines = self.to_string();
        lines.lines().for_each(|line| {
            latsym_output!("{line}");
        })
    }
}

// Blanket implementation
impl<T> LatsymOutput for T where T: fmt::Debug + fmt::Display {}

// ========
// Reporter
// ========

/// An enumerated type for the importance of an advisory message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Critical; always surfaced.
    Critical = 0,

    /// Something unexpected happened but computation carries on; always surfaced.
    Warning = 1,

    /// Useful but non-essential information.
    Info = 2,

    /// Detailed information mainly for debugging.
    Debug = 3,
}

impl Priority {
    /// Converts a numeric priority in $`[0, 3]`$ into a [`Priority`], saturating at
    /// [`Priority::Debug`].
    #[must_use]
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Critical,
            1 => Self::Warning,
            2 => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// A leveled sink for non-fatal advisory messages.
///
/// Messages of priority [`Priority::Critical`] and [`Priority::Warning`] are always surfaced.
/// Messages of priority [`Priority::Info`] and [`Priority::Debug`] are surfaced only when their
/// numeric level does not exceed [`Self::verbosity`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reporter {
    /// The verbosity threshold.
    pub verbosity: u8,
}

impl Reporter {
    /// Creates a reporter with a fixed verbosity threshold.
    #[must_use]
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    /// Checks whether a message of the given priority would be surfaced.
    #[must_use]
    pub fn surfaces(&self, priority: Priority) -> bool {
        priority <= Priority::Warning || (priority as u8) <= self.verbosity
    }

    /// Reports a message with the given priority.
    ///
    /// # Returns
    ///
    /// A flag indicating if the message has been surfaced.
    pub fn report(&self, message: &str, priority: Priority) -> bool {
        if !self.surfaces(priority) {
            return false;
        }
        match priority {
            Priority::Critical => {
                latsym_error!("{message}");
            }
            Priority::Warning => {
                latsym_warn!("{message}");
            }
            Priority::Info => {
                latsym_output!("{message}");
            }
            Priority::Debug => log::debug!(target: "latsym-output", "{message}"),
        }
        true
    }
}
