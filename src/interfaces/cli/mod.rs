use std::path::PathBuf;

use clap::Parser;

use crate::io::format::latsym_output;

const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Logs a nicely formatted `latsym` heading to the `latsym-output` logger.
pub fn log_heading() {
    let version = if let Some(ver) = VERSION {
        format!("v{ver}")
    } else {
        "v unknown".to_string()
    };
    latsym_output!("╭─────────────────────────────────────────────────────────────────────────────╮");
    latsym_output!("│   ██╗      █████╗ ████████╗███████╗██╗   ██╗███╗   ███╗                     │");
    latsym_output!("│   ██║     ██╔══██╗╚══██╔══╝██╔════╝╚██╗ ██╔╝████╗ ████║                     │");
    latsym_output!("│   ██║     ███████║   ██║   ███████╗ ╚████╔╝ ██╔████╔██║                     │");
    latsym_output!("│   ██║     ██╔══██║   ██║   ╚════██║  ╚██╔╝  ██║╚██╔╝██║                     │");
    latsym_output!("│   ███████╗██║  ██║   ██║   ███████║   ██║   ██║ ╚═╝ ██║                     │");
    latsym_output!("│   ╚══════╝╚═╝  ╚═╝   ╚═╝   ╚══════╝   ╚═╝   ╚═╝     ╚═╝                     │");
    latsym_output!("│                                                                             │");
    latsym_output!("│   Periodic geometry and rigid-motion symmetry for crystal unit cells        │");
    latsym_output!("│                                                               {version:>13} │");
    latsym_output!("╰─────────────────────────────────────────────────────────────────────────────╯");
    latsym_output!("");
}

/// Command-line arguments of the `latsym` binary.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// The YAML configuration file describing the calculations to run.
    #[arg(short, long)]
    pub config: PathBuf,

    /// An optional file to which the main output is written in addition to the console.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Raises the level of diagnostic logging. May be repeated.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
