use anyhow::{self, format_err, Context};
use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use latsym::interfaces::cli::{log_heading, Cli};
use latsym::interfaces::input::Input;
use latsym::interfaces::InputHandle;
use latsym::io::read_latsym_yaml;

const OUTPUT_PATTERN: &str = "{m}{n}";
const DIAGNOSTIC_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l:<5})} {t} - {m}{n}";

/// Sets up the `latsym-output` logger on the console and optionally a file, and the diagnostic
/// root logger on the standard error stream.
fn init_logging(cli: &Cli) -> Result<(), anyhow::Error> {
    let (output_level, root_level) = match cli.verbose {
        0 => (LevelFilter::Info, LevelFilter::Warn),
        1 => (LevelFilter::Debug, LevelFilter::Info),
        _ => (LevelFilter::Debug, LevelFilter::Debug),
    };

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(OUTPUT_PATTERN)))
        .build();
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(DIAGNOSTIC_PATTERN)))
        .build();

    let mut output_appenders = vec!["stdout"];
    let mut config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("stderr", Box::new(stderr)));
    if let Some(path) = cli.output.as_ref() {
        let file = FileAppender::builder()
            .append(false)
            .encoder(Box::new(PatternEncoder::new(OUTPUT_PATTERN)))
            .build(path)
            .with_context(|| format!("Unable to open output file `{}`", path.display()))?;
        config = config.appender(Appender::builder().build("output_file", Box::new(file)));
        output_appenders.push("output_file");
    }
    let config = config
        .logger(
            Logger::builder()
                .appenders(output_appenders)
                .additive(false)
                .build("latsym-output", output_level),
        )
        .build(Root::builder().appender("stderr").build(root_level))
        .map_err(|err| format_err!(err))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    log_heading();

    let input = read_latsym_yaml::<Input, _>(&cli.config).with_context(|| {
        format!(
            "Unable to read the configuration file `{}`",
            cli.config.display()
        )
    })?;
    input.handle().map_err(|err| {
        log::error!("{err:#}");
        err
    })
}
