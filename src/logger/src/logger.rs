use std::io::Write;

use env_logger::fmt::{Color, Formatter};
use env_logger::{Builder, Env};
use log::{Level, LevelFilter, Record};

/// Environment variable overriding the command-line verbosity.
pub const LOG_ENV_VAR: &str = "GRANK_LOG";

/// Console logger for grank-rs.
///
/// Batch results stream to the standard output, so every log row goes to
/// stderr (env_logger's default target) and stays on a single short line.
/// Verbosity comes from the number of `-v` flags and may be overriden at
/// runtime through `GRANK_LOG`.
pub struct Logger;

impl Logger {

    pub fn init(verbosity: u8) {
        Builder::new()
            .filter_level(verbosity_filter(verbosity))
            .parse_env(Env::default().filter(LOG_ENV_VAR))
            .format(write_record)
            .try_init()
            .expect("the logger is initialized exactly once");
    }

    pub fn set_level(verbosity: u8) {
        log::set_max_level(verbosity_filter(verbosity));
    }
}

/// `-v` occurrence count to filter. Warnings stay on unless `-q` drops the
/// count to zero; anything past `-vvv` saturates at trace.
pub fn verbosity_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// One stderr row: `[HH:MM:SS LEVEL] message`, with the raising code location
/// spliced in on error rows so failed batch runs point somewhere useful.
fn write_record(buf: &mut Formatter, record: &Record<'_>) -> std::io::Result<()> {
    let mut tag = buf.style();
    tag.set_color(level_color(record.level())).set_bold(true);

    let time = chrono::Local::now().format("%H:%M:%S");
    write!(buf, "[{time} {: <5}] ", tag.value(record.level()))?;
    if record.level() == Level::Error {
        write!(buf, "({}:{}) ", record.file().unwrap_or("?"), record.line().unwrap_or(0))?;
    }
    writeln!(buf, "{}", record.args())
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error           => Color::Red,
        Level::Warn            => Color::Yellow,
        Level::Info            => Color::Green,
        Level::Debug | Level::Trace => Color::Cyan,
    }
}
