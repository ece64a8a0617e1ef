use anstyle::{AnsiColor, Style};
use env_logger::{Builder, Target, WriteStyle};
use log::kv::Key;
use std::io::Write;

const DIM: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::BrightBlack)));
const CYAN: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::Cyan)));

/// Width of the duration column; continuation lines are indented past it.
const DURATION_WIDTH: usize = 10;

/// `12.3456ms` -> `12.35 ms`
fn format_duration(raw: &str) -> String {
    if let Some(idx) = raw.find(|c: char| c.is_alphabetic()) {
        let (num, unit) = raw.split_at(idx);
        if let Ok(value) = num.parse::<f32>() {
            return format!("{:.2} {}", value, unit);
        }
    }
    raw.to_string()
}

/// Logs go to stderr: timestamp, level and target on one line, then the
/// message prefixed by an optional `duration` key-value.
pub fn initialize_logger() {
    Builder::new()
        .write_style(WriteStyle::Auto)
        .format(|buf, record| {
            let level_style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{DIM}{}{DIM:#} {level_style}{}{level_style:#} {DIM}{}{DIM:#}",
                buf.timestamp(),
                record.level(),
                record.target(),
            )?;

            let duration = record
                .key_values()
                .get(Key::from("duration"))
                .map(|value| format_duration(&value.to_string()))
                .unwrap_or_default();
            let duration = if duration.is_empty() {
                " ".repeat(DURATION_WIDTH)
            } else {
                format!("{CYAN}{:>width$}{CYAN:#}", duration, width = DURATION_WIDTH)
            };

            let message = record.args().to_string();
            let mut lines = message.lines();
            if let Some(first) = lines.next() {
                writeln!(buf, "{} {}", duration, first)?;
            }
            for line in lines {
                writeln!(buf, "{}{}", " ".repeat(DURATION_WIDTH + 1), line)?;
            }
            Ok(())
        })
        .target(Target::Stderr)
        // INFO+ globally, WARN+ for Rocket; RUST_LOG refines both
        .filter(None, log::LevelFilter::Info)
        .filter(Some("rocket"), log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}
