//! `time-convert` and `time-elapsed`: run times in seconds, minutes or hours.

use crate::error::{ToolError, ToolResult};
use crate::io::{open_piped_input, STDIO};
use anyhow::Result;
use chrono::NaiveDateTime;
use clap::{Args, ValueEnum};
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeUnit {
    #[value(name = "s")]
    Seconds,
    #[value(name = "m")]
    Minutes,
    #[value(name = "h")]
    Hours,
}

impl TimeUnit {
    fn seconds(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3600.0,
        }
    }

    fn from_suffix(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            's' => Some(TimeUnit::Seconds),
            'm' => Some(TimeUnit::Minutes),
            'h' => Some(TimeUnit::Hours),
            _ => None,
        }
    }
}

fn invalid(time: &str, reason: &str) -> ToolError {
    ToolError::InvalidArgument(format!("invalid time '{}': {}", time, reason))
}

/// Timestamp layout of `time-elapsed`, e.g. `2019-03-01 14:05:09`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses `<number>[s|m|h]` or a clock time (`ss`, `mm:ss`, `hh:mm:ss`,
/// optionally with `h`/`m`/`s` suffixes on the fields) into seconds. A number
/// without a unit is taken as seconds.
pub fn parse_duration(time: &str) -> ToolResult<f64> {
    let time = time.trim();
    if time.contains(':') {
        let fields: Vec<&str> = time.split(':').collect();
        if fields.len() > 3 {
            return Err(invalid(time, "expected hh:mm:ss"));
        }
        let mut seconds = 0.0;
        for (field, unit) in fields.iter().rev().zip([1.0, 60.0, 3600.0]) {
            let value: f64 = field
                .trim_matches(|c: char| "hmsHMS".contains(c))
                .parse()
                .map_err(|_| invalid(time, "expected hh:mm:ss"))?;
            seconds += value * unit;
        }
        return Ok(seconds);
    }

    let (number, unit) = match time.chars().last().and_then(TimeUnit::from_suffix) {
        Some(unit) => (&time[..time.len() - 1], unit),
        None => (time, TimeUnit::Seconds),
    };
    let value: f64 = number
        .parse()
        .map_err(|_| invalid(time, "expected a number with an optional unit (s, m or h), e.g. 350m"))?;
    Ok(value * unit.seconds())
}

/// Parses a `%Y-%m-%d %H:%M:%S` timestamp. Fractional seconds are dropped.
pub fn parse_timestamp(timestamp: &str) -> ToolResult<NaiveDateTime> {
    let whole = timestamp.trim().split('.').next().unwrap_or_default();
    NaiveDateTime::parse_from_str(whole, TIMESTAMP_FORMAT).map_err(|e| {
        ToolError::InvalidArgument(format!(
            "invalid timestamp '{}': {} (expected YYYY-MM-DD HH:MM:SS)",
            timestamp.trim(),
            e
        ))
    })
}

/// Time from `start` to `end` in `unit`. Negative when `end` comes first.
pub fn elapsed(start: &str, end: &str, unit: TimeUnit) -> ToolResult<f64> {
    let delta = parse_timestamp(end)? - parse_timestamp(start)?;
    Ok(delta.num_seconds() as f64 / unit.seconds())
}

pub fn convert(time: &str, unit: TimeUnit) -> ToolResult<f64> {
    Ok(parse_duration(time)? / unit.seconds())
}

#[derive(Args, Debug)]
pub struct TimeConvertCmd {
    /// Time such as `350m`, `1.5h` or `01:20:05` (`-` reads one line from stdin)
    pub time: String,

    /// Unit to convert to
    #[arg(value_enum, default_value = "m")]
    pub unit: TimeUnit,
}

impl TimeConvertCmd {
    pub fn run(&self) -> Result<()> {
        let time = if self.time == STDIO {
            let mut line = String::new();
            open_piped_input(Path::new(STDIO), "the time")?.read_line(&mut line)?;
            line
        } else {
            self.time.clone()
        };
        println!("{}", convert(&time, self.unit)?);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct TimeElapsedCmd {
    /// Start time, e.g. `2019-03-01 14:05:09`
    #[arg(short, long)]
    pub start: String,

    /// End time in the same format
    #[arg(short, long)]
    pub end: String,

    /// Unit to report in
    #[arg(value_enum, default_value = "m")]
    pub unit: TimeUnit,
}

impl TimeElapsedCmd {
    pub fn run(&self) -> Result<()> {
        println!("{}", elapsed(&self.start, &self.end, self.unit)?);
        Ok(())
    }
}
