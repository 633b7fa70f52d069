/*!
 * Time conversions for FCPXML projects.
 *
 * FCPXML expresses offsets and durations as seconds with an `s` suffix,
 * either as a decimal (`"3.5s"`) or as a rational (`"180/60s"`). Titles are
 * reported as `HH:MM:SS:FF` timecodes at the 60 fps reference rate that
 * Final Cut Pro uses for its timeline.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Frames per second used for every rendered timecode
pub const FRAME_RATE: u32 = 60;

/// Time token substituted when an offset or start attribute is absent
pub const ZERO_TIME: &str = "0s";

/// Time token substituted when a title has no duration attribute
pub const DEFAULT_TITLE_DURATION: &str = "7s";

// @const: Timecode regex (HH:MM:SS:FF, hours may exceed two digits)
static TIMECODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}):(\d{2}):(\d{2}):(\d{2})$").unwrap()
});

/// Parse an FCPXML time token into seconds.
///
/// Accepts `"<decimal>s"` and `"<numerator>/<denominator>s"`. Anything else,
/// including a zero denominator, yields `0.0` so that a single bad attribute
/// never aborts the extraction of an otherwise valid project.
pub fn parse_time(token: &str) -> f64 {
    try_parse_time(token).unwrap_or(0.0)
}

/// Strict variant of [`parse_time`] that reports failure as `None`.
pub fn try_parse_time(token: &str) -> Option<f64> {
    let value = token.strip_suffix('s')?;

    let seconds = match value.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator = parse_number(numerator)?;
            let denominator = parse_number(denominator)?;
            if denominator == 0.0 {
                return None;
            }
            numerator / denominator
        }
        None => parse_number(value)?,
    };

    seconds.is_finite().then_some(seconds)
}

// A second slash ends up in the denominator and fails to parse there
fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Render seconds as an `HH:MM:SS:FF` timecode at [`FRAME_RATE`].
///
/// Every component is truncated, never rounded. Hours are not wrapped at 24;
/// values of 100 hours or more simply render with more than two hour digits.
/// Negative or non-finite input renders as `00:00:00:00`.
pub fn render_timecode(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 { seconds } else { 0.0 };

    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let frames = (seconds.fract() * FRAME_RATE as f64).floor() as u64;

    format!("{:02}:{:02}:{:02}:{:02}", hours, minutes, secs, frames)
}

/// Parse an `HH:MM:SS:FF` timecode back into seconds.
///
/// Returns `None` when the string is not a well-formed timecode or when a
/// component is out of range for the 60 fps reference rate.
pub fn timecode_to_seconds(timecode: &str) -> Option<f64> {
    let captures = TIMECODE_REGEX.captures(timecode.trim())?;

    let hours: u64 = captures[1].parse().ok()?;
    let minutes: u64 = captures[2].parse().ok()?;
    let secs: u64 = captures[3].parse().ok()?;
    let frames: u64 = captures[4].parse().ok()?;

    if minutes >= 60 || secs >= 60 || frames >= FRAME_RATE as u64 {
        return None;
    }

    Some((hours * 3600 + minutes * 60 + secs) as f64 + frames as f64 / FRAME_RATE as f64)
}
