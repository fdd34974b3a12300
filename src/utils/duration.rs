use anyhow::{anyhow, bail, Result};

/// Parses `1500ms`, `90s`, `25m`, `1h` or a bare number of milliseconds.
pub fn parse_duration_ms(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("duration must not be empty");
    }

    let split_at = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split_at);
    if digits.is_empty() {
        bail!("duration '{input}' must start with a number");
    }

    let value: u64 = digits
        .parse()
        .map_err(|err| anyhow!("invalid duration '{input}': {err}"))?;
    let factor = match unit.trim() {
        "" | "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        other => bail!("unknown duration unit '{other}' in '{input}'"),
    };

    value
        .checked_mul(factor)
        .ok_or_else(|| anyhow!("duration '{input}' is too large"))
}

/// Renders milliseconds as `HH:MM:SS`, rounding partial seconds up so a
/// countdown never shows zero while time is left.
pub fn format_clock(ms: u64) -> String {
    let total_secs = ms.div_ceil(1000);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
