/// Format a second count as zero-padded `MM:SS`.
///
/// Minutes are never rolled over into hours, so 3661 seconds is `61:01`.
pub fn format_timestamp(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parse either a bare second count (`"125"`) or `MM:SS` (`"02:05"`).
///
/// The seconds part must be exactly two digits but is not range checked,
/// so `"01:99"` is 159. Anything else, including surrounding whitespace or a
/// sign, is rejected.
pub fn parse_timestamp(text: &str) -> Option<u64> {
    if is_digits(text) {
        return text.parse().ok();
    }

    let (minutes, seconds) = text.split_once(':')?;
    if !is_digits(minutes) || seconds.len() != 2 || !is_digits(seconds) {
        return None;
    }

    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    minutes.checked_mul(60)?.checked_add(seconds)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
