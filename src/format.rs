//! Human-readable byte-size formatting.

/// Unit labels for binary (1024-step) size formatting.
const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count using binary (1024) unit steps.
///
/// Zero bytes formats as `0 B` with the requested decimals; values beyond
/// the TB step stay in TB.
///
/// # Examples
///
/// ```
/// use drive_fetch::format_human_size;
///
/// assert_eq!(format_human_size(1024, 2), "1.00 KB");
/// assert_eq!(format_human_size(1_048_576, 0), "1 MB");
/// ```
#[must_use]
pub fn format_human_size(bytes: u64, decimals: usize) -> String {
    let mut value = bytes as f64;
    let mut unit = 0usize;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.decimals$} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_kilobyte() {
        assert_eq!(format_human_size(1024, 2), "1.00 KB");
    }

    #[test]
    fn test_one_megabyte_no_decimals() {
        assert_eq!(format_human_size(1_048_576, 0), "1 MB");
    }

    #[test]
    fn test_zero_bytes_is_defined() {
        assert_eq!(format_human_size(0, 2), "0.00 B");
    }

    #[test]
    fn test_sub_kilobyte_stays_in_bytes() {
        assert_eq!(format_human_size(999, 0), "999 B");
    }

    #[test]
    fn test_fractional_sizes() {
        assert_eq!(format_human_size(1536, 1), "1.5 KB");
        assert_eq!(format_human_size(1_572_864, 2), "1.50 MB");
    }

    #[test]
    fn test_huge_values_cap_at_terabytes() {
        // 5 PB still renders in TB, the largest supported unit.
        let five_pb = 5 * 1024u64.pow(5);
        assert_eq!(format_human_size(five_pb, 0), "5120 TB");
    }
}
