//! Display helpers.

/// Format large numbers compactly: `1500` → `1.5K`, `2_000_000` → `2M`.
pub fn format_large_number(value: f64) -> String {
    let compact = |v: f64, suffix: &str| {
        let s = format!("{v:.1}");
        let s = s.strip_suffix(".0").unwrap_or(&s).to_string();
        format!("{s}{suffix}")
    };

    if value >= 1_000_000_000.0 {
        compact(value / 1_000_000_000.0, "B")
    } else if value >= 1_000_000.0 {
        compact(value / 1_000_000.0, "M")
    } else if value >= 1_000.0 {
        compact(value / 1_000.0, "K")
    } else {
        value.to_string()
    }
}

/// `0x1234567890...` → `0x1234...7890`
pub fn truncate_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_large_number() {
        assert_eq!(format_large_number(999.0), "999");
        assert_eq!(format_large_number(1_500.0), "1.5K");
        assert_eq!(format_large_number(2_000_000.0), "2M");
        assert_eq!(format_large_number(1_000_000_000.0), "1B");
    }

    #[test]
    fn test_truncate_address() {
        assert_eq!(
            truncate_address("0xabcdef0123456789abcdef0123456789abcdef01"),
            "0xabcd...ef01"
        );
        assert_eq!(truncate_address("0x1234"), "0x1234");
    }
}
