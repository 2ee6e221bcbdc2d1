//! Formatting of balances in ledger units.

/// The ledger's units, smallest first. Each step is a factor of 1000.
const UNITS: [&str; 6] = ["i", "Ki", "Mi", "Gi", "Ti", "Pi"];

/// Formats `value` in the largest unit it reaches.
///
/// Plain iotas are printed as integers; larger units get two decimals.
pub fn format_best(value: u64) -> String {
    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && value >= scale * 1000 {
        unit += 1;
        scale *= 1000;
    }

    if unit == 0 {
        format!("{} {}", value, UNITS[0])
    } else {
        format!("{:.2} {}", value as f64 / scale as f64, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_largest_unit() {
        assert_eq!(format_best(0), "0 i");
        assert_eq!(format_best(999), "999 i");
        assert_eq!(format_best(1_000), "1.00 Ki");
        assert_eq!(format_best(1_500_000), "1.50 Mi");
        assert_eq!(format_best(2_779_530_283_277_761), "2.78 Pi");
    }
}
