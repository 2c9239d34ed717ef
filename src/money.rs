//! Currency formatting for report cells.

const GROUP_SEPARATOR: char = ',';
const GROUP_SIZE: usize = 3;

/// Formats `amount` as `$<grouped integer>.<two decimals>`, e.g. `96818.71` as `$96,818.71`.
///
/// Negative amounts carry the sign in front of the currency symbol (`-$1,234.50`). Amounts that
/// round to zero are always printed as `$0.00`.
pub fn format_money(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let grouped = group_thousands(integer);
    let negative = amount.is_sign_negative() && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));

    if negative {
        format!("-${grouped}.{fraction}")
    } else {
        format!("${grouped}.{fraction}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / GROUP_SIZE);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % GROUP_SIZE == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::format_money;

    #[test]
    fn formats_reference_amounts() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(12.0), "$12.00");
        assert_eq!(format_money(1000.0), "$1,000.00");
        assert_eq!(format_money(96818.71), "$96,818.71");
    }

    #[test]
    fn groups_every_three_digits() {
        assert_eq!(format_money(999.999), "$1,000.00");
        assert_eq!(format_money(123456.5), "$123,456.50");
        assert_eq!(format_money(1234567.891), "$1,234,567.89");
        assert_eq!(format_money(100000000.0), "$100,000,000.00");
    }

    #[test]
    fn negative_amounts_keep_sign_outside_symbol() {
        assert_eq!(format_money(-1234.5), "-$1,234.50");
        assert_eq!(format_money(-0.001), "$0.00");
        assert_eq!(format_money(-0.0), "$0.00");
    }

    #[test]
    fn formatting_is_repeatable() {
        let amount = 45123.456;
        assert_eq!(format_money(amount), format_money(amount));
    }
}
