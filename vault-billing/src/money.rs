/// Format an amount in rupees: `₹` glyph plus Indian digit grouping,
/// where the last three digits form one group and the rest pair up
/// (1234567 → "₹12,34,567").
///
/// Fractions print only when present, to at most three digits with
/// trailing zeros dropped; negative amounts keep the glyph first
/// ("₹-5"), matching how the preview renders them.
pub fn format_inr(amount: f64) -> String {
    format!("₹{}", group_indian(amount))
}

fn group_indian(amount: f64) -> String {
    let negative = amount < 0.0;
    let rounded = format!("{:.3}", amount.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (rounded.as_str(), ""),
    };

    let digits = int_part.as_bytes();
    let grouped = if digits.len() <= 3 {
        int_part.to_string()
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = head
            .rchunks(2)
            .rev()
            .map(|c| std::str::from_utf8(c).expect("ascii digits"))
            .collect();
        groups.push(std::str::from_utf8(tail).expect("ascii digits"));
        groups.join(",")
    };

    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_amounts_have_no_separator() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(7.0), "₹7");
        assert_eq!(format_inr(657.0), "₹657");
    }

    #[test]
    fn indian_grouping_pairs_after_the_last_three() {
        assert_eq!(format_inr(1234.0), "₹1,234");
        assert_eq!(format_inr(12345.0), "₹12,345");
        assert_eq!(format_inr(123456.0), "₹1,23,456");
        assert_eq!(format_inr(1234567.0), "₹12,34,567");
        assert_eq!(format_inr(123456789.0), "₹12,34,56,789");
    }

    #[test]
    fn fractions_keep_up_to_three_digits() {
        assert_eq!(format_inr(549.5), "₹549.5");
        assert_eq!(format_inr(1999.99), "₹1,999.99");
        assert_eq!(format_inr(0.125), "₹0.125");
    }

    #[test]
    fn whole_number_floats_drop_the_point() {
        assert_eq!(format_inr(707.000), "₹707");
    }

    #[test]
    fn negative_amounts_put_the_glyph_first() {
        assert_eq!(format_inr(-5.0), "₹-5");
        assert_eq!(format_inr(-123456.0), "₹-1,23,456");
    }
}
