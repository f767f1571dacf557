/// Round `value` to `scale` decimal places, half away from zero, working on the
/// shortest decimal representation of the value rather than its binary expansion.
///
/// `2.675_f64` is stored as `2.67499999...`, but it prints as `2.675`, so it rounds
/// to `2.68`. Non-finite values are returned unchanged.
pub fn round_half_up(value: f64, scale: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let repr = format!("{}", value.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let scale_len = scale as usize;
    if frac_part.len() <= scale_len {
        return value;
    }

    // A fractional part only exists below 2^53, so the digits fit comfortably.
    let kept = format!("{}{}", int_part, &frac_part[..scale_len]);
    let mut digits: u128 = match kept.parse() {
        Ok(d) => d,
        Err(_) => return value,
    };
    if frac_part.as_bytes()[scale_len] >= b'5' {
        digits += 1;
    }

    let rounded = digits as f64 / 10f64.powi(scale as i32);
    if value.is_sign_negative() {
        -rounded
    } else {
        rounded
    }
}
