//! Number formatting for attribute strings and reports
//!
//! Rust's `{:e}` writes exponents as `e-2`; URDF files produced by the usual
//! exporters (and consumed by diff tools) use the C convention `e-02`.

/// Format with `precision` mantissa digits and a signed, two-digit exponent,
/// e.g. `5.4346870000e-02`
pub fn format_sci(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return non_finite(value);
    }
    let raw = format!("{:.*e}", precision, value);
    c_exponent(&raw)
}

/// Shortest round-trip representation, switching to scientific notation for
/// magnitudes below 1e-4 or from 1e16 upward (`0.0175`, `2.27e-20`, `2.0`)
pub fn format_shortest(value: f64) -> String {
    if !value.is_finite() {
        return non_finite(value);
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let sci = format!("{:e}", value);
    let exponent = sci
        .split_once('e')
        .and_then(|(_, exp)| exp.parse::<i32>().ok())
        .unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let plain = format!("{}", value);
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    } else {
        c_exponent(&sci)
    }
}

fn c_exponent(raw: &str) -> String {
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => raw.to_string(),
    }
}

fn non_finite(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value > 0.0 {
        "inf".to_string()
    } else {
        "-inf".to_string()
    }
}
