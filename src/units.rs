//! Size and percentage conversions for docker stats values.
//!
//! Sizes are normalized to bits with a decimal multiplier for both spellings
//! of a unit: `KB` and `KiB` are both 8e3 bits, `MB`/`MiB` 8e6, `GB`/`GiB` 8e9.

const KILO_BITS: f64 = 8e3;
const MEGA_BITS: f64 = 8e6;
const GIGA_BITS: f64 = 8e9;
const TERA_BITS: f64 = 8e12;

/// Convert a size such as `"12.3MiB"` or `"1.2kB"` to bits.
///
/// Unknown or missing units yield 0.
pub fn to_bits(text: &str) -> u64 {
    let unit: String = text
        .chars()
        .filter(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_ascii_lowercase();

    let multiplier = match unit.as_str() {
        "b" => 1.0,
        "kib" | "kb" => KILO_BITS,
        "mib" | "mb" => MEGA_BITS,
        "gib" | "gb" => GIGA_BITS,
        _ => return 0,
    };

    let magnitude: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    match magnitude.parse::<f64>() {
        Ok(value) => (value * multiplier) as u64,
        Err(_) => 0,
    }
}

/// Human readable size for an amount of bits, e.g. `"2 KB"`.
pub fn from_bits(bits: u64) -> String {
    let value = bits as f64;
    if value < KILO_BITS {
        format!("{} B", format_general(value / 8.0))
    } else if value < MEGA_BITS {
        format!("{} KB", format_general(value / KILO_BITS))
    } else if value < GIGA_BITS {
        format!("{} MB", format_general(value / MEGA_BITS))
    } else if value < TERA_BITS {
        format!("{} GB", format_general(value / GIGA_BITS))
    } else {
        format!("{} TB", format_general(value / TERA_BITS))
    }
}

/// Parse a percentage such as `"42.5%"`.
pub fn percentage_to_float(text: &str) -> Option<f64> {
    let text = text.trim();
    text.strip_suffix('%').unwrap_or(text).trim().parse().ok()
}

/// Smallest power of two that is >= `n`. `None` when `n` is not positive.
pub fn closest_power_of_2(n: f64) -> Option<f64> {
    if !n.is_finite() || n <= 0.0 {
        return None;
    }
    Some(2f64.powf(n.log2().ceil()))
}

/// General number formatting: 6 significant digits, no trailing zeros,
/// exponent notation for very small or very large magnitudes.
pub fn format_general(value: f64) -> String {
    const PRECISION: i32 = 6;

    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_trailing_zeros(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (PRECISION - 1 - exponent).max(0) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn strip_trailing_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
