//! Number formatting for tick labels and annotations

/// Format an integer with `sep` between groups of three digits.
///
/// `group_thousands(250000, ' ')` gives `"250 000"`.
pub fn group_thousands(value: u64, sep: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

/// Format a value for a log-scale axis tick.
///
/// Values of 1 and above are rounded and grouped with `,`; smaller values keep
/// enough decimals to stay distinct (`0.01`, `0.5`).
pub fn format_tick(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    if value >= 1.0 {
        return group_thousands(value.round() as u64, ',');
    }
    let decimals = (-value.log10()).ceil().max(1.0) as usize;
    let text = format!("{:.*}", decimals, value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format a measurement as `mean ± error` with three decimals.
pub fn format_measurement(mean: f64, error: f64) -> String {
    if error > 0.0 {
        format!("{:.3} ± {:.3}", mean, error)
    } else {
        format!("{:.3}", mean)
    }
}
