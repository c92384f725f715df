//! Metric name and label value formatting.

/// Separator placed between the non-empty parts of a metric name
pub const NAME_SEPARATOR: char = '_';

/// Join the non-empty parts of a metric name with `_`.
///
/// `build_metric("node", "load1", "")` is `node_load1`, and an empty prefix
/// leaves the name untouched.
pub fn build_metric(prefix: &str, name: &str, suffix: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + name.len() + suffix.len() + 2);
    for part in [prefix, name, suffix] {
        if part.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(NAME_SEPARATOR);
        }
        out.push_str(part);
    }
    out
}

/// Prefix to hand to [`build_metric`] for `metric_name`.
///
/// Empty when the name already starts with `default_prefix`, so applying it
/// any number of times prefixes a name at most once.
pub fn resolve_prefix<'a>(default_prefix: &'a str, metric_name: &str) -> &'a str {
    if metric_name.as_bytes().starts_with(default_prefix.as_bytes()) {
        ""
    } else {
        default_prefix
    }
}

/// Format a float the way `quantile` and `le` label values are written.
///
/// Shortest round-trip digits, decimal notation while the decimal exponent
/// is in `[-4, 6)` and `d.ddde±XX` outside it. `1.0` is `"1"`, `1e6` is
/// `"1e+06"` and positive infinity is `"+Inf"`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }

    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..6).contains(&exponent) {
        value.to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
    }
}
