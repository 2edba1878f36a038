//! Display helpers shared by check results and localized explanations.

/// Rounds a dollar amount to whole cents.
pub fn to_cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

/// Inclusive threshold comparison at cent precision.
pub fn meets(actual: f64, threshold: f64) -> bool {
    to_cents(actual) >= to_cents(threshold)
}

/// Formats an amount as US currency, e.g. `$12,500.00`.
pub fn currency(value: f64) -> String {
    let cents = to_cents(value);
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, digit) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Formats a multiplier or percentage without trailing zeros.
pub fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

pub fn count(value: u32, singular: &str, plural: &str) -> String {
    if value == 1 {
        format!("{value} {singular}")
    } else {
        format!("{value} {plural}")
    }
}
