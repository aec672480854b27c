//! User-facing presentation of distances, drive times, and symptom lists.

const MILES_PER_METER: f64 = 0.000_621_371;

/// Converts meters to miles, rounded to two decimal places.
#[must_use]
pub fn meters_to_miles(meters: f64) -> f64 {
    (meters * MILES_PER_METER * 100.0).round() / 100.0
}

/// Formats a drive time as `"M min"`, `"1 hr, M min"`, or `"H hrs, M min"`.
///
/// Seconds are rounded to the nearest whole minute first, so 45 s reads as
/// `"1 min"`.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let minutes = (seconds.max(0.0) / 60.0).round() as u64;
    let hours = minutes / 60;
    let remaining = minutes % 60;

    match hours {
        0 => format!("{minutes} min"),
        1 => format!("1 hr, {remaining} min"),
        _ => format!("{hours} hrs, {remaining} min"),
    }
}

/// Joins terms as an English list: `a`, `a and b`, `a, b, and c`.
#[must_use]
pub fn join_terms<S: AsRef<str>>(terms: &[S]) -> String {
    match terms {
        [] => String::new(),
        [only] => only.as_ref().to_owned(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}
