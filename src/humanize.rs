//! Human-readable byte sizes.
//!
//! Decimal SI units (powers of 1000), the way `ls -h --si` and most
//! dashboards print them: `"5 B"`, `"1.5 kB"`, `"42 MB"`.

const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

/// Formats `n` bytes as a compact SI string.
///
/// Values below ten keep one decimal place, everything else is shown as a
/// whole number:
///
/// ```rust
/// use routedump::humanize;
///
/// assert_eq!(humanize::bytes(5), "5 B");
/// assert_eq!(humanize::bytes(1_500), "1.5 kB");
/// assert_eq!(humanize::bytes(123_456_789), "123 MB");
/// ```
pub fn bytes(n: u64) -> String {
    if n < 10 {
        return format!("{n} B");
    }

    // floor(log1000(n)), computed on integers so exact powers of 1000 never
    // land one step short through float error.
    let mut exp = 0;
    let mut scale: u64 = 1;
    while exp + 1 < UNITS.len() && n / scale >= 1000 {
        scale *= 1000;
        exp += 1;
    }

    // n / scale rounded half-up to one decimal, in tenths.
    let scale = u128::from(scale);
    let tenths = (u128::from(n) * 10 + scale / 2) / scale;

    if tenths < 100 {
        format!("{}.{} {}", tenths / 10, tenths % 10, UNITS[exp])
    } else {
        format!("{} {}", tenths / 10, UNITS[exp])
    }
}
