/// Bytes in one megabyte; filesystem sizes arrive in MB.
pub const MB: f64 = 1_048_576.0;

/// Format a raw byte count into a human-readable string: "12.5 MiB"
pub fn fmt_bytes(bytes: f64) -> String {
    if bytes < 0.0 {
        return format!("-{}", fmt_bytes(-bytes));
    }
    const TIB: f64 = 1_099_511_627_776.0;
    const GIB: f64 = 1_073_741_824.0;
    const KIB: f64 = 1_024.0;
    if bytes >= TIB      { format!("{} TiB", trim2(bytes / TIB)) }
    else if bytes >= GIB { format!("{} GiB", trim2(bytes / GIB)) }
    else if bytes >= MB  { format!("{} MiB", trim2(bytes / MB)) }
    else if bytes >= KIB { format!("{} KiB", trim2(bytes / KIB)) }
    else                 { format!("{:.0} B", bytes) }
}

/// Format a megabyte count: `fmt_mb(800.0)` is "800 MiB".
pub fn fmt_mb(mb: f64) -> String {
    fmt_bytes(mb * MB)
}

/// Signed variant for growth values: "+1.5 GiB", "-200 MiB"
pub fn fmt_bytes_signed(bytes: f64) -> String {
    if bytes >= 0.0 { format!("+{}", fmt_bytes(bytes)) } else { fmt_bytes(bytes) }
}

/// Format a percentage with two decimals: "84.50%"
pub fn fmt_pct(pct: f64) -> String {
    format!("{:.2}%", pct)
}

/// Whole counts such as inodes: "1654272"
pub fn fmt_count(n: f64) -> String {
    format!("{:.0}", n)
}

/// Format a duration in seconds using its two most significant units:
/// "6 minutes 0 seconds", "2 hours 0 minutes", "0 seconds".
pub fn fmt_timespan(seconds: f64) -> String {
    if seconds < 0.0 {
        return format!("-{}", fmt_timespan(-seconds));
    }
    let secs = seconds.round() as u64;
    const UNITS: &[(u64, &str)] = &[
        (365 * 86_400, "year"),
        (86_400,       "day"),
        (3_600,        "hour"),
        (60,           "minute"),
        (1,            "second"),
    ];

    for (i, (size, name)) in UNITS.iter().enumerate() {
        if secs >= *size || *size == 1 {
            let major = secs / size;
            let mut text = plural(major, name);
            if let Some((next_size, next_name)) = UNITS.get(i + 1) {
                let minor = (secs % size) / next_size;
                text.push(' ');
                text.push_str(&plural(minor, next_name));
            }
            return text;
        }
    }
    unreachable!("the seconds unit always matches")
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 { format!("1 {}", unit) } else { format!("{} {}s", n, unit) }
}

fn trim2(v: f64) -> String {
    let s = format!("{:.2}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
