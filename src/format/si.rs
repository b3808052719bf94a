/// How many decimal places a formatted value gets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Precision {
    /// Explicit decimal count.
    Fixed(usize),
    /// Derive the decimal count from an axis tick size: finer gridlines
    /// need more decimals to keep adjacent labels distinguishable.
    TickSize(f64),
}

impl Precision {
    fn decimals(&self) -> usize {
        match *self {
            Precision::Fixed(decimals) => decimals,
            Precision::TickSize(tick) => decimals_for_tick(tick),
        }
    }

    /// Precision against a rescaled axis: dividing the values by `scale`
    /// divides the effective tick size too.
    fn rescaled(&self, scale: f64) -> Self {
        match *self {
            Precision::Fixed(decimals) => Precision::Fixed(decimals),
            Precision::TickSize(tick) => Precision::TickSize(tick / scale),
        }
    }
}

fn decimals_for_tick(tick: f64) -> usize {
    if tick < 0.01 {
        3
    } else if tick < 0.1 {
        2
    } else if tick < 1.0 {
        1
    } else {
        0
    }
}

const PREFIXES: [&str; 6] = ["", "k", "M", "G", "T", "P"];

/// Magnitude step for one SI prefix of the given unit: 1000 for Watts,
/// 1000² and 1000³ for squared/cubed units, 1024 for everything else
/// (byte-flavoured monitoring data).
fn step_for_unit(unit: &str) -> f64 {
    if unit.ends_with('²') {
        1_000_000.0
    } else if unit.ends_with('³') {
        1_000_000_000.0
    } else if unit.ends_with('W') {
        1000.0
    } else {
        1024.0
    }
}

/// Units whose sign is meaningful and must survive formatting.
/// Negated plot channels, by contrast, are displayed by magnitude.
fn keeps_sign(unit: &str) -> bool {
    unit.contains('°') || unit.contains('℃')
}

/// Formats a raw magnitude as a human-readable value with an SI/binary
/// prefix and unit suffix.
///
/// Unit-specific rules, in the order they are checked:
/// - `"ms"` values are durations: rescaled to µs, ms, s, hours or days,
///   with the precision recomputed against the rescaled tick size.
/// - A unit already carrying a `k`/`M` prefix (`"kB"`, `"MW"`) has the
///   prefix absorbed into the value before scaling, so the output never
///   stacks prefixes ("kkB").
/// - A leading `i` followed by anything but `o` marks a pre-scaled unit
///   (`"iB"` totals from the volume aggregator): the sentinel is stripped
///   and the value printed literally. `"io/s"` is a real unit, not a
///   sentinel.
/// - Everything else scales through none/k/M/G/T/P.
///
/// Zero never scales and falls through to the unscaled branch.
pub fn si(value: f64, precision: Precision, unit: &str) -> String {
    let negative = value < 0.0;
    let magnitude = value.abs();

    if unit == "ms" {
        return format_duration(magnitude, negative, precision);
    }

    // Absorb a prefix already baked into the unit string.
    let (mut magnitude, unit) = match unit.strip_prefix('k') {
        Some(rest) if !rest.is_empty() => (magnitude * step_for_unit(rest), rest),
        _ => match unit.strip_prefix('M') {
            Some(rest) if !rest.is_empty() => {
                let step = step_for_unit(rest);
                (magnitude * step * step, rest)
            }
            _ => (magnitude, unit),
        },
    };

    if let Some(rest) = unit.strip_prefix('i') {
        if !rest.starts_with('o') {
            return render(magnitude, negative && keeps_sign(unit), precision.decimals(), "", rest);
        }
    }

    let step = step_for_unit(unit);
    let mut prefix_index = 0;
    while magnitude >= step && prefix_index < PREFIXES.len() - 1 {
        magnitude /= step;
        prefix_index += 1;
    }
    render(
        magnitude,
        negative && keeps_sign(unit),
        precision.decimals(),
        PREFIXES[prefix_index],
        unit,
    )
}

/// Sub- and super-second rendering for millisecond durations.
fn format_duration(magnitude: f64, negative: bool, precision: Precision) -> String {
    const HOUR_MS: f64 = 3_600_000.0;
    const DAY_MS: f64 = 86_400_000.0;
    let (scaled, scale, unit) = if magnitude > 0.0 && magnitude < 1.0 {
        (magnitude * 1000.0, 0.001, "µs")
    } else if magnitude < 1000.0 {
        (magnitude, 1.0, "ms")
    } else if magnitude < HOUR_MS {
        (magnitude / 1000.0, 1000.0, "s")
    } else if magnitude < DAY_MS {
        (magnitude / HOUR_MS, HOUR_MS, "h")
    } else {
        (magnitude / DAY_MS, DAY_MS, "d")
    };
    render(scaled, negative, precision.rescaled(scale).decimals(), "", unit)
}

fn render(magnitude: f64, negative: bool, decimals: usize, prefix: &str, unit: &str) -> String {
    let sign = if negative { "-" } else { "" };
    format!("{sign}{magnitude:.decimals$} {prefix}{unit}")
}
