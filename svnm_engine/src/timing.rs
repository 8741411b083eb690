//! Wall-clock timing for load stages.

use std::time::{Duration, Instant};

use log::info;

/// Run `f`, log how long it took under `label`, and return its result.
pub fn measure_time<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    let result = f();
    info!("{label} takes {}", format_duration(started.elapsed()));
    result
}

/// Render a duration as its non-zero units, largest first: `1 d 2 h 3 m 4 s 5 ms`.
///
/// Sub-millisecond remainders are dropped; anything under a millisecond is `0 ms`.
pub fn format_duration(duration: Duration) -> String {
    let mut ms = duration.as_millis();
    if ms == 0 {
        return "0 ms".to_string();
    }

    let mut parts = Vec::new();
    for (unit, size) in [("ms", 1000), ("s", 60), ("m", 60), ("h", 24)] {
        if ms % size > 0 {
            parts.push(format!("{} {unit}", ms % size));
        }
        ms /= size;
    }
    if ms > 0 {
        parts.push(format!("{ms} d"));
    }
    parts.reverse();
    parts.join(" ")
}
