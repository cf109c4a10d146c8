use crate::models::ring_average::RingAverage;
use crate::util::human::{fmt_average, fmt_value};

/// Generate a human-readable dump of the buffer's state to a String.
pub fn generate(avg: &RingAverage, precision: usize) -> String {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut out = String::new();

    out.push_str("═══════════════════════════════════════════════\n");
    out.push_str(&format!("  Moving Average Dump — {}\n", now));
    out.push_str("═══════════════════════════════════════════════\n\n");
    out.push_str(&render_state(avg, precision));
    out.push_str("═══════════════════════════════════════════════\n");
    out
}

/// The body of the dump without the timestamped banner.
pub fn render_state(avg: &RingAverage, precision: usize) -> String {
    let mut out = String::new();

    out.push_str("── Structure ──────────────────────────────────\n");
    out.push_str(&format!("  Element Count : {}\n", avg.count()));
    out.push_str(&format!("  Max Elements  : {}\n", avg.capacity()));
    out.push_str(&format!("  Write Cursor  : {}\n", avg.write_cursor()));
    out.push_str(&format!("  Average       : {}\n", fmt_average(avg.average(), precision)));
    out.push_str(&format!("  Running Sum   : {}\n", fmt_value(avg.running_sum(), precision)));
    out.push('\n');

    out.push_str(&format!("── Samples ({}) ────────────────────────────────\n", avg.count()));
    if avg.is_empty() {
        out.push_str("  (empty)\n");
    }
    for s in avg.samples() {
        out.push_str(&format!("  Seq: {:<8} Value: {}\n", s.seq, fmt_value(s.value, precision)));
    }
    out.push_str(&format!("  Next Sequence : {}\n", avg.next_sequence()));
    out.push('\n');
    out
}
