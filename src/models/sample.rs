use serde::Serialize;

/// One retained value and the order it was pushed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Sample {
    /// Per-instance insertion number, for diagnostics only.
    pub seq:   u64,
    pub value: f64,
}
