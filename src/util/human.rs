use crate::error::Result;

/// Format a sample or statistic with a fixed number of decimals: "12.500"
pub fn fmt_value(v: f64, precision: usize) -> String {
    format!("{:.*}", precision, v)
}

/// Format an average, or "—" when there is nothing to average.
pub fn fmt_average(avg: Result<f64>, precision: usize) -> String {
    match avg {
        Ok(v)  => fmt_value(v, precision),
        Err(_) => "—".to_string(),
    }
}
