use anyhow::{Context, Result};

/// Parse a stream of samples. Values are separated by whitespace or commas;
/// `#` comments out the rest of a line.
pub fn parse_samples(text: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("");
        for tok in line.split(|c: char| c.is_whitespace() || c == ',') {
            if tok.is_empty() {
                continue;
            }
            out.push(parse_value(tok).with_context(|| format!("line {}", lineno + 1))?);
        }
    }
    Ok(out)
}

/// Parse one finite sample.
pub fn parse_value(tok: &str) -> Result<f64> {
    let v: f64 = tok
        .trim()
        .parse()
        .with_context(|| format!("invalid sample '{}'", tok))?;
    if !v.is_finite() {
        anyhow::bail!("sample '{}' is not finite", tok);
    }
    Ok(v)
}
