use crate::foundation::core::PolarPosition;

/// A track line that could not be turned into a waypoint.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("line {line_no}: {reason} (tokens: {tokens:?}, line: '{line}')")]
pub struct TrackParseError {
    /// 1-based line number in the source text.
    pub line_no: usize,
    /// Trimmed line content.
    pub line: String,
    /// Whitespace-separated tokens found on the line.
    pub tokens: Vec<String>,
    /// What was wrong with the tokens.
    pub reason: String,
}

/// Return `true` for lines that carry no waypoint: blanks, comments and the column header.
pub fn is_ignorable(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with("//") || line.starts_with("theta")
}

/// Parse `.thr` track text into waypoints, in file order.
///
/// Each significant line holds `<theta> <rho>` separated by any whitespace; extra tokens are
/// ignored. The first malformed line aborts parsing.
pub fn parse_waypoints<'a, I>(lines: I) -> Result<Vec<PolarPosition>, TrackParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = Vec::new();
    for (idx, raw) in lines.into_iter().enumerate() {
        let line = raw.trim();
        if is_ignorable(line) {
            continue;
        }
        out.push(parse_line(idx + 1, line)?);
    }
    Ok(out)
}

/// Parse a whole track file body.
pub fn parse_track_text(text: &str) -> Result<Vec<PolarPosition>, TrackParseError> {
    parse_waypoints(text.lines())
}

fn parse_line(line_no: usize, line: &str) -> Result<PolarPosition, TrackParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let fail = |reason: String| TrackParseError {
        line_no,
        line: line.to_string(),
        tokens: tokens.iter().map(|t| t.to_string()).collect(),
        reason,
    };

    let [theta_tok, rho_tok, ..] = tokens.as_slice() else {
        return Err(fail(format!(
            "expected '<theta> <rho>', found {} token(s)",
            tokens.len()
        )));
    };

    let theta = theta_tok
        .parse::<f64>()
        .map_err(|e| fail(format!("invalid theta '{theta_tok}': {e}")))?;
    let rho = rho_tok
        .parse::<f64>()
        .map_err(|e| fail(format!("invalid rho '{rho_tok}': {e}")))?;
    if !theta.is_finite() || !rho.is_finite() {
        return Err(fail("theta and rho must be finite".to_string()));
    }

    Ok(PolarPosition { theta, rho })
}

#[cfg(test)]
#[path = "../../tests/unit/track/parse.rs"]
mod tests;
