//! `text://` resource URIs.
//!
//! `text://{path}?lines={start}-{end}` maps onto a line-range read. The end
//! bound may be empty ("to end of file"): `text:///var/log/app.log?lines=5-`.

use crate::error::EditorError;
use url::Url;

/// A parsed line-range resource request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRangeRequest {
    pub file_path: String,
    pub line_start: usize,
    pub line_end: Option<usize>,
}

/// Parse a `text://` URI into a file path and inclusive line range.
pub fn parse_uri(uri: &str) -> Result<LineRangeRequest, EditorError> {
    let parsed = Url::parse(uri)
        .map_err(|e| EditorError::InvalidRequest(format!("invalid resource URI: {e}")))?;
    if parsed.scheme() != "text" {
        return Err(EditorError::InvalidRequest(format!(
            "unsupported URI scheme: {}",
            parsed.scheme()
        )));
    }

    // `text:///abs/path` carries the whole path; `text://abs/path` puts the
    // first segment in the host position. Accept both.
    let mut file_path = String::new();
    if let Some(host) = parsed.host_str()
        && !host.is_empty()
    {
        file_path.push('/');
        file_path.push_str(host);
    }
    file_path.push_str(parsed.path());

    let lines = parsed
        .query_pairs()
        .find(|(key, _)| key == "lines")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| {
            EditorError::InvalidRequest("missing 'lines' query parameter".to_string())
        })?;

    let Some((start_str, end_str)) = lines.split_once('-') else {
        return Err(EditorError::InvalidRequest(format!(
            "invalid line range '{lines}' (expected start-end)"
        )));
    };

    let line_start: usize = if start_str.is_empty() {
        1
    } else {
        start_str.parse().map_err(|_| {
            EditorError::InvalidRequest(format!("invalid start line '{start_str}'"))
        })?
    };
    let line_end: Option<usize> = if end_str.is_empty() {
        None
    } else {
        Some(end_str.parse().map_err(|_| {
            EditorError::InvalidRequest(format!("invalid end line '{end_str}'"))
        })?)
    };

    if line_start < 1 {
        return Err(EditorError::InvalidRange(
            "line numbers are 1-based".to_string(),
        ));
    }
    if let Some(end) = line_end
        && end < line_start
    {
        return Err(EditorError::InvalidRange(format!(
            "line_end {end} is before line_start {line_start}"
        )));
    }

    Ok(LineRangeRequest {
        file_path,
        line_start,
        line_end,
    })
}
