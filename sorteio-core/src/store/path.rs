use crate::error::{Result, SorteioError};

const FORBIDDEN: [char; 5] = ['.', '#', '$', '[', ']'];

/// Split a `/`-separated store path into its segments. Empty segments are
/// ignored, so `""` and `"/"` both address the root.
pub fn segments(path: &str) -> Result<Vec<String>> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if segment.contains(&FORBIDDEN[..]) {
                return Err(SorteioError::invalid_path(
                    path,
                    format!("segment '{}' contains one of . # $ [ ]", segment),
                ));
            }
            Ok(segment.to_string())
        })
        .collect()
}

pub fn join(segments: &[String]) -> String {
    segments.join("/")
}

/// Two locations overlap when one is an ancestor of (or equal to) the other.
pub fn overlaps(a: &[String], b: &[String]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}
