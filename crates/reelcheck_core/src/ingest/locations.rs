//! Location file parsing.
//!
//! Fixed layout after dropping empty lines:
//!
//! ```text
//! 0      title
//! 1      Producer: <value>
//! 2      Operator: <value>
//! 3      Job: <value>
//! 4      location block header
//! 5..    canonical locations (lines containing '/')
//! len-2  notes header
//! len-1  notes
//! ```

use std::fs;
use std::path::Path;

use super::{IngestError, IngestResult};
use crate::models::LocationSet;

/// Minimum number of non-empty lines in a well-formed location file.
pub const MIN_LOCATION_LINES: usize = 8;

const LOCATIONS_START: usize = 5;
const TRAILING_LINES: usize = 2;

/// Extract the value of a `Key: value` header line, checking the key.
fn header_value(lines: &[&str], index: usize, field: &'static str) -> IngestResult<String> {
    let line = lines[index];
    match line.split_once(':') {
        Some((key, value)) if key.trim() == field => Ok(value.trim().to_string()),
        _ => Err(IngestError::MissingField {
            line: index + 1,
            field,
            text: line.to_string(),
        }),
    }
}

/// Parse location file contents into a validated [`LocationSet`].
pub fn parse_location_str(content: &str) -> IngestResult<LocationSet> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < MIN_LOCATION_LINES {
        return Err(IngestError::TooFewLines {
            found: lines.len(),
            required: MIN_LOCATION_LINES,
        });
    }

    let producer = header_value(&lines, 1, "Producer")?;
    let operator = header_value(&lines, 2, "Operator")?;
    let job = header_value(&lines, 3, "Job")?;

    // Notes have no required delimiter
    let last = lines[lines.len() - 1];
    let notes = last
        .split_once(": ")
        .map(|(_, value)| value.trim())
        .unwrap_or(last)
        .to_string();

    let block = &lines[LOCATIONS_START..lines.len() - TRAILING_LINES];
    let locations = block
        .iter()
        .filter(|l| l.contains('/'))
        .map(|l| l.to_string());

    Ok(LocationSet::new(producer, operator, job, notes, locations))
}

/// Read and parse a location file.
pub fn parse_location_file(path: &Path) -> IngestResult<LocationSet> {
    let content = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let set = parse_location_str(&content)?;
    tracing::debug!(
        "Parsed {} canonical locations from {}",
        set.len(),
        path.display()
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Workorder 1107

Producer: Joe Schmoe
Operator: John Doe
Job: Dirtfixing

Location:
/hpsans13/production/Dune/reel1/partA/1920x1080
/hpsans12/production/Dune/reel1/VFX/Hydraulx
not a path
/hpsans13/production/Dune/reel1/partA/1920x1080

Notes:
Please clean files noted per Colorist Tom
";

    #[test]
    fn parses_fixed_layout() {
        let set = parse_location_str(SAMPLE).unwrap();

        assert_eq!(set.producer, "Joe Schmoe");
        assert_eq!(set.operator, "John Doe");
        assert_eq!(set.job, "Dirtfixing");
        assert_eq!(set.notes, "Please clean files noted per Colorist Tom");
        assert_eq!(
            set.locations,
            vec![
                "/hpsans13/production/Dune/reel1/partA/1920x1080",
                "/hpsans12/production/Dune/reel1/VFX/Hydraulx",
            ]
        );
    }

    #[test]
    fn notes_with_delimiter_keep_value() {
        let content = SAMPLE.replace(
            "Please clean files noted per Colorist Tom",
            "Note: handle with care",
        );
        let set = parse_location_str(&content).unwrap();
        assert_eq!(set.notes, "handle with care");
    }

    #[test]
    fn too_few_lines_is_fatal() {
        let err = parse_location_str("a\nProducer: x\nOperator: y\nJob: z\n").unwrap_err();
        assert!(matches!(
            err,
            IngestError::TooFewLines {
                found: 4,
                required: 8
            }
        ));
    }

    #[test]
    fn wrong_header_key_is_fatal() {
        let content = SAMPLE.replace("Operator: John Doe", "Editor: John Doe");
        let err = parse_location_str(&content).unwrap_err();
        match err {
            IngestError::MissingField { line, field, .. } => {
                assert_eq!(line, 3);
                assert_eq!(field, "Operator");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_colon_is_fatal() {
        let content = SAMPLE.replace("Job: Dirtfixing", "Dirtfixing");
        assert!(matches!(
            parse_location_str(&content),
            Err(IngestError::MissingField { field: "Job", .. })
        ));
    }
}
