//! Scenario loading from line-oriented text files
//!
//! Each data line is `<role> <id> <x> <y> <z>`. Blank lines and lines
//! starting with `#` are skipped. Any other line that does not parse aborts
//! the whole load.

use crate::geometry::Position;
use crate::scenario::{Role, Scenario};
use crate::{PlannerError, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

const TOKENS_PER_LINE: usize = 5;

fn malformed(line: usize, content: &str, reason: impl Into<String>) -> PlannerError {
    PlannerError::MalformedLine {
        line,
        content: content.to_string(),
        reason: reason.into(),
    }
}

fn parse_coord(token: &str, axis: &str, line: usize, content: &str) -> Result<f64> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(malformed(
            line,
            content,
            format!("invalid {} coordinate '{}'", axis, token),
        )),
    }
}

/// Parse one data line into its role and position.
///
/// `line_no` is 1-based and only used for error reporting. Satellite ids must
/// be positive integers; ids of other roles are required but not interpreted.
pub fn parse_line(line_no: usize, content: &str) -> Result<(Role, Option<usize>, Position)> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() != TOKENS_PER_LINE {
        return Err(malformed(
            line_no,
            content,
            format!("expected {} tokens, found {}", TOKENS_PER_LINE, parts.len()),
        ));
    }

    let role: Role = parts[0]
        .parse()
        .map_err(|reason: String| malformed(line_no, content, reason))?;

    let declared_id = match role {
        Role::Satellite => match parts[1].parse::<usize>() {
            Ok(id) if id >= 1 => Some(id),
            _ => {
                return Err(malformed(
                    line_no,
                    content,
                    format!("satellite id must be a positive integer, got '{}'", parts[1]),
                ))
            }
        },
        Role::User | Role::Interferer => None,
    };

    let position = Position::new(
        parse_coord(parts[2], "x", line_no, content)?,
        parse_coord(parts[3], "y", line_no, content)?,
        parse_coord(parts[4], "z", line_no, content)?,
    );

    Ok((role, declared_id, position))
}

/// Build a scenario from any buffered reader
pub fn read_scenario(reader: impl BufRead) -> Result<Scenario> {
    let mut scenario = Scenario::new();
    let mut skipped = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            skipped += 1;
            continue;
        }

        let (role, declared_id, position) = parse_line(line_no, trimmed)?;

        if let Some(id) = declared_id {
            let index = scenario.satellites.len() + 1;
            if id != index {
                // Ids are positional; the declared one is informational only
                warn!(
                    "line {}: satellite declared as {} is satellite {} by position",
                    line_no, id, index
                );
            }
        }

        scenario.push(role, position);
    }

    info!(
        "Parsed scenario: {} users, {} satellites, {} interferers ({} comment/blank lines)",
        scenario.users.len(),
        scenario.satellites.len(),
        scenario.interferers.len(),
        skipped
    );

    Ok(scenario)
}

/// Build a scenario from file contents already in memory
pub fn parse_scenario(text: &str) -> Result<Scenario> {
    read_scenario(text.as_bytes())
}

/// Load a scenario file
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    info!("Loading scenario from {:?}", path);

    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PlannerError::ScenarioNotFound(path.to_path_buf()),
        _ => PlannerError::Io(e),
    })?;

    read_scenario(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
# Starlink scenario
sat 1 0 0 6921
sat 2 100 0 6921

user 1 0 0 6371
user 2 50 0 6371
interferer 1 0 3000 6900
";

    #[test]
    fn test_parse_scenario() {
        let scenario = parse_scenario(SAMPLE).unwrap();
        assert_eq!(scenario.satellites.len(), 2);
        assert_eq!(scenario.users.len(), 2);
        assert_eq!(scenario.interferers.len(), 1);
        assert_eq!(scenario.satellites[1], Position::new(100.0, 0.0, 6921.0));
        assert_eq!(scenario.interferers[0].y, 3000.0);
    }

    #[test]
    fn test_wrong_token_count_is_fatal() {
        let err = parse_scenario("sat 1 0 0 6921\nuser 1 0 0\n").unwrap_err();
        match err {
            PlannerError::MalformedLine { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_role_is_fatal() {
        let err = parse_scenario("ship 1 0 0 0\n").unwrap_err();
        assert!(matches!(err, PlannerError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_bad_coordinate_is_fatal() {
        assert!(parse_scenario("user 1 0 north 6371\n").is_err());
        assert!(parse_scenario("user 1 0 0 NaN\n").is_err());
    }

    #[test]
    fn test_satellite_id_must_be_positive() {
        assert!(parse_scenario("sat 0 0 0 6921\n").is_err());
        assert!(parse_scenario("sat x 0 0 6921\n").is_err());
        // Non-satellite ids are not interpreted
        assert!(parse_scenario("user x 0 0 6371\n").is_ok());
    }

    #[test]
    fn test_empty_input() {
        let scenario = parse_scenario("# nothing here\n\n").unwrap();
        assert_eq!(scenario, Scenario::new());
    }

    #[test]
    fn test_load_scenario_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let scenario = load_scenario(file.path()).unwrap();
        assert_eq!(scenario.users.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = load_scenario("/definitely/not/here/scenario.txt").unwrap_err();
        assert!(matches!(err, PlannerError::ScenarioNotFound(_)));
    }
}
