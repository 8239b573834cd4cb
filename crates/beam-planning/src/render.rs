//! Output rendering for assignment events
//!
//! Text output is one `sat <id> beam <n> user <id> color <c>` line per event,
//! which is also the format [`crate::evaluate`] reads back.

use crate::assignment::{AssignmentEvent, AssignmentSink, AssignmentSummary};
use crate::config::PlannerConfig;
use crate::scenario::Scenario;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Streams each event as a text line
pub struct TextSink<W: Write> {
    writer: W,
    lines: usize,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Flush and hand back the writer
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> AssignmentSink for TextSink<W> {
    fn emit(&mut self, event: AssignmentEvent) -> Result<()> {
        writeln!(self.writer, "{}", event)?;
        self.lines += 1;
        Ok(())
    }
}

/// JSON document describing a whole planning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub assignments: Vec<AssignmentEvent>,
    pub metadata: PlanMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub users: usize,
    pub satellites: usize,
    pub interferers: usize,
    pub summary: AssignmentSummary,
    pub coverage_pct: f64,
    pub config: PlannerConfig,
    pub generated_at: String,
}

impl PlanReport {
    pub fn new(
        scenario: &Scenario,
        config: &PlannerConfig,
        assignments: Vec<AssignmentEvent>,
        summary: AssignmentSummary,
    ) -> Self {
        Self {
            assignments,
            metadata: PlanMetadata {
                users: scenario.users.len(),
                satellites: scenario.satellites.len(),
                interferers: scenario.interferers.len(),
                summary,
                coverage_pct: summary.coverage_pct(),
                config: *config,
                generated_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    pub fn write_json(&self, writer: impl Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam_state::Color;
    use crate::scenario::{SatelliteId, UserId};

    fn event(sat: usize, beam: usize, user: usize, color: Color) -> AssignmentEvent {
        AssignmentEvent {
            satellite: SatelliteId(sat),
            beam,
            user: UserId(user),
            color,
        }
    }

    #[test]
    fn test_text_sink_lines() {
        let mut sink = TextSink::new(Vec::new());
        sink.emit(event(0, 1, 4, Color::A)).unwrap();
        sink.emit(event(2, 1, 0, Color::C)).unwrap();
        assert_eq!(sink.lines(), 2);

        let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(out, "sat 1 beam 1 user 5 color A\nsat 3 beam 1 user 1 color C\n");
    }

    #[test]
    fn test_report_json() {
        let scenario = Scenario {
            users: vec![crate::Position::new(0.0, 0.0, 6371.0); 2],
            ..Scenario::default()
        };
        let summary = AssignmentSummary {
            users: 2,
            served: 1,
            unassigned: 1,
            ..AssignmentSummary::default()
        };
        let report = PlanReport::new(
            &scenario,
            &PlannerConfig::default(),
            vec![event(0, 1, 1, Color::B)],
            summary,
        );

        let mut buf = Vec::new();
        report.write_json(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["metadata"]["coverage_pct"], 50.0);
        assert_eq!(value["metadata"]["users"], 2);
        assert_eq!(value["assignments"][0]["color"], "B");
        assert_eq!(value["metadata"]["config"]["beams_per_satellite"], 32);
    }
}
