use std::time::{Duration, Instant};

use tracing::info;

use crate::config::InspectConfig;
use crate::error::Result;
use crate::ingestion;
use crate::report::MeshSummary;

/// Outcome of an inspection run.
#[derive(Debug)]
pub struct InspectResult {
    pub summary: MeshSummary,
    pub duration: Duration,
}

/// Inspection driver: load, apply edits, summarise.
pub struct Inspector;

impl Inspector {
    pub fn run(config: &InspectConfig) -> Result<InspectResult> {
        let start = Instant::now();
        info!(input = %config.input.display(), "Starting inspection");

        let mut mesh = ingestion::load_mesh(&config.input)?;

        if !config.temporary_attributes.is_empty() {
            for group in mesh.iter_mut() {
                for name in &config.temporary_attributes {
                    group.set_attribute_temporary(name.as_str(), true);
                }
            }
            info!(attributes = ?config.temporary_attributes, "Flagged temporary attributes");
        }

        if config.uniform {
            let report = mesh.restrict_to_common_schema();
            info!(
                dropped = report.dropped.len(),
                truncated = report.truncated.len(),
                "Restricted mesh to common schema"
            );
        }

        let summary = MeshSummary::from_mesh(&mut mesh);
        let duration = start.elapsed();
        info!(
            groups = summary.face_group_count,
            faces = summary.face_count,
            homogeneous = summary.homogeneous,
            elapsed = ?duration,
            "Inspection complete"
        );

        Ok(InspectResult { summary, duration })
    }
}
