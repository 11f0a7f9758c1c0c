//! The result accumulator threaded through an ingestion run.

use serde::{Deserialize, Serialize};

use crate::{payload::SkippedRow, plan::PlanAssignment};

/// Statistics and partial-failure report for one ingestion run.
///
/// Built fresh per run and returned to the caller; nothing is shared between
/// runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
  /// Rows that reached the database.
  pub processed:   usize,
  pub new_matches: usize,
  pub new_tips:    usize,
  pub skipped:     Vec<SkippedRow>,
  /// One entry per plan touched by the assignment engine, merged across rows.
  pub assignments: Vec<PlanAssignment>,
}

impl IngestReport {
  /// Fold a per-row assignment into the running totals for its plan.
  pub fn record_assignment(&mut self, assignment: PlanAssignment) {
    match self.assignments.iter_mut().find(|a| a.plan_id == assignment.plan_id) {
      Some(existing) => existing.added_tips += assignment.added_tips,
      None => self.assignments.push(assignment),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn assignment(plan_id: i64, added_tips: usize) -> PlanAssignment {
    PlanAssignment { plan_id, plan_name: format!("plan {plan_id}"), added_tips }
  }

  #[test]
  fn assignments_merge_per_plan() {
    let mut report = IngestReport::default();
    report.record_assignment(assignment(1, 2));
    report.record_assignment(assignment(2, 0));
    report.record_assignment(assignment(1, 1));
    assert_eq!(report.assignments, vec![assignment(1, 3), assignment(2, 0)]);
  }
}
