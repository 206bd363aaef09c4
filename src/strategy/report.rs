//! Per-child outcomes and the strategy-level report.

use crate::error::ChildSubmissionFailed;
use crate::exchange::{ChildOrderSpec, OrderReceipt};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Result of submitting one planned child order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChildOutcome {
    Placed {
        index: usize,
        order: ChildOrderSpec,
        receipt: OrderReceipt,
    },
    Failed {
        index: usize,
        order: ChildOrderSpec,
        error: ChildSubmissionFailed,
    },
}

impl ChildOutcome {
    /// Position of the child in the plan (0-based).
    pub fn index(&self) -> usize {
        match self {
            ChildOutcome::Placed { index, .. } | ChildOutcome::Failed { index, .. } => *index,
        }
    }

    pub fn order(&self) -> &ChildOrderSpec {
        match self {
            ChildOutcome::Placed { order, .. } | ChildOutcome::Failed { order, .. } => order,
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, ChildOutcome::Placed { .. })
    }

    pub fn receipt(&self) -> Option<&OrderReceipt> {
        match self {
            ChildOutcome::Placed { receipt, .. } => Some(receipt),
            ChildOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ChildSubmissionFailed> {
        match self {
            ChildOutcome::Placed { .. } => None,
            ChildOutcome::Failed { error, .. } => Some(error),
        }
    }
}

impl fmt::Display for ChildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildOutcome::Placed { order, receipt, .. } => {
                write!(f, "placed {} (order id {})", order, receipt.order_id)
            }
            ChildOutcome::Failed { order, error, .. } => {
                write!(f, "failed {}: {}", order, error)
            }
        }
    }
}

/// Outcomes of one strategy run, in submission order.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub strategy: String,
    pub planned: usize,
    pub outcomes: Vec<ChildOutcome>,
    /// Set when the run stopped early on request; later children were never sent
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl StrategyReport {
    pub fn placed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_placed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.placed_count()
    }

    /// Children planned but never attempted.
    pub fn skipped_count(&self) -> usize {
        self.planned - self.outcomes.len()
    }

    /// Every planned child was attempted.
    pub fn is_complete(&self) -> bool {
        self.outcomes.len() == self.planned
    }

    pub fn all_placed(&self) -> bool {
        self.is_complete() && self.failed_count() == 0
    }

    /// One-line summary for the console and the audit log.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{}: {}/{} orders placed, {} failed",
            self.strategy,
            self.placed_count(),
            self.planned,
            self.failed_count()
        );
        if self.cancelled {
            line.push_str(&format!(", {} not sent (cancelled)", self.skipped_count()));
        }
        line
    }
}
