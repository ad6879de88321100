//! # Epoch Reduction
//!
//! Folds an epoch's query results into two joined value lists and a count,
//! in the order the store produced them. Values are never parsed.

use crate::domain::types::DcDmReply;
use gl_02_record_lifecycle::QueryResult;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEPARATOR: &str = ", ";

/// Whether revoked records contribute to an aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevokedPolicy {
    /// Revoked records are aggregated like any other.
    #[default]
    Include,
    /// Revoked records are skipped and not counted.
    Exclude,
}

impl RevokedPolicy {
    pub fn admits(&self, revoked: bool) -> bool {
        match self {
            RevokedPolicy::Include => true,
            RevokedPolicy::Exclude => !revoked,
        }
    }
}

/// Running reduction over one epoch.
#[derive(Debug, Clone)]
pub struct Aggregator<'a> {
    policy: RevokedPolicy,
    separator: &'a str,
    values_a: Vec<&'a str>,
    values_b: Vec<&'a str>,
    skipped: usize,
}

impl<'a> Aggregator<'a> {
    pub fn new(policy: RevokedPolicy, separator: &'a str) -> Self {
        Self {
            policy,
            separator,
            values_a: Vec::new(),
            values_b: Vec::new(),
            skipped: 0,
        }
    }

    pub fn push(&mut self, result: &'a QueryResult) {
        if !self.policy.admits(result.record.revoked) {
            self.skipped += 1;
            return;
        }
        self.values_a.push(&result.record.dm_value);
        self.values_b.push(&result.record.dc_value);
    }

    /// Records left out by the revoked policy.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> DcDmReply {
        DcDmReply {
            aggregated_a: self.values_a.join(self.separator),
            aggregated_b: self.values_b.join(self.separator),
            count: self.values_a.len().to_string(),
        }
    }
}

/// Reduce `results` in one pass.
pub fn aggregate(results: &[QueryResult], policy: RevokedPolicy, separator: &str) -> DcDmReply {
    let mut aggregator = Aggregator::new(policy, separator);
    for result in results {
        aggregator.push(result);
    }
    aggregator.finish()
}
