use super::plan::ReconciliationPlan;
use crate::confirm::{is_affirmative, Confirmer};
use std::collections::HashSet;
use std::sync::Arc;

/// How restore/reset questions get answered.
pub enum DecisionMode {
    /// Non-interactive default policy: approve every restore, decline every
    /// reset. Recreating scaffolding the user deleted is cheap to undo;
    /// overwriting content that drifted from baseline is not.
    Forced,
    /// Ask a question per candidate through the given confirmer.
    Interactive(Arc<dyn Confirmer>),
}

/// A concrete verdict for every restore/reset candidate in a plan.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationDecisions {
    pub restore: HashSet<String>,
    pub reset: HashSet<String>,
    pub skip: HashSet<String>,
}

impl ReconciliationDecisions {
    /// The forced-mode policy applied to a plan.
    pub fn forced(plan: &ReconciliationPlan) -> Self {
        Self {
            restore: plan.to_restore.iter().map(|f| f.path.clone()).collect(),
            reset: HashSet::new(),
            skip: plan.to_reset.iter().map(|f| f.path.clone()).collect(),
        }
    }
}

/// Settle every restore/reset candidate in the plan. In interactive mode
/// each candidate is asked about in plan order; once the answer stream ends
/// everything still open is skipped.
pub async fn gather_decisions(
    plan: &ReconciliationPlan,
    mode: &DecisionMode,
) -> ReconciliationDecisions {
    match mode {
        DecisionMode::Forced => ReconciliationDecisions::forced(plan),
        DecisionMode::Interactive(confirmer) => ask_each(plan, confirmer.as_ref()).await,
    }
}

async fn ask_each(plan: &ReconciliationPlan, confirmer: &dyn Confirmer) -> ReconciliationDecisions {
    let mut decisions = ReconciliationDecisions::default();
    let mut input_open = true;

    for info in &plan.to_restore {
        let mut approved = false;
        if input_open {
            let prompt = format!("Restore missing {}? [y/N] ", info.path);
            match confirmer.ask(&prompt).await {
                Ok(Some(answer)) => approved = is_affirmative(&answer),
                Ok(None) | Err(_) => input_open = false,
            }
        }
        if approved {
            decisions.restore.insert(info.path.clone());
        } else {
            decisions.skip.insert(info.path.clone());
        }
    }

    for info in &plan.to_reset {
        let mut approved = false;
        if input_open {
            let prompt = format!(
                "Reset {} to canonical content ({} -> {})? [y/N] ",
                info.path,
                short_digest(&info.current_hash),
                short_digest(&info.expected_hash),
            );
            match confirmer.ask(&prompt).await {
                Ok(Some(answer)) => approved = is_affirmative(&answer),
                Ok(None) | Err(_) => input_open = false,
            }
        }
        if approved {
            decisions.reset.insert(info.path.clone());
        } else {
            decisions.skip.insert(info.path.clone());
        }
    }

    decisions
}

// Manifest hash fields are unconstrained strings; never slice mid-character.
fn short_digest(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}
