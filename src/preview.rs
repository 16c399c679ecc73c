use crate::adapter::ChainAdapter;
use crate::error::Result;
use crate::types::{EncodedCall, Plan};

/// Encode every step of a plan, in plan order, without submitting
/// anything.
///
/// This walks the same step sequence through the same
/// [`ChainAdapter::encode_step`] path the executor submits through, so
/// the returned list is byte-identical to what execution would send,
/// call for call. That equivalence is the whole point: what the user
/// reviews is what gets signed.
pub fn preview_plan(plan: &Plan, adapter: &dyn ChainAdapter) -> Result<Vec<EncodedCall>> {
    plan.steps
        .iter()
        .map(|step| adapter.encode_step(step))
        .collect()
}
