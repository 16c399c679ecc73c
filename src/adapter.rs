use crate::error::Result;
use crate::types::{Address, EncodedCall, NetworkId, Step};
use async_trait::async_trait;

/// Chain-side collaborator: per-network read predicates plus the wire
/// encoding of each step. The planner owns no byte format of its own;
/// whatever this trait encodes is what gets previewed and submitted.
///
/// The two ownership predicates are intentionally independent checks
/// (a node qualifies for a reverse record if either holds); neither
/// supersedes the other.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Whether this adapter can reach the given network at all.
    fn supports_network(&self, network: NetworkId) -> bool;

    /// Operator access over `root_name` already delegated to the naming
    /// controller, making the grant step unnecessary.
    async fn is_already_approved(&self, root_name: &str, network: NetworkId) -> Result<bool>;

    /// Contract exposes an owner and that owner is the caller.
    async fn is_ownable_and_owned_by_caller(
        &self,
        address: Address,
        network: NetworkId,
    ) -> Result<bool>;

    /// Contract's reverse node is claimable by (or already held by) the
    /// caller.
    async fn is_reverse_claimable_and_owned_by_caller(
        &self,
        address: Address,
        network: NetworkId,
    ) -> Result<bool>;

    /// Encode one step into its wire-level call. Pure: the executor and
    /// the preview encoder both go through this exact function, which is
    /// what keeps the preview byte-identical to what gets submitted.
    fn encode_step(&self, step: &Step) -> Result<EncodedCall>;
}
