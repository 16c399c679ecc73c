use crate::error::Result;
use crate::types::{Address, EncodedCall, NetworkId, TxHandle, TxReceipt};
use async_trait::async_trait;

/// Wallet-side collaborator: everything the executor needs from whatever
/// is holding the keys. Implemented by the embedding application over its
/// wallet connection; this crate never touches key material.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Account the plan is executed as.
    fn address(&self) -> Address;

    /// Network the wallet is currently on.
    async fn current_network(&self) -> Result<NetworkId>;

    /// Ask the wallet to switch networks. Completion is not guaranteed
    /// when this returns; the executor polls `current_network` until the
    /// switch lands or times out.
    async fn switch_network(&self, network: NetworkId) -> Result<()>;

    /// Sign and submit an encoded call, returning as soon as the wallet
    /// acknowledges the submission.
    async fn submit(&self, call: &EncodedCall) -> Result<TxHandle>;

    /// Wait for the submitted call to be confirmed on-chain.
    async fn await_confirmation(&self, handle: &TxHandle) -> Result<TxReceipt>;
}
