use crate::abi::{self, AbiValue};
use crate::adapter::ChainAdapter;
use crate::error::{PlannerError, Result};
use crate::types::{Address, EncodedCall, NetworkId, Step, StepKind};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

/// Per-network contract addresses and RPC endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEndpoint {
    pub rpc_url: String,
    /// Naming registry holding node ownership and operator approvals.
    pub registry: Address,
    /// Batch naming controller; operator access is granted to it for the
    /// duration of a plan.
    pub controller: Address,
    /// Reverse registrar for the network.
    pub reverse_registrar: Address,
}

/// [`ChainAdapter`] backed by plain JSON-RPC `eth_call` reads.
///
/// Contract reverts and empty returns on read predicates map to `false`
/// (the planner's silently-skipped case); transport and HTTP failures
/// map to `Err`, since a half-queried plan could diverge from its
/// preview.
pub struct HttpChainAdapter {
    client: Client,
    caller: Address,
    networks: HashMap<NetworkId, NetworkEndpoint>,
}

impl HttpChainAdapter {
    pub fn new(caller: Address) -> Self {
        Self {
            client: Client::new(),
            caller,
            networks: HashMap::new(),
        }
    }

    /// Create an adapter with a custom reqwest client.
    pub fn with_client(caller: Address, client: Client) -> Self {
        Self {
            client,
            caller,
            networks: HashMap::new(),
        }
    }

    pub fn with_network(mut self, network: NetworkId, endpoint: NetworkEndpoint) -> Self {
        self.networks.insert(network, endpoint);
        self
    }

    fn endpoint(&self, network: NetworkId) -> Result<&NetworkEndpoint> {
        self.networks
            .get(&network)
            .ok_or(PlannerError::UnsupportedNetwork(network))
    }

    /// Read-only contract call. `Ok(None)` means the node reported an
    /// execution error (revert); transport problems are `Err`.
    async fn eth_call(
        &self,
        network: NetworkId,
        to: Address,
        data: Vec<u8>,
    ) -> Result<Option<Vec<u8>>> {
        let endpoint = self.endpoint(network)?;
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": to.to_hex(), "data": format!("0x{}", hex::encode(&data)) },
                "latest"
            ]
        });

        let response = self
            .client
            .post(&endpoint.rpc_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PlannerError::Rpc(format!("HTTP {}: {}", status, body)));
        }

        let body: RpcResponse = response.json().await?;
        if let Some(error) = body.error {
            debug!(
                "eth_call to {} on network {} reverted: {}",
                to, network, error.message
            );
            return Ok(None);
        }

        let result = body
            .result
            .ok_or_else(|| PlannerError::Rpc("response carries neither result nor error".into()))?;
        let bytes = hex::decode(result.trim_start_matches("0x"))
            .map_err(|e| PlannerError::Rpc(format!("undecodable result: {}", e)))?;
        Ok(Some(bytes))
    }

    fn word_to_bool(word: Option<Vec<u8>>) -> bool {
        match word {
            Some(bytes) if bytes.len() >= 32 => bytes[31] != 0,
            _ => false,
        }
    }

    fn word_to_address(word: &[u8]) -> Option<Address> {
        if word.len() < 32 {
            return None;
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&word[12..32]);
        Some(Address(out))
    }
}

#[async_trait]
impl ChainAdapter for HttpChainAdapter {
    fn supports_network(&self, network: NetworkId) -> bool {
        self.networks.contains_key(&network)
    }

    async fn is_already_approved(&self, _root_name: &str, network: NetworkId) -> Result<bool> {
        let endpoint = self.endpoint(network)?;
        let data = abi::encode_call(
            "isApprovedForAll(address,address)",
            &[
                AbiValue::Address(self.caller),
                AbiValue::Address(endpoint.controller),
            ],
        );
        let result = self.eth_call(network, endpoint.registry, data).await?;
        Ok(Self::word_to_bool(result))
    }

    async fn is_ownable_and_owned_by_caller(
        &self,
        address: Address,
        network: NetworkId,
    ) -> Result<bool> {
        let data = abi::encode_call("owner()", &[]);
        match self.eth_call(network, address, data).await? {
            Some(word) => Ok(Self::word_to_address(&word) == Some(self.caller)),
            // Not an Ownable contract; expected, not an error.
            None => Ok(false),
        }
    }

    async fn is_reverse_claimable_and_owned_by_caller(
        &self,
        address: Address,
        network: NetworkId,
    ) -> Result<bool> {
        let endpoint = self.endpoint(network)?;
        let node = abi::reverse_node(address);
        let data = abi::encode_call("owner(bytes32)", &[AbiValue::FixedBytes(node)]);
        match self.eth_call(network, endpoint.registry, data).await? {
            Some(word) => Ok(Self::word_to_address(&word) == Some(self.caller)),
            None => Ok(false),
        }
    }

    fn encode_step(&self, step: &Step) -> Result<EncodedCall> {
        let endpoint = self.endpoint(step.target_network)?;
        let (to, data) = match &step.kind {
            StepKind::GrantAccess { .. } => (
                endpoint.registry,
                abi::encode_call(
                    "setApprovalForAll(address,bool)",
                    &[
                        AbiValue::Address(endpoint.controller),
                        AbiValue::Bool(true),
                    ],
                ),
            ),
            StepKind::RevokeAccess { .. } => (
                endpoint.registry,
                abi::encode_call(
                    "setApprovalForAll(address,bool)",
                    &[
                        AbiValue::Address(endpoint.controller),
                        AbiValue::Bool(false),
                    ],
                ),
            ),
            StepKind::SubmitBatch {
                batch,
                labels,
                coin_types,
            } => {
                if labels.len() != batch.members.len() {
                    return Err(PlannerError::Encode(format!(
                        "batch under '{}' has {} labels for {} members",
                        batch.parent_name,
                        labels.len(),
                        batch.members.len()
                    )));
                }
                let parent_node = abi::namehash(&batch.parent_name);
                let data = abi::encode_call(
                    "setSubnodeRecords(bytes32,string[],address[],uint256[])",
                    &[
                        AbiValue::FixedBytes(parent_node),
                        AbiValue::Array(
                            labels
                                .iter()
                                .map(|l| AbiValue::String(l.clone()))
                                .collect(),
                        ),
                        AbiValue::Array(
                            batch
                                .members
                                .iter()
                                .map(|n| AbiValue::Address(n.address))
                                .collect(),
                        ),
                        AbiValue::Array(coin_types.iter().map(|c| AbiValue::Uint(*c)).collect()),
                    ],
                );
                (endpoint.controller, data)
            }
            StepKind::SetReverseRecord { node } => (
                endpoint.reverse_registrar,
                abi::encode_call(
                    "setNameForAddr(address,string)",
                    &[
                        AbiValue::Address(node.address),
                        AbiValue::String(node.full_name.clone()),
                    ],
                ),
            ),
        };

        Ok(EncodedCall {
            network: step.target_network,
            to,
            data,
        })
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Batch, HierarchyNode};
    use std::str::FromStr;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    fn endpoint() -> NetworkEndpoint {
        NetworkEndpoint {
            rpc_url: "http://localhost:8545".to_string(),
            registry: addr(0x01),
            controller: addr(0x02),
            reverse_registrar: addr(0x03),
        }
    }

    fn adapter() -> HttpChainAdapter {
        let caller =
            Address::from_str("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        HttpChainAdapter::new(caller).with_network(NetworkId(1), endpoint())
    }

    fn node() -> HierarchyNode {
        HierarchyNode {
            full_name: "vault.example.eth".to_string(),
            address: addr(0xaa),
            level: 1,
            immediate_parent: "example.eth".to_string(),
        }
    }

    #[test]
    fn test_supports_only_registered_networks() {
        let adapter = adapter();
        assert!(adapter.supports_network(NetworkId(1)));
        assert!(!adapter.supports_network(NetworkId(10)));
    }

    #[test]
    fn test_grant_and_revoke_encode_to_registry() {
        let adapter = adapter();
        let grant = Step::new(
            StepKind::GrantAccess {
                root_name: "example.eth".to_string(),
            },
            NetworkId(1),
        );
        let revoke = Step::new(
            StepKind::RevokeAccess {
                root_name: "example.eth".to_string(),
            },
            NetworkId(1),
        );
        let grant_call = adapter.encode_step(&grant).unwrap();
        let revoke_call = adapter.encode_step(&revoke).unwrap();
        assert_eq!(grant_call.to, addr(0x01));
        assert_eq!(&grant_call.data[..4], &abi::selector("setApprovalForAll(address,bool)"));
        // Same call shape, approved flag flipped.
        assert_eq!(grant_call.data.len(), revoke_call.data.len());
        assert_eq!(grant_call.data[67], 1);
        assert_eq!(revoke_call.data[67], 0);
    }

    #[test]
    fn test_submit_batch_encodes_to_controller() {
        let adapter = adapter();
        let member = node();
        let step = Step::new(
            StepKind::SubmitBatch {
                batch: Batch {
                    parent_name: "example.eth".to_string(),
                    level: 1,
                    members: vec![member],
                },
                labels: vec!["vault".to_string()],
                coin_types: vec![60],
            },
            NetworkId(1),
        );
        let call = adapter.encode_step(&step).unwrap();
        assert_eq!(call.to, addr(0x02));
        assert_eq!(
            &call.data[..4],
            &abi::selector("setSubnodeRecords(bytes32,string[],address[],uint256[])")
        );
        assert_eq!(&call.data[4..36], &abi::namehash("example.eth"));
    }

    #[test]
    fn test_label_member_mismatch_rejected() {
        let adapter = adapter();
        let step = Step::new(
            StepKind::SubmitBatch {
                batch: Batch {
                    parent_name: "example.eth".to_string(),
                    level: 1,
                    members: vec![node()],
                },
                labels: vec![],
                coin_types: vec![60],
            },
            NetworkId(1),
        );
        assert!(matches!(
            adapter.encode_step(&step),
            Err(PlannerError::Encode(_))
        ));
    }

    #[test]
    fn test_unknown_network_rejected() {
        let adapter = adapter();
        let step = Step::new(
            StepKind::SetReverseRecord { node: node() },
            NetworkId(42),
        );
        assert!(matches!(
            adapter.encode_step(&step),
            Err(PlannerError::UnsupportedNetwork(_))
        ));
    }

    #[test]
    fn test_word_helpers() {
        let mut word = vec![0u8; 32];
        word[31] = 1;
        assert!(HttpChainAdapter::word_to_bool(Some(word.clone())));
        assert!(!HttpChainAdapter::word_to_bool(Some(vec![0u8; 32])));
        assert!(!HttpChainAdapter::word_to_bool(None));

        let mut word = vec![0u8; 32];
        word[12..].copy_from_slice(&[0xbb; 20]);
        assert_eq!(HttpChainAdapter::word_to_address(&word), Some(addr(0xbb)));
        assert_eq!(HttpChainAdapter::word_to_address(&[0u8; 8]), None);
    }
}
