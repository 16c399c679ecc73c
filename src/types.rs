use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero placeholder address used for synthesized hierarchy nodes.
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Hex form with `0x` prefix, lowercase.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix("0x").ok_or(ValidationError::InvalidAddress)?;
        if body.len() != 40 {
            return Err(ValidationError::InvalidAddress);
        }
        let bytes = hex::decode(body).map_err(|_| ValidationError::InvalidAddress)?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Chain id newtype identifying a network the plan may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkId(pub u64);

impl NetworkId {
    /// Coin type carried in naming records for this network: 60 for
    /// mainnet, `0x8000_0000 | chain_id` for every other EVM network.
    pub fn coin_type(&self) -> u64 {
        if self.0 == 1 {
            60
        } else {
            0x8000_0000 | self.0
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User-authored unit of work: one contract address and the name it
/// should receive under the chosen root.
///
/// `address` and `name` hold the raw text as typed; empty fields mean
/// "not filled in yet" and are deferred rather than invalid. Validation
/// results are attached in place of being returned as errors so the
/// caller can show every problem at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingEntry {
    /// Stable identifier for UI correlation; irrelevant to ordering.
    pub id: Uuid,
    pub address: String,
    /// Bare label or full dot-separated name ending in the root.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_error: Option<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_error: Option<ValidationError>,
}

impl NamingEntry {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            address: address.into(),
            name: name.into(),
            address_error: None,
            label_error: None,
        }
    }

    /// Both fields present and neither carries a validation error.
    pub fn is_valid(&self) -> bool {
        !self.address.is_empty()
            && !self.name.is_empty()
            && self.address_error.is_none()
            && self.label_error.is_none()
    }

    pub fn parsed_address(&self) -> Option<Address> {
        Address::from_str(self.address.trim()).ok()
    }
}

/// Resolved node after ancestor synthesis; one per unique full name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Normalized (lowercase) full name.
    pub full_name: String,
    /// Real contract address, or `Address::ZERO` for synthesized ancestors.
    pub address: Address,
    /// Label count above the root; the root's direct children are level 1.
    pub level: u32,
    /// Full name one label shallower, or the root name at level 1.
    pub immediate_parent: String,
}

impl HierarchyNode {
    pub fn is_placeholder(&self) -> bool {
        self.address.is_zero()
    }

    /// Bare label relative to the immediate parent.
    pub fn label(&self) -> &str {
        self.full_name
            .strip_suffix(&format!(".{}", self.immediate_parent))
            .unwrap_or(&self.full_name)
    }
}

/// Same-level, same-parent nodes submitted together as one naming
/// operation. Members are sorted by full name ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub parent_name: String,
    pub level: u32,
    pub members: Vec<HierarchyNode>,
}

/// How the executor decides a submitting step is done.
///
/// `AwaitSubmissionOnly` exists for multi-signature / relayed wallets
/// whose confirmations cannot be awaited synchronously: submission
/// acknowledgement counts as the step's terminal state and downstream
/// steps proceed without a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationPolicy {
    AwaitReceipt,
    AwaitSubmissionOnly,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        ConfirmationPolicy::AwaitReceipt
    }
}

/// Per-step lifecycle. Strictly `Pending -> Running -> {Confirmed | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Pending,
    Running,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepKind {
    /// Delegate operator access over the root to the naming controller.
    GrantAccess { root_name: String },
    /// Create one batch of subnames with their address records.
    SubmitBatch {
        batch: Batch,
        /// Bare labels, parallel to `batch.members`.
        labels: Vec<String>,
        /// Union of coin types the address records are written for.
        coin_types: Vec<u64>,
    },
    /// Point a contract's reverse record at its new name.
    SetReverseRecord { node: HierarchyNode },
    /// Remove the operator access granted at plan start.
    RevokeAccess { root_name: String },
}

impl StepKind {
    pub fn name(&self) -> &'static str {
        match self {
            StepKind::GrantAccess { .. } => "grant-access",
            StepKind::SubmitBatch { .. } => "submit-batch",
            StepKind::SetReverseRecord { .. } => "set-reverse-record",
            StepKind::RevokeAccess { .. } => "revoke-access",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    pub target_network: NetworkId,
    /// Set when this step runs on a different network than the step
    /// before it; the executor must get the wallet switched first.
    pub requires_network_switch: bool,
    pub status: StepStatus,
}

impl Step {
    pub fn new(kind: StepKind, target_network: NetworkId) -> Self {
        Self {
            kind,
            target_network,
            requires_network_switch: false,
            status: StepStatus::Pending,
        }
    }
}

/// Fully ordered, multi-phase transaction plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub root_name: String,
    pub home_network: NetworkId,
    pub confirmation_policy: ConfirmationPolicy,
    pub steps: Vec<Step>,
    pub created_at: DateTime<Utc>,
}

/// Wire-level call produced by the chain adapter. The preview list and
/// the executor's submissions are both sequences of these, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedCall {
    pub network: NetworkId,
    pub to: Address,
    pub data: Vec<u8>,
}

/// Handle returned by the signer on submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxHandle {
    pub hash: String,
}

/// Confirmation receipt for a submitted call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// Everything the plan builder needs from the caller for one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub root_name: String,
    pub entries: Vec<NamingEntry>,
    /// Skip home-network reverse records entirely.
    #[serde(default)]
    pub skip_home_naming: bool,
    /// Secondary networks, in user-selection order.
    #[serde(default)]
    pub secondary_networks: Vec<NetworkId>,
    #[serde(default)]
    pub confirmation_policy: ConfirmationPolicy,
}

impl PlanRequest {
    pub fn new(root_name: impl Into<String>, entries: Vec<NamingEntry>) -> Self {
        Self {
            root_name: root_name.into(),
            entries,
            skip_home_naming: false,
            secondary_networks: Vec::new(),
            confirmation_policy: ConfirmationPolicy::default(),
        }
    }

    pub fn with_secondary_networks(mut self, networks: Vec<NetworkId>) -> Self {
        self.secondary_networks = networks;
        self
    }

    pub fn with_skip_home_naming(mut self, skip: bool) -> Self {
        self.skip_home_naming = skip;
        self
    }

    pub fn with_confirmation_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.confirmation_policy = policy;
        self
    }
}
