pub mod abi;
pub mod adapter;
pub mod config;
pub mod error;
pub mod executor;
pub mod grouping;
pub mod hierarchy;
pub mod plan;
pub mod preview;
pub mod rpc;
pub mod signer;
pub mod types;
pub mod validate;

pub use adapter::ChainAdapter;
pub use config::PlannerConfig;
pub use error::{PlannerError, Result, ValidationError};
pub use executor::{CancelFlag, ExecutionReport, PlanExecutor};
pub use grouping::group_batches;
pub use hierarchy::resolve_hierarchy;
pub use plan::build_plan;
pub use preview::preview_plan;
pub use rpc::{HttpChainAdapter, NetworkEndpoint};
pub use signer::Signer;
pub use types::{
    Address, Batch, ConfirmationPolicy, EncodedCall, HierarchyNode, NamingEntry, NetworkId, Plan,
    PlanRequest, Step, StepKind, StepStatus, TxHandle, TxReceipt,
};
pub use validate::{find_duplicates, validate_address, validate_entries, validate_label};

/// SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapter::ChainAdapter;
    pub use crate::config::PlannerConfig;
    pub use crate::error::{PlannerError, Result, ValidationError};
    pub use crate::executor::{CancelFlag, ExecutionReport, PlanExecutor};
    pub use crate::plan::build_plan;
    pub use crate::preview::preview_plan;
    pub use crate::signer::Signer;
    pub use crate::types::*;
}
