use crate::adapter::ChainAdapter;
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::grouping::{group_batches, real_nodes_in_batch_order};
use crate::hierarchy::resolve_hierarchy;
use crate::types::{
    HierarchyNode, NetworkId, Plan, PlanRequest, Step, StepKind,
};
use crate::validate::validate_entries;
use log::{debug, info};

/// Build the ordered step sequence for one naming pass.
///
/// Construction order: optional access grant, one submit step per batch
/// (dependency order), home-network reverse records for every qualifying
/// real node, per-secondary-network reverse records in selection order,
/// terminal access revoke. Network-switch flags are derived afterwards by
/// walking the sequence and marking each divergence from the previously
/// active network, so the revoke step switches home when the plan
/// wandered off it.
pub async fn build_plan(
    request: &PlanRequest,
    adapter: &dyn ChainAdapter,
    config: &PlannerConfig,
) -> Result<Plan> {
    let root_name = request.root_name.trim().to_lowercase();
    if root_name.is_empty() {
        return Err(PlannerError::EmptyRootName);
    }

    let validated = validate_entries(&request.entries, &root_name);
    let invalid = validated
        .iter()
        .filter(|e| e.address_error.is_some() || e.label_error.is_some())
        .count();
    if invalid > 0 {
        return Err(PlannerError::ValidationBlocked(invalid));
    }

    let home = config.home_network;
    if !adapter.supports_network(home) {
        return Err(PlannerError::UnsupportedNetwork(home));
    }
    for network in &request.secondary_networks {
        if !adapter.supports_network(*network) {
            return Err(PlannerError::UnsupportedNetwork(*network));
        }
    }

    let nodes = resolve_hierarchy(&root_name, &validated);
    if nodes.is_empty() {
        return Err(PlannerError::NoValidEntries);
    }
    let batches = group_batches(&nodes);
    let real_nodes = real_nodes_in_batch_order(&batches);

    let mut steps: Vec<Step> = Vec::new();

    let already_approved = adapter.is_already_approved(&root_name, home).await?;
    if !already_approved {
        steps.push(Step::new(
            StepKind::GrantAccess {
                root_name: root_name.clone(),
            },
            home,
        ));
    }

    let coin_types = requested_coin_types(request, home);
    for batch in &batches {
        let labels = batch.members.iter().map(|n| n.label().to_string()).collect();
        steps.push(Step::new(
            StepKind::SubmitBatch {
                batch: batch.clone(),
                labels,
                coin_types: coin_types.clone(),
            },
            home,
        ));
    }

    if !request.skip_home_naming {
        for node in &real_nodes {
            if node_qualifies(adapter, node, home).await? {
                steps.push(Step::new(
                    StepKind::SetReverseRecord { node: node.clone() },
                    home,
                ));
            } else {
                debug!(
                    "skipping home reverse record for {} (not owned or claimable)",
                    node.full_name
                );
            }
        }
    }

    for network in &request.secondary_networks {
        for node in &real_nodes {
            if node_qualifies(adapter, node, *network).await? {
                steps.push(Step::new(
                    StepKind::SetReverseRecord { node: node.clone() },
                    *network,
                ));
            } else {
                debug!(
                    "skipping reverse record for {} on network {}",
                    node.full_name, network
                );
            }
        }
    }

    steps.push(Step::new(
        StepKind::RevokeAccess {
            root_name: root_name.clone(),
        },
        home,
    ));

    mark_network_switches(&mut steps, home);

    info!(
        "planned {} steps for '{}': {} batches, {} nodes ({} placeholders)",
        steps.len(),
        root_name,
        batches.len(),
        nodes.len(),
        nodes.len() - real_nodes.len()
    );

    Ok(Plan {
        root_name,
        home_network: home,
        confirmation_policy: request.confirmation_policy,
        steps,
        created_at: chrono::Utc::now(),
    })
}

/// Coin types written into each batch's address records: the home
/// network's unless home naming is skipped, plus one per selected
/// secondary network, deduplicated in selection order.
fn requested_coin_types(request: &PlanRequest, home: NetworkId) -> Vec<u64> {
    let mut coin_types: Vec<u64> = Vec::new();
    if !request.skip_home_naming {
        coin_types.push(home.coin_type());
    }
    for network in &request.secondary_networks {
        let ct = network.coin_type();
        if !coin_types.contains(&ct) {
            coin_types.push(ct);
        }
    }
    coin_types
}

/// Both ownership predicates, queried sequentially and independently.
/// A node that satisfies neither is silently skipped for this network;
/// that is the expected outcome for non-owned contracts, not an error.
async fn node_qualifies(
    adapter: &dyn ChainAdapter,
    node: &HierarchyNode,
    network: NetworkId,
) -> Result<bool> {
    if adapter
        .is_ownable_and_owned_by_caller(node.address, network)
        .await?
    {
        return Ok(true);
    }
    adapter
        .is_reverse_claimable_and_owned_by_caller(node.address, network)
        .await
}

fn mark_network_switches(steps: &mut [Step], home: NetworkId) {
    let mut active = home;
    for step in steps.iter_mut() {
        step.requires_network_switch = step.target_network != active;
        active = step.target_network;
    }
}
