use crate::adapter::ChainAdapter;
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::signer::Signer;
use crate::types::{ConfirmationPolicy, NetworkId, Plan, StepStatus};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Root names with a plan currently executing. The access grant/revoke
/// bracket is not reentrant-safe, so a second plan for the same root is
/// rejected until the first releases its slot.
static ACTIVE_ROOTS: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

struct RootGuard {
    root_name: String,
}

impl RootGuard {
    fn acquire(root_name: &str) -> Result<Self> {
        let mut active = ACTIVE_ROOTS.lock();
        if !active.insert(root_name.to_string()) {
            return Err(PlannerError::PlanAlreadyRunning(root_name.to_string()));
        }
        Ok(RootGuard {
            root_name: root_name.to_string(),
        })
    }
}

impl Drop for RootGuard {
    fn drop(&mut self) {
        ACTIVE_ROOTS.lock().remove(&self.root_name);
    }
}

/// Cooperative cancellation handle. The executor checks it between
/// steps, never mid-step: a submitted on-chain operation cannot be
/// aborted once sent.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What actually ran. `tx_hashes` is parallel to the confirmed prefix of
/// the plan's steps; `cancelled` means the plan stopped cleanly between
/// steps with everything before the stop point confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub steps_run: usize,
    pub tx_hashes: Vec<String>,
    pub cancelled: bool,
}

/// Runs a plan strictly sequentially against the signer and chain
/// adapter. Step *n+1* never starts before step *n* reaches a terminal
/// state: later naming batches depend on earlier steps' on-chain effects
/// (granted access, created parent subdomains).
pub struct PlanExecutor<'a> {
    signer: &'a dyn Signer,
    adapter: &'a dyn ChainAdapter,
    config: &'a PlannerConfig,
    cancel: CancelFlag,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(
        signer: &'a dyn Signer,
        adapter: &'a dyn ChainAdapter,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            signer,
            adapter,
            config,
            cancel: CancelFlag::new(),
        }
    }

    /// Handle the caller can use to request cancellation from elsewhere.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Execute every step in order, updating each step's status in place.
    ///
    /// On step failure the plan halts with `StepFailed`; prior confirmed
    /// steps are NOT rolled back (their on-chain effects are not
    /// revocable from here), and `partially_applied` tells the caller
    /// whether any chain state was already touched.
    pub async fn execute(&self, plan: &mut Plan) -> Result<ExecutionReport> {
        let _guard = RootGuard::acquire(&plan.root_name)?;

        let mut report = ExecutionReport {
            steps_run: 0,
            tx_hashes: Vec::new(),
            cancelled: false,
        };

        info!(
            "executing plan for '{}': {} steps, policy {:?}",
            plan.root_name,
            plan.steps.len(),
            plan.confirmation_policy
        );

        for index in 0..plan.steps.len() {
            if self.cancel.is_cancelled() {
                warn!(
                    "plan for '{}' cancelled before step {} of {}",
                    plan.root_name,
                    index,
                    plan.steps.len()
                );
                report.cancelled = true;
                return Ok(report);
            }

            plan.steps[index].status = StepStatus::Running;
            match self.run_step(plan, index).await {
                Ok(tx_hash) => {
                    plan.steps[index].status = StepStatus::Confirmed;
                    report.steps_run += 1;
                    report.tx_hashes.push(tx_hash);
                }
                Err(cause) => {
                    plan.steps[index].status = StepStatus::Failed;
                    return Err(PlannerError::StepFailed {
                        index,
                        partially_applied: report.steps_run > 0,
                        source: Box::new(cause),
                    });
                }
            }
        }

        info!("plan for '{}' completed: {} steps", plan.root_name, report.steps_run);
        Ok(report)
    }

    async fn run_step(&self, plan: &Plan, index: usize) -> Result<String> {
        let step = &plan.steps[index];
        debug!(
            "step {}: {} on network {}",
            index,
            step.kind.name(),
            step.target_network
        );

        if step.requires_network_switch {
            self.ensure_network(step.target_network).await?;
        }

        let call = self.adapter.encode_step(step)?;
        let handle = self.signer.submit(&call).await?;

        match plan.confirmation_policy {
            ConfirmationPolicy::AwaitSubmissionOnly => {
                // Deferred signer (multi-sig / relayed wallet): submission
                // acknowledgement is this step's terminal state.
                debug!("step {} acknowledged as {}", index, handle.hash);
            }
            ConfirmationPolicy::AwaitReceipt => {
                let receipt = self.signer.await_confirmation(&handle).await?;
                if !receipt.success {
                    return Err(PlannerError::ConfirmationFailed(format!(
                        "transaction {} reverted",
                        receipt.tx_hash
                    )));
                }
                debug!("step {} confirmed as {}", index, receipt.tx_hash);
            }
        }

        Ok(handle.hash)
    }

    /// Request a wallet network switch and poll until it lands. Bounded:
    /// after `switch_max_attempts` polls the step fails rather than hang.
    async fn ensure_network(&self, target: NetworkId) -> Result<()> {
        self.signer.switch_network(target).await?;
        for _ in 0..self.config.switch_max_attempts {
            if self.signer.current_network().await? == target {
                return Ok(());
            }
            tokio::time::sleep(self.config.switch_poll()).await;
        }
        Err(PlannerError::NetworkSwitchTimeout(target))
    }
}
