// tests/executor.rs
//
// Plan execution against mock collaborators: preview/execution
// equivalence, halt-on-failure, cancellation, network-switch handling
// and the deferred-signer confirmation policy.

use async_trait::async_trait;
use nameplan::prelude::*;
use nameplan::{build_plan, preview_plan};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const ADDR_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const ADDR_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

const HOME: NetworkId = NetworkId(1);
const BASE: NetworkId = NetworkId(8453);

struct MockAdapter;

#[async_trait]
impl ChainAdapter for MockAdapter {
    fn supports_network(&self, network: NetworkId) -> bool {
        network.0 < 100_000
    }

    async fn is_already_approved(&self, _root: &str, _network: NetworkId) -> Result<bool> {
        Ok(false)
    }

    async fn is_ownable_and_owned_by_caller(
        &self,
        _address: Address,
        _network: NetworkId,
    ) -> Result<bool> {
        Ok(true)
    }

    async fn is_reverse_claimable_and_owned_by_caller(
        &self,
        _address: Address,
        _network: NetworkId,
    ) -> Result<bool> {
        Ok(false)
    }

    fn encode_step(&self, step: &Step) -> Result<EncodedCall> {
        let data = serde_json::to_vec(&(&step.kind, step.target_network))?;
        Ok(EncodedCall {
            network: step.target_network,
            to: Address::ZERO,
            data,
        })
    }
}

struct MockSigner {
    current: Mutex<NetworkId>,
    /// When false, switch requests are acknowledged but never land.
    switch_lands: bool,
    fail_submit_at: Option<usize>,
    confirm_success: bool,
    submitted: Mutex<Vec<EncodedCall>>,
    confirmations: AtomicUsize,
}

impl MockSigner {
    fn new() -> Self {
        Self {
            current: Mutex::new(HOME),
            switch_lands: true,
            fail_submit_at: None,
            confirm_success: true,
            submitted: Mutex::new(Vec::new()),
            confirmations: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Signer for MockSigner {
    fn address(&self) -> Address {
        Address::from_str(ADDR_A).unwrap()
    }

    async fn current_network(&self) -> Result<NetworkId> {
        Ok(*self.current.lock().unwrap())
    }

    async fn switch_network(&self, network: NetworkId) -> Result<()> {
        if self.switch_lands {
            *self.current.lock().unwrap() = network;
        }
        Ok(())
    }

    async fn submit(&self, call: &EncodedCall) -> Result<TxHandle> {
        let mut submitted = self.submitted.lock().unwrap();
        let index = submitted.len();
        if self.fail_submit_at == Some(index) {
            return Err(PlannerError::SignerRejected("user denied".to_string()));
        }
        submitted.push(call.clone());
        Ok(TxHandle {
            hash: format!("0xtx{:04}", index),
        })
    }

    async fn await_confirmation(&self, handle: &TxHandle) -> Result<TxReceipt> {
        self.confirmations.fetch_add(1, Ordering::SeqCst);
        Ok(TxReceipt {
            tx_hash: handle.hash.clone(),
            block_number: Some(1),
            success: self.confirm_success,
        })
    }
}

fn config() -> PlannerConfig {
    PlannerConfig::new(HOME)
        .with_switch_poll(Duration::from_millis(10))
        .with_switch_max_attempts(3)
}

async fn plan_for(root: &str, secondary: Vec<NetworkId>) -> Plan {
    let request = PlanRequest::new(
        root,
        vec![
            NamingEntry::new(ADDR_A, format!("one.{}", root)),
            NamingEntry::new(ADDR_B, format!("two.{}", root)),
        ],
    )
    .with_secondary_networks(secondary);
    build_plan(&request, &MockAdapter, &config()).await.unwrap()
}

#[tokio::test]
async fn execution_order_matches_preview() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut plan = plan_for("preview-eq.eth", vec![BASE]).await;
    let preview = preview_plan(&plan, &MockAdapter).unwrap();

    let signer = MockSigner::new();
    let cfg = config();
    let executor = PlanExecutor::new(&signer, &MockAdapter, &cfg);
    let report = executor.execute(&mut plan).await.unwrap();

    assert!(!report.cancelled);
    assert_eq!(report.steps_run, plan.steps.len());
    assert_eq!(report.tx_hashes.len(), plan.steps.len());
    assert!(plan.steps.iter().all(|s| s.status == StepStatus::Confirmed));

    // The submitted calls are the previewed calls, byte for byte.
    let submitted = signer.submitted.lock().unwrap();
    assert_eq!(*submitted, preview);
}

#[tokio::test]
async fn halt_on_failure_reports_index_and_partial_application() {
    let mut plan = plan_for("halt.eth", vec![]).await;

    let mut signer = MockSigner::new();
    signer.fail_submit_at = Some(1);
    let cfg = config();
    let executor = PlanExecutor::new(&signer, &MockAdapter, &cfg);

    match executor.execute(&mut plan).await {
        Err(PlannerError::StepFailed {
            index,
            partially_applied,
            source,
        }) => {
            assert_eq!(index, 1);
            assert!(partially_applied);
            assert!(matches!(*source, PlannerError::SignerRejected(_)));
        }
        other => panic!("expected StepFailed, got {:?}", other.map(|r| r.steps_run)),
    }

    assert_eq!(plan.steps[0].status, StepStatus::Confirmed);
    assert_eq!(plan.steps[1].status, StepStatus::Failed);
    assert!(plan.steps[2..]
        .iter()
        .all(|s| s.status == StepStatus::Pending));
    assert_eq!(signer.submitted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn first_step_failure_is_not_partially_applied() {
    let mut plan = plan_for("first-fail.eth", vec![]).await;

    let mut signer = MockSigner::new();
    signer.fail_submit_at = Some(0);
    let cfg = config();
    let executor = PlanExecutor::new(&signer, &MockAdapter, &cfg);

    match executor.execute(&mut plan).await {
        Err(PlannerError::StepFailed {
            index,
            partially_applied,
            ..
        }) => {
            assert_eq!(index, 0);
            assert!(!partially_applied);
        }
        other => panic!("expected StepFailed, got {:?}", other.map(|r| r.steps_run)),
    }
}

#[tokio::test]
async fn cancellation_stops_between_steps() {
    let mut plan = plan_for("cancel.eth", vec![]).await;

    let signer = MockSigner::new();
    let cfg = config();
    let executor = PlanExecutor::new(&signer, &MockAdapter, &cfg);
    executor.cancel_flag().cancel();

    let report = executor.execute(&mut plan).await.unwrap();
    assert!(report.cancelled);
    assert_eq!(report.steps_run, 0);
    assert!(plan.steps.iter().all(|s| s.status == StepStatus::Pending));
    assert!(signer.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn network_switch_timeout_fails_the_step() {
    let request = PlanRequest::new(
        "switch-timeout.eth",
        vec![NamingEntry::new(ADDR_A, "one.switch-timeout.eth")],
    )
    .with_secondary_networks(vec![BASE]);
    let cfg = config();
    let mut plan = build_plan(&request, &MockAdapter, &cfg).await.unwrap();

    let mut signer = MockSigner::new();
    signer.switch_lands = false;
    let executor = PlanExecutor::new(&signer, &MockAdapter, &cfg);

    // grant, batch, home reverse, then the base-network reverse that
    // needs a switch the wallet never completes.
    match executor.execute(&mut plan).await {
        Err(PlannerError::StepFailed {
            index,
            partially_applied,
            source,
        }) => {
            assert_eq!(index, 3);
            assert!(partially_applied);
            assert!(matches!(*source, PlannerError::NetworkSwitchTimeout(n) if n == BASE));
        }
        other => panic!("expected StepFailed, got {:?}", other.map(|r| r.steps_run)),
    }
}

#[tokio::test]
async fn deferred_signer_policy_skips_confirmations() {
    let request = PlanRequest::new(
        "deferred.eth",
        vec![NamingEntry::new(ADDR_A, "one.deferred.eth")],
    )
    .with_confirmation_policy(ConfirmationPolicy::AwaitSubmissionOnly);
    let cfg = config();
    let mut plan = build_plan(&request, &MockAdapter, &cfg).await.unwrap();

    let signer = MockSigner::new();
    let executor = PlanExecutor::new(&signer, &MockAdapter, &cfg);
    let report = executor.execute(&mut plan).await.unwrap();

    assert_eq!(report.steps_run, plan.steps.len());
    assert_eq!(signer.confirmations.load(Ordering::SeqCst), 0);
    assert!(plan.steps.iter().all(|s| s.status == StepStatus::Confirmed));
}

#[tokio::test]
async fn await_receipt_policy_confirms_every_step() {
    let mut plan = plan_for("receipts.eth", vec![]).await;
    let signer = MockSigner::new();
    let cfg = config();
    let executor = PlanExecutor::new(&signer, &MockAdapter, &cfg);
    executor.execute(&mut plan).await.unwrap();
    assert_eq!(
        signer.confirmations.load(Ordering::SeqCst),
        plan.steps.len()
    );
}

#[tokio::test]
async fn reverted_confirmation_fails_the_step() {
    let mut plan = plan_for("reverted.eth", vec![]).await;
    let mut signer = MockSigner::new();
    signer.confirm_success = false;
    let cfg = config();
    let executor = PlanExecutor::new(&signer, &MockAdapter, &cfg);
    match executor.execute(&mut plan).await {
        Err(PlannerError::StepFailed { index, source, .. }) => {
            assert_eq!(index, 0);
            assert!(matches!(*source, PlannerError::ConfirmationFailed(_)));
        }
        other => panic!("expected StepFailed, got {:?}", other.map(|r| r.steps_run)),
    }
}

#[tokio::test]
async fn guard_releases_after_completion() {
    let mut plan = plan_for("rerun.eth", vec![]).await;
    let signer = MockSigner::new();
    let cfg = config();
    let executor = PlanExecutor::new(&signer, &MockAdapter, &cfg);
    executor.execute(&mut plan).await.unwrap();

    // A fresh pass for the same root is allowed once the first finished.
    let mut second = plan_for("rerun.eth", vec![]).await;
    let signer2 = MockSigner::new();
    let executor2 = PlanExecutor::new(&signer2, &MockAdapter, &cfg);
    let report = executor2.execute(&mut second).await.unwrap();
    assert_eq!(report.steps_run, second.steps.len());
}
