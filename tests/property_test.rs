mod common;

use common::*;
use pay_dispatch::domain::id::PaymentId;
use pay_dispatch::domain::payment::Outcome;
use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::approve()),
        "[a-z]{1,8}".prop_map(|m| Step::decline(&m)),
        Just(Step::Timeout),
        "[a-z ]{1,12}".prop_map(Step::Fault),
        Just(Step::Reply("{".to_string())),
    ]
}

fn expected_outcome(step: &Step) -> Option<Outcome> {
    match step {
        Step::Reply(body) if body == APPROVED => Some(Outcome::Succeeded),
        Step::Reply(body) => match serde_json::from_str::<serde_json::Value>(body) {
            Ok(v) => Some(Outcome::Failed(v["message"].as_str().unwrap_or("").to_string())),
            // Reason text comes from the JSON parser; only the variant is checked.
            Err(_) => None,
        },
        Step::Timeout => Some(Outcome::Failed("Request timeout.".into())),
        Step::Fault(msg) => Some(Outcome::Failed(msg.clone())),
    }
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Attempts stop at the first success or at the budget, one outcome is
    /// recorded per attempt, and every attempt has its own transaction id.
    #[test]
    fn attempt_loop_honours_budget(
        script in prop::collection::vec(arb_step(), 1..6),
        max_attempts in 1u32..5,
    ) {
        let rt = paused_runtime();
        let h = harness(
            account(2, 10),
            retry(max_attempts, 100),
            ScriptedTransport::new(script.clone(), Duration::from_millis(20)),
        );
        let pid = PaymentId::new();
        rt.block_on(pay(&h.dispatcher, pid));

        let first_success = script.iter().position(|s| matches!(s, Step::Reply(b) if b == APPROVED));
        // Past the script the transport approves.
        let success_at = first_success.unwrap_or(script.len());
        let expected_attempts = (success_at + 1).min(max_attempts as usize);

        let calls = h.transport.calls();
        let outcomes = h.recorder.outcomes_for(pid);
        prop_assert_eq!(calls.len(), expected_attempts);
        prop_assert_eq!(outcomes.len(), expected_attempts);
        prop_assert_eq!(h.recorder.submissions_for(pid).len(), 1);

        let ids: HashSet<_> = calls.iter().map(|c| c.transaction_id).collect();
        prop_assert_eq!(ids.len(), calls.len());

        for (i, recorded) in outcomes.iter().enumerate() {
            let step = script.get(i).cloned().unwrap_or_else(Step::approve);
            match expected_outcome(&step) {
                Some(expected) => prop_assert_eq!(&recorded.outcome, &expected),
                None => prop_assert!(matches!(recorded.outcome, Outcome::Failed(_))),
            }
        }
        prop_assert_eq!(h.dispatcher.gate().in_use(), 0);
    }
}
