//! Property-based tests for the letter of credit lifecycle
//!
//! Random records and random transition sequences are driven through the
//! contract against the in-memory store. The properties are the ones a
//! caller relies on: what was requested is what is read back, non-status
//! fields never change after the request, and the audit trail lists exactly
//! the versions that were written, in order.
//!
//! What these tests DON'T cover (deliberately):
//!
//! - sled persistence (see scenarios.rs)
//! - the strict policy beyond its step rule (see the contract unit tests)

use lc_ledger::{
    contract::{LcContract, TransitionPolicy},
    error::ContractError,
    history,
    record::{LcStatus, LetterOfCredit},
    store::MemoryStore,
};
use proptest::prelude::*;

// PROPERTY TEST STRATEGIES

/// Strategy to generate a letter of credit as requested by a buyer
fn request_strategy() -> impl Strategy<Value = LetterOfCredit> {
    (
        "[A-Za-z0-9_-]{1,24}",
        "[0-9]{4}-[0-9]{2}-[0-9]{2}",
        "\\PC{0,16}",
        "\\PC{0,16}",
        "\\PC{0,16}",
        any::<u64>(),
    )
        .prop_map(|(id, expiry, buyer, bank, seller, amount)| {
            LetterOfCredit::new(id)
                .set_expiry_date(expiry)
                .set_buyer(buyer)
                .set_bank(bank)
                .set_seller(seller)
                .set_amount(amount)
        })
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Issue,
    Accept,
}

/// Strategy to generate a sequence of status transitions (0 to 8 steps)
fn steps_strategy() -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(
        prop_oneof![Just(Step::Issue), Just(Step::Accept)],
        0..=8,
    )
}

fn request_args(lc: &LetterOfCredit) -> String {
    serde_json::json!({
        "lcId": lc.id(),
        "expiryDate": lc.expiry_date(),
        "buyer": lc.buyer(),
        "bank": lc.bank(),
        "seller": lc.seller(),
        "amount": lc.amount(),
    })
    .to_string()
}

fn id_args(lc: &LetterOfCredit) -> String {
    serde_json::json!({ "lcID": lc.id() }).to_string()
}

fn read_back(store: &MemoryStore, lc_id: &str) -> LetterOfCredit {
    let bytes = LcContract::new()
        .get_lc(store, lc_id)
        .unwrap()
        .expect("record should exist");
    LetterOfCredit::from_bytes(lc_id, &bytes).unwrap()
}

// PROPERTY TESTS
proptest! {
    /// Property: RequestLC then GetLC returns the request with status Requested
    #[test]
    fn prop_request_round_trips(lc in request_strategy()) {
        let store = MemoryStore::new();
        LcContract::new().request_lc(&store, &request_args(&lc)).unwrap();

        let stored = read_back(&store, lc.id());
        prop_assert_eq!(stored.status(), LcStatus::Requested);
        prop_assert_eq!(stored, lc);
    }

    /// Property: transitions only ever change the status field, and the
    /// current status is always the one set by the last transition
    #[test]
    fn prop_transitions_only_touch_status(lc in request_strategy(), steps in steps_strategy()) {
        let store = MemoryStore::new();
        let contract = LcContract::new();
        contract.request_lc(&store, &request_args(&lc)).unwrap();

        let mut expected = LcStatus::Requested;
        for step in &steps {
            expected = match step {
                Step::Issue => contract.issue_lc(&store, &id_args(&lc)).unwrap().status(),
                Step::Accept => contract.accept_lc(&store, &id_args(&lc)).unwrap().status(),
            };
        }

        let stored = read_back(&store, lc.id());
        prop_assert_eq!(stored, lc.with_status(expected));
    }

    /// Property: N writes produce N history entries in write order, none deleted
    #[test]
    fn prop_history_matches_writes(lc in request_strategy(), steps in steps_strategy()) {
        let store = MemoryStore::new();
        let contract = LcContract::new();

        let mut written = vec![contract.request_lc(&store, &request_args(&lc)).unwrap()];
        for step in &steps {
            let next = match step {
                Step::Issue => contract.issue_lc(&store, &id_args(&lc)).unwrap(),
                Step::Accept => contract.accept_lc(&store, &id_args(&lc)).unwrap(),
            };
            written.push(next);
        }

        let entries = history::get_lc_history(&store, lc.id()).unwrap();
        prop_assert_eq!(entries.len(), written.len());
        for (entry, record) in entries.iter().zip(&written) {
            prop_assert!(!entry.is_delete);
            let stored = entry.value.as_ref().map(|raw| raw.get().to_string());
            prop_assert_eq!(stored, Some(serde_json::to_string(record).unwrap()));
        }
        for pair in entries.windows(2) {
            prop_assert!(pair[0].timestamp <= pair[1].timestamp);
            prop_assert!(pair[0].timestamp.to_datetime_utc() <= pair[1].timestamp.to_datetime_utc());
        }
        prop_assert_eq!(store.open_iterators(), 0);
    }

    /// Property: a transition on an id that was never requested fails and writes nothing
    #[test]
    fn prop_missing_record_is_never_written(lc in request_strategy(), accept in any::<bool>()) {
        let store = MemoryStore::new();
        let contract = LcContract::new();

        let result = if accept {
            contract.accept_lc(&store, &id_args(&lc))
        } else {
            contract.issue_lc(&store, &id_args(&lc))
        };

        let is_deserialization_failure = matches!(result, Err(ContractError::DeserializationFailure { .. }));
        prop_assert!(is_deserialization_failure);
        prop_assert_eq!(store.version_count(lc.id()), 0);
    }

    /// Property: under the strict policy the stored status never moves backwards
    #[test]
    fn prop_strict_status_is_monotonic(lc in request_strategy(), steps in steps_strategy()) {
        let store = MemoryStore::new();
        let contract = LcContract::with_policy(TransitionPolicy::Strict);
        contract.request_lc(&store, &request_args(&lc)).unwrap();

        let mut previous = LcStatus::Requested;
        for step in &steps {
            let _ = match step {
                Step::Issue => contract.issue_lc(&store, &id_args(&lc)),
                Step::Accept => contract.accept_lc(&store, &id_args(&lc)),
            };
            let current = read_back(&store, lc.id()).status();
            prop_assert!(current >= previous);
            prop_assert!(current == previous || previous.next() == Some(current));
            previous = current;
        }
    }

    /// Property: arbitrary text that is not a JSON object never reaches the store
    #[test]
    fn prop_garbage_request_is_rejected(args in "[^{]\\PC{0,40}") {
        let store = MemoryStore::new();
        let result = LcContract::new().request_lc(&store, &args);

        let is_malformed = matches!(result, Err(ContractError::MalformedInput { .. }));
        prop_assert!(is_malformed);
        prop_assert_eq!(store.key_count(), 0);
    }
}
