use utxo_data_structures::{
    amount::Amount,
    chain::{Hash, Hashable, Input, OwnerId, Transaction, TxIdList},
    transaction_factory::{make_genesis, make_spend},
};
use utxo_ledger::{
    identity::CreatorIdentity,
    invocation::{Invocation, Response},
    keys,
    query::Query,
    Ledger, LedgerError,
};
use utxo_storage::{
    backends::{btreemap, nobackend},
    composite_key,
    storage::Storage,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn amount(s: &str) -> Amount {
    s.parse().unwrap()
}

fn alice() -> CreatorIdentity {
    CreatorIdentity::new("alice")
}

fn alice_id() -> OwnerId {
    OwnerId::from_credential(b"alice")
}

fn bob() -> CreatorIdentity {
    CreatorIdentity::new("bob")
}

fn bob_id() -> OwnerId {
    OwnerId::from_credential(b"bob")
}

fn query(
    ledger: &Ledger<btreemap::Backend>,
    identity: &CreatorIdentity,
    query: Query,
) -> Vec<Hash> {
    let response = ledger.invoke(identity, Invocation::Query(query)).unwrap();

    TxIdList::from_bytes(response.payload().unwrap())
        .unwrap()
        .tx_ids
}

fn sorted(mut ids: Vec<Hash>) -> Vec<Hash> {
    ids.sort();
    ids
}

/// Ledger whose genesis minted 100000 to alice
fn ledger_with_genesis() -> (Ledger<btreemap::Backend>, Transaction) {
    init_logger();
    let ledger = Ledger::new(btreemap::Backend::default());
    let genesis = make_genesis(alice_id(), amount("100000"));

    let response = ledger
        .invoke(&alice(), Invocation::Genesis(genesis.to_bytes().unwrap()))
        .unwrap();
    assert_eq!(response, Response::Empty);

    (ledger, genesis)
}

fn spend(
    ledger: &Ledger<btreemap::Backend>,
    identity: &CreatorIdentity,
    candidate: &Transaction,
) -> Result<Response, LedgerError> {
    ledger.invoke(identity, Invocation::Spend(candidate.to_bytes().unwrap()))
}

#[test]
fn genesis_then_unspent() {
    let (ledger, genesis) = ledger_with_genesis();

    assert_eq!(query(&ledger, &alice(), Query::Unspent), vec![genesis.hash()]);
    assert_eq!(query(&ledger, &alice(), Query::All), vec![genesis.hash()]);
    assert!(query(&ledger, &alice(), Query::Spent).is_empty());
}

#[test]
fn genesis_accepts_numeric_fee() {
    init_logger();
    let ledger = Ledger::new(btreemap::Backend::default());
    let raw = format!(
        "{{\"inputs\":[\"CoinBase\"],\"output\":\"{}\",\"fee\":100000}}",
        alice_id()
    );

    ledger
        .invoke(&alice(), Invocation::Genesis(raw.into_bytes()))
        .unwrap();

    let genesis = make_genesis(alice_id(), amount("100000"));
    assert_eq!(query(&ledger, &alice(), Query::Unspent), vec![genesis.hash()]);
}

#[test]
fn genesis_for_someone_else_is_unauthorized() {
    init_logger();
    let ledger = Ledger::new(btreemap::Backend::default());
    let genesis = make_genesis(bob_id(), amount("100000"));

    assert!(matches!(
        ledger.invoke(&alice(), Invocation::Genesis(genesis.to_bytes().unwrap())),
        Err(LedgerError::Unauthorized { .. })
    ));
    assert!(query(&ledger, &bob(), Query::All).is_empty());
}

#[test]
fn genesis_rejects_invalid_transactions() {
    init_logger();
    let ledger = Ledger::new(btreemap::Backend::default());

    for raw in &[
        format!(
            "{{\"inputs\":[\"CoinBase\"],\"output\":\"{}\",\"fee\":\"0\"}}",
            alice_id()
        ),
        format!(
            "{{\"inputs\":[\"CoinBase\"],\"output\":\"{}\",\"fee\":\"-5\"}}",
            alice_id()
        ),
        format!(
            "{{\"inputs\":[\"CoinBase\"],\"output\":\"{}\",\"fee\":-5}}",
            alice_id()
        ),
        "{\"inputs\":[\"CoinBase\"],\"output\":\"\",\"fee\":\"5\"}".to_string(),
        "not a transaction".to_string(),
    ] {
        assert!(
            matches!(
                ledger.invoke(&alice(), Invocation::Genesis(raw.clone().into_bytes())),
                Err(LedgerError::InvalidArgument(_))
            ),
            "{}",
            raw
        );
    }
}

#[test]
fn spend_mints_output_and_change() {
    let (ledger, genesis) = ledger_with_genesis();
    let (candidate, expected_change) =
        make_spend(alice_id(), amount("9999.99"), &[genesis.clone()]).unwrap();
    assert_eq!(expected_change, amount("90000.01"));

    let response = spend(&ledger, &alice(), &candidate).unwrap();
    let change_tx = Transaction::from_bytes(response.payload().unwrap()).unwrap();

    assert_eq!(change_tx.inputs, vec![Input::CoinBase]);
    assert_eq!(change_tx.output, alice_id());
    assert_eq!(change_tx.fee, amount("90000.01"));
    assert_eq!(
        sorted(query(&ledger, &alice(), Query::Unspent)),
        sorted(vec![candidate.hash(), change_tx.hash()])
    );
    assert_eq!(query(&ledger, &alice(), Query::Spent), vec![genesis.hash()]);
    assert_eq!(
        sorted(query(&ledger, &alice(), Query::All)),
        sorted(vec![genesis.hash(), candidate.hash(), change_tx.hash()])
    );
}

#[test]
fn value_is_conserved() {
    let (ledger, genesis) = ledger_with_genesis();
    let (candidate, _) = make_spend(bob_id(), amount("0.000001"), &[genesis]).unwrap();

    let response = spend(&ledger, &alice(), &candidate).unwrap();
    let change_tx = Transaction::from_bytes(response.payload().unwrap()).unwrap();

    assert_eq!(
        change_tx.fee.checked_add(candidate.fee),
        Some(amount("100000"))
    );
}

#[test]
fn exact_spend_produces_no_change() {
    let (ledger, genesis) = ledger_with_genesis();
    let (candidate, change) = make_spend(bob_id(), amount("100000"), &[genesis.clone()]).unwrap();
    assert!(change.is_zero());

    assert_eq!(spend(&ledger, &alice(), &candidate).unwrap(), Response::Empty);
    assert!(query(&ledger, &alice(), Query::Unspent).is_empty());
    assert_eq!(query(&ledger, &alice(), Query::Spent), vec![genesis.hash()]);
    assert_eq!(query(&ledger, &bob(), Query::Unspent), vec![candidate.hash()]);
}

#[test]
fn spending_twice_is_already_spent() {
    let (ledger, genesis) = ledger_with_genesis();
    let (candidate, _) = make_spend(alice_id(), amount("9999.99"), &[genesis.clone()]).unwrap();
    spend(&ledger, &alice(), &candidate).unwrap();

    assert!(matches!(
        spend(&ledger, &alice(), &candidate),
        Err(LedgerError::AlreadySpent(id)) if id == genesis.hash()
    ));

    let (other, _) = make_spend(bob_id(), amount("1"), &[genesis.clone()]).unwrap();
    assert!(matches!(
        spend(&ledger, &alice(), &other),
        Err(LedgerError::AlreadySpent(id)) if id == genesis.hash()
    ));
}

#[test]
fn overlapping_inputs_are_already_spent() {
    let (ledger, genesis) = ledger_with_genesis();
    let (first, _) = make_spend(alice_id(), amount("10"), &[genesis.clone()]).unwrap();
    let change_tx = Transaction::from_bytes(
        spend(&ledger, &alice(), &first)
            .unwrap()
            .payload()
            .unwrap(),
    )
    .unwrap();

    // The change is unspent but the genesis is not
    let (second, _) = make_spend(bob_id(), amount("5"), &[change_tx, genesis]).unwrap();

    assert!(matches!(
        spend(&ledger, &alice(), &second),
        Err(LedgerError::AlreadySpent(_))
    ));
    assert_eq!(query(&ledger, &bob(), Query::All), Vec::<Hash>::new());
}

#[test]
fn forged_coinbase_input_is_not_found() {
    let (ledger, _genesis) = ledger_with_genesis();
    let forged = Transaction {
        inputs: vec![Input::CoinBase],
        output: alice_id(),
        fee: amount("1000"),
    };

    assert!(matches!(
        spend(&ledger, &alice(), &forged),
        Err(LedgerError::NotFound(_))
    ));
}

#[test]
fn unknown_input_is_not_found() {
    let (ledger, _genesis) = ledger_with_genesis();
    let candidate = Transaction {
        inputs: vec![Input::Transaction(Hash::SHA256([1; 32]))],
        output: alice_id(),
        fee: amount("1"),
    };

    assert!(matches!(
        spend(&ledger, &alice(), &candidate),
        Err(LedgerError::NotFound(_))
    ));
}

#[test]
fn insufficient_funds_leaves_state_untouched() {
    let (ledger, genesis) = ledger_with_genesis();
    let candidate = Transaction {
        inputs: vec![Input::Transaction(genesis.hash())],
        output: bob_id(),
        fee: amount("100000.000001"),
    };

    assert!(matches!(
        spend(&ledger, &alice(), &candidate),
        Err(LedgerError::InsufficientFunds { inputs, output })
            if inputs == amount("100000") && output == amount("100000.000001")
    ));
    assert_eq!(query(&ledger, &alice(), Query::Unspent), vec![genesis.hash()]);
    assert!(query(&ledger, &alice(), Query::Spent).is_empty());
    assert!(query(&ledger, &bob(), Query::All).is_empty());
}

#[test]
fn spending_another_owner_output_is_unauthorized() {
    let (ledger, genesis) = ledger_with_genesis();
    let (candidate, _) = make_spend(bob_id(), amount("1"), &[genesis.clone()]).unwrap();

    assert!(matches!(
        spend(&ledger, &bob(), &candidate),
        Err(LedgerError::Unauthorized { owner, caller }) if owner == alice_id() && caller == bob_id()
    ));
    assert_eq!(query(&ledger, &alice(), Query::Unspent), vec![genesis.hash()]);
}

#[test]
fn empty_inputs_are_invalid() {
    let (ledger, _genesis) = ledger_with_genesis();
    let candidate = Transaction {
        inputs: vec![],
        output: bob_id(),
        fee: amount("1"),
    };

    assert!(matches!(
        spend(&ledger, &alice(), &candidate),
        Err(LedgerError::InvalidArgument(_))
    ));
}

#[test]
fn chained_spends_between_owners() {
    let (ledger, genesis) = ledger_with_genesis();

    let (to_bob, _) = make_spend(bob_id(), amount("300"), &[genesis]).unwrap();
    let alice_change = Transaction::from_bytes(
        spend(&ledger, &alice(), &to_bob)
            .unwrap()
            .payload()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(alice_change.fee, amount("99700"));

    let (back_to_alice, _) = make_spend(alice_id(), amount("100.5"), &[to_bob.clone()]).unwrap();
    let bob_change = Transaction::from_bytes(
        spend(&ledger, &bob(), &back_to_alice)
            .unwrap()
            .payload()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(bob_change.output, bob_id());
    assert_eq!(bob_change.fee, amount("199.5"));

    assert_eq!(query(&ledger, &bob(), Query::Spent), vec![to_bob.hash()]);
    assert_eq!(query(&ledger, &bob(), Query::Unspent), vec![bob_change.hash()]);
    assert_eq!(
        sorted(query(&ledger, &alice(), Query::Unspent)),
        sorted(vec![alice_change.hash(), back_to_alice.hash()])
    );

    // Merge both of alice's outputs
    let (merged, change) = make_spend(
        alice_id(),
        amount("99800.5"),
        &[alice_change, back_to_alice],
    )
    .unwrap();
    assert!(change.is_zero());
    assert_eq!(spend(&ledger, &alice(), &merged).unwrap(), Response::Empty);
    assert_eq!(query(&ledger, &alice(), Query::Unspent), vec![merged.hash()]);
}

fn change_of(response: Response) -> Transaction {
    Transaction::from_bytes(response.payload().unwrap()).unwrap()
}

#[test]
fn change_identical_to_spent_change_is_minted_again() {
    let (ledger, genesis) = ledger_with_genesis();

    let (first, _) = make_spend(bob_id(), amount("10"), &[genesis]).unwrap();
    let alice_change = change_of(spend(&ledger, &alice(), &first).unwrap());
    let (second, _) = make_spend(bob_id(), amount("10"), &[alice_change]).unwrap();
    spend(&ledger, &alice(), &second).unwrap();

    let (from_first, _) = make_spend(alice_id(), amount("5"), &[first.clone()]).unwrap();
    let bob_change = change_of(spend(&ledger, &bob(), &from_first).unwrap());
    let (spend_change, _) = make_spend(alice_id(), amount("5"), &[bob_change.clone()]).unwrap();
    assert_eq!(spend(&ledger, &bob(), &spend_change).unwrap(), Response::Empty);
    assert!(query(&ledger, &bob(), Query::Unspent).contains(&second.hash()));
    assert!(!query(&ledger, &bob(), Query::Unspent).contains(&bob_change.hash()));

    // The change of this spend has the same content as the one already spent
    let (from_second, _) = make_spend(alice_id(), amount("5"), &[second.clone()]).unwrap();
    let reminted = change_of(spend(&ledger, &bob(), &from_second).unwrap());

    assert_eq!(reminted, bob_change);
    assert_eq!(query(&ledger, &bob(), Query::Unspent), vec![bob_change.hash()]);
    assert_eq!(
        sorted(query(&ledger, &bob(), Query::Spent)),
        sorted(vec![first.hash(), second.hash()])
    );
    assert_eq!(
        ledger
            .invoke(&bob(), Invocation::Query(Query::ById(bob_change.hash())))
            .unwrap(),
        Response::Payload(bob_change.to_bytes().unwrap())
    );
}

#[test]
fn repeated_genesis_leaves_a_single_unspent_output() {
    let (ledger, genesis) = ledger_with_genesis();

    let response = ledger
        .invoke(&alice(), Invocation::Genesis(genesis.to_bytes().unwrap()))
        .unwrap();

    assert_eq!(response, Response::Empty);
    assert_eq!(query(&ledger, &alice(), Query::All), vec![genesis.hash()]);
    assert_eq!(query(&ledger, &alice(), Query::Unspent), vec![genesis.hash()]);
}

#[test]
fn query_by_id() {
    let (ledger, genesis) = ledger_with_genesis();

    let response = ledger
        .invoke(&alice(), Invocation::Query(Query::ById(genesis.hash())))
        .unwrap();
    assert_eq!(response, Response::Payload(genesis.to_bytes().unwrap()));

    assert!(matches!(
        ledger.invoke(&alice(), Invocation::Query(Query::ById(Hash::SHA256([1; 32])))),
        Err(LedgerError::NotFound(_))
    ));
}

#[test]
fn query_through_positional_arguments() {
    let (ledger, genesis) = ledger_with_genesis();
    let tx_id = genesis.hash().to_string();

    let invocation = Invocation::from_args(&["query", "Identify", tx_id.as_str()]).unwrap();
    assert_eq!(
        ledger.invoke(&alice(), invocation).unwrap(),
        Response::Payload(genesis.to_bytes().unwrap())
    );

    let invocation = Invocation::from_args(&["query", "Unspent"]).unwrap();
    assert_eq!(
        ledger.invoke(&alice(), invocation).unwrap(),
        Response::Payload(format!("{{\"tx_id\":[\"{}\"]}}", tx_id).into_bytes())
    );
}

#[test]
fn empty_listings_for_unknown_owner() {
    let (ledger, _genesis) = ledger_with_genesis();

    for q in &[Query::Unspent, Query::Spent, Query::All] {
        assert!(query(&ledger, &bob(), *q).is_empty());
    }
}

#[test]
fn anonymous_caller_is_unauthenticated() {
    let (ledger, genesis) = ledger_with_genesis();
    let (candidate, _) = make_spend(bob_id(), amount("1"), &[genesis]).unwrap();

    assert!(matches!(
        ledger.invoke(&CreatorIdentity::anonymous(), Invocation::Query(Query::All)),
        Err(LedgerError::Unauthenticated)
    ));
    assert!(matches!(
        ledger.invoke(
            &CreatorIdentity::anonymous(),
            Invocation::Spend(candidate.to_bytes().unwrap())
        ),
        Err(LedgerError::Unauthenticated)
    ));
}

#[test]
fn malformed_index_entries_are_skipped_and_counted() {
    let (ledger, genesis) = ledger_with_genesis();
    let bogus_value = keys::spent_state(&alice_id(), &Hash::SHA256([1; 32])).unwrap();
    ledger.storage().put(bogus_value, vec![0x02]).unwrap();
    let bogus_key = composite_key::encode(
        keys::SPENT_STATE_INDEX,
        &[alice_id().to_string(), "garbage".to_string()],
    )
    .unwrap();
    ledger.storage().put(bogus_key, vec![0x01]).unwrap();

    assert_eq!(query(&ledger, &alice(), Query::All), vec![genesis.hash()]);
    assert_eq!(ledger.skipped_index_entries(), 2);
    assert_eq!(query(&ledger, &alice(), Query::Unspent), vec![genesis.hash()]);
    assert_eq!(ledger.skipped_index_entries(), 4);
}

#[test]
fn corrupted_entry_fails_point_reads() {
    let (ledger, genesis) = ledger_with_genesis();
    let key = keys::spent_state(&alice_id(), &genesis.hash()).unwrap();
    ledger.storage().put(key, vec![0x02]).unwrap();
    let (candidate, _) = make_spend(bob_id(), amount("1"), &[genesis]).unwrap();

    assert!(matches!(
        spend(&ledger, &alice(), &candidate),
        Err(LedgerError::Corrupted { .. })
    ));
    assert!(query(&ledger, &bob(), Query::All).is_empty());
}

#[test]
fn unavailable_storage() {
    init_logger();
    let ledger = Ledger::new(nobackend::Backend);
    let genesis = make_genesis(alice_id(), amount("100000"));
    let (candidate, _) = make_spend(bob_id(), amount("1"), &[genesis.clone()]).unwrap();

    assert!(matches!(
        ledger.invoke(&alice(), Invocation::Genesis(genesis.to_bytes().unwrap())),
        Err(LedgerError::StorageUnavailable(_))
    ));
    assert!(matches!(
        ledger.invoke(&alice(), Invocation::Spend(candidate.to_bytes().unwrap())),
        Err(LedgerError::StorageUnavailable(_))
    ));
    for q in vec![Query::ById(genesis.hash()), Query::Unspent, Query::Spent, Query::All] {
        assert!(matches!(
            ledger.invoke(&alice(), Invocation::Query(q)),
            Err(LedgerError::StorageUnavailable(_))
        ));
    }
}

#[test]
fn concurrent_spends_of_one_input() {
    use std::sync::Arc;

    let (ledger, genesis) = ledger_with_genesis();
    let ledger = Arc::new(ledger);

    let handles: Vec<_> = (1..=8)
        .map(|n| {
            let ledger = Arc::clone(&ledger);
            let (candidate, _) =
                make_spend(bob_id(), Amount::from_units(n).unwrap(), &[genesis.clone()]).unwrap();
            std::thread::spawn(move || spend(&ledger, &alice(), &candidate).is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(query(&ledger, &bob(), Query::Unspent).len(), 1);
}
