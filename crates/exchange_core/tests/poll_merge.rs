use exchange_core::{
    update, ContainerHandle, Effect, ExchangeError, ExchangeFields, ExchangeRecord, ExchangeStore,
    Msg, Placement, RecordId, StoreError, ViewUpdate,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    exchange_logging::initialize_for_tests();
}

fn bound_store() -> ExchangeStore {
    let mut state = ExchangeStore::new();
    state.place_in(ContainerHandle(7));
    state
}

fn fields(id: &str) -> ExchangeFields {
    ExchangeFields {
        id: id.to_string(),
        ..ExchangeFields::default()
    }
}

fn record(id: u64) -> ExchangeRecord {
    ExchangeRecord {
        id: RecordId::Number(id),
        status: None,
        details: String::new(),
        message: format!("message {id}"),
        responses: Vec::new(),
        name: String::new(),
        date_str: String::new(),
    }
}

#[test]
fn max_id_is_the_largest_seen_in_any_order() {
    init_logging();
    for order in [["3", "7", "5"], ["7", "5", "3"], ["5", "3", "7"]] {
        let mut state = bound_store();
        state.import_batch(order.iter().map(|id| fields(id)), Placement::Append);
        assert_eq!(state.max_id(), 7);
    }
}

#[test]
fn max_id_never_decreases() {
    init_logging();
    let mut state = bound_store();
    state.create(fields("10"), Placement::Append).unwrap();
    state.create(fields("2"), Placement::Prepend).unwrap();
    assert_eq!(state.max_id(), 10);
}

#[test]
fn poll_due_requests_records_newer_than_max_id() {
    init_logging();
    let mut state = bound_store();
    state.import_batch([fields("10"), fields("8")], Placement::Append);

    let (_state, effects) = update(state, Msg::PollDue);
    assert_eq!(effects, vec![Effect::FetchNewer { since_id: 10 }]);
}

#[test]
fn poll_results_are_each_prepended_in_response_order() {
    init_logging();
    let mut state = bound_store();
    state.import_batch([fields("10"), fields("8")], Placement::Append);
    assert_eq!(state.ids(), vec![10, 8]);

    let (state, effects) = update(state, Msg::PollResults(vec![record(12), record(11)]));

    assert!(effects.is_empty());
    // Each record lands on top as it arrives, so the last one received leads.
    assert_eq!(state.ids(), vec![11, 12, 10, 8]);
    assert_eq!(state.max_id(), 12);
}

#[test]
fn poll_prepends_emit_prepend_renders() {
    init_logging();
    let mut state = bound_store();
    state.take_view_updates();

    let (mut state, _) = update(state, Msg::PollResults(vec![record(3)]));
    let placements: Vec<_> = state
        .take_view_updates()
        .into_iter()
        .filter_map(|u| match u {
            ViewUpdate::RenderSummary { placement, row } => Some((placement, row.id)),
            _ => None,
        })
        .collect();
    assert_eq!(placements, vec![(Placement::Prepend, 3)]);
}

#[test]
fn bad_record_does_not_block_the_batch() {
    init_logging();
    let state = bound_store();
    let mut bad = record(0);
    bad.id = RecordId::Text("none".to_string());

    let (state, _) = update(state, Msg::PollResults(vec![record(4), bad, record(6)]));

    assert_eq!(state.ids(), vec![6, 4]);
    assert_eq!(state.import_failures().len(), 1);
    assert_eq!(state.import_failures()[0].index, 1);
    assert_eq!(
        state.import_failures()[0].error,
        StoreError::Import(ExchangeError::InvalidId("none".to_string()))
    );
}

#[test]
fn failed_poll_changes_nothing() {
    init_logging();
    let mut state = bound_store();
    state.import_batch([fields("1")], Placement::Append);
    let before = state.view();

    let (state, effects) = update(
        state,
        Msg::PollFailed {
            reason: "http status 500".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view(), before);

    let (_state, effects) = update(state, Msg::PollDue);
    assert_eq!(effects, vec![Effect::FetchNewer { since_id: 1 }]);
}

#[test]
fn duplicate_imports_are_kept_as_separate_instances() {
    init_logging();
    let mut state = bound_store();
    let keys = state.import_batch([fields("5"), fields("5")], Placement::Append);

    assert_eq!(keys.len(), 2);
    assert_ne!(keys[0], keys[1]);
    assert_eq!(state.exchange(keys[0]), state.exchange(keys[1]));
    assert_eq!(state.ids(), vec![5, 5]);
}
