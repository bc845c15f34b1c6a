use exchange_core::{
    Exchange, ExchangeError, ExchangeFields, ExchangeRecord, RecordId, StatusCode, SubmitError,
    Translations,
};
use pretty_assertions::assert_eq;

fn fields(id: &str) -> ExchangeFields {
    ExchangeFields {
        id: id.to_string(),
        status: Some(StatusCode::new("success")),
        details: "Incoming\n+255 Juma\n2 hours ago".to_string(),
        message: "water pump broken".to_string(),
        responses: vec!["on our way".to_string()],
        name: "Juma".to_string(),
        date_str: "2 hours ago".to_string(),
    }
}

#[test]
fn record_fields_read_back_unchanged() {
    let record = ExchangeRecord {
        id: RecordId::Number(42),
        status: Some(StatusCode::new("sent")),
        details: "details".to_string(),
        message: "hello".to_string(),
        responses: vec!["a".to_string(), "b".to_string()],
        name: "Amina".to_string(),
        date_str: "yesterday".to_string(),
    };

    let exchange = Exchange::from_record(record).expect("valid record");

    assert_eq!(exchange.id(), 42);
    assert_eq!(exchange.status(), Some(&StatusCode::new("sent")));
    assert_eq!(exchange.details(), "details");
    assert_eq!(exchange.message(), "hello");
    assert_eq!(exchange.responses(), ["a", "b"]);
    assert_eq!(exchange.name(), "Amina");
    assert_eq!(exchange.date_str(), "yesterday");
    assert_eq!(exchange.draft_message(), "");
}

#[test]
fn json_record_with_string_id_and_missing_responses() {
    let record: ExchangeRecord = serde_json::from_str(
        r#"{"id": "sms_17", "status": "pending", "details": "d", "message": "m",
            "name": "n", "dateStr": "today"}"#,
    )
    .expect("parse record");

    let exchange = Exchange::from_record(record).expect("valid record");
    assert_eq!(exchange.id(), 17);
    assert!(exchange.responses().is_empty());
    assert_eq!(exchange.date_str(), "today");
}

#[test]
fn id_without_digits_fails() {
    let err = Exchange::create(fields("no-digits")).unwrap_err();
    assert_eq!(err, ExchangeError::InvalidId("no-digits".to_string()));
}

#[test]
fn status_defaults_to_pending() {
    let mut f = fields("1");
    f.status = None;
    let exchange = Exchange::create(f).unwrap();
    assert_eq!(exchange.status(), None);
    assert_eq!(exchange.current_status_code(), StatusCode::pending());
}

#[test]
fn response_summary_pluralizes() {
    let translations = Translations::default();
    let mut f = fields("1");
    f.responses = Vec::new();
    let mut exchange = Exchange::create(f).unwrap();
    assert_eq!(exchange.response_count_summary(&translations), "0 responses");

    exchange.append_draft_response("one").unwrap();
    assert_eq!(exchange.response_count_summary(&translations), "1 response");

    exchange.append_draft_response("two").unwrap();
    assert_eq!(exchange.response_count_summary(&translations), "2 responses");
}

#[test]
fn blank_drafts_are_rejected_without_mutation() {
    let mut exchange = Exchange::create(fields("3")).unwrap();
    exchange.set_draft("   ");

    assert_eq!(
        exchange.append_draft_response(""),
        Err(SubmitError::EmptyMessage)
    );
    assert_eq!(
        exchange.append_draft_response("   "),
        Err(SubmitError::EmptyMessage)
    );
    assert_eq!(exchange.responses(), ["on our way"]);
    assert_eq!(exchange.draft_message(), "   ");
}

#[test]
fn length_limit_is_inclusive() {
    let mut exchange = Exchange::create(fields("3")).unwrap();

    assert!(exchange.append_draft_response(&"a".repeat(160)).is_ok());
    assert_eq!(
        exchange.append_draft_response(&"a".repeat(161)),
        Err(SubmitError::MessageTooLong {
            count: 161,
            limit: 160
        })
    );
    assert_eq!(exchange.responses().len(), 2);
}

#[test]
fn append_clears_draft_and_tracks_pending() {
    let mut exchange = Exchange::create(fields("3")).unwrap();
    exchange.set_draft("hello");

    let index = exchange.append_draft_response("hello").unwrap();

    assert_eq!(index, 1);
    assert_eq!(exchange.draft_message(), "");
    assert_eq!(exchange.pending_response_count(), 1);
    assert_eq!(exchange.reconcile_latest_pending("hello!"), Some(1));
    assert_eq!(exchange.responses(), ["on our way", "hello!"]);
    assert_eq!(exchange.reconcile_latest_pending("again"), None);
}

#[test]
fn same_fields_give_equal_but_separate_exchanges() {
    let a = Exchange::create(fields("8")).unwrap();
    let mut b = Exchange::create(fields("8")).unwrap();
    assert_eq!(a, b);

    b.set_status(StatusCode::new("failed"));
    assert_ne!(a, b);
    assert_eq!(a.status(), Some(&StatusCode::new("success")));
}
