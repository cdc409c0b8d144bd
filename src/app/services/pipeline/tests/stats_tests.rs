use crate::Error;
use crate::app::services::pipeline::{BatchReport, BatchStats, MessageOutcome, MessageStage};

fn completed(index: usize, dispatched: bool) -> MessageOutcome {
    let mut outcome = MessageOutcome::received(index, None);
    while let Some(next) = outcome.stage.next() {
        outcome.advance(next).unwrap();
    }
    outcome.dispatched = dispatched;
    outcome.location_attached = true;
    outcome.clinical_entries = 2;
    outcome
}

fn failed(index: usize) -> MessageOutcome {
    let mut outcome = MessageOutcome::received(index, Some(format!("queue-{}", index)));
    outcome.fail(&Error::malformed_message("first segment must be MSH"));
    outcome
}

#[test]
fn test_outcome_fail_moves_to_failed_stage() {
    let outcome = failed(1);

    assert!(outcome.is_failed());
    assert_eq!(outcome.label(), "queue-1");
    assert!(outcome.failure.as_deref().unwrap().contains("MSH"));
}

#[test]
fn test_batch_stats_counts() {
    let mut stats = BatchStats::new();
    stats.record(&completed(0, true));
    stats.record(&failed(1));
    stats.record(&completed(2, false));

    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.geocoded, 2);
    assert_eq!(stats.clinical_entries, 4);
    assert_eq!(stats.dispatched, 1);
    assert_eq!(stats.dispatch_failures, 1);
    assert_eq!(stats.error_messages.len(), 1);
    assert!((stats.success_rate() - 66.666).abs() < 0.01);
    assert!(!stats.all_failed());
    assert!(stats.summary().contains("3 messages"));
}

#[test]
fn test_empty_batch_is_acknowledged() {
    let report = BatchReport::new(chrono::Utc::now(), Vec::new());

    assert_eq!(report.stats.success_rate(), 100.0);
    assert!(report.into_result().is_ok());
}

#[test]
fn test_all_failed_batch_is_an_error() {
    let report = BatchReport::new(chrono::Utc::now(), vec![failed(0), failed(1)]);

    assert!(matches!(
        report.into_result(),
        Err(Error::BatchFailed { total: 2 })
    ));
}

#[test]
fn test_report_serializes_stage_names() {
    let report = BatchReport::new(chrono::Utc::now(), vec![completed(0, true)]);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["outcomes"][0]["stage"], "done");
    assert_eq!(json["stats"]["dispatched"], 1);
    assert_eq!(report.outcomes[0].stage, MessageStage::Done);
}
