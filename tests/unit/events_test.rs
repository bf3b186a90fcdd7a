//! Tests for progress event sinks

use prometheus_loadgate::core::{
    build_event, EventKind, EventSink, InMemoryEventSink, JobStatus, LoadState, TargetId,
};

#[test]
fn test_in_memory_event_sink() {
    let mut sink = InMemoryEventSink::new(10);

    let event = build_event(
        "batch-1",
        EventKind::JobStatus {
            index: 0,
            status: JobStatus::Uploading,
            error: None,
        },
    );

    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].source, "batch-1");
    assert_eq!(events[0], event);
}

#[test]
fn test_event_sink_overflow() {
    let mut sink = InMemoryEventSink::new(2);

    for id in 0..3 {
        sink.record(build_event(
            format!("target-{id}"),
            EventKind::LoadState {
                target: TargetId(id),
                state: LoadState::Observing,
            },
        ));
    }

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].source, "target-1");
    assert_eq!(events[1].source, "target-2");
}

#[test]
fn test_event_serializes_with_kind_tag() {
    let event = build_event("b", EventKind::BatchFinished { done: 4, failed: 1 });
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["kind"]["kind"], "batch_finished");
    assert_eq!(json["kind"]["done"], 4);
}
