//! End-to-end tests for damage follow-up correlation.

use std::sync::Arc;
use std::time::Duration;

use correlation::{
    CorrelationEngine, CorrelationTrigger, DamageFollowUpTrigger, DrainScheduler, SchedulerConfig,
};
use domain::{Aggregate, CreateItem, ItemStatus, RentalItemService, ReportDamage};
use event_store::{EventStore, InMemoryEventStore, StreamId};
use projections::{ItemCatalogView, Projection, ProjectionProcessor};

struct Harness {
    store: Arc<InMemoryEventStore>,
    service: Arc<RentalItemService<InMemoryEventStore>>,
    engine: CorrelationEngine<InMemoryEventStore>,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryEventStore::new());
    let service = Arc::new(RentalItemService::new(Arc::clone(&store)));
    let mut engine = CorrelationEngine::new(Arc::clone(&store), 64);
    engine.register(Arc::new(DamageFollowUpTrigger::new(Arc::clone(&service)))
        as Arc<dyn CorrelationTrigger>);
    Harness {
        store,
        service,
        engine,
    }
}

async fn count_events(store: &InMemoryEventStore, stream_id: StreamId, event_type: &str) -> usize {
    store
        .events_for_stream(stream_id)
        .await
        .unwrap()
        .iter()
        .filter(|e| e.event_type == event_type)
        .count()
}

#[tokio::test]
async fn damage_emptying_the_pool_schedules_maintenance() {
    let h = harness();

    let created = h
        .service
        .create_item(CreateItem::new("Projector", "SN-1", 50.0, 2), None)
        .await
        .unwrap();
    let item_id = created.aggregate.id().unwrap();

    h.service
        .report_damage(
            ReportDamage::new(item_id, "dropped in transit", "staff-1").with_quantity(2),
            None,
        )
        .await
        .unwrap();

    h.engine.correlate().await.unwrap();

    let item = h.service.get_item(item_id).await.unwrap().unwrap();
    assert_eq!(item.status(), ItemStatus::Maintenance);
    assert_eq!(
        count_events(&h.store, item_id, "MaintenanceScheduled").await,
        1
    );
    // The follow-up command is attributed to the engine.
    let envelopes = h.store.events_for_stream(item_id).await.unwrap();
    let scheduled = envelopes
        .iter()
        .find(|e| e.event_type == "MaintenanceScheduled")
        .unwrap();
    assert_eq!(scheduled.actor_id.as_deref(), Some("correlation-engine"));
}

#[tokio::test]
async fn redelivery_does_not_duplicate_the_follow_up() {
    let h = harness();

    let created = h
        .service
        .create_item(CreateItem::new("Speaker", "SN-2", 30.0, 1), None)
        .await
        .unwrap();
    let item_id = created.aggregate.id().unwrap();

    h.service
        .report_damage(ReportDamage::new(item_id, "torn cone", "staff-1"), None)
        .await
        .unwrap();

    // Two scans: the second sees the follow-up's own events and the item
    // already in Maintenance.
    h.engine.correlate().await.unwrap();
    h.engine.correlate().await.unwrap();

    assert_eq!(
        count_events(&h.store, item_id, "MaintenanceScheduled").await,
        1
    );
}

#[tokio::test]
async fn partial_damage_needs_no_follow_up() {
    let h = harness();

    let created = h
        .service
        .create_item(CreateItem::new("Drill", "SN-3", 15.0, 3), None)
        .await
        .unwrap();
    let item_id = created.aggregate.id().unwrap();

    h.service
        .report_damage(ReportDamage::new(item_id, "chipped bit", "staff-1"), None)
        .await
        .unwrap();

    h.engine.correlate().await.unwrap();

    let item = h.service.get_item(item_id).await.unwrap().unwrap();
    assert_eq!(item.status(), ItemStatus::Quarantined);
    assert_eq!(
        count_events(&h.store, item_id, "MaintenanceScheduled").await,
        0
    );
}

#[tokio::test]
async fn scheduler_drives_drain_and_correlation_in_background() {
    let store = Arc::new(InMemoryEventStore::new());
    let service = Arc::new(RentalItemService::new(Arc::clone(&store)));
    let view = Arc::new(ItemCatalogView::new());

    let mut processor = ProjectionProcessor::new(Arc::clone(&store));
    processor.register(Arc::clone(&view) as Arc<dyn Projection>);

    let mut engine = CorrelationEngine::new(Arc::clone(&store), 64);
    engine.register(Arc::new(DamageFollowUpTrigger::new(Arc::clone(&service)))
        as Arc<dyn CorrelationTrigger>);

    let config = SchedulerConfig {
        drain_interval: Duration::from_millis(20),
        ..SchedulerConfig::default()
    };
    let scheduler = DrainScheduler::start(
        Arc::clone(&store),
        Arc::new(processor),
        Arc::new(engine),
        config,
    );
    let mut signals = scheduler.subscribe();

    let created = service
        .create_item(CreateItem::new("Camera", "SN-4", 80.0, 1), None)
        .await
        .unwrap();
    let item_id = created.aggregate.id().unwrap();
    service
        .report_damage(ReportDamage::new(item_id, "cracked lens", "staff-1"), None)
        .await
        .unwrap();

    // A change signal arrives once the background cycle has run.
    tokio::time::timeout(Duration::from_secs(2), signals.recv())
        .await
        .expect("no change signal within 2s")
        .unwrap();

    // Poll until the follow-up lands and the view has converged.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let item = service.get_item(item_id).await.unwrap().unwrap();
        let record = view.get(item_id).await;
        if item.status() == ItemStatus::Maintenance
            && record.is_some_and(|r| r.status == ItemStatus::Maintenance)
        {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "background cycle did not converge in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    scheduler.shutdown();
}
