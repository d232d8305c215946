//! Integration tests for the remote entity store, driven through the mock
//! transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use futures::future::join_all;
use time::macros::datetime;

use odo_remote::{
    CredentialProvider, Credentials, Error, MockConnector, MockTableTransport, RemoteStore,
    Result, StaticCredentials,
};
use odo_types::codec::{self, VEHICLE_SORT_KEY};
use odo_types::{AttrValue, ItemKind, ServiceEvent, ServiceItem, Vehicle};

const TABLE: &str = "GarageUserData";
const USER: &str = "user-1";

fn credentials() -> Credentials {
    Credentials {
        access_key: "AK".to_string(),
        secret: "SK".to_string(),
        session_token: "token".to_string(),
        expires_at: None,
    }
}

fn store_over(transport: &Arc<MockTableTransport>) -> (RemoteStore, Arc<MockConnector>) {
    let connector = Arc::new(MockConnector::new(Arc::clone(transport)));
    let store = RemoteStore::new(
        TABLE,
        USER,
        Arc::new(StaticCredentials::new(credentials())),
        Arc::clone(&connector) as Arc<dyn odo_remote::TableConnector>,
    );
    (store, connector)
}

fn oil_change() -> ServiceItem {
    ServiceItem::new(
        "Oil Change",
        5000,
        ItemKind::Maintenance,
        vec![ServiceEvent::new(datetime!(2026-01-10 09:00 UTC), 10_000)],
    )
}

fn vehicle() -> Vehicle {
    Vehicle {
        year: "2023".to_string(),
        make: "Acura".to_string(),
        model: "Integra Type S".to_string(),
        current_mileage: 12_570,
        last_updated: datetime!(2026-02-01 18:00 UTC),
    }
}

#[tokio::test]
async fn put_then_query_roundtrip() {
    let transport = Arc::new(MockTableTransport::new());
    let (store, _) = store_over(&transport);

    let item_a = oil_change();
    let item_b = ServiceItem::new("Exhaust", 0, ItemKind::Modification, Vec::new());

    store.put_vehicle(&vehicle()).await.unwrap();
    store.put_item(&item_a).await.unwrap();
    store.put_item(&item_b).await.unwrap();

    let fetched = store.query_all().await.unwrap();
    assert_eq!(fetched.vehicle, Some(vehicle()));
    assert_eq!(fetched.items.len(), 2);
    assert!(fetched.skipped.is_empty());

    let titles: Vec<_> = fetched.items.iter().map(|i| i.title.as_str()).collect();
    assert!(titles.contains(&"Oil Change"));
    assert!(titles.contains(&"Exhaust"));
}

#[tokio::test]
async fn put_is_idempotent() {
    let transport = Arc::new(MockTableTransport::new());
    let (store, _) = store_over(&transport);

    let item = oil_change();
    store.put_item(&item).await.unwrap();
    let first = transport.row(USER, &item.id.to_string()).await.unwrap();

    store.put_item(&item).await.unwrap();
    let second = transport.row(USER, &item.id.to_string()).await.unwrap();

    assert_eq!(transport.row_count().await, 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn undecodable_rows_are_skipped_not_fatal() {
    let transport = Arc::new(MockTableTransport::new());
    let (store, _) = store_over(&transport);

    store.put_vehicle(&vehicle()).await.unwrap();
    store.put_item(&oil_change()).await.unwrap();

    // A row with no title cannot decode as an item.
    let mut corrupt = codec::encode_item(USER, &oil_change());
    corrupt.remove(codec::ATTR_TITLE);
    let sort = corrupt
        .get(codec::ATTR_SORT)
        .and_then(AttrValue::as_s)
        .unwrap()
        .to_string();
    transport.insert_row(USER, &sort, corrupt).await;

    let fetched = store.query_all().await.unwrap();
    assert!(fetched.vehicle.is_some());
    assert_eq!(fetched.items.len(), 1);
    assert_eq!(fetched.skipped.len(), 1);
    assert_eq!(fetched.skipped[0].sort_key.as_deref(), Some(sort.as_str()));
    assert!(fetched.skipped[0].reason.contains("title"));
}

#[tokio::test]
async fn corrupt_vehicle_row_is_skipped() {
    let transport = Arc::new(MockTableTransport::new());
    let (store, _) = store_over(&transport);

    let mut row = codec::encode_vehicle(USER, &vehicle());
    row.remove(codec::ATTR_MAKE);
    transport.insert_row(USER, VEHICLE_SORT_KEY, row).await;

    let fetched = store.query_all().await.unwrap();
    assert!(fetched.vehicle.is_none());
    assert_eq!(
        fetched.skipped[0].sort_key.as_deref(),
        Some(VEHICLE_SORT_KEY)
    );
}

#[tokio::test]
async fn delete_item_removes_single_row() {
    let transport = Arc::new(MockTableTransport::new());
    let (store, _) = store_over(&transport);

    let keep = oil_change();
    let removed = ServiceItem::new("Air Filter", 20_000, ItemKind::Maintenance, Vec::new());
    store.put_item(&keep).await.unwrap();
    store.put_item(&removed).await.unwrap();

    store.delete_item(removed.id).await.unwrap();

    let fetched = store.query_all().await.unwrap();
    assert_eq!(fetched.items.len(), 1);
    assert_eq!(fetched.items[0].id, keep.id);
}

#[tokio::test]
async fn wipe_continues_past_failures_and_aggregates_once() {
    let transport = Arc::new(MockTableTransport::new());
    let (store, _) = store_over(&transport);

    store.put_vehicle(&vehicle()).await.unwrap();
    for title in ["Oil Change", "Brakes", "Coolant"] {
        store
            .put_item(&ServiceItem::new(title, 5000, ItemKind::Maintenance, Vec::new()))
            .await
            .unwrap();
    }
    assert_eq!(transport.row_count().await, 4);

    // Second delete of the sequence fails; the rest must still run.
    transport.fail_delete_call(2);

    let err = store.wipe_all().await.unwrap_err();
    match err {
        Error::PartialWipe {
            attempted, failed, ..
        } => {
            assert_eq!(attempted, 4);
            assert_eq!(failed, 1);
        }
        other => panic!("expected PartialWipe, got {other}"),
    }

    // All four deletes were attempted; exactly the poisoned row survives.
    assert_eq!(transport.delete_call_count(), 4);
    assert_eq!(transport.row_count().await, 1);
}

#[tokio::test]
async fn wipe_clean_table_deletes_everything() {
    let transport = Arc::new(MockTableTransport::new());
    let (store, _) = store_over(&transport);

    store.put_vehicle(&vehicle()).await.unwrap();
    store.put_item(&oil_change()).await.unwrap();

    store.wipe_all().await.unwrap();
    assert_eq!(transport.row_count().await, 0);
}

struct CountingCredentials {
    resolves: AtomicU32,
}

#[async_trait]
impl CredentialProvider for CountingCredentials {
    async fn resolve(&self) -> Result<Credentials> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        Ok(credentials())
    }
}

#[tokio::test]
async fn connection_is_memoized_and_single_flight() {
    let transport = Arc::new(MockTableTransport::new());
    let connector = Arc::new(MockConnector::new(Arc::clone(&transport)));
    let provider = Arc::new(CountingCredentials {
        resolves: AtomicU32::new(0),
    });
    let store = RemoteStore::new(
        TABLE,
        USER,
        Arc::clone(&provider) as Arc<dyn CredentialProvider>,
        Arc::clone(&connector) as Arc<dyn odo_remote::TableConnector>,
    );

    // Eight concurrent first-time callers must share one establishment.
    let queries = (0..8).map(|_| store.query_all());
    for outcome in join_all(queries).await {
        outcome.unwrap();
    }
    assert_eq!(provider.resolves.load(Ordering::SeqCst), 1);
    assert_eq!(connector.connect_count(), 1);

    // Only an explicit invalidation re-resolves.
    store.invalidate().await;
    store.query_all().await.unwrap();
    assert_eq!(provider.resolves.load(Ordering::SeqCst), 2);
    assert_eq!(connector.connect_count(), 2);
}
