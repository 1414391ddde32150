//! Runs the store contract against a real MongoDB.
//!
//! Requires `mongodb://localhost:27017` (or `MONGODB_URI`); run with
//! `cargo test -- --ignored`.

mod common;

use chrono::{NaiveDate, TimeZone, Utc};
use common::test_config;
use savings_service::config::StoreBackend;
use savings_service::models::{RepeatInterval, Saving, SavingChanges};
use savings_service::services::{DateFilter, MongoSavingsStore, SavingFilter, SavingsStore};

async fn connect() -> (MongoSavingsStore, String) {
    let config = test_config(StoreBackend::Mongo);
    let store = MongoSavingsStore::connect(&config.mongodb.uri, &config.mongodb.database)
        .await
        .expect("Failed to connect to MongoDB");
    store
        .initialize_indexes()
        .await
        .expect("Failed to create indexes");
    (store, config.mongodb.database)
}

async fn cleanup(store: &MongoSavingsStore, db_name: &str) {
    let _ = store.client().database(db_name).drop(None).await;
}

#[tokio::test]
#[ignore = "Requires MongoDB running on localhost:27017"]
async fn crud_round_trip_against_mongodb() {
    let (store, db_name) = connect().await;

    let saving = Saving::new(
        "Gym".to_string(),
        29.99,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()),
    )
    .with_category(Some("health".to_string()))
    .with_recurrence(true, Some(RepeatInterval::Monthly), Some(12));

    let created = store.insert(saving.clone()).await.unwrap();
    assert_eq!(created, saving);

    let all = store.list(SavingFilter::All).await.unwrap();
    assert_eq!(all, vec![saving.clone()]);

    let may_first = DateFilter::from_params(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), None)
        .unwrap();
    assert_eq!(store.list(SavingFilter::Date(may_first)).await.unwrap().len(), 1);
    assert_eq!(
        store
            .list(SavingFilter::Category("travel".to_string()))
            .await
            .unwrap()
            .len(),
        0
    );

    let updated = store
        .update(
            &saving.id,
            SavingChanges {
                amount: Some(35.0),
                repeat_duration: Some(Some(6)),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("saving should exist");
    assert_eq!(updated.amount, 35.0);
    assert_eq!(updated.repeat_duration, Some(6));
    assert_eq!(updated.title, "Gym");

    let stopped = store
        .update(
            &saving.id,
            SavingChanges {
                repeat: Some(false),
                category: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("saving should exist");
    assert!(!stopped.repeat);
    assert_eq!(stopped.repeat_interval, None);
    assert_eq!(stopped.repeat_duration, None);
    assert_eq!(stopped.category, None);

    assert!(store
        .update("missing", SavingChanges::default())
        .await
        .unwrap()
        .is_none());

    assert!(store.delete(&saving.id).await.unwrap());
    assert!(!store.delete(&saving.id).await.unwrap());
    assert!(store.list(SavingFilter::All).await.unwrap().is_empty());

    store.health_check().await.unwrap();

    cleanup(&store, &db_name).await;
}
