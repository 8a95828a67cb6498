//! User aggregate behaviour against the in-memory gateway.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use mento_api::db::{Gateway, MemoryGateway};
use mento_api::error::AppError;
use mento_api::models::journal::{JournalEntryUpdate, NewJournalEntry};
use mento_api::models::profile::{ProfileUpdate, UserMode};
use mento_api::models::wellbeing::NewCheckIn;
use mento_api::services::UserData;

mod common;

fn check_in(mood: i32, energy: i32) -> NewCheckIn {
    NewCheckIn {
        mood,
        energy,
        notes: None,
        tags: Vec::new(),
    }
}

fn journal_entry(title: &str) -> NewJournalEntry {
    NewJournalEntry {
        title: title.into(),
        content: "Went for a walk".into(),
        mood: 7,
        tags: vec!["outside".into()],
    }
}

#[tokio::test]
async fn test_first_load_creates_default_profile() {
    let gateway = MemoryGateway::new();
    let user = common::identity("ada@example.com");
    let mut data = UserData::new(Arc::new(gateway.clone()), user.clone());

    data.load().await;

    let snapshot = data.user().expect("snapshot should be loaded");
    assert_eq!(snapshot.profile.id, user.id);
    assert_eq!(snapshot.profile.name, "ada");
    assert_eq!(snapshot.profile.mode, UserMode::Solo);
    assert_eq!(
        snapshot.profile.daily_reminder_time,
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    );
    assert!(snapshot.last_check_in.is_none());
    assert!(snapshot.mood_history.is_empty());
    assert!(snapshot.journal_entries.is_empty());

    // Second load reuses the stored profile.
    let mut again = UserData::new(Arc::new(gateway.clone()), user.clone());
    again.load().await;
    assert_eq!(
        again.user().unwrap().profile.created_at,
        snapshot.profile.created_at
    );
}

#[tokio::test]
async fn test_profile_name_falls_back_without_email() {
    let gateway = MemoryGateway::new();
    let mut user = common::identity("unused@example.com");
    user.email = None;
    let mut data = UserData::new(Arc::new(gateway), user);

    data.load().await;

    assert_eq!(data.user().unwrap().profile.name, "User");
}

#[tokio::test]
async fn test_two_check_ins_same_day_upsert_series() {
    let gateway = MemoryGateway::new();
    let user = common::identity("ada@example.com");
    let mut data = UserData::new(Arc::new(gateway.clone()), user.clone());
    data.load().await;

    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    data.add_check_in_on(day, check_in(5, 4)).await.unwrap();
    data.add_check_in_on(day, check_in(8, 9)).await.unwrap();

    let snapshot = data.user().unwrap();
    assert_eq!(snapshot.mood_history.len(), 1);
    assert_eq!(snapshot.mood_history[0].mood, 8);
    assert_eq!(snapshot.mood_history[0].date, day);
    assert_eq!(snapshot.energy_history.len(), 1);
    assert_eq!(snapshot.energy_history[0].energy, 9);

    let last = snapshot.last_check_in.as_ref().unwrap();
    assert_eq!((last.mood, last.energy), (8, 9));
    assert_eq!(gateway.check_in_count(user.id).await, 2);
}

#[tokio::test]
async fn test_check_ins_on_different_days_keep_both_entries() {
    let gateway = MemoryGateway::new();
    let user = common::identity("ada@example.com");
    let mut data = UserData::new(Arc::new(gateway), user);
    data.load().await;

    let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let tuesday = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.add_check_in_on(monday, check_in(3, 3)).await.unwrap();
    data.add_check_in_on(tuesday, check_in(6, 7)).await.unwrap();

    let snapshot = data.user().unwrap();
    assert_eq!(snapshot.mood_history.len(), 2);
    // Oldest date first, ready for charting.
    assert_eq!(snapshot.mood_history[0].date, monday);
    assert_eq!(snapshot.mood_history[1].date, tuesday);
}

#[tokio::test]
async fn test_update_user_merges_locally() {
    let gateway = MemoryGateway::new();
    let user = common::identity("ada@example.com");
    let mut data = UserData::new(Arc::new(gateway.clone()), user.clone());
    data.load().await;

    data.update_user(ProfileUpdate {
        name: Some("Ada L.".into()),
        mode: Some(UserMode::Team),
        daily_reminder_time: None,
    })
    .await
    .unwrap();

    let profile = &data.user().unwrap().profile;
    assert_eq!(profile.name, "Ada L.");
    assert_eq!(profile.mode, UserMode::Team);
    assert_eq!(
        profile.daily_reminder_time,
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    );

    let stored = gateway.find_profile(user.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Ada L.");
    assert_eq!(stored.mode, UserMode::Team);
}

#[tokio::test]
async fn test_update_user_before_load_is_noop() {
    let gateway = MemoryGateway::new();
    let user = common::identity("ada@example.com");
    let mut data = UserData::new(Arc::new(gateway.clone()), user.clone());

    data.update_user(ProfileUpdate {
        name: Some("Nobody".into()),
        ..Default::default()
    })
    .await
    .unwrap();

    assert!(data.user().is_none());
    assert!(gateway.find_profile(user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_journal_crud_is_scoped_to_owner() {
    let gateway = Arc::new(MemoryGateway::new());
    let ada = common::identity("ada@example.com");
    let bob = common::identity("bob@example.com");

    let mut ada_data = UserData::new(gateway.clone(), ada);
    ada_data.load().await;
    let entry = ada_data.add_journal_entry(journal_entry("Monday")).await.unwrap();
    assert_eq!(ada_data.user().unwrap().journal_entries.len(), 1);

    // Another identity can neither edit nor delete it.
    let mut bob_data = UserData::new(gateway.clone(), bob);
    bob_data.load().await;
    assert!(bob_data.user().unwrap().journal_entries.is_empty());
    let err = bob_data
        .update_journal_entry(
            entry.id,
            JournalEntryUpdate {
                title: Some("Hijacked".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = bob_data.delete_journal_entry(entry.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let updated = ada_data
        .update_journal_entry(
            entry.id,
            JournalEntryUpdate {
                title: Some("Monday, revisited".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Monday, revisited");
    assert_eq!(updated.content, "Went for a walk");
    assert_eq!(
        ada_data.user().unwrap().journal_entries[0].title,
        "Monday, revisited"
    );

    ada_data.delete_journal_entry(entry.id).await.unwrap();
    assert!(ada_data.user().unwrap().journal_entries.is_empty());
}

#[tokio::test]
async fn test_profile_failure_leaves_snapshot_unset() {
    let gateway = MemoryGateway::new();
    gateway.fail_on("insert_profile").await;
    let user = common::identity("ada@example.com");
    let mut data = UserData::new(Arc::new(gateway.clone()), user.clone());

    data.load().await;

    assert!(data.user().is_none());
    assert!(data.ensure_profile().await.is_err());
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_snapshot() {
    let gateway = MemoryGateway::new();
    let user = common::identity("ada@example.com");
    let mut data = UserData::new(Arc::new(gateway.clone()), user);
    data.load().await;
    let before = data.user().unwrap().profile.id;

    gateway.fail_on("find_profile").await;
    data.load().await;

    assert_eq!(data.user().map(|u| u.profile.id), Some(before));
}

#[tokio::test]
async fn test_failed_series_read_degrades_to_empty() {
    let gateway = MemoryGateway::new();
    let user = common::identity("ada@example.com");
    let mut data = UserData::new(Arc::new(gateway.clone()), user.clone());
    data.load().await;
    let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    data.add_check_in_on(day, check_in(6, 7)).await.unwrap();
    data.add_journal_entry(journal_entry("Tuesday")).await.unwrap();

    gateway.fail_on("list_mood_entries").await;
    data.load().await;

    let snapshot = data.user().expect("profile still loads");
    assert_eq!(snapshot.profile.name, "ada");
    assert!(snapshot.mood_history.is_empty());
    assert_eq!(snapshot.energy_history.len(), 1);
    assert_eq!(snapshot.last_check_in.as_ref().map(|c| c.mood), Some(6));
    assert_eq!(snapshot.journal_entries.len(), 1);
}

#[tokio::test]
async fn test_add_check_in_files_under_today() {
    let gateway = MemoryGateway::new();
    let user = common::identity("ada@example.com");
    let mut data = UserData::new(Arc::new(gateway), user);
    data.load().await;

    let before = chrono::Utc::now().date_naive();
    data.add_check_in(check_in(4, 5)).await.unwrap();
    let after = chrono::Utc::now().date_naive();

    let entry = &data.user().unwrap().mood_history[0];
    assert!(entry.date == before || entry.date == after);
    assert_eq!(entry.mood, 4);
}

#[tokio::test]
async fn test_concurrent_first_loads_share_one_profile() {
    let gateway = Arc::new(MemoryGateway::new());
    let user = common::identity("ada@example.com");
    let mut first = UserData::new(gateway.clone(), user.clone());
    let mut second = UserData::new(gateway.clone(), user.clone());

    tokio::join!(first.load(), second.load());

    let a = first.user().expect("first load succeeds");
    let b = second.user().expect("second load succeeds");
    assert_eq!(a.profile.created_at, b.profile.created_at);
}

#[tokio::test]
async fn test_blank_name_and_title_rejected_by_service() {
    let gateway = MemoryGateway::new();
    let user = common::identity("ada@example.com");
    let mut data = UserData::new(Arc::new(gateway.clone()), user.clone());
    data.load().await;

    let err = data
        .update_user(ProfileUpdate {
            name: Some("  ".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(gateway.find_profile(user.id).await.unwrap().unwrap().name, "ada");

    let err = data.add_journal_entry(journal_entry(" ")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(data.user().unwrap().journal_entries.is_empty());
}
