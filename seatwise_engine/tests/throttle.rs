use seatwise_engine::{
    db_types::AccountStatus,
    queues::{work_queue, SpamReason, SpamSignal},
    test_utils::{fixtures::seed_account, prepare_env::fresh_database},
    traits::AccountManagement,
    AbuseThrottle,
    BookingApi,
};

#[tokio::test]
async fn third_strike_blacklists() {
    let db = fresh_database().await;
    let alice = seed_account(&db, "alice").await;
    let bob = seed_account(&db, "bob").await;
    let (signals, queue) = work_queue();
    let mut throttle = AbuseThrottle::new(db.clone(), queue);
    assert_eq!(throttle.threshold(), 3);

    signals.push(SpamSignal::new(alice.id, SpamReason::AbandonedHold));
    signals.push(SpamSignal::new(alice.id, SpamReason::AbandonedHold));
    signals.push(SpamSignal::new(bob.id, SpamReason::Reported));
    let result = throttle.drain().await;
    assert_eq!(result.processed, 3);
    assert!(result.blacklisted.is_empty());
    assert_eq!(db.fetch_spam_counter(alice.id).await.unwrap().unwrap().count, 2);
    assert_eq!(db.fetch_spam_counter(bob.id).await.unwrap().unwrap().count, 1);
    assert_eq!(db.fetch_account(alice.id).await.unwrap().unwrap().status, AccountStatus::Active);

    signals.push(SpamSignal::new(alice.id, SpamReason::AbandonedHold));
    let result = throttle.drain().await;
    assert_eq!(result.blacklisted, vec![alice.id]);
    assert_eq!(db.fetch_account(alice.id).await.unwrap().unwrap().status, AccountStatus::Blacklisted);
    assert_eq!(db.fetch_account(bob.id).await.unwrap().unwrap().status, AccountStatus::Active);
}

#[tokio::test]
async fn counters_only_go_up() {
    let db = fresh_database().await;
    let alice = seed_account(&db, "alice").await;
    let (signals, queue) = work_queue();
    let mut throttle = AbuseThrottle::new(db.clone(), queue).with_threshold(2);
    let mut last = 0;
    for round in 0..4 {
        signals.push(SpamSignal::new(alice.id, SpamReason::Reported));
        let result = throttle.drain().await;
        assert_eq!(result.processed, 1);
        // Only the strike that crosses the threshold reports a new blacklisting.
        assert_eq!(result.blacklisted.len(), usize::from(round == 1));
        let count = db.fetch_spam_counter(alice.id).await.unwrap().unwrap().count;
        assert!(count > last);
        last = count;
    }
    assert_eq!(last, 4);
    assert_eq!(db.fetch_account(alice.id).await.unwrap().unwrap().status, AccountStatus::Blacklisted);
}

#[tokio::test]
async fn blacklisting_is_never_lifted() {
    let db = fresh_database().await;
    let alice = seed_account(&db, "alice").await;
    db.set_account_status(alice.id, AccountStatus::Blacklisted).await.unwrap();
    let (signals, queue) = work_queue();
    let mut throttle = AbuseThrottle::new(db.clone(), queue).with_threshold(1);
    signals.push(SpamSignal::new(alice.id, SpamReason::Reported));
    let result = throttle.drain().await;
    assert!(result.blacklisted.is_empty());
    assert_eq!(db.fetch_account(alice.id).await.unwrap().unwrap().status, AccountStatus::Blacklisted);
}

#[tokio::test]
async fn bad_signals_do_not_stop_the_drain() {
    let db = fresh_database().await;
    let alice = seed_account(&db, "alice").await;
    let (signals, queue) = work_queue();
    let mut throttle = AbuseThrottle::new(db.clone(), queue);
    signals.push(SpamSignal::new(9999, SpamReason::Reported));
    signals.push(SpamSignal::new(alice.id, SpamReason::Reported));
    let result = throttle.drain().await;
    assert_eq!(result.failed, 1);
    assert_eq!(result.processed, 1);
    assert_eq!(db.fetch_spam_counter(alice.id).await.unwrap().unwrap().count, 1);
}

#[tokio::test]
async fn reports_from_the_booking_engine_reach_the_throttle() {
    let db = fresh_database().await;
    let alice = seed_account(&db, "alice").await;
    let (signals, queue) = work_queue();
    let bookings = BookingApi::new(db.clone(), signals);
    let mut throttle = AbuseThrottle::new(db.clone(), queue).with_threshold(2);
    bookings.flag_suspicious(alice.id, SpamReason::Reported);
    bookings.flag_suspicious(alice.id, SpamReason::Reported);
    let result = throttle.drain().await;
    assert_eq!(result.processed, 2);
    assert_eq!(result.blacklisted, vec![alice.id]);
}

#[tokio::test]
async fn account_status_changes_are_visible_immediately() {
    let db = fresh_database().await;
    let alice = seed_account(&db, "alice").await;
    for status in [AccountStatus::Blacklisted, AccountStatus::Active, AccountStatus::Blacklisted] {
        let updated = db.set_account_status(alice.id, status).await.unwrap();
        assert_eq!(updated.status, status);
        let stored = db.fetch_account(alice.id).await.unwrap().expect("account should still exist");
        assert_eq!(stored.status, status);
        let by_name = db.fetch_account_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.status, status);
    }
    let counter = db.increment_spam_counter(alice.id).await.unwrap();
    assert_eq!(db.fetch_spam_counter(alice.id).await.unwrap(), Some(counter));
}
