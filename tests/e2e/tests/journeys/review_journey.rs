//! Journey: a learner works through reviews over several weeks
//!
//! Drives the service with a manual clock and checks what the due queue and
//! the stored records look like at each step.

use chrono::Days;
use kioku_core::{ProgressStore, Quality};
use kioku_e2e_tests::harness::TestDatabaseManager;
use kioku_e2e_tests::mocks::TestDataFactory;

const LEARNER: &str = "learner-1";

#[test]
fn test_single_item_over_a_month() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();

    // Day 0: new items are due immediately
    service.start_studying(LEARNER, "taberu").unwrap();
    assert_eq!(service.due_items(LEARNER, 10).unwrap().len(), 1);

    let progress = service.submit_review(LEARNER, "taberu", 5).unwrap();
    assert_eq!(progress.retention.interval, 1);
    assert_eq!(progress.retention.next_review_date, db.today() + Days::new(1));
    assert!(service.due_items(LEARNER, 10).unwrap().is_empty());

    // Day 1
    db.advance_days(1);
    assert_eq!(service.due_items(LEARNER, 10).unwrap().len(), 1);
    let progress = service.submit_review(LEARNER, "taberu", 4).unwrap();
    assert_eq!(progress.retention.interval, 6);
    assert_eq!(progress.retention.repetitions, 2);

    // Day 7
    db.advance_days(6);
    let progress = service.submit_review(LEARNER, "taberu", 4).unwrap();
    // round(6 * 2.6)
    assert_eq!(progress.retention.interval, 16);

    // Day 12: not due yet
    db.advance_days(5);
    assert!(service.due_items(LEARNER, 10).unwrap().is_empty());
    let stats = service.review_stats(LEARNER, "taberu").unwrap();
    assert!(!stats.is_due);
    assert_eq!(stats.days_until_next_review, 11);
    assert_eq!(stats.days_since_last_review, Some(5));

    // Day 23: forgot it
    db.advance_days(11);
    assert_eq!(service.due_items(LEARNER, 10).unwrap().len(), 1);
    let progress = service.submit_review(LEARNER, "taberu", 1).unwrap();
    assert_eq!(progress.retention.repetitions, 0);
    assert_eq!(progress.retention.interval, 1);
    assert!((progress.retention.ease_factor - 2.06).abs() < 1e-9);
    assert_eq!(progress.retention.next_review_date, db.today() + Days::new(1));

    let stats = service.review_stats(LEARNER, "taberu").unwrap();
    assert_eq!(stats.total_reviews, 4);
    assert_eq!(stats.correct_reviews, 3);
    assert_eq!(stats.success_rate, 75.0);
    assert_eq!(progress.version, 5);
}

#[test]
fn test_due_queue_order_and_limit() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let ids = db.seed_items(LEARNER, 6);

    // Push two items out by one day and one by six days
    service.submit_review(LEARNER, &ids[0], 4).unwrap();
    service.submit_review(LEARNER, &ids[1], 4).unwrap();
    service.submit_review(LEARNER, &ids[2], 4).unwrap();
    service.submit_review(LEARNER, &ids[2], 4).unwrap();

    let due_today = service.due_items(LEARNER, 10).unwrap();
    let mut expected: Vec<String> = ids[3..].to_vec();
    expected.sort();
    let got: Vec<String> = due_today.iter().map(|p| p.item_id.clone()).collect();
    assert_eq!(got, expected);

    assert_eq!(service.due_items(LEARNER, 2).unwrap().len(), 2);
    assert!(service.due_items(LEARNER, 0).unwrap().is_empty());

    // A week later everything is due; overdue-by-most comes first
    db.advance_days(7);
    let due = service.due_items(LEARNER, 10).unwrap();
    assert_eq!(due.len(), 6);
    for pair in due.windows(2) {
        assert!(pair[0].retention.next_review_date <= pair[1].retention.next_review_date);
    }
    assert_eq!(due[5].item_id, ids[2]);
}

#[test]
fn test_late_review_uses_scheduled_interval() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let today = db.today();

    let mature = TestDataFactory::mature(today);
    let overdue = TestDataFactory::overdue_progress(LEARNER, "nomu", mature, today, 10);
    db.store.create(&overdue).unwrap();

    let progress = service.submit_review(LEARNER, "nomu", 4).unwrap();

    // round(40 * 2.7), counted from the day of the review
    assert_eq!(progress.retention.interval, 108);
    assert_eq!(progress.retention.next_review_date, today + Days::new(108));
    assert_eq!(progress.retention.repetitions, 7);
}

#[test]
fn test_leech_stays_at_floor() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let today = db.today();

    let state = TestDataFactory::leech(today);
    let leech = TestDataFactory::overdue_progress(LEARNER, "oyogu", state, today, 0);
    db.store.create(&leech).unwrap();

    for _ in 0..5 {
        let progress = service.submit_review(LEARNER, "oyogu", 0).unwrap();
        assert_eq!(progress.retention.ease_factor, 1.3);
        assert_eq!(progress.retention.interval, 1);
        db.advance_days(1);
    }
}

#[test]
fn test_preview_matches_submission() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let [_, learned, _] = db.seed_with_retention_states(LEARNER);

    let preview = service.preview(LEARNER, &learned).unwrap();
    let submitted = service
        .submit_review(LEARNER, &learned, Quality::CORRECT_HESITANT.into())
        .unwrap();

    assert_eq!(submitted.retention, preview.good);
    assert!(preview.easy.interval >= preview.good.interval);
    assert!(preview.good.interval >= preview.hard.interval);
    assert_eq!(preview.again.interval, 1);
}

#[test]
fn test_right_wrong_answers() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();

    service.submit_answer(LEARNER, "kiku", true).unwrap();
    service.submit_answer(LEARNER, "kiku", true).unwrap();
    let progress = service.submit_answer(LEARNER, "kiku", false).unwrap();

    assert_eq!(progress.total_reviews, 3);
    assert_eq!(progress.correct_reviews, 2);
    assert_eq!(progress.retention.repetitions, 0);
    // 2.5, 2.5, then 2.5 - 0.54
    assert!((progress.retention.ease_factor - 1.96).abs() < 1e-9);
}

#[test]
fn test_learners_are_isolated() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();

    service.submit_review("learner-a", "miru", 5).unwrap();
    service.start_studying("learner-b", "miru").unwrap();

    let a = db.store.load("learner-a", "miru").unwrap();
    let b = db.store.load("learner-b", "miru").unwrap();
    assert_eq!(a.retention.repetitions, 1);
    assert_eq!(b.retention.repetitions, 0);

    assert!(service.due_items("learner-a", 10).unwrap().is_empty());
    assert_eq!(service.due_items("learner-b", 10).unwrap().len(), 1);
}
