//! Registration, renewal, deletion and portal workflows over SQLite

use chrono::NaiveDate;
use gym_common::db::{init_memory_database, members, payments, plans, trainers, SqliteStore};
use gym_common::models::{Member, MembershipPlan, Payment, PaymentMode, PaymentStatus, Trainer};
use gym_common::workflow::{
    delete_member, ensure_not_registered, login, payment_history, process_deletion, profile,
    register_member, renew_membership, ActionContext, DeletionOutcome, DeletionRequest,
    RegistrationRequest, RenewalRequest,
};
use gym_common::{Error, GymStore};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Two plans, one trainer, member 1 (Amy) ending 2024-06-30 with two payments
async fn seeded_store() -> SqliteStore {
    let pool = init_memory_database().await.unwrap();

    for (name, price, months) in [("Gold", 4999, 6), ("Monthly", 799, 1)] {
        plans::insert_plan(
            &pool,
            &MembershipPlan {
                name: name.to_string(),
                price: Decimal::from(price),
                validity_months: months,
            },
        )
        .await
        .unwrap();
    }

    trainers::insert_trainer(
        &pool,
        &Trainer {
            trainer_id: 1,
            name: "Raj Kumar".to_string(),
            specialization: "Yoga".to_string(),
        },
    )
    .await
    .unwrap();

    members::insert_member_row(
        &pool,
        &Member {
            member_id: 1,
            name: "Amy Lee".to_string(),
            age: Some(29),
            gender: Some("F".to_string()),
            contact: Some(9876543210),
            plan: "Gold".to_string(),
            start_date: date(2024, 1, 2),
            end_date: Some(date(2024, 6, 30)),
            trainer_id: Some(1),
        },
    )
    .await
    .unwrap();

    add_payment(&pool, 1, "PAAAAA1", date(2024, 1, 2), 4999).await;
    add_payment(&pool, 1, "PAAAAA2", date(2023, 7, 1), 4999).await;

    SqliteStore::new(pool)
}

async fn add_payment(pool: &SqlitePool, member_id: i64, id: &str, day: NaiveDate, amount: i64) {
    payments::insert_payment(
        pool,
        &Payment {
            payment_id: id.into(),
            member_id: Some(member_id),
            amount: Some(Decimal::from(amount)),
            payment_date: Some(day),
            mode: Some(PaymentMode::Cash),
            status: Some(PaymentStatus::Paid),
        },
    )
    .await
    .unwrap();
}

/// Member 2 (Ben) on Monthly with three payments of his own
async fn add_second_member(pool: &SqlitePool) {
    members::insert_member_row(
        pool,
        &Member {
            member_id: 2,
            name: "Ben Ray".to_string(),
            age: Some(35),
            gender: Some("M".to_string()),
            contact: Some(9000000002),
            plan: "Monthly".to_string(),
            start_date: date(2024, 5, 1),
            end_date: Some(date(2024, 5, 31)),
            trainer_id: None,
        },
    )
    .await
    .unwrap();

    add_payment(pool, 2, "PBBBBB1", date(2024, 3, 1), 799).await;
    add_payment(pool, 2, "PBBBBB2", date(2024, 4, 1), 799).await;
    add_payment(pool, 2, "PBBBBB3", date(2024, 5, 1), 799).await;
}

fn renewal(member_id: i64, months: u32) -> RenewalRequest {
    RenewalRequest {
        member_id,
        plan: "Monthly".to_string(),
        amount: Decimal::from(799),
        mode: Some(PaymentMode::Card),
        status: PaymentStatus::Paid,
        duration_months: months,
    }
}

#[tokio::test]
async fn test_renewal_before_expiry_extends_from_end_date() {
    let store = seeded_store().await;
    let ctx = ActionContext::new(date(2024, 6, 1));

    let outcome = renew_membership(&store, &ctx, renewal(1, 2)).await.unwrap();

    assert_eq!(outcome.start_date, date(2024, 7, 1));
    assert_eq!(outcome.end_date, date(2024, 8, 30));
    assert!(outcome.member_updated);

    let last = outcome.last_payment.unwrap();
    assert_eq!(last.payment_date, Some(date(2024, 6, 1)));
    assert_eq!(last.amount, Some(Decimal::from(799)));

    assert_eq!(store.member_end_date(1).await.unwrap(), Some(date(2024, 8, 30)));
    let listed = store.list_members(None).await.unwrap();
    assert_eq!(listed[0].plan.as_deref(), Some("Monthly"));
    assert_eq!(listed[0].payment_mode.as_deref(), Some("Card"));
}

#[tokio::test]
async fn test_renewal_after_expiry_starts_today() {
    let store = seeded_store().await;
    let ctx = ActionContext::new(date(2024, 9, 10));

    let outcome = renew_membership(&store, &ctx, renewal(1, 1)).await.unwrap();

    assert_eq!(outcome.start_date, date(2024, 9, 10));
    assert_eq!(outcome.end_date, date(2024, 10, 10));
}

#[tokio::test]
async fn test_renewal_of_unknown_member() {
    let store = seeded_store().await;
    let ctx = ActionContext::new(date(2024, 6, 1));

    let err = renew_membership(&store, &ctx, renewal(42, 1)).await.unwrap_err();

    assert!(matches!(err, Error::MemberNotFound(42)));
    assert_eq!(count(store.pool(), "payments").await, 2);
}

#[tokio::test]
async fn test_registration_end_date() {
    let store = seeded_store().await;
    let ctx = ActionContext::new(date(2024, 3, 1));

    let outcome = register_member(
        &store,
        &ctx,
        RegistrationRequest {
            name: "  bob stone ".to_string(),
            age: Some(40),
            gender: Some("male".to_string()),
            contact: Some(9123456780),
            plan: "gold".to_string(),
            trainer_id: Some(1),
            payment_mode: Some(PaymentMode::Cash),
            payment_status: PaymentStatus::Paid,
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.start_date, date(2024, 3, 1));
    assert_eq!(outcome.end_date, date(2024, 8, 28));

    let profile = store.member_profile(outcome.member_id).await.unwrap().unwrap();
    assert_eq!(profile.name, "Bob Stone");
    assert_eq!(profile.gender.as_deref(), Some("M"));
    assert_eq!(profile.plan.as_deref(), Some("Gold"));
    assert_eq!(profile.trainer_name.as_deref(), Some("Raj Kumar"));

    let history = store.member_payments(outcome.member_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].payment_id, outcome.payment_id.as_str());
    assert_eq!(history[0].amount, Some(Decimal::from(4999)));

    let dup = ensure_not_registered(&store, "bob stone", 9123456780).await;
    assert!(matches!(dup, Err(Error::AlreadyRegistered)));
    assert!(ensure_not_registered(&store, "bob stone", 1).await.is_ok());
}

#[tokio::test]
async fn test_registration_unknown_plan() {
    let store = seeded_store().await;
    let ctx = ActionContext::new(date(2024, 3, 1));

    let err = register_member(
        &store,
        &ctx,
        RegistrationRequest {
            name: "Cy".to_string(),
            age: None,
            gender: None,
            contact: Some(1),
            plan: "Platinum".to_string(),
            trainer_id: None,
            payment_mode: None,
            payment_status: PaymentStatus::Unpaid,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::PlanNotFound(ref p) if p == "Platinum"));
    assert_eq!(count(store.pool(), "members").await, 1);
}

#[tokio::test]
async fn test_delete_nonexistent_member_changes_nothing() {
    let store = seeded_store().await;
    add_second_member(store.pool()).await;

    let err = delete_member(&store, 99).await.unwrap_err();

    assert!(matches!(err, Error::DeletionFailed { member_id: 99, .. }));
    assert_eq!(count(store.pool(), "members").await, 2);
    assert_eq!(count(store.pool(), "payments").await, 5);
}

#[tokio::test]
async fn test_delete_member_removes_only_its_payments() {
    let store = seeded_store().await;
    add_second_member(store.pool()).await;

    let removed = delete_member(&store, 1).await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(count(store.pool(), "members").await, 1);
    assert_eq!(count(store.pool(), "payments").await, 3);
    assert!(store.member_profile(1).await.unwrap().is_none());
    assert!(store.member_payments(1).await.unwrap().is_empty());

    let ben: Vec<String> = store
        .member_payments(2)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.payment_id)
        .collect();
    assert_eq!(ben, vec!["PBBBBB3", "PBBBBB2", "PBBBBB1"]);
    assert_eq!(store.member_end_date(2).await.unwrap(), Some(date(2024, 5, 31)));
}

#[tokio::test]
async fn test_two_step_deletion_by_name() {
    let store = seeded_store().await;

    let preview = process_deletion(
        &store,
        DeletionRequest {
            query: "amy lee".to_string(),
            confirm: false,
        },
    )
    .await
    .unwrap();
    assert!(matches!(preview, DeletionOutcome::Pending { ref member } if member.member_id == 1));
    assert_eq!(count(store.pool(), "members").await, 1);

    let done = process_deletion(
        &store,
        DeletionRequest {
            query: "1".to_string(),
            confirm: true,
        },
    )
    .await
    .unwrap();
    assert!(matches!(done, DeletionOutcome::Deleted { payments_removed: 2, .. }));

    let missing = process_deletion(
        &store,
        DeletionRequest {
            query: "amy lee".to_string(),
            confirm: true,
        },
    )
    .await;
    assert!(matches!(missing, Err(Error::NoMatchingMember(_))));
}

#[tokio::test]
async fn test_portal_login_and_views() {
    let store = seeded_store().await;

    let session = login(&store, " 1 ", "9876543210").await.unwrap();
    assert_eq!(session.name, "Amy Lee");

    let me = profile(&store, &session).await.unwrap();
    assert_eq!(me.trainer_specialization.as_deref(), Some("Yoga"));

    let history = payment_history(&store, &session).await.unwrap();
    let dates: Vec<_> = history.iter().map(|p| p.payment_date).collect();
    assert_eq!(dates, vec![Some(date(2024, 1, 2)), Some(date(2023, 7, 1))]);

    assert!(matches!(
        login(&store, "1", "1111111111").await,
        Err(Error::InvalidCredentials)
    ));
    assert!(matches!(login(&store, "one", "9876543210").await, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_member_list_plan_filter() {
    let store = seeded_store().await;

    assert_eq!(store.list_members(Some("Gold")).await.unwrap().len(), 1);
    assert!(store.list_members(Some("Monthly")).await.unwrap().is_empty());

    let all = store.list_members(None).await.unwrap();
    assert_eq!(all[0].trainer_name.as_deref(), Some("Raj Kumar"));
    assert_eq!(all[0].payment_amount, Some(Decimal::from(4999)));
    assert_eq!(all[0].payment_status.as_deref(), Some("Paid"));
}

#[tokio::test]
async fn test_same_day_payments_ordered_by_payment_id() {
    let store = seeded_store().await;
    add_payment(store.pool(), 1, "PFFFFFF", date(2024, 3, 1), 100).await;
    add_payment(store.pool(), 1, "P000000", date(2024, 3, 1), 200).await;

    let all = store.list_members(None).await.unwrap();
    assert_eq!(all[0].payment_amount, Some(Decimal::from(100)));

    let latest = store.latest_payment(1).await.unwrap().unwrap();
    assert_eq!(latest.amount, Some(Decimal::from(100)));

    let ids: Vec<String> = store
        .member_payments(1)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.payment_id)
        .collect();
    assert_eq!(ids, vec!["PFFFFFF", "P000000", "PAAAAA1", "PAAAAA2"]);
}
