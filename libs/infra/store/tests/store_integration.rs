// [libs/infra/store/tests/store_integration.rs]
use gateway_infra_store::repositories::{
    transaction_repository::NewTransaction, usage_repository::NewUsage, user_repository::NewUser,
    TransactionRepository, UsageRepository, UserRepository,
};
use gateway_infra_store::StoreClient;

async fn memory_store() -> StoreClient {
    StoreClient::connect(":memory:", None)
        .await
        .expect("in-memory store should always connect")
}

#[tokio::test]
async fn registers_and_looks_up_a_user() {
    let store = memory_store().await;
    let conn = store.connection().unwrap();

    let created = UserRepository::insert(
        &conn,
        NewUser {
            user_id: "u-1".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            hashed_password: "hash".into(),
        requests_per_minute: None,
        requests_per_hour: None,
        requests_per_day: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(created.token_balance, 100.0);

    let found = UserRepository::find_by_username(&conn, "ada").await.unwrap();
    assert_eq!(found.unwrap().user_id, "u-1");
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let store = memory_store().await;
    let conn = store.connection().unwrap();

    let make = |n: &str| NewUser {
        user_id: n.to_string(),
        username: "ada".into(),
        email: format!("{n}@example.com"),
        hashed_password: "hash".into(),
    requests_per_minute: None,
    requests_per_hour: None,
    requests_per_day: None,
    };

    UserRepository::insert(&conn, make("u-1")).await.unwrap();
    let result = UserRepository::insert(&conn, make("u-2")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn debit_fails_closed_on_insufficient_balance() {
    let store = memory_store().await;
    let conn = store.connection().unwrap();

    UserRepository::insert(
        &conn,
        NewUser {
            user_id: "u-1".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            hashed_password: "hash".into(),
        requests_per_minute: None,
        requests_per_hour: None,
        requests_per_day: None,
        },
    )
    .await
    .unwrap();

    let debited = UserRepository::try_debit(&conn, "u-1", 1000.0).await.unwrap();
    assert!(debited.is_none());

    let debited = UserRepository::try_debit(&conn, "u-1", 40.0).await.unwrap();
    assert_eq!(debited, Some((100.0, 60.0)));
}

#[tokio::test]
async fn usage_ledger_counts_only_successes_in_window() {
    let store = memory_store().await;
    let conn = store.connection().unwrap();

    UserRepository::insert(
        &conn,
        NewUser {
            user_id: "u-1".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            hashed_password: "hash".into(),
        requests_per_minute: None,
        requests_per_hour: None,
        requests_per_day: None,
        },
    )
    .await
    .unwrap();

    for success in [true, true, false] {
        UsageRepository::insert(
            &conn,
            NewUsage {
                user_id: "u-1".into(),
                api_key_id: None,
                endpoint: "/api/credit-scores".into(),
                tokens_consumed: 1.0,
                request_size: 10,
                response_size: 10,
                processing_time_ms: 5,
                success,
                error_message: None,
            },
        )
        .await
        .unwrap();
    }

    let since = "2000-01-01T00:00:00Z";
    let count = UsageRepository::count_since(&conn, "u-1", None, since).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn transaction_ledger_is_append_only_history() {
    let store = memory_store().await;
    let conn = store.connection().unwrap();

    UserRepository::insert(
        &conn,
        NewUser {
            user_id: "u-1".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            hashed_password: "hash".into(),
        requests_per_minute: None,
        requests_per_hour: None,
        requests_per_day: None,
        },
    )
    .await
    .unwrap();

    TransactionRepository::insert(
        &conn,
        NewTransaction {
            user_id: "u-1".into(),
            transaction_type: "purchase".into(),
            amount: 50.0,
            previous_balance: 100.0,
            new_balance: 150.0,
            description: "token purchase".into(),
            reference_id: Some("ref-1".into()),
        },
    )
    .await
    .unwrap();

    let history = TransactionRepository::list_recent(&conn, "u-1", 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].new_balance, 150.0);
}
