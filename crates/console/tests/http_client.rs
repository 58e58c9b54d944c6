use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;

use api_types::{
    bulk::{BulkOutcome, BulkRequest},
    common::{ErrorBody, ListEnvelope, Pagination},
    ledger::{LedgerBalance, LedgerRequest},
    user::{UserDetail, UserStatus, UserSummary},
};
use console::{
    Api, Client, ClientError, Direction, QueryDescriptor, SortOrder, Users,
};

const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
struct BackendState {
    seen: Arc<Mutex<Seen>>,
}

#[derive(Default)]
struct Seen {
    list_params: Option<Vec<(String, String)>>,
    bulk: Option<BulkRequest>,
    debit: Option<LedgerRequest>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            error: "token expired".to_string(),
        }),
    )
        .into_response()
}

fn sample_user(id: &str) -> UserSummary {
    UserSummary {
        id: id.to_string(),
        username: format!("user-{id}"),
        phone: "+2207001122".to_string(),
        status: UserStatus::Active,
        wallet_balance_minor: 30_000,
        created_at: Utc::now(),
    }
}

async fn list_users(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.seen.lock().unwrap().list_params = Some(params);
    Json(ListEnvelope {
        items: vec![sample_user("u1")],
        pagination: Pagination {
            page: 2,
            total_pages: 5,
            total_count: 97,
        },
    })
    .into_response()
}

async fn user_detail(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match id.as_str() {
        "u1" => Json(UserDetail {
            id: "u1".to_string(),
            username: "user-u1".to_string(),
            phone: "+2207001122".to_string(),
            email: Some("u1@example.com".to_string()),
            status: UserStatus::Active,
            wallet_balance_minor: 30_000,
            kyc_level: 2,
            total_topups_minor: 120_000,
            total_payments_minor: 90_000,
            last_login_at: None,
            created_at: Utc::now(),
        })
        .into_response(),
        "frozen" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody {
                error: "account is frozen".to_string(),
            }),
        )
            .into_response(),
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "ledger backend down".to_string(),
            }),
        )
            .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "no such user".to_string(),
            }),
        )
            .into_response(),
    }
}

async fn bulk_users(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(request): Json<BulkRequest>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut per_item_errors = std::collections::BTreeMap::new();
    for id in &request.ids {
        if id == "u2" {
            per_item_errors.insert(id.clone(), "provider timeout".to_string());
        }
    }
    let outcome = BulkOutcome {
        success_count: (request.ids.len() - per_item_errors.len()) as u32,
        error_count: per_item_errors.len() as u32,
        per_item_errors,
    };
    state.seen.lock().unwrap().bulk = Some(request);
    Json(outcome).into_response()
}

async fn ledger_debit(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(request): Json<LedgerRequest>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    // The server applies a 7-cent processing fee on debits; clients must
    // display this figure, not their own arithmetic.
    let balance = LedgerBalance {
        account_id: request.account_id.clone(),
        balance_minor: 30_000 - request.amount_minor - 7,
        reference: request.reference,
    };
    state.seen.lock().unwrap().debit = Some(request);
    Json(balance).into_response()
}

async fn spawn_backend() -> (String, BackendState) {
    let state = BackendState::default();
    let app = Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(user_detail))
        .route("/users/bulk", post(bulk_users))
        .route("/ledger/debit", post(ledger_debit))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

fn descriptor() -> QueryDescriptor {
    QueryDescriptor::new("createdAt", SortOrder::Desc, 20)
}

#[tokio::test]
async fn list_sends_bearer_token_and_query_contract() {
    let (base_url, state) = spawn_backend().await;
    let client = Client::new(&base_url, TOKEN).unwrap();

    let mut query = descriptor();
    query.search = "ada".to_string();
    query.filters.insert("status".to_string(), "active".to_string());

    let page = client.list::<Users>(&query).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 5);
    assert!(page.has_next);
    assert!(page.has_prev);

    let params = state.seen.lock().unwrap().list_params.clone().unwrap();
    for expected in [
        ("search", "ada"),
        ("status", "active"),
        ("page", "1"),
        ("limit", "20"),
        ("sortBy", "createdAt"),
        ("sortOrder", "desc"),
    ] {
        assert!(
            params.contains(&(expected.0.to_string(), expected.1.to_string())),
            "missing query pair {expected:?} in {params:?}"
        );
    }
}

#[tokio::test]
async fn status_codes_map_to_error_classes() {
    let (base_url, _state) = spawn_backend().await;

    let wrong_token = Client::new(&base_url, "stale").unwrap();
    let err = wrong_token.list::<Users>(&descriptor()).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));

    let client = Client::new(&base_url, TOKEN).unwrap();
    let err = client.detail::<Users>("nope").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound));

    let err = client.detail::<Users>("frozen").await.unwrap_err();
    match err {
        ClientError::Rejected(message) => assert_eq!(message, "account is frozen"),
        other => panic!("expected Rejected, got {other:?}"),
    }

    let err = client.detail::<Users>("boom").await.unwrap_err();
    match err {
        ClientError::Server(message) => assert_eq!(message, "ledger backend down"),
        other => panic!("expected Server, got {other:?}"),
    }
}

#[tokio::test]
async fn detail_is_richer_than_the_list_row() {
    let (base_url, _state) = spawn_backend().await;
    let client = Client::new(&base_url, TOKEN).unwrap();

    let detail = client.detail::<Users>("u1").await.unwrap();
    assert_eq!(detail.id, "u1");
    assert_eq!(detail.kyc_level, 2);
    assert_eq!(detail.total_topups_minor, 120_000);
}

#[tokio::test]
async fn bulk_round_trips_the_partial_outcome() {
    let (base_url, state) = spawn_backend().await;
    let client = Client::new(&base_url, TOKEN).unwrap();

    let request = BulkRequest {
        action: "suspend".to_string(),
        ids: vec!["u1".to_string(), "u2".to_string(), "u3".to_string()],
        reason: Some("fraud review".to_string()),
    };
    let outcome = client.bulk::<Users>(&request).await.unwrap();
    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.error_count, 1);
    assert_eq!(
        outcome.per_item_errors.get("u2").map(String::as_str),
        Some("provider timeout")
    );

    let seen = state.seen.lock().unwrap();
    let posted = seen.bulk.as_ref().unwrap();
    assert_eq!(posted.action, "suspend");
    assert_eq!(posted.reason.as_deref(), Some("fraud review"));
}

#[tokio::test]
async fn debit_returns_the_server_computed_balance() {
    let (base_url, state) = spawn_backend().await;
    let client = Client::new(&base_url, TOKEN).unwrap();

    let request = LedgerRequest {
        account_id: "u1".to_string(),
        amount_minor: 200,
        reason: "chargeback".to_string(),
        reference: None,
    };
    let balance = client.ledger(Direction::Debit, &request).await.unwrap();

    // 30000 - 200 would be the naive figure; the server charged its fee.
    assert_eq!(balance.balance_minor, 29_793);
    assert_eq!(
        state.seen.lock().unwrap().debit.as_ref().unwrap().reason,
        "chargeback"
    );
}
