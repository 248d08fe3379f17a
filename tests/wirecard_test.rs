use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use mockito::Matcher;
use serde_json::json;
use url::Url;
use uuid::Uuid;

use gateway_core::adapters::{
    InMemoryReconciliationQueue, InMemoryTransactionStore, NoVerification, QueryCallbackUrlBuilder,
};
use gateway_core::config::{HttpOptions, WirecardConfig};
use gateway_core::domain::{TotalPrice, Transaction, TransactionStatus};
use gateway_core::payment::handler::{
    CallbackPayload, HandleCallbackData, InitData, RequestContext,
};
use gateway_core::payment::wirecard::WirecardHandler;
use gateway_core::payment::CallbackType;
use gateway_core::payment::MethodHandler;
use gateway_core::ports::{StoreError, StoreResult, TransactionStore};

fn config(host: &str) -> WirecardConfig {
    WirecardConfig {
        merchant_account_id: "maid-1".to_string(),
        username: "user".to_string(),
        password: "pass".to_string(),
        sandbox: true,
        host_test: host.to_string(),
        host_live: host.to_string(),
        http: HttpOptions {
            timeout_secs: 5,
            retry: 0,
            log_bodies: false,
        },
    }
}

fn handler_with_store(host: &str, store: Arc<dyn TransactionStore>) -> WirecardHandler {
    WirecardHandler::new(
        &config(host),
        store,
        Arc::new(QueryCallbackUrlBuilder::new()),
        Arc::new(InMemoryReconciliationQueue::new()),
        Arc::new(NoVerification),
    )
    .unwrap()
}

fn transaction(gross: i64) -> Transaction {
    Transaction::new("R-1001", TotalPrice::new(gross, "EUR"), Uuid::new_v4())
}

fn init_data(transaction: &Transaction) -> InitData {
    InitData {
        transaction: transaction.clone(),
        context: RequestContext::new(Url::parse("https://shop.example").unwrap()),
    }
}

fn callback_data(transaction: &Transaction, callback_type: CallbackType) -> HandleCallbackData {
    let payload = CallbackPayload::default().with_form(
        "response-base64",
        BASE64.encode(
            json!({
                "payment": {
                    "request-id": transaction.id.to_string(),
                    "transaction-id": "W-77",
                    "transaction-state": "success",
                }
            })
            .to_string(),
        ),
    );
    HandleCallbackData {
        transaction: transaction.clone(),
        payload,
        callback_type,
    }
}

#[tokio::test]
async fn test_init_registers_payment_and_returns_redirect_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/payment/register")
        .match_header("authorization", "Basic dXNlcjpwYXNz")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "payment": {
                "merchant-account-id": { "value": "maid-1" },
                "transaction-type": "authorization",
                "requested-amount": { "value": 20.0, "currency": "EUR" },
            }
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"payment-redirect-url":"https://pay.example/x"}"#)
        .create_async()
        .await;

    let store = Arc::new(InMemoryTransactionStore::new());
    let tx = transaction(2000);
    store.insert(tx.clone());
    let handler = handler_with_store(&server.url(), store.clone());

    let result = handler.init(init_data(&tx)).await;

    assert!(result.success);
    assert_eq!(result.redirect_url.as_deref(), Some("https://pay.example/x"));
    assert!(result.errors.is_empty());

    // the transaction was persisted as pending before the remote call
    let stored = store.by_id(tx.id).await.unwrap();
    assert_eq!(stored.status, Some(TransactionStatus::Pending));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_init_converts_minor_units_to_decimal_major_units() {
    let mut server = mockito::Server::new_async().await;
    let tx = transaction(1050);
    let mock = server
        .mock("POST", "/api/payment/register")
        .match_body(Matcher::PartialJson(json!({
            "payment": {
                "request-id": tx.id.to_string(),
                "requested-amount": { "value": 10.5, "currency": "EUR" },
            }
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"payment-redirect-url":"https://pay.example/x"}"#)
        .create_async()
        .await;

    let store = Arc::new(InMemoryTransactionStore::new());
    store.insert(tx.clone());
    let handler = handler_with_store(&server.url(), store);

    let result = handler.init(init_data(&tx)).await;

    assert!(result.success);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_init_surfaces_provider_error_list() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/payment/register")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"errors":[{"code":"1","description":"bad account"}]}"#)
        .create_async()
        .await;

    let store = Arc::new(InMemoryTransactionStore::new());
    let tx = transaction(2000);
    store.insert(tx.clone());
    let handler = handler_with_store(&server.url(), store);

    let result = handler.init(init_data(&tx)).await;

    assert!(!result.success);
    assert!(result.redirect_url.is_none());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, "1");
    assert_eq!(result.errors[0].message, "bad account");
}

#[tokio::test]
async fn test_init_fails_when_redirect_url_is_missing() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/payment/register")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    let store = Arc::new(InMemoryTransactionStore::new());
    let tx = transaction(2000);
    store.insert(tx.clone());
    let handler = handler_with_store(&server.url(), store);

    let result = handler.init(init_data(&tx)).await;

    assert!(!result.success);
    assert_eq!(result.errors[0].code, "wirecard.no_redirect_url");
}

#[tokio::test]
async fn test_init_fails_on_undecodable_response() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/payment/register")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let store = Arc::new(InMemoryTransactionStore::new());
    let tx = transaction(2000);
    store.insert(tx.clone());
    let handler = handler_with_store(&server.url(), store);

    let result = handler.init(init_data(&tx)).await;

    assert!(!result.success);
    assert_eq!(result.errors[0].code, "remote.decode");
}

#[tokio::test]
async fn test_init_fails_on_transport_error() {
    // nothing listens here
    let store = Arc::new(InMemoryTransactionStore::new());
    let tx = transaction(2000);
    store.insert(tx.clone());
    let handler = handler_with_store("http://127.0.0.1:9", store);

    let result = handler.init(init_data(&tx)).await;

    assert!(!result.success);
    assert_eq!(result.errors[0].code, "remote.transport");
}

struct FailingStore;

#[async_trait]
impl TransactionStore for FailingStore {
    async fn save_status(
        &self,
        _id: Uuid,
        _status: TransactionStatus,
        _foreign_id: Option<String>,
    ) -> StoreResult<Transaction> {
        Err(StoreError::Backend("disk full".to_string()))
    }

    async fn by_id(&self, id: Uuid) -> StoreResult<Transaction> {
        Err(StoreError::NotFound(id))
    }
}

#[tokio::test]
async fn test_init_makes_no_remote_call_when_save_fails() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/payment/register")
        .expect(0)
        .create_async()
        .await;

    let tx = transaction(2000);
    let handler = handler_with_store(&server.url(), Arc::new(FailingStore));

    let result = handler.init(init_data(&tx)).await;

    assert!(!result.success);
    assert_eq!(result.errors[0].code, "store.backend");
    assert!(result.errors[0].message.contains("disk full"));
    mock.assert_async().await;
}

struct VanishingStore;

#[async_trait]
impl TransactionStore for VanishingStore {
    async fn save_status(
        &self,
        id: Uuid,
        status: TransactionStatus,
        _foreign_id: Option<String>,
    ) -> StoreResult<Transaction> {
        let mut tx = Transaction::new("R-1001", TotalPrice::new(2000, "EUR"), Uuid::new_v4());
        tx.id = id;
        tx.status = Some(status);
        Ok(tx)
    }

    async fn by_id(&self, id: Uuid) -> StoreResult<Transaction> {
        Err(StoreError::NotFound(id))
    }
}

#[tokio::test]
async fn test_init_makes_no_remote_call_when_reload_fails() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/payment/register")
        .expect(0)
        .create_async()
        .await;

    let tx = transaction(2000);
    let handler = handler_with_store(&server.url(), Arc::new(VanishingStore));

    let result = handler.init(init_data(&tx)).await;

    assert!(!result.success);
    assert_eq!(result.errors[0].code, "store.not_found");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_callback_outcome_can_be_saved_repeatedly() {
    let store = Arc::new(InMemoryTransactionStore::new());
    let tx = transaction(2000);
    store.insert(tx.clone());
    store
        .save_status(tx.id, TransactionStatus::Pending, None)
        .await
        .unwrap();

    let handler = handler_with_store("http://127.0.0.1:9", store.clone());

    // duplicate delivery of the same callback
    let first = handler
        .handle_callback(callback_data(&tx, CallbackType::Success))
        .await;
    let second = handler
        .handle_callback(callback_data(&tx, CallbackType::Success))
        .await;
    assert_eq!(first, second);
    assert_eq!(first.status, TransactionStatus::Success);

    // the outer layer persists both outcomes; the second save re-asserts
    // the terminal status instead of failing
    for result in [&first, &second] {
        let saved = store
            .save_status(tx.id, result.status, result.foreign_id.clone())
            .await
            .unwrap();
        assert_eq!(saved.status, Some(TransactionStatus::Success));
        assert_eq!(saved.foreign_id.as_deref(), Some("W-77"));
    }

    // a late cancel callback cannot regress the terminal status
    let cancelled = handler
        .handle_callback(callback_data(&tx, CallbackType::Cancel))
        .await;
    assert_eq!(cancelled.status, TransactionStatus::Cancelled);
    let save = store
        .save_status(tx.id, cancelled.status, cancelled.foreign_id)
        .await;
    assert!(matches!(save, Err(StoreError::InvalidTransition { .. })));
}
