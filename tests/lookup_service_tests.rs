//! LookupService tests
//!
//! Provider 和历史存储都用内存 mock，验证历史写入条件和失败处理。

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use geolocator::errors::{GeolocatorError, Result};
use geolocator::services::{AuthenticatedUser, GeoLookup, LookupOutcome, LookupService, ProviderError};
use geolocator::storage::{GeoData, HistoryRecord, HistoryStore, User};

// =============================================================================
// Mocks
// =============================================================================

struct MockProvider {
    result: std::result::Result<GeoData, ProviderError>,
    calls: Mutex<Vec<Option<String>>>,
}

impl MockProvider {
    fn ok(data: GeoData) -> Self {
        Self {
            result: Ok(data),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: ProviderError) -> Self {
        Self {
            result: Err(err),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl GeoLookup for MockProvider {
    async fn lookup(&self, ip: Option<&str>) -> std::result::Result<GeoData, ProviderError> {
        self.calls.lock().unwrap().push(ip.map(str::to_string));
        self.result.clone()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[derive(Default)]
struct MemoryHistory {
    records: Mutex<Vec<HistoryRecord>>,
    fail_inserts: bool,
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn insert_history(
        &self,
        user_id: i64,
        ip_address: &str,
        geo_data: &GeoData,
    ) -> Result<HistoryRecord> {
        if self.fail_inserts {
            return Err(GeolocatorError::database_operation("disk full"));
        }
        let mut records = self.records.lock().unwrap();
        let now = Utc::now();
        let record = HistoryRecord {
            id: records.len() as i64 + 1,
            user_id,
            ip_address: ip_address.to_string(),
            geo_data: geo_data.clone(),
            created_at: now,
            updated_at: now,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list_history_by_owner(&self, user_id: i64) -> Result<Vec<HistoryRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_history_by_owner(&self, _user_id: i64, _ids: &[i64]) -> Result<u64> {
        Ok(0)
    }

    async fn existing_history_ids(&self, _ids: &[i64]) -> Result<HashSet<i64>> {
        Ok(HashSet::new())
    }
}

fn geo_data() -> GeoData {
    match json!({ "ip": "8.8.8.8", "city": "Mountain View", "country": "US" }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn requester() -> AuthenticatedUser {
    let now = Utc::now();
    AuthenticatedUser {
        user: User {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            created_at: now,
            updated_at: now,
        },
        token_id: "test-jti".to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_lookup_with_ip_records_history() {
    let provider = Arc::new(MockProvider::ok(geo_data()));
    let history = Arc::new(MemoryHistory::default());
    let service = LookupService::new(provider.clone(), history.clone());
    let user = requester();

    let outcome = service.perform_lookup(Some(" 8.8.8.8 "), Some(&user)).await;

    match outcome {
        LookupOutcome::Found { geo_data: data, history_id } => {
            assert_eq!(data, geo_data());
            assert_eq!(history_id, Some(1));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let records = history.list_history_by_owner(7).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ip_address, "8.8.8.8");
    assert_eq!(
        provider.calls.lock().unwrap().as_slice(),
        &[Some("8.8.8.8".to_string())]
    );
}

#[tokio::test]
async fn test_self_lookup_does_not_record() {
    let provider = Arc::new(MockProvider::ok(geo_data()));
    let history = Arc::new(MemoryHistory::default());
    let service = LookupService::new(provider.clone(), history.clone());
    let user = requester();

    for ip in [None, Some(""), Some("   ")] {
        let outcome = service.perform_lookup(ip, Some(&user)).await;
        assert!(matches!(
            outcome,
            LookupOutcome::Found { history_id: None, .. }
        ));
    }

    assert!(history.records.lock().unwrap().is_empty());
    assert!(provider.calls.lock().unwrap().iter().all(Option::is_none));
}

#[tokio::test]
async fn test_anonymous_lookup_does_not_record() {
    let history = Arc::new(MemoryHistory::default());
    let service = LookupService::new(Arc::new(MockProvider::ok(geo_data())), history.clone());

    let outcome = service.perform_lookup(Some("8.8.8.8"), None).await;
    assert!(matches!(outcome, LookupOutcome::Found { history_id: None, .. }));
    assert!(history.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_history_failure_does_not_fail_lookup() {
    let history = Arc::new(MemoryHistory {
        fail_inserts: true,
        ..Default::default()
    });
    let service = LookupService::new(Arc::new(MockProvider::ok(geo_data())), history);
    let user = requester();

    let outcome = service.perform_lookup(Some("8.8.8.8"), Some(&user)).await;
    match outcome {
        LookupOutcome::Found { geo_data: data, history_id } => {
            assert_eq!(data["city"], "Mountain View");
            assert_eq!(history_id, None);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_provider_failure_skips_history() {
    let history = Arc::new(MemoryHistory::default());
    let service = LookupService::new(
        Arc::new(MockProvider::failing(ProviderError::Status(503))),
        history.clone(),
    );
    let user = requester();

    let outcome = service.perform_lookup(Some("8.8.8.8"), Some(&user)).await;
    assert_eq!(outcome, LookupOutcome::Failed(ProviderError::Status(503)));
    assert!(history.records.lock().unwrap().is_empty());
    assert_eq!(service.provider_name(), "mock");
}
