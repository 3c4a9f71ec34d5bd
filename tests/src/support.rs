//! Mocked ledger REST API.
//!
//! [`MockLedger`] accepts batches on `POST /batches`, keeps every posted
//! transaction, reports a configurable status for any batch id and, once
//! they count as committed, serves posted transactions back on
//! `GET /transactions/{id}`. State is served only where a test mounts it;
//! every other address is a 404.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use dl_02_payload_codec::{decode, encode_record, PayloadFields};
use dl_03_transaction_builder::proto::{BatchList, Transaction, TransactionHeader};
use doc_runtime::{LedgerClient, RuntimeConfig};
use parking_lot::Mutex;
use prost::Message;
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Base64 state entry of `record`.
pub fn state_entry<T: Serialize>(record: &T) -> String {
    STANDARD.encode(encode_record(record).expect("record encodes"))
}

/// Records every transaction of every posted batch list.
struct AcceptBatches(Arc<Mutex<Vec<Transaction>>>);

impl Respond for AcceptBatches {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        match BatchList::decode(request.body.as_slice()) {
            Ok(list) => {
                let ids: Vec<String> = list.batches.iter().map(|b| b.header_signature.clone()).collect();
                self.0
                    .lock()
                    .extend(list.batches.into_iter().flat_map(|b| b.transactions));
                ResponseTemplate::new(202)
                    .set_body_json(json!({ "link": format!("/batch_statuses?id={}", ids.join(",")) }))
            }
            Err(e) => ResponseTemplate::new(400).set_body_json(json!({ "error": e.to_string() })),
        }
    }
}

/// Reports `status` for whatever batch id is asked for.
struct ReportStatus {
    status: &'static str,
    message: &'static str,
    delay: Duration,
}

impl Respond for ReportStatus {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id = request
            .url
            .query_pairs()
            .find(|(name, _)| name == "id")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        let invalid = if self.status == "INVALID" {
            json!([{ "id": "tx", "message": self.message }])
        } else {
            json!([])
        };
        ResponseTemplate::new(200)
            .set_body_json(json!({ "data": [{ "id": id, "status": self.status, "invalid_transactions": invalid }] }))
            .set_delay(self.delay)
    }
}

/// Serves posted transactions by id once they are committed.
struct ServeTransactions {
    posted: Arc<Mutex<Vec<Transaction>>>,
    committed: Arc<AtomicBool>,
}

impl Respond for ServeTransactions {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id = request.url.path().rsplit('/').next().unwrap_or_default();
        let posted = self.posted.lock();
        let found = posted
            .iter()
            .find(|tx| tx.header_signature == id)
            .filter(|_| self.committed.load(Ordering::SeqCst));
        match found {
            Some(tx) => ResponseTemplate::new(200).set_body_json(json!({
                "data": { "header_signature": tx.header_signature, "payload": STANDARD.encode(&tx.payload) }
            })),
            None => ResponseTemplate::new(404).set_body_json(json!({ "error": { "code": 72 } })),
        }
    }
}

/// A wiremock ledger REST API.
pub struct MockLedger {
    pub server: MockServer,
    posted: Arc<Mutex<Vec<Transaction>>>,
    committed: Arc<AtomicBool>,
}

impl MockLedger {
    /// Server that accepts batches and serves posted transactions. Batch
    /// statuses and state are mounted by the test.
    pub async fn start() -> Self {
        let ledger = Self {
            server: MockServer::start().await,
            posted: Arc::new(Mutex::new(Vec::new())),
            committed: Arc::new(AtomicBool::new(false)),
        };
        Mock::given(method("POST"))
            .and(path("/batches"))
            .respond_with(AcceptBatches(ledger.posted.clone()))
            .mount(&ledger.server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex("^/transactions/[0-9a-f]+$"))
            .respond_with(ServeTransactions {
                posted: ledger.posted.clone(),
                committed: ledger.committed.clone(),
            })
            .mount(&ledger.server)
            .await;
        ledger
    }

    /// Short waits so failing paths finish quickly.
    pub fn config(&self) -> RuntimeConfig {
        RuntimeConfig {
            rest_api_url: self.server.uri(),
            submit_max_wait: Duration::from_secs(2),
            status_poll_interval: Duration::from_millis(20),
            operation_timeout: Duration::from_secs(5),
            ..RuntimeConfig::default()
        }
    }

    pub fn client(&self) -> LedgerClient {
        LedgerClient::from_config(&self.config()).expect("valid config")
    }

    pub async fn report_status(&self, status: &'static str) {
        self.report_status_after(status, Duration::ZERO).await;
    }

    /// Report `status` for every batch. `COMMITTED` also commits the posted
    /// transactions.
    pub async fn report_status_after(&self, status: &'static str, delay: Duration) {
        if status == "COMMITTED" {
            self.commit_transactions();
        }
        Mock::given(method("GET"))
            .and(path("/batch_statuses"))
            .respond_with(ReportStatus {
                status,
                message: "rejected by the transaction processor",
                delay,
            })
            .mount(&self.server)
            .await;
    }

    /// Serve posted transactions whatever status batches report.
    pub fn commit_transactions(&self) {
        self.committed.store(true, Ordering::SeqCst);
    }

    /// Serve `record` at `address`. Mount before [`Self::no_other_state`].
    pub async fn serve_state<T: Serialize>(&self, address: &str, record: &T) {
        Mock::given(method("GET"))
            .and(path(format!("/state/{address}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": state_entry(record) })))
            .mount(&self.server)
            .await;
    }

    /// Serve `records` for a range read of `prefix`.
    pub async fn serve_range<T: Serialize>(&self, prefix: &str, records: &[(String, T)]) {
        let data: Vec<_> = records
            .iter()
            .map(|(address, record)| json!({ "address": address, "data": state_entry(record) }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/state"))
            .and(query_param("address", prefix))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data, "paging": {} })))
            .mount(&self.server)
            .await;
    }

    /// 404 for every single-address read not mounted before.
    pub async fn no_other_state(&self) {
        Mock::given(method("GET"))
            .and(path_regex("^/state/[0-9a-f]+$"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": { "code": 75 } })))
            .mount(&self.server)
            .await;
    }

    pub fn posted(&self) -> Vec<Transaction> {
        self.posted.lock().clone()
    }

    /// Family name and decoded payload of every posted transaction.
    pub fn posted_payloads(&self) -> Vec<(String, PayloadFields)> {
        self.posted()
            .iter()
            .map(|tx| {
                let header = TransactionHeader::decode(tx.header.as_slice()).expect("header decodes");
                (header.family_name, decode(&tx.payload).expect("payload decodes"))
            })
            .collect()
    }

    /// Wait until `count` transactions were posted.
    pub async fn wait_for_posts(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.posted.lock().len() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("transactions posted in time");
    }
}
