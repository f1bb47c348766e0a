//! Fakes and an in-process REST server shared by the unit tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use reqwest::Method;
use serde_json::Value;
use shared::domain::{Physician, PhysicianId, Resource, Specialty, SpecialtyId};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    gateway::{EntityGateway, GatewayError},
    surface::{Confirmation, ModalFactory, ModalSurface},
};

pub(crate) fn status_error(method: Method, status: u16) -> GatewayError {
    GatewayError::Status {
        method,
        url: "http://fake/api".to_string(),
        status,
        body: String::new(),
    }
}

pub(crate) struct FakeGateway<R: Resource> {
    pub records: Mutex<Vec<R>>,
    pub calls: Mutex<Vec<&'static str>>,
    failures: Mutex<HashMap<&'static str, u16>>,
    next_id: Mutex<i64>,
    assign_id: fn(&mut R, i64),
}

impl<R: Resource> FakeGateway<R> {
    fn with_assigner(seed: Vec<R>, assign_id: fn(&mut R, i64)) -> Arc<Self> {
        Arc::new(Self {
            next_id: Mutex::new(seed.len() as i64 + 100),
            records: Mutex::new(seed),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            assign_id,
        })
    }

    pub async fn fail(&self, op: &'static str, status: u16) {
        self.failures.lock().await.insert(op, status);
    }

    pub async fn recover(&self, op: &'static str) {
        self.failures.lock().await.remove(op);
    }

    pub async fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().await.clone()
    }

    async fn enter(&self, op: &'static str, method: Method) -> Result<(), GatewayError> {
        self.calls.lock().await.push(op);
        match self.failures.lock().await.get(op) {
            Some(status) => Err(status_error(method, *status)),
            None => Ok(()),
        }
    }
}

impl FakeGateway<Specialty> {
    pub fn specialties(seed: Vec<Specialty>) -> Arc<Self> {
        Self::with_assigner(seed, |record, id| record.id = Some(SpecialtyId(id)))
    }
}

impl FakeGateway<Physician> {
    pub fn physicians(seed: Vec<Physician>) -> Arc<Self> {
        Self::with_assigner(seed, |record, id| record.id = Some(PhysicianId(id)))
    }
}

#[async_trait]
impl<R: Resource> EntityGateway<R> for FakeGateway<R> {
    async fn list(&self) -> Result<Vec<R>, GatewayError> {
        self.enter("list", Method::GET).await?;
        Ok(self.records.lock().await.clone())
    }

    async fn get(&self, id: R::Id) -> Result<R, GatewayError> {
        self.enter("get", Method::GET).await?;
        self.records
            .lock()
            .await
            .iter()
            .find(|record| record.id() == Some(id))
            .cloned()
            .ok_or_else(|| status_error(Method::GET, 404))
    }

    async fn create(&self, dto: &R) -> Result<R, GatewayError> {
        self.enter("create", Method::POST).await?;
        let mut record = dto.clone();
        let id = {
            let mut next_id = self.next_id.lock().await;
            *next_id += 1;
            *next_id
        };
        (self.assign_id)(&mut record, id);
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: R::Id, dto: &R) -> Result<R, GatewayError> {
        self.enter("update", Method::PUT).await?;
        let mut records = self.records.lock().await;
        let slot = records
            .iter_mut()
            .find(|record| record.id() == Some(id))
            .ok_or_else(|| status_error(Method::PUT, 404))?;
        *slot = dto.clone();
        Ok(slot.clone())
    }

    async fn delete(&self, id: R::Id) -> Result<(), GatewayError> {
        self.enter("delete", Method::DELETE).await?;
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|record| record.id() != Some(id));
        if records.len() == before {
            return Err(status_error(Method::DELETE, 404));
        }
        Ok(())
    }
}

/// Records every modal lifecycle call as `build`, `show:<title>` or `hide`.
#[derive(Clone, Default)]
pub(crate) struct RecordingModals {
    pub log: Arc<StdMutex<Vec<String>>>,
}

impl RecordingModals {
    pub fn events(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

struct RecordingSurface {
    log: Arc<StdMutex<Vec<String>>>,
}

impl ModalSurface for RecordingSurface {
    fn show(&mut self, title: &str) {
        if let Ok(mut log) = self.log.lock() {
            log.push(format!("show:{title}"));
        }
    }

    fn hide(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.push("hide".to_string());
        }
    }
}

impl ModalFactory for RecordingModals {
    fn build(&self) -> Box<dyn ModalSurface> {
        if let Ok(mut log) = self.log.lock() {
            log.push("build".to_string());
        }
        Box::new(RecordingSurface {
            log: Arc::clone(&self.log),
        })
    }
}

pub(crate) struct ScriptedConfirmation {
    answer: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmation {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Confirmation for ScriptedConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().await.push(prompt.to_string());
        self.answer
    }
}

/// In-memory REST collection served by axum. Rejects duplicates of
/// `unique_field` with 409.
#[derive(Clone)]
pub(crate) struct MockApi {
    pub records: Arc<Mutex<Vec<Value>>>,
    pub requests: Arc<Mutex<Vec<String>>>,
    next_id: Arc<Mutex<i64>>,
    unique_field: &'static str,
}

impl MockApi {
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    async fn record(&self, line: String) {
        self.requests.lock().await.push(line);
    }

    async fn is_duplicate(&self, body: &Value, except: Option<i64>) -> bool {
        let Some(candidate) = body.get(self.unique_field) else {
            return false;
        };
        self.records.lock().await.iter().any(|existing| {
            existing.get(self.unique_field) == Some(candidate)
                && existing.get("id").and_then(Value::as_i64) != except
        })
    }
}

async fn list_records(State(api): State<MockApi>) -> Json<Vec<Value>> {
    api.record("GET".to_string()).await;
    Json(api.records.lock().await.clone())
}

async fn fetch_record(
    State(api): State<MockApi>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, StatusCode> {
    api.record(format!("GET {id}")).await;
    api.records
        .lock()
        .await
        .iter()
        .find(|record| record.get("id").and_then(Value::as_i64) == Some(id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_record(
    State(api): State<MockApi>,
    Json(mut body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    api.record("POST".to_string()).await;
    if api.is_duplicate(&body, None).await {
        return Err(StatusCode::CONFLICT);
    }
    let id = {
        let mut next_id = api.next_id.lock().await;
        *next_id += 1;
        *next_id
    };
    body["id"] = Value::from(id);
    api.records.lock().await.push(body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn update_record(
    State(api): State<MockApi>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    api.record(format!("PUT {id}")).await;
    if api.is_duplicate(&body, Some(id)).await {
        return Err(StatusCode::CONFLICT);
    }
    body["id"] = Value::from(id);
    let mut records = api.records.lock().await;
    let slot = records
        .iter_mut()
        .find(|record| record.get("id").and_then(Value::as_i64) == Some(id))
        .ok_or(StatusCode::NOT_FOUND)?;
    *slot = body.clone();
    Ok(Json(body))
}

async fn delete_record(State(api): State<MockApi>, Path(id): Path<i64>) -> StatusCode {
    api.record(format!("DELETE {id}")).await;
    let mut records = api.records.lock().await;
    let before = records.len();
    records.retain(|record| record.get("id").and_then(Value::as_i64) != Some(id));
    if records.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

/// Serves `path` on an ephemeral port; returns the collection URL.
pub(crate) async fn spawn_mock_api(
    path: &str,
    unique_field: &'static str,
    seed: Vec<Value>,
) -> (url::Url, MockApi) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let max_id = seed
        .iter()
        .filter_map(|record| record.get("id").and_then(Value::as_i64))
        .max()
        .unwrap_or(0);
    let api = MockApi {
        records: Arc::new(Mutex::new(seed)),
        requests: Arc::new(Mutex::new(Vec::new())),
        next_id: Arc::new(Mutex::new(max_id)),
        unique_field,
    };
    let app = Router::new()
        .route(path, get(list_records).post(create_record))
        .route(
            &format!("{path}/:id"),
            get(fetch_record).put(update_record).delete(delete_record),
        )
        .with_state(api.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let url = url::Url::parse(&format!("http://{addr}{path}")).expect("url");
    (url, api)
}
