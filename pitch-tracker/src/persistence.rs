// Persistence gateway: best-effort storage of teams and pitchers.
//
// The engine never waits on storage. Committed changes are handed to a
// background writer task over an unbounded channel; failures are logged and
// stop at this module.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::db::{Database, Row};
use crate::model::{Pitcher, Team};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is unavailable")]
    Unavailable,

    #[error("sqlite error: {0}")]
    Sqlite(String),

    #[error("failed to serialize {collection} record {id}: {source}")]
    Serialize {
        collection: Collection,
        id: u64,
        source: serde_json::Error,
    },

    #[error("malformed {collection} record {id}: {message}")]
    Malformed {
        collection: Collection,
        id: u64,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// The two stored collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Teams,
    Pitchers,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Teams => "teams",
            Collection::Pitchers => "pitchers",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored entity: its id and its serialized form.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: u64,
    pub body: serde_json::Value,
}

/// A domain type that lives in a collection, keyed by id.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn record_id(&self) -> u64;
}

impl Record for Team {
    const COLLECTION: Collection = Collection::Teams;

    fn record_id(&self) -> u64 {
        self.id.0
    }
}

impl Record for Pitcher {
    const COLLECTION: Collection = Collection::Pitchers;

    fn record_id(&self) -> u64 {
        self.id.0
    }
}

pub fn encode_all<R: Record>(items: &[R]) -> Result<Vec<StoredRecord>, StoreError> {
    items
        .iter()
        .map(|item| {
            let id = item.record_id();
            let body = serde_json::to_value(item).map_err(|source| StoreError::Serialize {
                collection: R::COLLECTION,
                id,
                source,
            })?;
            Ok(StoredRecord { id, body })
        })
        .collect()
}

fn decode<R: Record>(record: StoredRecord) -> Result<R, StoreError> {
    let malformed = |message: String| StoreError::Malformed {
        collection: R::COLLECTION,
        id: record.id,
        message,
    };
    let item: R = serde_json::from_value(record.body.clone()).map_err(|e| malformed(e.to_string()))?;
    if item.record_id() != record.id {
        return Err(malformed(format!("body carries id {}", item.record_id())));
    }
    Ok(item)
}

/// Decode stored records, dropping (and logging) any that do not parse.
pub fn decode_all<R: Record>(records: Vec<StoredRecord>) -> Vec<R> {
    records
        .into_iter()
        .filter_map(|record| match decode(record) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping record: {}", e);
                None
            }
        })
        .collect()
}

/// Load every well-formed record of type `R` from the gateway.
pub fn load<R: Record>(gateway: &dyn PersistenceGateway) -> Vec<R> {
    decode_all(gateway.get_all(R::COLLECTION))
}

// ---------------------------------------------------------------------------
// Gateway trait
// ---------------------------------------------------------------------------

/// Key-addressable store for whole collections.
///
/// `save_all` writes the supplied set as the new contents of the collection:
/// records are upserted by id and ids not in the set are removed.
pub trait PersistenceGateway: Send {
    /// Prepare the store. Safe to call repeatedly; returns `false` when the
    /// storage medium is missing or cannot be opened.
    fn init(&mut self) -> bool;

    /// Every record in `collection`. Empty when the store is unavailable.
    fn get_all(&self, collection: Collection) -> Vec<StoredRecord>;

    fn save_all(&self, collection: Collection, records: &[StoredRecord]) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// SQLite gateway
// ---------------------------------------------------------------------------

/// Gateway over a SQLite file, opened lazily by `init`.
pub struct SqliteGateway {
    path: String,
    db: Option<Database>,
}

impl SqliteGateway {
    pub fn new(path: impl Into<String>) -> Self {
        SqliteGateway { path: path.into(), db: None }
    }
}

impl PersistenceGateway for SqliteGateway {
    fn init(&mut self) -> bool {
        if self.db.is_some() {
            return true;
        }
        match Database::open(&self.path) {
            Ok(db) => {
                let stored = |c: Collection| db.count(c.as_str()).unwrap_or(0);
                info!(
                    "Database opened at {} ({} teams, {} pitchers stored)",
                    self.path,
                    stored(Collection::Teams),
                    stored(Collection::Pitchers)
                );
                self.db = Some(db);
                true
            }
            Err(e) => {
                warn!("Storage unavailable at {}: {:#}", self.path, e);
                false
            }
        }
    }

    fn get_all(&self, collection: Collection) -> Vec<StoredRecord> {
        let Some(db) = &self.db else {
            return Vec::new();
        };
        let rows = match db.load_collection(collection.as_str()) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Failed to load {}: {:#}", collection, e);
                return Vec::new();
            }
        };
        rows.into_iter()
            .filter_map(|row| match serde_json::from_str(&row.body) {
                Ok(body) => Some(StoredRecord { id: row.id, body }),
                Err(e) => {
                    warn!("Skipping unreadable {} row {}: {}", collection, row.id, e);
                    None
                }
            })
            .collect()
    }

    fn save_all(&self, collection: Collection, records: &[StoredRecord]) -> Result<(), StoreError> {
        let db = self.db.as_ref().ok_or(StoreError::Unavailable)?;
        let rows: Vec<Row> = records
            .iter()
            .map(|r| Row { id: r.id, body: r.body.to_string() })
            .collect();
        db.replace_collection(collection.as_str(), &rows)
            .map_err(|e| StoreError::Sqlite(format!("{e:#}")))
    }
}

// ---------------------------------------------------------------------------
// In-memory gateway
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct MemoryInner {
    available: bool,
    fail_writes: bool,
    collections: HashMap<Collection, BTreeMap<u64, serde_json::Value>>,
}

/// In-process gateway. Clones share the same storage, so a test can hand
/// one clone to the writer and inspect another.
#[derive(Debug, Clone)]
pub struct MemoryGateway {
    inner: Arc<Mutex<MemoryInner>>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        MemoryGateway {
            inner: Arc::new(Mutex::new(MemoryInner {
                available: true,
                fail_writes: false,
                collections: HashMap::new(),
            })),
        }
    }

    /// A gateway whose storage medium is missing.
    pub fn unavailable() -> Self {
        let gateway = Self::new();
        gateway.lock().available = false;
        gateway
    }

    /// Make every subsequent write fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Insert a raw record, bypassing serialization (for seeding bad data).
    pub fn insert_raw(&self, collection: Collection, id: u64, body: serde_json::Value) {
        self.lock()
            .collections
            .entry(collection)
            .or_default()
            .insert(id, body);
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.lock().collections.get(&collection).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().expect("memory gateway mutex poisoned")
    }
}

impl PersistenceGateway for MemoryGateway {
    fn init(&mut self) -> bool {
        self.lock().available
    }

    fn get_all(&self, collection: Collection) -> Vec<StoredRecord> {
        let inner = self.lock();
        if !inner.available {
            return Vec::new();
        }
        inner
            .collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(id, body)| StoredRecord { id: *id, body: body.clone() })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn save_all(&self, collection: Collection, records: &[StoredRecord]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.available {
            return Err(StoreError::Unavailable);
        }
        if inner.fail_writes {
            return Err(StoreError::Sqlite("simulated write failure".into()));
        }
        let set = records.iter().map(|r| (r.id, r.body.clone())).collect();
        inner.collections.insert(collection, set);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Background writer
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum PersistRequest {
    SaveAll {
        collection: Collection,
        records: Vec<StoredRecord>,
    },
    /// Reply once every earlier request has been handled.
    Flush(oneshot::Sender<()>),
}

/// What the writer did before its channel closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterReport {
    pub written: usize,
    pub skipped: usize,
    /// A write failed and later writes were skipped.
    pub degraded: bool,
}

/// Sending half used by the engine. Sends never block and never fail the
/// caller.
#[derive(Debug, Clone)]
pub struct PersistHandle {
    tx: Option<mpsc::UnboundedSender<PersistRequest>>,
}

impl PersistHandle {
    /// A handle with no writer behind it: state stays in memory only.
    pub fn detached() -> Self {
        PersistHandle { tx: None }
    }

    /// A handle plus the receiving end, for driving the writer manually.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PersistRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (PersistHandle { tx: Some(tx) }, rx)
    }

    pub fn is_detached(&self) -> bool {
        self.tx.is_none()
    }

    /// Queue the full current set of `R` records for writing.
    pub fn save<R: Record>(&self, items: &[R]) {
        match encode_all(items) {
            Ok(records) => self.send(PersistRequest::SaveAll {
                collection: R::COLLECTION,
                records,
            }),
            Err(e) => warn!("Not persisting {}: {}", R::COLLECTION, e),
        }
    }

    /// Wait until everything queued so far has been processed. Returns
    /// immediately when detached or when the writer has gone away.
    pub async fn flush(&self) {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(PersistRequest::Flush(reply_tx));
        let _ = reply_rx.await;
    }

    fn send(&self, request: PersistRequest) {
        if let Some(tx) = &self.tx {
            if tx.send(request).is_err() {
                debug!("Persistence writer has stopped; request dropped");
            }
        }
    }
}

/// Spawn the writer task that owns `gateway`.
pub fn spawn_writer(
    gateway: Box<dyn PersistenceGateway>,
) -> (PersistHandle, JoinHandle<WriterReport>) {
    let (handle, rx) = PersistHandle::channel();
    let task = tokio::spawn(run_writer(rx, gateway));
    (handle, task)
}

/// Apply requests until every sender is dropped. After the first failed
/// write the writer stops touching storage for the rest of the process.
///
/// Each write runs on the blocking pool; the gateway moves there and back.
pub async fn run_writer(
    mut rx: mpsc::UnboundedReceiver<PersistRequest>,
    gateway: Box<dyn PersistenceGateway>,
) -> WriterReport {
    let mut report = WriterReport::default();
    let mut gateway = Some(gateway);

    while let Some(request) = rx.recv().await {
        match request {
            PersistRequest::SaveAll { collection, records } => {
                if report.degraded {
                    report.skipped += 1;
                    debug!("Memory-only mode: skipped write of {}", collection);
                    continue;
                }
                let Some(gw) = gateway.take() else {
                    report.skipped += 1;
                    continue;
                };
                let count = records.len();
                let joined = tokio::task::spawn_blocking(move || {
                    let result = gw.save_all(collection, &records);
                    (gw, result)
                })
                .await;
                let result = match joined {
                    Ok((gw, result)) => {
                        gateway = Some(gw);
                        result
                    }
                    Err(e) => Err(StoreError::Sqlite(format!("write task failed: {e}"))),
                };
                match result {
                    Ok(()) => {
                        report.written += 1;
                        debug!("Saved {} {}", count, collection);
                    }
                    Err(e) => {
                        report.degraded = true;
                        warn!(
                            "Failed to save {}: {}; continuing in memory-only mode",
                            collection, e
                        );
                    }
                }
            }
            PersistRequest::Flush(reply) => {
                let _ = reply.send(());
            }
        }
    }

    info!(
        "Persistence writer stopped: {} written, {} skipped",
        report.written, report.skipped
    );
    report
}
