#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use notes_api::api::ProxyRequest;
use notes_api::database::{DatabaseError, Note, NoteStore, PoolBuilder, PoolManager};
use notes_api::handlers::HandlerContext;
use notes_api::secrets::{CredentialResolver, Credentials, SecretError, SecretStore};

pub const SECRET_JSON: &str =
    r#"{"engine":"postgres","host":"db.internal","port":5432,"dbname":"notes","username":"app","password":"pw"}"#;

/// In-memory notes table with the same ownership and ordering rules as Postgres
pub struct MemoryNoteStore {
    rows: Mutex<Vec<(String, Note)>>,
    clock: Mutex<DateTime<Utc>>,
    operations: AtomicUsize,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            clock: Mutex::new(Utc::now()),
            operations: AtomicUsize::new(0),
        }
    }

    /// Strictly increasing timestamps so ordering never ties
    fn tick(&self) -> DateTime<Utc> {
        let mut clock = self.clock.lock().unwrap();
        *clock += chrono::Duration::milliseconds(5);
        *clock
    }

    /// Simulate an update touching `updated_at`
    pub fn touch(&self, id: Uuid) {
        let now = self.tick();
        let mut rows = self.rows.lock().unwrap();
        if let Some((_, note)) = rows.iter_mut().find(|(_, note)| note.id == id) {
            note.updated_at = now;
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.rows.lock().unwrap().iter().any(|(_, note)| note.id == id)
    }

    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn create(&self, user_id: &str, title: &str, content: &str) -> Result<Note, DatabaseError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        let now = self.tick();
        let note = Note {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push((user_id.to_string(), note.clone()));
        Ok(note)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Note>, DatabaseError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        let mut notes: Vec<Note> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, note)| note.clone())
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notes)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<Option<Uuid>, DatabaseError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let position = rows
            .iter()
            .position(|(owner, note)| note.id == id && owner == user_id);
        Ok(position.map(|index| rows.remove(index).1.id))
    }
}

/// Store whose every query fails the way an unreachable database does
pub struct UnreachableNoteStore;

#[async_trait]
impl NoteStore for UnreachableNoteStore {
    async fn create(&self, _: &str, _: &str, _: &str) -> Result<Note, DatabaseError> {
        Err(DatabaseError::ConnectionTimeout)
    }

    async fn list(&self, _: &str) -> Result<Vec<Note>, DatabaseError> {
        Err(DatabaseError::ConnectionTimeout)
    }

    async fn delete(&self, _: &str, _: Uuid) -> Result<Option<Uuid>, DatabaseError> {
        Err(DatabaseError::ConnectionTimeout)
    }
}

/// Secret store that counts lookups, optionally slow and optionally failing once
pub struct CountingSecretStore {
    calls: AtomicUsize,
    delay: Duration,
    fail_next: AtomicBool,
}

impl CountingSecretStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn failing_once(delay: Duration) -> Self {
        let store = Self::new(delay);
        store.fail_next.store(true, Ordering::SeqCst);
        store
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for CountingSecretStore {
    async fn secret_string(&self, secret_id: &str) -> Result<String, SecretError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SecretError::Unavailable {
                secret_id: secret_id.to_string(),
                reason: "throttled".to_string(),
            });
        }
        Ok(SECRET_JSON.to_string())
    }
}

/// Pool builder handing out a shared in-memory store, counting constructions
pub struct MemoryPoolBuilder {
    store: Arc<MemoryNoteStore>,
    builds: Arc<AtomicUsize>,
    fail_next: AtomicBool,
}

impl MemoryPoolBuilder {
    pub fn new(store: Arc<MemoryNoteStore>, builds: Arc<AtomicUsize>) -> Self {
        Self {
            store,
            builds,
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn failing_once(self) -> Self {
        self.fail_next.store(true, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl PoolBuilder<Arc<MemoryNoteStore>> for MemoryPoolBuilder {
    async fn build(&self, credentials: Credentials) -> Result<Arc<MemoryNoteStore>, DatabaseError> {
        assert_eq!(credentials.host, "db.internal");
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DatabaseError::ConnectionTimeout);
        }
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(self.store.clone())
    }
}

/// Note store that goes through a `PoolManager` like the Postgres store does
pub struct PooledNoteStore {
    pub pools: PoolManager<Arc<MemoryNoteStore>>,
}

#[async_trait]
impl NoteStore for PooledNoteStore {
    async fn create(&self, user_id: &str, title: &str, content: &str) -> Result<Note, DatabaseError> {
        self.pools.get().await?.create(user_id, title, content).await
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Note>, DatabaseError> {
        self.pools.get().await?.list(user_id).await
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<Option<Uuid>, DatabaseError> {
        self.pools.get().await?.delete(user_id, id).await
    }

    fn is_ready(&self) -> bool {
        self.pools.is_ready()
    }
}

/// A simulated process: secret store, pool manager and handlers wired together
pub struct Harness {
    pub ctx: HandlerContext,
    pub secrets: Arc<CountingSecretStore>,
    pub memory: Arc<MemoryNoteStore>,
    pub builds: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new(secrets: CountingSecretStore) -> Self {
        Self::with_builder(secrets, |memory, builds| MemoryPoolBuilder::new(memory, builds))
    }

    pub fn with_builder(
        secrets: CountingSecretStore,
        builder: impl FnOnce(Arc<MemoryNoteStore>, Arc<AtomicUsize>) -> MemoryPoolBuilder,
    ) -> Self {
        let secrets = Arc::new(secrets);
        let memory = Arc::new(MemoryNoteStore::new());
        let builds = Arc::new(AtomicUsize::new(0));

        let pools = PoolManager::new(
            CredentialResolver::new(secrets.clone()),
            Some("arn:aws:secretsmanager:us-east-1:000000000000:secret:notes-db".to_string()),
            builder(memory.clone(), builds.clone()),
        );
        let ctx = HandlerContext::new(Arc::new(PooledNoteStore { pools }));

        Self {
            ctx,
            secrets,
            memory,
            builds,
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

pub fn memory_context() -> (HandlerContext, Arc<MemoryNoteStore>) {
    let memory = Arc::new(MemoryNoteStore::new());
    (HandlerContext::new(memory.clone()), memory)
}

pub fn event_for(sub: &str) -> ProxyRequest {
    ProxyRequest::new().with_subject(sub)
}
