//! In-memory adapters for exercising services without a database.

use crate::{
    core::{
        model::{
            file::{File, FileInsert, SortDirection, SortField},
            user::{OtpInsert, SessionInsert, User, UserInsert},
        },
        notify::OtpSender,
        repo::{
            file::{FileQuery, FileRepo},
            user::UserRepo,
            Atomic,
        },
        storage::BlobStore,
    },
    err,
    error::StowageError,
};
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use uuid::Uuid;

pub fn user(email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        account_id: Uuid::new_v4(),
        full_name: email.to_string(),
        email: email.to_string(),
        avatar: String::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRepo {
    files: Arc<Mutex<Vec<File>>>,
    users: Arc<Mutex<Vec<User>>>,
    otps: Arc<Mutex<HashMap<Uuid, (String, DateTime<Utc>, i32)>>>,
    sessions: Arc<Mutex<HashMap<String, (Uuid, DateTime<Utc>)>>>,
    fail_inserts: Arc<AtomicBool>,
    fail_removals: Arc<AtomicBool>,
}

impl MemoryRepo {
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn expire_otps(&self) {
        let past = Utc::now() - chrono::Duration::minutes(1);
        for (_, expires_at, _) in self.otps.lock().unwrap().values_mut() {
            *expires_at = past;
        }
    }
}

fn unavailable() -> Result<(), StowageError> {
    Err(StowageError::new(
        file!(),
        line!(),
        column!(),
        std::io::Error::other("repository unavailable").into(),
    ))
}

#[async_trait::async_trait]
impl FileRepo for MemoryRepo {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<File>, StowageError> {
        let files = self.files.lock().unwrap();
        Ok(files.iter().find(|f| f.id == id).cloned())
    }

    async fn list(&self, query: FileQuery<'_>) -> Result<Vec<File>, StowageError> {
        let mut files: Vec<File> = self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.is_accessible_by(query.user_id, query.email))
            .filter(|f| query.categories.is_empty() || query.categories.contains(&f.category))
            .filter(|f| match query.search {
                Some(search) => f.name.to_lowercase().contains(&search.to_lowercase()),
                None => true,
            })
            .cloned()
            .collect();

        files.sort_by(|a, b| {
            let ord = match query.sort.field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::Name => a.name.cmp(&b.name),
                SortField::Size => a.size.cmp(&b.size),
            };
            match query.sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });

        if let Some(limit) = query.limit {
            files.truncate(limit as usize);
        }

        Ok(files)
    }

    async fn list_owned(&self, owner_id: Uuid) -> Result<Vec<File>, StowageError> {
        let files = self.files.lock().unwrap();
        Ok(files
            .iter()
            .filter(|f| f.is_owned_by(owner_id))
            .cloned()
            .collect())
    }

    async fn insert(&self, file: FileInsert<'_>) -> Result<File, StowageError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            unavailable()?;
        }

        let now = Utc::now();
        let file = File {
            id: file.id,
            name: file.name.to_string(),
            extension: file.extension,
            size: file.size,
            category: file.category,
            owner_id: file.owner_id,
            account_id: file.account_id,
            shared_with: vec![],
            blob_id: file.blob_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.files.lock().unwrap().push(file.clone());

        Ok(file)
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<File>, StowageError> {
        let mut files = self.files.lock().unwrap();
        Ok(files.iter_mut().find(|f| f.id == id).map(|f| {
            f.name = name.to_string();
            f.updated_at = Utc::now();
            f.clone()
        }))
    }

    async fn update_shared_with(
        &self,
        id: Uuid,
        emails: &[String],
    ) -> Result<Option<File>, StowageError> {
        let mut files = self.files.lock().unwrap();
        Ok(files.iter_mut().find(|f| f.id == id).map(|f| {
            f.shared_with = emails.to_vec();
            f.updated_at = Utc::now();
            f.clone()
        }))
    }

    async fn remove_by_id(&self, id: Uuid) -> Result<u64, StowageError> {
        if self.fail_removals.load(Ordering::SeqCst) {
            unavailable()?;
        }

        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.id != id);
        Ok((before - files.len()) as u64)
    }
}

impl Atomic for MemoryRepo {
    type Tx = ();

    async fn start_tx(&self) -> Result<Self::Tx, StowageError> {
        Ok(())
    }

    async fn commit_tx(&self, _tx: Self::Tx) -> Result<(), StowageError> {
        Ok(())
    }

    async fn abort_tx(&self, _tx: Self::Tx) -> Result<(), StowageError> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryRepo {
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StowageError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_by_account_id(&self, account_id: Uuid) -> Result<Option<User>, StowageError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.account_id == account_id).cloned())
    }

    async fn insert(&self, user: UserInsert<'_>) -> Result<User, StowageError> {
        let now = Utc::now();
        let user = User {
            id: user.id,
            account_id: user.account_id,
            full_name: user.full_name.to_string(),
            email: user.email.to_string(),
            avatar: user.avatar.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn upsert_otp(&self, otp: OtpInsert<'_>) -> Result<(), StowageError> {
        self.otps
            .lock()
            .unwrap()
            .insert(otp.account_id, (otp.code_hash.to_string(), otp.expires_at, 0));
        Ok(())
    }

    async fn consume_otp(
        &self,
        account_id: Uuid,
        code_hash: &str,
        now: DateTime<Utc>,
        max_attempts: i32,
        _tx: &mut <Self as Atomic>::Tx,
    ) -> Result<bool, StowageError>
    where
        Self: Atomic,
    {
        let mut otps = self.otps.lock().unwrap();

        let Some((hash, expires_at, attempts)) = otps.get_mut(&account_id) else {
            return Ok(false);
        };

        if hash == code_hash && *expires_at > now {
            otps.remove(&account_id);
            return Ok(true);
        }

        *attempts += 1;
        if *attempts >= max_attempts {
            otps.remove(&account_id);
        }

        Ok(false)
    }

    async fn insert_session(
        &self,
        session: SessionInsert<'_>,
        _tx: &mut <Self as Atomic>::Tx,
    ) -> Result<(), StowageError>
    where
        Self: Atomic,
    {
        self.sessions.lock().unwrap().insert(
            session.token_hash.to_string(),
            (session.user_id, session.expires_at),
        );
        Ok(())
    }

    async fn get_by_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StowageError> {
        let user_id = match self.sessions.lock().unwrap().get(token_hash) {
            Some((user_id, expires_at)) if *expires_at > now => *user_id,
            _ => return Ok(None),
        };
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn remove_session(&self, token_hash: &str) -> Result<u64, StowageError> {
        let removed = self.sessions.lock().unwrap().remove(token_hash);
        Ok(removed.map_or(0, |_| 1))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_deletes: Arc<AtomicBool>,
}

impl MemoryBlobStore {
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, blob_id: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(blob_id)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    fn id(&self) -> &'static str {
        "memory"
    }

    async fn write(&self, blob_id: &str, content: &[u8]) -> Result<(), StowageError> {
        let mut blobs = self.blobs.lock().unwrap();
        if blobs.contains_key(blob_id) {
            return err!(AlreadyExists, "Blob '{blob_id}'");
        }
        blobs.insert(blob_id.to_string(), content.to_vec());
        Ok(())
    }

    async fn read(&self, blob_id: &str) -> Result<Vec<u8>, StowageError> {
        match self.blobs.lock().unwrap().get(blob_id) {
            Some(content) => Ok(content.clone()),
            None => err!(DoesNotExist, "Blob '{blob_id}'"),
        }
    }

    async fn delete(&self, blob_id: &str) -> Result<(), StowageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            unavailable()?;
        }

        self.blobs.lock().unwrap().remove(blob_id);
        Ok(())
    }
}

/// Keeps every code it is asked to deliver.
#[derive(Debug, Clone, Default)]
pub struct RecordingOtpSender {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingOtpSender {
    pub fn last_code(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait::async_trait]
impl OtpSender for RecordingOtpSender {
    async fn send(&self, email: &str, code: &str) -> Result<(), StowageError> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}
