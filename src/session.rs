// src/session.rs
//! Хранилище сессии: пара bearer-токенов и имя пользователя.
//!
//! Аналог браузерных cookie с истечением через 7 дней. Запись —
//! fire-and-forget: падение персистенции логируется и никогда не
//! становится ошибкой для вызывающего.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Shown when no username is stored.
pub const USERNAME_PLACEHOLDER: &str = "Ваше имя";

const KEY_ACCESS_TOKEN: &str = "access_token";
const KEY_REFRESH_TOKEN: &str = "refresh_token";
const KEY_USERNAME: &str = "username";
const KEY_EMAIL: &str = "email";
const KEY_PASSWORD: &str = "password";

// ==================== KEY-VALUE STORE ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// File-backed key-value store with a per-entry expiry.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    ttl: Duration,
    entries: HashMap<String, Entry>,
}

impl SessionStore {
    /// Open a store at `path`. A missing or corrupt file starts empty —
    /// persistence is best effort in both directions.
    pub fn open(path: impl AsRef<Path>, ttl_days: i64) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, Entry>>(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    log::warn!("Session store {} is corrupt, starting empty: {}", path.display(), err);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            ttl: Duration::days(ttl_days),
            entries,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.expires_at <= Utc::now() {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Utc::now() + self.ttl,
            },
        );
        self.persist();
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.persist();
    }

    // Fire-and-forget: ошибка записи — это warning, не результат.
    fn persist(&self) {
        let raw = match serde_json::to_string(&self.entries) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("Failed to serialize session store: {}", err);
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, raw) {
            log::warn!("Failed to persist session store {}: {}", self.path.display(), err);
        }
    }

    #[cfg(test)]
    fn expire_now(&mut self, key: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.expires_at = Utc::now() - Duration::seconds(1);
        }
    }
}

// ==================== SESSION ====================

/// Держатель сессии: читается каждой операцией каталога, очищается при
/// выходе. Чистый фасад над хранилищем — никакого автомата состояний.
#[derive(Debug)]
pub struct Session {
    store: SessionStore,
    /// Transient "just completed login" marker, never persisted. Suppresses
    /// the redundant loading transition on the screen right after login.
    just_logged_in: bool,
}

impl Session {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            just_logged_in: false,
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(KEY_ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(KEY_REFRESH_TOKEN)
    }

    pub fn username(&self) -> String {
        self.store
            .get(KEY_USERNAME)
            .unwrap_or_else(|| USERNAME_PLACEHOLDER.to_string())
    }

    pub fn set_username(&mut self, username: &str) {
        self.store.set(KEY_USERNAME, username);
    }

    /// Persist the token pair. An absent or empty value is a no-op for that
    /// slot: a partial server reply must not wipe a stored token.
    pub fn set_tokens(&mut self, access: Option<&str>, refresh: Option<&str>) {
        if let Some(access) = access.filter(|a| !a.is_empty()) {
            self.store.set(KEY_ACCESS_TOKEN, access);
        }
        if let Some(refresh) = refresh.filter(|r| !r.is_empty()) {
            self.store.set(KEY_REFRESH_TOKEN, refresh);
        }
    }

    /// Remove both tokens. The username is intentionally left in place: its
    /// lifecycle is tied to the login form history, not to session validity.
    pub fn clear(&mut self) {
        self.store.remove(KEY_ACCESS_TOKEN);
        self.store.remove(KEY_REFRESH_TOKEN);
    }

    /// Mirror the login form drafts the way the original stores them.
    pub fn remember_login_draft(&mut self, email: &str, password: &str) {
        self.store.set(KEY_EMAIL, email);
        self.store.set(KEY_PASSWORD, password);
    }

    pub fn login_draft(&self) -> (Option<String>, Option<String>) {
        (self.store.get(KEY_EMAIL), self.store.get(KEY_PASSWORD))
    }

    pub fn mark_just_logged_in(&mut self) {
        self.just_logged_in = true;
    }

    /// Reads and resets the flag, like `sessionStorage` consume-on-read.
    pub fn take_just_logged_in(&mut self) -> bool {
        std::mem::take(&mut self.just_logged_in)
    }
}
