//! Mock implementations for all repository and service traits
//!
//! This module provides in-memory mock implementations that can be used
//! for unit testing without requiring actual database connections or
//! a running Redis instance.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use client_manager_core::{
    CacheService, CacheStats, ClientLog, ClientLogRepository, ConfigurationEntry, ConfigurationFilter,
    ConfigurationRepository, Feedback, FeedbackRepository, FeedbackStats, FeedbackType, LogScope, LogStats,
    ManagerError, ManagerResult, PageRequest,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

fn paginate<T>(items: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[derive(Debug, Clone)]
struct StoredEntry {
    entry: ConfigurationEntry,
    deleted: bool,
}

/// Mock implementation of ConfigurationRepository for testing
///
/// Deletes are soft: the row stays in the map but is invisible to reads.
/// `key_reads` counts `get_by_key` calls so tests can tell whether a read
/// was served from the cache or reached the store.
#[derive(Debug, Clone)]
pub struct MockConfigurationRepository {
    entries: Arc<Mutex<HashMap<i64, StoredEntry>>>,
    next_id: Arc<Mutex<i64>>,
    key_reads: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MockConfigurationRepository {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
            key_reads: Arc::new(AtomicUsize::new(0)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_entries(entries: Vec<ConfigurationEntry>) -> Self {
        let mut entry_map = HashMap::new();
        let mut max_id = 0;

        for entry in entries {
            if entry.id > max_id {
                max_id = entry.id;
            }
            entry_map.insert(entry.id, StoredEntry { entry, deleted: false });
        }

        Self {
            entries: Arc::new(Mutex::new(entry_map)),
            next_id: Arc::new(Mutex::new(max_id + 1)),
            key_reads: Arc::new(AtomicUsize::new(0)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
        *self.next_id.lock().unwrap() = 1;
    }

    /// Number of live (not soft-deleted) entries
    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().values().filter(|s| !s.deleted).count()
    }

    pub fn is_deleted(&self, id: i64) -> bool {
        self.entries
            .lock()
            .unwrap()
            .get(&id)
            .map(|s| s.deleted)
            .unwrap_or(false)
    }

    pub fn key_reads(&self) -> usize {
        self.key_reads.load(Ordering::SeqCst)
    }

    pub fn reset_reads(&self) {
        self.key_reads.store(0, Ordering::SeqCst);
    }

    /// Make every subsequent call fail with a database error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> ManagerResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ManagerError::database_error("mock database unavailable"));
        }
        Ok(())
    }

    fn live_entries(&self) -> Vec<ConfigurationEntry> {
        self.entries
            .lock()
            .unwrap()
            .values()
            .filter(|s| !s.deleted)
            .map(|s| s.entry.clone())
            .collect()
    }

    fn matches_search(entry: &ConfigurationEntry, search: &Option<String>) -> bool {
        match search {
            Some(term) => {
                let term = term.to_lowercase();
                entry.namespace.to_lowercase().contains(&term)
                    || entry.key.to_lowercase().contains(&term)
                    || entry.description.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

impl Default for MockConfigurationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigurationRepository for MockConfigurationRepository {
    async fn get_by_key(&self, namespace: &str, key: &str) -> ManagerResult<Option<ConfigurationEntry>> {
        self.key_reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let entries = self.entries.lock().unwrap();
        Ok(entries
            .values()
            .find(|s| !s.deleted && s.entry.namespace == namespace && s.entry.key == key)
            .map(|s| s.entry.clone()))
    }

    async fn exists_by_key(&self, namespace: &str, key: &str) -> ManagerResult<bool> {
        self.check_available()?;

        let entries = self.entries.lock().unwrap();
        Ok(entries
            .values()
            .any(|s| !s.deleted && s.entry.namespace == namespace && s.entry.key == key))
    }

    async fn get_by_id(&self, id: i64) -> ManagerResult<Option<ConfigurationEntry>> {
        self.check_available()?;

        let entries = self.entries.lock().unwrap();
        Ok(entries.get(&id).filter(|s| !s.deleted).map(|s| s.entry.clone()))
    }

    async fn create(&self, entry: &ConfigurationEntry) -> ManagerResult<ConfigurationEntry> {
        self.check_available()?;

        let mut entries = self.entries.lock().unwrap();
        let duplicate = entries
            .values()
            .any(|s| !s.deleted && s.entry.namespace == entry.namespace && s.entry.key == entry.key);
        if duplicate {
            return Err(ManagerError::Conflict("configuration already exists".to_string()));
        }

        let mut next_id = self.next_id.lock().unwrap();
        let now = Utc::now();
        let mut new_entry = entry.clone();
        new_entry.id = *next_id;
        new_entry.created_at = Some(now);
        new_entry.updated_at = Some(now);
        *next_id += 1;

        entries.insert(
            new_entry.id,
            StoredEntry {
                entry: new_entry.clone(),
                deleted: false,
            },
        );
        Ok(new_entry)
    }

    async fn update(&self, entry: &ConfigurationEntry) -> ManagerResult<ConfigurationEntry> {
        self.check_available()?;

        let mut entries = self.entries.lock().unwrap();
        let duplicate = entries.iter().any(|(id, s)| {
            *id != entry.id && !s.deleted && s.entry.namespace == entry.namespace && s.entry.key == entry.key
        });
        if duplicate {
            return Err(ManagerError::Conflict("configuration already exists".to_string()));
        }

        let stored = entries
            .get_mut(&entry.id)
            .filter(|s| !s.deleted)
            .ok_or(ManagerError::ConfigurationIdNotFound { id: entry.id })?;

        let mut updated = entry.clone();
        updated.created_at = stored.entry.created_at;
        updated.updated_at = Some(Utc::now());
        stored.entry = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> ManagerResult<()> {
        self.check_available()?;

        let mut entries = self.entries.lock().unwrap();
        let stored = entries
            .get_mut(&id)
            .filter(|s| !s.deleted)
            .ok_or(ManagerError::ConfigurationIdNotFound { id })?;
        stored.deleted = true;
        Ok(())
    }

    async fn list(&self, filter: &ConfigurationFilter) -> ManagerResult<Vec<ConfigurationEntry>> {
        self.check_available()?;

        let mut filtered: Vec<ConfigurationEntry> = self
            .live_entries()
            .into_iter()
            .filter(|e| Self::matches_search(e, &filter.search))
            .collect();

        // Newest first, id breaks ties for entries created in the same instant
        filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(paginate(filtered, filter.offset, filter.limit))
    }

    async fn count(&self, filter: &ConfigurationFilter) -> ManagerResult<i64> {
        self.check_available()?;

        Ok(self
            .live_entries()
            .iter()
            .filter(|e| Self::matches_search(e, &filter.search))
            .count() as i64)
    }

    async fn list_by_namespace(&self, namespace: &str) -> ManagerResult<Vec<ConfigurationEntry>> {
        self.check_available()?;

        let mut entries: Vec<ConfigurationEntry> = self
            .live_entries()
            .into_iter()
            .filter(|e| e.namespace == namespace)
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}

/// Mock implementation of FeedbackRepository for testing
#[derive(Debug, Clone)]
pub struct MockFeedbackRepository {
    feedbacks: Arc<Mutex<Vec<Feedback>>>,
    next_id: Arc<Mutex<i64>>,
    batch_calls: Arc<AtomicUsize>,
}

impl MockFeedbackRepository {
    pub fn new() -> Self {
        Self {
            feedbacks: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(1)),
            batch_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_feedbacks(feedbacks: Vec<Feedback>) -> Self {
        let max_id = feedbacks.iter().map(|f| f.id).max().unwrap_or(0);
        Self {
            feedbacks: Arc::new(Mutex::new(feedbacks)),
            next_id: Arc::new(Mutex::new(max_id + 1)),
            batch_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn count(&self) -> usize {
        self.feedbacks.lock().unwrap().len()
    }

    pub fn get_all_feedbacks(&self) -> Vec<Feedback> {
        self.feedbacks.lock().unwrap().clone()
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    fn insert(&self, feedback: &Feedback) -> Feedback {
        let mut next_id = self.next_id.lock().unwrap();
        let mut new_feedback = feedback.clone();
        new_feedback.id = *next_id;
        *next_id += 1;

        self.feedbacks.lock().unwrap().push(new_feedback.clone());
        new_feedback
    }
}

impl Default for MockFeedbackRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedbackRepository for MockFeedbackRepository {
    async fn create(&self, feedback: &Feedback) -> ManagerResult<Feedback> {
        Ok(self.insert(feedback))
    }

    async fn create_batch(&self, feedbacks: &[Feedback]) -> ManagerResult<usize> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        for feedback in feedbacks {
            self.insert(feedback);
        }
        Ok(feedbacks.len())
    }

    async fn list_by_conversation(&self, conversation_id: &str) -> ManagerResult<Vec<Feedback>> {
        let mut result: Vec<Feedback> = self
            .feedbacks
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.conversation_id == conversation_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    async fn list_by_type(&self, feedback_type: FeedbackType, page: PageRequest) -> ManagerResult<Vec<Feedback>> {
        let mut result: Vec<Feedback> = self
            .feedbacks
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.feedback_type == feedback_type)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(result, page.offset(), page.limit()))
    }

    async fn count_by_type(&self, feedback_type: FeedbackType) -> ManagerResult<i64> {
        Ok(self
            .feedbacks
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.feedback_type == feedback_type)
            .count() as i64)
    }

    async fn stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ManagerResult<FeedbackStats> {
        let feedbacks = self.feedbacks.lock().unwrap();
        let mut stats = FeedbackStats::default();

        for feedback in feedbacks
            .iter()
            .filter(|f| f.created_at >= start && f.created_at <= end)
        {
            *stats
                .type_counts
                .entry(feedback.feedback_type.as_str().to_string())
                .or_insert(0) += 1;
            stats.total_count += 1;
        }

        Ok(stats)
    }
}

/// Mock implementation of ClientLogRepository for testing
#[derive(Debug, Clone)]
pub struct MockClientLogRepository {
    logs: Arc<Mutex<Vec<ClientLog>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockClientLogRepository {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    pub fn with_logs(logs: Vec<ClientLog>) -> Self {
        let max_id = logs.iter().map(|l| l.id).max().unwrap_or(0);
        Self {
            logs: Arc::new(Mutex::new(logs)),
            next_id: Arc::new(Mutex::new(max_id + 1)),
        }
    }

    pub fn count(&self) -> usize {
        self.logs.lock().unwrap().len()
    }

    pub fn get_all_logs(&self) -> Vec<ClientLog> {
        self.logs.lock().unwrap().clone()
    }

    fn scoped(&self, scope: &LogScope) -> Vec<ClientLog> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| match scope {
                LogScope::Client(id) => &log.client_id == id,
                LogScope::User(id) => &log.user_id == id,
                LogScope::Module(name) => &log.module_name == name,
                LogScope::Sessions(id) => &log.client_id == id && log.is_session_boundary(),
            })
            .cloned()
            .collect()
    }
}

impl Default for MockClientLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientLogRepository for MockClientLogRepository {
    async fn create(&self, log: &ClientLog) -> ManagerResult<ClientLog> {
        let mut next_id = self.next_id.lock().unwrap();
        let mut new_log = log.clone();
        new_log.id = *next_id;
        *next_id += 1;

        self.logs.lock().unwrap().push(new_log.clone());
        Ok(new_log)
    }

    async fn list(&self, scope: &LogScope, page: PageRequest) -> ManagerResult<Vec<ClientLog>> {
        let mut result = self.scoped(scope);
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(result, page.offset(), page.limit()))
    }

    async fn count(&self, scope: &LogScope) -> ManagerResult<i64> {
        Ok(self.scoped(scope).len() as i64)
    }

    async fn stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ManagerResult<LogStats> {
        let logs = self.logs.lock().unwrap();
        let mut stats = LogStats::default();

        for log in logs.iter().filter(|l| l.created_at >= start && l.created_at <= end) {
            stats.total_count += 1;
            *stats.client_counts.entry(log.client_id.clone()).or_insert(0) += 1;
            *stats.module_counts.entry(log.module_name.clone()).or_insert(0) += 1;
        }

        Ok(stats)
    }

    async fn delete_before(&self, before: DateTime<Utc>) -> ManagerResult<u64> {
        let mut logs = self.logs.lock().unwrap();
        let original = logs.len();
        logs.retain(|l| l.created_at >= before);
        Ok((original - logs.len()) as u64)
    }
}

/// In-memory CacheService with TTL and failure injection
///
/// Expiry is measured on tokio's clock, so tests running with
/// `#[tokio::test(start_paused = true)]` can move past a TTL with
/// `tokio::time::advance`.
#[derive(Debug, Clone)]
pub struct MockCacheService {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
    stats: Arc<Mutex<CacheStats>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MockCacheService {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(Mutex::new(CacheStats::default())),
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// `get` returns an operational error while set
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// `set` and `delete` return an operational error while set
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Simulate the whole backend being down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.set_fail_reads(unavailable);
        self.set_fail_writes(unavailable);
    }

    /// Seed a value directly, bypassing stats and failure injection
    pub fn insert_raw(&self, key: &str, value: &str, ttl: Duration) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
    }

    /// Current unexpired value, bypassing stats and failure injection
    pub fn peek(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|(_, expires_at)| Instant::now() < *expires_at)
            .map(|(value, _)| value.clone())
    }

    /// Remaining TTL of an unexpired key
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .and_then(|(_, expires_at)| expires_at.checked_duration_since(Instant::now()))
            .filter(|remaining| !remaining.is_zero())
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .unwrap()
            .values()
            .filter(|(_, expires_at)| now < *expires_at)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record_error(&self) {
        self.stats.lock().unwrap().errors += 1;
    }
}

impl Default for MockCacheService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for MockCacheService {
    async fn get(&self, key: &str) -> ManagerResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            self.record_error();
            return Err(ManagerError::cache_error("mock cache read failure"));
        }

        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        let value = match entries.get(key) {
            Some((value, expires_at)) if now < *expires_at => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        };

        let mut stats = self.stats.lock().unwrap();
        if value.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> ManagerResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            self.record_error();
            return Err(ManagerError::cache_error("mock cache write failure"));
        }

        self.insert_raw(key, value, ttl);
        self.stats.lock().unwrap().sets += 1;
        Ok(())
    }

    async fn delete(&self, key: &str) -> ManagerResult<bool> {
        if self.fail_writes.load(Ordering::SeqCst) {
            self.record_error();
            return Err(ManagerError::cache_error("mock cache delete failure"));
        }

        let existed = self.entries.lock().unwrap().remove(key).is_some();
        self.stats.lock().unwrap().deletes += 1;
        Ok(existed)
    }

    async fn health_check(&self) -> ManagerResult<bool> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ManagerError::cache_error("mock cache unavailable"));
        }
        Ok(true)
    }

    async fn get_stats(&self) -> CacheStats {
        self.stats.lock().unwrap().clone()
    }
}
