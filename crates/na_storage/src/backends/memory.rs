use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use na_core::types::normalize_company;
use na_core::{
    AnalysisCache, AnalysisTask, CompanyAnalysisResult, CompanyReport, Error, Result, RunStage,
    TaskRegistry,
};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MemoryConfig {
    pub capacity: usize,
}

impl MemoryConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self::new(64)
    }
}

/// LRU bookkeeping behind [`MemoryCache`]. `order` holds keys, most recent first.
pub struct MemoryStore {
    capacity: usize,
    entries: HashMap<String, (String, CompanyAnalysisResult)>,
    order: VecDeque<String>,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_front(k);
            }
        }
    }

    pub fn get(&mut self, company: &str) -> Option<CompanyAnalysisResult> {
        let key = normalize_company(company);
        let result = self.entries.get(&key).map(|(_, result)| result.clone())?;
        self.touch(&key);
        Some(result)
    }

    pub fn insert(&mut self, company: &str, result: CompanyAnalysisResult) {
        let key = normalize_company(company);
        let display = company.trim().to_string();
        if self.entries.insert(key.clone(), (display, result)).is_some() {
            self.touch(&key);
            return;
        }
        self.order.push_front(key);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_back() {
                debug!("Evicting cached analysis for {}", evicted);
                self.entries.remove(&evicted);
            }
        }
    }

    pub fn companies(&self) -> Vec<String> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|(display, _)| display.clone()))
            .collect()
    }
}

pub struct MemoryCache {
    store: Arc<RwLock<MemoryStore>>,
    config: MemoryConfig,
}

impl MemoryCache {
    pub fn new(config: MemoryConfig) -> Self {
        let store = Arc::new(RwLock::new(MemoryStore::new(config.capacity)));
        Self { store, config }
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }
}

#[async_trait]
impl AnalysisCache for MemoryCache {
    async fn get(&self, company: &str) -> Result<Option<CompanyAnalysisResult>> {
        // LRU recency is updated on reads, so this takes the write half.
        let mut store = self.store.write().await;
        Ok(store.get(company))
    }

    async fn insert(&self, company: &str, result: CompanyAnalysisResult) -> Result<()> {
        if company.trim().is_empty() {
            return Err(Error::InvalidCompanyName);
        }
        let mut store = self.store.write().await;
        store.insert(company, result);
        Ok(())
    }

    async fn companies(&self) -> Result<Vec<String>> {
        let store = self.store.read().await;
        Ok(store.companies())
    }
}

/// Task table behind [`MemoryTaskRegistry`]. Only finished tasks are
/// evicted, oldest completion first, once more than `capacity` are kept.
struct TaskTable {
    capacity: usize,
    tasks: HashMap<String, AnalysisTask>,
    finished: VecDeque<String>,
}

impl TaskTable {
    fn forget_finished(&mut self, task_id: &str) {
        self.finished.retain(|id| id != task_id);
    }

    fn evict_finished(&mut self) {
        while self.finished.len() > self.capacity {
            if let Some(evicted) = self.finished.pop_front() {
                debug!("Dropping finished task {}", evicted);
                self.tasks.remove(&evicted);
            }
        }
    }
}

pub struct MemoryTaskRegistry {
    table: Arc<RwLock<TaskTable>>,
}

impl MemoryTaskRegistry {
    pub fn new(config: MemoryConfig) -> Self {
        let table = TaskTable {
            capacity: config.capacity,
            tasks: HashMap::new(),
            finished: VecDeque::new(),
        };
        Self {
            table: Arc::new(RwLock::new(table)),
        }
    }
}

impl Default for MemoryTaskRegistry {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

#[async_trait]
impl TaskRegistry for MemoryTaskRegistry {
    async fn begin(&self, task_id: &str, company: &str) -> Result<bool> {
        let mut table = self.table.write().await;
        if let Some(existing) = table.tasks.get(task_id) {
            if !existing.completed {
                return Ok(false);
            }
        }
        table.forget_finished(task_id);
        table
            .tasks
            .insert(task_id.to_string(), AnalysisTask::new(task_id, company));
        Ok(true)
    }

    async fn advance(&self, task_id: &str, stage: RunStage) -> Result<()> {
        let mut table = self.table.write().await;
        let task = table
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
        task.advance(stage);
        Ok(())
    }

    async fn complete(&self, task_id: &str, report: CompanyReport) -> Result<()> {
        let mut table = self.table.write().await;
        let task = table
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
        if !task.complete(report) {
            return Err(Error::Storage(format!("Task {} already completed", task_id)));
        }
        table.finished.push_back(task_id.to_string());
        table.evict_finished();
        Ok(())
    }

    async fn get(&self, task_id: &str) -> Result<Option<AnalysisTask>> {
        let table = self.table.read().await;
        Ok(table.tasks.get(task_id).cloned())
    }
}
