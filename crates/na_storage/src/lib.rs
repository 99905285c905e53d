use std::sync::Arc;

use na_core::{AnalysisCache, Error, Result, TaskRegistry};

pub mod backends;

pub use backends::*;

/// Cache and task registry handed to the analysis service.
#[derive(Clone)]
pub struct Storage {
    pub cache: Arc<dyn AnalysisCache>,
    pub tasks: Arc<dyn TaskRegistry>,
}

pub fn create_storage(kind: &str, capacity: usize) -> Result<Storage> {
    match kind {
        "memory" => Ok(Storage {
            cache: Arc::new(MemoryCache::new(MemoryConfig::new(capacity))),
            tasks: Arc::new(MemoryTaskRegistry::new(MemoryConfig::new(capacity))),
        }),
        other => Err(Error::Storage(format!(
            "Unsupported storage backend: {}. Available backends: memory",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, Storage};
}
