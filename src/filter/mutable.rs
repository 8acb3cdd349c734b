//! Rejects tokens whose metadata can still be changed

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use super::metadata::MetadataSource;
use super::{Filter, FilterVerdict};
use crate::cache::PoolRecord;

pub struct MutableFilter {
    metadata: Arc<dyn MetadataSource>,
}

impl MutableFilter {
    pub fn new(metadata: Arc<dyn MetadataSource>) -> Self {
        Self { metadata }
    }
}

#[async_trait]
impl Filter for MutableFilter {
    fn name(&self) -> &'static str {
        "mutable"
    }

    async fn execute(&self, pool: &PoolRecord) -> FilterVerdict {
        match self.metadata.fetch(&pool.base_mint()).await {
            Ok(Some(metadata)) if metadata.is_mutable => {
                FilterVerdict::fail("Mutable -> Metadata can be changed")
            }
            Ok(Some(_)) => FilterVerdict::pass(),
            Ok(None) => FilterVerdict::fail("Mutable -> Failed to fetch account data"),
            Err(e) => {
                error!("Mutable -> Failed to check mutable for {}: {}", pool.base_mint(), e);
                FilterVerdict::fail("Mutable -> Failed to check mutable")
            }
        }
    }
}
