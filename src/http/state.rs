//! Shared state for the HTTP handlers

use std::sync::Arc;

use super::access::{FileAccess, StoreFileAccess};
use crate::core::cas::ContentStore;
use crate::core::services::Services;

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Resolves file ids to sharded paths
    pub content: Arc<ContentStore>,

    /// API key and file record lookup
    pub access: Arc<dyn FileAccess>,
}

impl AppState {
    pub fn new(content: Arc<ContentStore>, access: Arc<dyn FileAccess>) -> Self {
        Self { content, access }
    }

    /// State backed by the services' record store
    pub fn from_services(services: &Services) -> Self {
        Self::new(
            Arc::clone(&services.content),
            Arc::new(StoreFileAccess::new(Arc::clone(&services.source))),
        )
    }
}
