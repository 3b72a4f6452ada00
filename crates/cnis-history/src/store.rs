//! Client-profile persistence seam.

use std::collections::HashMap;

use parking_lot::RwLock;

use cnis_core::Result;
use cnis_extract::EmploymentHistory;

/// Durable storage of saved histories, keyed by client identity.
pub trait ProfileStore: Send + Sync {
    /// The last saved history of a client, if any.
    fn load_history(&self, client_id: &str) -> Result<Option<EmploymentHistory>>;

    /// Replace the saved history of a client.
    fn update_history(&self, client_id: &str, history: &EmploymentHistory) -> Result<()>;

    /// Forget a client's saved history. Returns whether one existed.
    fn delete_history(&self, client_id: &str) -> Result<bool>;

    /// Number of clients with a saved history.
    fn count_histories(&self) -> Result<usize>;
}

/// Process-local store, used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryProfileStore {
    histories: RwLock<HashMap<String, EmploymentHistory>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.histories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.read().is_empty()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load_history(&self, client_id: &str) -> Result<Option<EmploymentHistory>> {
        Ok(self.histories.read().get(client_id).cloned())
    }

    fn update_history(&self, client_id: &str, history: &EmploymentHistory) -> Result<()> {
        self.histories
            .write()
            .insert(client_id.to_string(), history.clone());
        Ok(())
    }

    fn delete_history(&self, client_id: &str) -> Result<bool> {
        Ok(self.histories.write().remove(client_id).is_some())
    }

    fn count_histories(&self) -> Result<usize> {
        Ok(self.len())
    }
}
