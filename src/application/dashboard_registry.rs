// Dashboard registry - Immutable name -> dashboard snapshots
use crate::domain::dashboard::Dashboard;
use crate::error::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type Snapshot = HashMap<String, Dashboard>;

/// Readers clone the current snapshot pointer; a load builds a complete new
/// snapshot and swaps it in, so a lookup never observes a partial registry.
#[derive(Debug, Default)]
pub struct DashboardRegistry {
    snapshot: RwLock<Arc<Snapshot>>,
}

impl DashboardRegistry {
    pub fn from_dashboards(dashboards: Vec<Dashboard>) -> AppResult<Self> {
        let registry = Self::default();
        registry.load(dashboards)?;
        Ok(registry)
    }

    /// Replace the active mapping. On error the previous snapshot stays active.
    pub fn load(&self, dashboards: Vec<Dashboard>) -> AppResult<()> {
        let mut next = HashMap::with_capacity(dashboards.len());
        for dashboard in dashboards {
            if dashboard.name.is_empty() {
                return Err(AppError::Config("dashboard with an empty name".to_string()));
            }
            if next.contains_key(&dashboard.name) {
                return Err(AppError::Config(format!(
                    "dashboard '{}' is defined more than once",
                    dashboard.name
                )));
            }
            next.insert(dashboard.name.clone(), dashboard);
        }

        let next = Arc::new(next);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, name: &str) -> AppResult<Dashboard> {
        self.current()
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.current().keys().cloned().collect();
        names.sort();
        names
    }

    fn current(&self) -> Arc<Snapshot> {
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }
}
