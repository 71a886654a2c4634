use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An owning salon as known to the deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalonProfile {
    pub id: String,
    pub name: String,
}

/// Lookup collaborator for owning salons. Injected so deployments can back
/// it with configuration instead of tables baked into the core.
pub trait SalonDirectory: Send + Sync {
    fn resolve(&self, salon_id: &str) -> Option<SalonProfile>;
}

/// Directory over a fixed set of profiles loaded at startup.
pub struct StaticSalonDirectory {
    salons: HashMap<String, SalonProfile>,
}

impl StaticSalonDirectory {
    pub fn new(profiles: Vec<SalonProfile>) -> Self {
        let salons = profiles.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self { salons }
    }
}

impl SalonDirectory for StaticSalonDirectory {
    fn resolve(&self, salon_id: &str) -> Option<SalonProfile> {
        self.salons.get(salon_id).cloned()
    }
}
