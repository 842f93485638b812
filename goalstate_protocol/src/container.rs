//! The process-wide container-id register, updated by the root fetcher.
//!
//! Modeled as an injected, clonable handle over a shared `RwLock` rather
//! than a true global, so callers control its lifetime and tests can hand
//! the root fetcher a throwaway register instead of mutating real global
//! state.

use std::sync::{Arc, RwLock};

#[derive(Clone, Default)]
pub struct ContainerIdRegister(Arc<RwLock<String>>);

impl ContainerIdRegister {
    pub fn new() -> Self {
        ContainerIdRegister(Arc::new(RwLock::new(String::new())))
    }

    pub fn update(&self, container_id: &str) {
        let mut guard = self.0.write().expect("container id register lock poisoned");
        *guard = container_id.to_string();
    }

    pub fn get(&self) -> String {
        self.0.read().expect("container id register lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_then_get_roundtrips() {
        let reg = ContainerIdRegister::new();
        assert_eq!(reg.get(), "");
        reg.update("abc-123");
        assert_eq!(reg.get(), "abc-123");
    }

    #[test]
    fn clones_share_the_same_backing_store() {
        let reg = ContainerIdRegister::new();
        let clone = reg.clone();
        clone.update("shared");
        assert_eq!(reg.get(), "shared");
    }
}
