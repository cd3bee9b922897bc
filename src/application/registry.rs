//! Handler registry - the wired set of domain handlers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::HandlerId;
use crate::ports::{DomainHandler, ToolSpec};

/// Errors during registry wiring.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Handler '{0}' is already registered")]
    Duplicate(HandlerId),
}

/// Validated map of handler id to handler implementation.
///
/// The routing engine only ever sees the ids registered here, which keeps
/// `active_handler` pointing at known handlers by construction.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerId, Arc<dyn DomainHandler>>,
    // Registration order, so available_handlers() is deterministic.
    order: Vec<HandlerId>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under its own id.
    ///
    /// # Errors
    ///
    /// - `Duplicate` if a handler with the same id is already registered
    pub fn register(&mut self, handler: Arc<dyn DomainHandler>) -> Result<(), RegistryError> {
        let id = handler.id();
        if self.handlers.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        self.order.push(id.clone());
        self.handlers.insert(id, handler);
        Ok(())
    }

    /// Looks up a handler by id.
    pub fn get(&self, id: &HandlerId) -> Option<&Arc<dyn DomainHandler>> {
        self.handlers.get(id)
    }

    /// The registered handler ids, in registration order.
    pub fn available_handlers(&self) -> Vec<HandlerId> {
        self.order.clone()
    }

    /// The declared tool contract for the generation capability.
    pub fn tool_specs(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|id| self.handlers.get(id))
            .map(|h| ToolSpec {
                name: h.id().to_string(),
                description: h.description().to_string(),
            })
            .collect()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::ports::{HandlerError, ListFilter, ListItem, TurnContext};

    struct StubHandler {
        id: HandlerId,
    }

    #[async_trait]
    impl DomainHandler for StubHandler {
        fn id(&self) -> HandlerId {
            self.id.clone()
        }

        fn description(&self) -> &str {
            "stub"
        }

        async fn process(
            &self,
            _utterance: &str,
            _context: &TurnContext,
        ) -> Result<String, HandlerError> {
            Ok("ok".to_string())
        }

        async fn list(&self, _filter: &ListFilter) -> Result<Vec<ListItem>, HandlerError> {
            Ok(Vec::new())
        }
    }

    fn stub(id: HandlerId) -> Arc<dyn DomainHandler> {
        Arc::new(StubHandler { id })
    }

    #[test]
    fn registers_and_looks_up() {
        let mut registry = HandlerRegistry::new();
        registry.register(stub(HandlerId::scheduling())).unwrap();

        assert!(registry.get(&HandlerId::scheduling()).is_some());
        assert!(registry.get(&HandlerId::tasks()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rejects_duplicate_registration() {
        let mut registry = HandlerRegistry::new();
        registry.register(stub(HandlerId::tasks())).unwrap();

        let result = registry.register(stub(HandlerId::tasks()));
        assert!(matches!(result, Err(RegistryError::Duplicate(_))));
    }

    #[test]
    fn available_handlers_follow_registration_order() {
        let mut registry = HandlerRegistry::new();
        registry.register(stub(HandlerId::tasks())).unwrap();
        registry.register(stub(HandlerId::scheduling())).unwrap();

        assert_eq!(
            registry.available_handlers(),
            vec![HandlerId::tasks(), HandlerId::scheduling()]
        );
    }

    #[test]
    fn tool_specs_cover_every_handler() {
        let mut registry = HandlerRegistry::new();
        registry.register(stub(HandlerId::tasks())).unwrap();
        registry.register(stub(HandlerId::correspondence())).unwrap();

        let specs = registry.tool_specs();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "tasks");
        assert_eq!(specs[1].name, "correspondence");
    }
}
