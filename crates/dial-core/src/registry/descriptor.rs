use std::sync::Arc;

use dial_model::{AttrMap, AttrValue};

use crate::error::{ControlError, ControlResult};

/// Mutable attribute store of one registered task type.
///
/// A descriptor distinguishes attributes set on the task type itself (*own*
/// attributes) from attributes inherited from its base type (`defaults`).
/// The bulk settings operations only ever observe own attributes; the
/// single-attribute operations use the broader check that falls back to the
/// defaults. Both predicates exist so the two operation families keep their
/// distinct existence semantics.
#[derive(Debug, Clone)]
pub struct TaskDescriptor {
    name: String,
    own: AttrMap,
    defaults: Arc<AttrMap>,
}

impl TaskDescriptor {
    /// Create a descriptor with no inherited defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            own: AttrMap::new(),
            defaults: Arc::new(AttrMap::new()),
        }
    }

    /// Create a descriptor that inherits from a shared defaults store.
    pub fn with_defaults(name: impl Into<String>, defaults: Arc<AttrMap>) -> Self {
        Self {
            name: name.into(),
            own: AttrMap::new(),
            defaults,
        }
    }

    /// Name of the task type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value set on this descriptor itself, ignoring defaults.
    pub fn get_own(&self, attr: &str) -> Option<&AttrValue> {
        self.own.get(attr)
    }

    /// Attribute value via the fallback chain: own first, then defaults.
    pub fn get(&self, attr: &str) -> Option<&AttrValue> {
        self.own.get(attr).or_else(|| self.defaults.get(attr))
    }

    /// Returns `true` if the attribute is set on this descriptor itself.
    pub fn has_own(&self, attr: &str) -> bool {
        self.own.contains(attr)
    }

    /// Returns `true` if the attribute is visible through the fallback
    /// chain (own or inherited).
    pub fn has(&self, attr: &str) -> bool {
        self.own.contains(attr) || self.defaults.contains(attr)
    }

    /// Set an own attribute.
    pub fn set(&mut self, attr: &str, value: AttrValue) -> ControlResult<()> {
        Self::check_attr_name(&self.name, attr)?;
        self.own.insert(attr, value);
        Ok(())
    }

    /// Remove an own attribute.
    ///
    /// `Ok(false)` means the attribute was not set on the descriptor itself;
    /// inherited defaults are never removable.
    pub fn remove(&mut self, attr: &str) -> ControlResult<bool> {
        Self::check_attr_name(&self.name, attr)?;
        Ok(self.own.remove(attr).is_some())
    }

    /// The requested attributes that are physically present on this
    /// descriptor, excluding anything visible only through the defaults.
    pub fn own_subset(&self, attrs: &[String]) -> AttrMap {
        attrs
            .iter()
            .filter_map(|attr| {
                self.own
                    .get(attr)
                    .map(|value| (attr.clone(), value.clone()))
            })
            .collect()
    }

    // The store accepts arbitrary attribute names from the wire; the empty
    // name is the one value that can never round-trip as a JSON object key
    // worth storing.
    fn check_attr_name(task: &str, attr: &str) -> ControlResult<()> {
        if attr.is_empty() {
            return Err(ControlError::Mutation(format!(
                "empty attribute name for task {task}"
            )));
        }
        Ok(())
    }
}
