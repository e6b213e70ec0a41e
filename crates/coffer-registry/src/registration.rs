//! Ordered registration callbacks.
//!
//! Each module that provides member types exposes a function that registers
//! its factories. The composition root collects those functions in a
//! [`Registrations`] list and runs them once, in order, before the registry
//! is used.

use std::fmt;

use crate::error::RegistryResult;
use crate::members::register_builtin;
use crate::registry::Registry;

/// A callback that adds one family of factories to a registry.
pub type RegisterFn = Box<dyn Fn(&mut Registry) -> RegistryResult<()> + Send + Sync>;

/// An ordered list of registration callbacks.
#[derive(Default)]
pub struct Registrations {
    callbacks: Vec<RegisterFn>,
}

impl Registrations {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in member types.
    pub fn standard() -> Self {
        Self::new().with(register_builtin)
    }

    /// Append a callback, builder style.
    pub fn with<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Registry) -> RegistryResult<()> + Send + Sync + 'static,
    {
        self.push(callback);
        self
    }

    pub fn push<F>(&mut self, callback: F)
    where
        F: Fn(&mut Registry) -> RegistryResult<()> + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Run every callback in insertion order, stopping at the first error.
    pub fn apply(&self, registry: &mut Registry) -> RegistryResult<()> {
        for callback in &self.callbacks {
            callback(registry)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for Registrations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrations")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::CodecFactory;
    use crate::members::{tags, JsonCodec};
    use coffer_types::TypeTag;

    const NOTE: TypeTag = TypeTag::from_static("Note");

    fn register_notes(registry: &mut Registry) -> RegistryResult<()> {
        registry.register(CodecFactory::new(NOTE, JsonCodec::<Vec<String>>::new()))
    }

    #[test]
    fn standard_registers_builtins() {
        let registry = Registry::from_registrations(&Registrations::standard()).unwrap();
        assert!(registry.is_finalized());
        assert_eq!(registry.len(), 7);
        assert!(registry.lookup(tags::STRING_ID_VECTOR.as_str()).is_some());
    }

    #[test]
    fn callbacks_run_in_order() {
        // The second callback overrides the builtin String codec.
        let regs = Registrations::standard()
            .with(register_notes)
            .with(|r: &mut Registry| {
                r.register(CodecFactory::new(tags::STRING, JsonCodec::<String>::new()))
            });
        assert_eq!(regs.len(), 3);

        let registry = Registry::from_registrations(&regs).unwrap();
        assert_eq!(registry.len(), 8);
        assert_eq!(registry.lookup("String").unwrap().extension(), "json");
        assert!(registry.lookup("Note").is_some());
    }

    #[test]
    fn apply_stops_on_error() {
        let mut registry = Registry::new();
        registry.finalize();
        let err = Registrations::standard().apply(&mut registry);
        assert!(err.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_list() {
        let regs = Registrations::new();
        assert!(regs.is_empty());
        let registry = Registry::from_registrations(&regs).unwrap();
        assert!(registry.is_empty());
        assert!(registry.is_finalized());
    }
}
