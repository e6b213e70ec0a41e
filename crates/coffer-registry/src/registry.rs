use std::collections::HashMap;
use std::fmt;

use coffer_types::{Member, TypeTag};
use tracing::{debug, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::factory::MemberFactory;
use crate::registration::Registrations;

/// Type-dispatch table mapping type tags to member factories.
///
/// The registry is populated during a single-threaded setup phase, then
/// optionally finalized. After that it is read-only and can be shared across
/// threads (for example behind an `Arc`); lookups take `&self` and never
/// lock.
pub struct Registry {
    factories: HashMap<TypeTag, Box<dyn MemberFactory>>,
    finalized: bool,
}

impl Registry {
    /// Create an empty, unfinalized registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            finalized: false,
        }
    }

    /// Run every registration callback in order, then finalize.
    pub fn from_registrations(registrations: &Registrations) -> RegistryResult<Self> {
        let mut registry = Self::new();
        registrations.apply(&mut registry)?;
        registry.finalize();
        Ok(registry)
    }

    /// Register a factory. A later factory for the same tag replaces the
    /// earlier one.
    ///
    /// Rejected with [`RegistryError::Finalized`] once the registry is
    /// finalized; the registry is left unchanged.
    pub fn register<F: MemberFactory + 'static>(&mut self, factory: F) -> RegistryResult<()> {
        self.register_boxed(Box::new(factory))
    }

    pub fn register_boxed(&mut self, factory: Box<dyn MemberFactory>) -> RegistryResult<()> {
        let type_tag = factory.type_tag().clone();
        if self.finalized {
            warn!(type_tag = %type_tag, "rejected factory registration: registry already finalized");
            return Err(RegistryError::Finalized(type_tag));
        }
        if self.factories.insert(type_tag.clone(), factory).is_some() {
            debug!(type_tag = %type_tag, "replaced member factory");
        }
        Ok(())
    }

    /// Close the registry to further registration. Calling this twice only
    /// logs a warning.
    pub fn finalize(&mut self) {
        if self.finalized {
            warn!("registry already finalized");
            return;
        }
        self.finalized = true;
        debug!(factories = self.factories.len(), "registry finalized");
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The factory for `type_tag`, if one is registered.
    pub fn lookup(&self, type_tag: &str) -> Option<&dyn MemberFactory> {
        self.factories.get(type_tag).map(|f| &**f)
    }

    /// Like [`lookup`](Self::lookup), but a missing factory is an error.
    pub fn require(&self, type_tag: &TypeTag) -> RegistryResult<&dyn MemberFactory> {
        self.lookup(type_tag.as_str())
            .ok_or_else(|| RegistryError::MissingFactory(type_tag.clone()))
    }

    /// Clone a member through its factory, keeping its name and timestamp.
    pub fn clone_member(&self, member: &Member) -> RegistryResult<Member> {
        let factory = self.require(member.type_tag())?;
        let copy = factory.clone_member(member)?;
        Ok(copy.with_identity(member.name(), member.timestamp_ms()))
    }

    /// Registered type tags, sorted.
    pub fn type_tags(&self) -> Vec<&TypeTag> {
        let mut tags: Vec<&TypeTag> = self.factories.keys().collect();
        tags.sort();
        tags
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("type_tags", &self.type_tags())
            .field("finalized", &self.finalized)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::CodecFactory;
    use crate::members::{self, tags, NumberCodec, TextCodec};

    fn populated() -> Registry {
        let mut r = Registry::new();
        r.register(CodecFactory::new(tags::INT, NumberCodec::<i32>::new()))
            .unwrap();
        r.register(CodecFactory::new(tags::STRING, TextCodec)).unwrap();
        r
    }

    #[test]
    fn lookup_by_tag() {
        let r = populated();
        assert_eq!(r.len(), 2);
        assert_eq!(r.lookup("Int").unwrap().type_tag(), &tags::INT);
        assert!(r.lookup("Float").is_none());
        assert_eq!(r.type_tags(), vec![&tags::INT, &tags::STRING]);
    }

    #[test]
    fn require_missing_factory() {
        let r = populated();
        let err = r.require(&tags::FLOAT).unwrap_err();
        assert!(matches!(err, RegistryError::MissingFactory(t) if t == tags::FLOAT));
    }

    #[test]
    fn require_registered_factory() {
        let r = populated();
        let factory = r.require(&tags::INT).unwrap();
        assert_eq!(factory.type_tag(), &tags::INT);
        assert!(format!("{factory:?}").contains("Int"));
    }

    #[test]
    fn last_registration_wins() {
        let mut r = populated();
        r.register(CodecFactory::new(tags::STRING, members::JsonCodec::<String>::new()))
            .unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.lookup("String").unwrap().extension(), "json");
    }

    #[test]
    fn registration_after_finalize_is_rejected() {
        let mut r = populated();
        r.finalize();
        let err = r
            .register(CodecFactory::new(tags::FLOAT, NumberCodec::<f32>::new()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Finalized(_)));
        assert!(r.lookup("Float").is_none());
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn double_finalize_is_harmless() {
        let mut r = populated();
        r.finalize();
        r.finalize();
        assert!(r.is_finalized());
        assert!(r.lookup("Int").is_some());
    }

    #[test]
    fn clone_member_keeps_identity() {
        let r = populated();
        let mut source = members::int("count", 5);
        source.set_timestamp_ms(1234);

        let mut copy = r.clone_member(&source).unwrap();
        assert_eq!(copy.name(), "count");
        assert_eq!(copy.timestamp_ms(), 1234);
        assert_eq!(copy.downcast_ref::<i32>(), Some(&5));

        *copy.downcast_mut::<i32>().unwrap() = 6;
        assert_eq!(source.downcast_ref::<i32>(), Some(&5));
    }

    #[test]
    fn clone_member_without_factory() {
        let r = populated();
        let err = r.clone_member(&members::float("f", 1.5)).unwrap_err();
        assert!(matches!(err, RegistryError::MissingFactory(_)));
    }

    #[test]
    fn registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
