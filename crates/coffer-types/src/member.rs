use std::any::Any;
use std::fmt;

use crate::tag::TypeTag;
use crate::time::now_ms;

/// Bound for the payload carried by a [`Member`].
///
/// Blanket-implemented for every `Any + Debug + Send + Sync` type, so codecs
/// can use plain Rust types (`String`, `i32`, a serde struct) as payloads.
pub trait MemberValue: Any + fmt::Debug + Send + Sync {
    /// Upcast for downcasting to the concrete payload type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete payload type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> MemberValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A single named, typed, timestamped unit of data.
///
/// The name is unique within the owning collection by convention only. The
/// type tag is fixed at construction. The payload is opaque to everything
/// except the factory registered for the tag.
pub struct Member {
    name: String,
    type_tag: TypeTag,
    timestamp_ms: i64,
    value: Box<dyn MemberValue>,
}

impl Member {
    /// Create a member stamped with the current time.
    pub fn new<V: MemberValue>(name: impl Into<String>, type_tag: TypeTag, value: V) -> Self {
        Self {
            name: name.into(),
            type_tag,
            timestamp_ms: now_ms(),
            value: Box::new(value),
        }
    }

    /// Create a member with an empty name and a zero timestamp.
    ///
    /// This is what factories hand back from `decode` and `clone_member`;
    /// the caller assigns identity afterwards.
    pub fn unnamed<V: MemberValue>(type_tag: TypeTag, value: V) -> Self {
        Self {
            name: String::new(),
            type_tag,
            timestamp_ms: 0,
            value: Box::new(value),
        }
    }

    /// Set both name and timestamp, consuming and returning the member.
    pub fn with_identity(mut self, name: impl Into<String>, timestamp_ms: i64) -> Self {
        self.name = name.into();
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn type_tag(&self) -> &TypeTag {
        &self.type_tag
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn set_timestamp_ms(&mut self, timestamp_ms: i64) {
        self.timestamp_ms = timestamp_ms;
    }

    /// The type-erased payload.
    pub fn value(&self) -> &dyn MemberValue {
        &*self.value
    }

    /// The payload as `T`, or `None` if it holds another type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value().as_any().downcast_ref::<T>()
    }

    /// The payload as `&mut T`, or `None` if it holds another type.
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        let value: &mut dyn MemberValue = &mut *self.value;
        value.as_any_mut().downcast_mut::<T>()
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("type_tag", &self.type_tag)
            .field("timestamp_ms", &self.timestamp_ms)
            .field("value", &self.value)
            .finish()
    }
}
