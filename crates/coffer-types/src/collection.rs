use std::any::Any;

use crate::member::Member;
use crate::time::now_ms;

/// An ordered, named set of owned members.
///
/// Members keep insertion order. Names are expected to be unique but this is
/// not enforced by [`add_member`](Self::add_member); lookups return the first
/// match. The error list is a transient diagnostic log for the caller and is
/// never persisted.
#[derive(Debug)]
pub struct Collection {
    name: String,
    timestamp_ms: i64,
    members: Vec<Member>,
    errors: Vec<String>,
}

impl Collection {
    /// Create an empty collection stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp_ms: now_ms(),
            members: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn set_timestamp_ms(&mut self, timestamp_ms: i64) {
        self.timestamp_ms = timestamp_ms;
    }

    // ---------------------------------------------------------------
    // Members
    // ---------------------------------------------------------------

    /// Append a member, taking ownership. Name collisions are not checked.
    pub fn add_member(&mut self, member: Member) {
        self.members.push(member);
    }

    /// Replace the first member with the same name, or append if none.
    ///
    /// Returns the replaced member.
    pub fn replace_member(&mut self, member: Member) -> Option<Member> {
        match self.members.iter_mut().find(|m| m.name() == member.name()) {
            Some(slot) => Some(std::mem::replace(slot, member)),
            None => {
                self.members.push(member);
                None
            }
        }
    }

    /// Remove and return the first member with the given name.
    pub fn remove_member(&mut self, name: &str) -> Option<Member> {
        let pos = self.members.iter().position(|m| m.name() == name)?;
        Some(self.members.remove(pos))
    }

    /// The first member with the given name.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name() == name)
    }

    pub fn member_mut(&mut self, name: &str) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.name() == name)
    }

    /// The payload of the named member as `T`.
    ///
    /// `None` if there is no such member or it holds another variant.
    pub fn value<T: Any>(&self, name: &str) -> Option<&T> {
        self.member(name).and_then(Member::downcast_ref::<T>)
    }

    /// Every member whose payload is a `T`, in insertion order.
    pub fn values<T: Any>(&self) -> impl Iterator<Item = (&Member, &T)> {
        self.members
            .iter()
            .filter_map(|m| m.downcast_ref::<T>().map(|v| (m, v)))
    }

    /// Members in insertion order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Member names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(Member::name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Drop all members and all diagnostic errors. Name and timestamp stay.
    pub fn clear(&mut self) {
        self.members.clear();
        self.errors.clear();
    }

    // ---------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new("")
    }
}
