//! Parent back-references
//!
//! Children are owned by their parents. The reverse direction is a
//! [`ParentRef`], a typed snapshot of where the parent sat in the tree (its
//! field path and machine id) at the time of the last
//! [`Hierarchical::apply_parent_to_children`] call. A snapshot never keeps the
//! parent alive and goes stale if the tree is reshaped afterwards.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Non-owning, typed snapshot of a node's parent
pub struct ParentRef<P> {
    path: String,
    machine_id: Option<String>,
    _parent: PhantomData<fn() -> P>,
}

impl<P> ParentRef<P> {
    #[inline]
    pub(crate) fn new(path: impl Into<String>, machine_id: Option<&str>) -> Self {
        Self {
            path: path.into(),
            machine_id: machine_id.map(str::to_owned),
            _parent: PhantomData,
        }
    }

    /// Field path of the parent (`""` for the root)
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Machine id of the parent, if it carries one
    #[inline]
    #[must_use]
    pub fn machine_id(&self) -> Option<&str> {
        self.machine_id.as_deref()
    }
}

impl<P> Clone for ParentRef<P> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            machine_id: self.machine_id.clone(),
            _parent: PhantomData,
        }
    }
}

impl<P> PartialEq for ParentRef<P> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.machine_id == other.machine_id
    }
}

impl<P> Eq for ParentRef<P> {}

impl<P> fmt::Debug for ParentRef<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentRef")
            .field("kind", &short_type_name::<P>())
            .field("path", &self.path)
            .field("machine_id", &self.machine_id)
            .finish()
    }
}

fn short_type_name<P>() -> &'static str {
    let full = std::any::type_name::<P>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Storage for a node's parent link and its own location.
///
/// Ignored by equality and hashing: two nodes with identical fields are equal
/// wherever they sit in a tree.
pub struct ParentSlot<P> {
    parent: Option<ParentRef<P>>,
    location: String,
}

impl<P> ParentSlot<P> {
    /// Current parent snapshot
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&ParentRef<P>> {
        self.parent.as_ref()
    }

    /// Own field path recorded at the last binding
    #[inline]
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[inline]
    pub(crate) fn bind(&mut self, parent: ParentRef<P>, location: String) {
        self.parent = Some(parent);
        self.location = location;
    }
}

impl<P> Default for ParentSlot<P> {
    fn default() -> Self {
        Self {
            parent: None,
            location: String::new(),
        }
    }
}

impl<P> Clone for ParentSlot<P> {
    fn clone(&self) -> Self {
        Self {
            parent: self.parent.clone(),
            location: self.location.clone(),
        }
    }
}

impl<P> PartialEq for ParentSlot<P> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<P> Eq for ParentSlot<P> {}

impl<P> Hash for ParentSlot<P> {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

impl<P> fmt::Debug for ParentSlot<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "ParentSlot({:?})", parent.path()),
            None => f.write_str("ParentSlot(unbound)"),
        }
    }
}

/// A node that knows its parent
pub trait Hierarchical {
    /// Type of the parent node
    type Parent;

    /// Parent snapshot, `None` for the root or a node never bound
    fn parent(&self) -> Option<&ParentRef<Self::Parent>>;

    /// Own field path recorded at the last binding
    fn location(&self) -> &str;

    /// Bind every descendant to its parent according to the current shape
    fn apply_parent_to_children(&mut self);
}

/// Crate-internal write access to the parent slot
pub(crate) trait Attach: Hierarchical {
    fn slot_mut(&mut self) -> &mut ParentSlot<Self::Parent>;
}

/// Join a field path and a segment
#[must_use]
pub(crate) fn child_path(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_owned()
    } else {
        format!("{base}.{segment}")
    }
}

/// Segment for a collection member
#[inline]
#[must_use]
pub(crate) fn indexed(field: &str, index: usize) -> String {
    format!("{field}[{index}]")
}

/// Bind `child` under `parent` at `segment`, then recurse into its children
pub(crate) fn adopt<C: Attach>(child: &mut C, parent: ParentRef<C::Parent>, segment: &str) {
    let location = child_path(parent.path(), segment);
    child.slot_mut().bind(parent, location);
    child.apply_parent_to_children();
}

/// Implement [`Hierarchical`] and [`Attach`] for a node without children
macro_rules! leaf_node {
    ($ty:ty, $parent:ty) => {
        impl $crate::hierarchy::Hierarchical for $ty {
            type Parent = $parent;

            fn parent(&self) -> Option<&$crate::hierarchy::ParentRef<$parent>> {
                self.parent.get()
            }

            fn location(&self) -> &str {
                self.parent.location()
            }

            fn apply_parent_to_children(&mut self) {}
        }

        impl $crate::hierarchy::Attach for $ty {
            fn slot_mut(&mut self) -> &mut $crate::hierarchy::ParentSlot<$parent> {
                &mut self.parent
            }
        }
    };
}

/// Implement [`Attach`] for a composite node
macro_rules! attach_slot {
    ($ty:ty, $parent:ty) => {
        impl $crate::hierarchy::Attach for $ty {
            fn slot_mut(&mut self) -> &mut $crate::hierarchy::ParentSlot<$parent> {
                &mut self.parent
            }
        }
    };
}

pub(crate) use attach_slot;
pub(crate) use leaf_node;

#[cfg(test)]
mod tests {
    use super::*;

    struct Root;

    #[test]
    fn child_path_joins_segments() {
        assert_eq!(child_path("", "services[0]"), "services[0]");
        assert_eq!(child_path("services[0]", "engine"), "services[0].engine");
        assert_eq!(indexed("hosts", 2), "hosts[2]");
    }

    #[test]
    fn slot_is_ignored_by_equality() {
        let mut a: ParentSlot<Root> = ParentSlot::default();
        let b: ParentSlot<Root> = ParentSlot::default();
        a.bind(ParentRef::new("services[0]", Some("svc-1")), "services[0].engine".into());
        assert_eq!(a, b);
        assert_eq!(a.location(), "services[0].engine");
        assert_eq!(a.get().and_then(ParentRef::machine_id), Some("svc-1"));
    }

    #[test]
    fn debug_shows_parent_kind() {
        let parent: ParentRef<Root> = ParentRef::new("x", None);
        let rendered = format!("{parent:?}");
        assert!(rendered.contains("Root"));
        assert!(rendered.contains("\"x\""));
    }
}
