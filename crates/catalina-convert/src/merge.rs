//! Identity-based merge of a desired collection into same-tag siblings
//!
//! Classification is recomputed from scratch on every call:
//!
//! 1. **matched**: an owned element whose key equals a desired key; each
//!    desired item claims the first unclaimed such element in document order
//! 2. **orphaned**: an owned element nobody claimed, surplus duplicates
//!    included; removed
//! 3. **new**: a desired item with no element; appended, then populated
//!
//! Elements that are not owned are counted as foreign and never touched.
//! Orphans are removed before anything else so that a rename into another
//! item's old key cannot be ambiguous.

use crate::converters::ConvertContext;
use crate::error::{ConvertError, ConvertResult};
use catalina_xml::Element;
use std::ops::AddAssign;

/// Element counts touched by a write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Existing elements updated in place
    pub updated: usize,
    /// Elements inserted
    pub created: usize,
    /// Elements removed
    pub removed: usize,
    /// Same-tag elements left alone because the engine does not own them
    pub foreign: usize,
}

impl MergeOutcome {
    #[must_use]
    pub fn updated() -> Self {
        Self {
            updated: 1,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn created() -> Self {
        Self {
            created: 1,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn removed() -> Self {
        Self {
            removed: 1,
            ..Self::default()
        }
    }

    /// True when no element was inserted or removed
    #[inline]
    #[must_use]
    pub fn is_structurally_stable(&self) -> bool {
        self.created == 0 && self.removed == 0
    }
}

impl AddAssign for MergeOutcome {
    fn add_assign(&mut self, rhs: Self) {
        self.updated += rhs.updated;
        self.created += rhs.created;
        self.removed += rhs.removed;
        self.foreign += rhs.foreign;
    }
}

impl std::ops::Add for MergeOutcome {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

/// Type-specific half of a merge
pub trait MergeTarget {
    /// Desired item type
    type Item;

    /// Tag of the sibling elements being merged
    fn tag(&self) -> &'static str;

    /// Identity key of a desired item
    fn item_key(&self, item: &Self::Item) -> String;

    /// Identity key of an element, placeholders resolved
    fn element_key(&self, element: &Element, cx: &ConvertContext<'_>) -> String;

    /// Whether the engine manages this element
    fn is_owned(&self, element: &Element, cx: &ConvertContext<'_>) -> bool;

    /// Fresh element for a new item, before it is populated
    fn create(&self, item: &Self::Item, cx: &ConvertContext<'_>) -> Element;

    /// Populate or update an element from an item
    ///
    /// # Errors
    /// Propagates converter errors of nested structures.
    fn update(
        &self,
        element: &mut Element,
        item: &Self::Item,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome>;
}

struct Existing {
    index: usize,
    key: String,
    owned: bool,
    claimed: bool,
}

/// Reconcile the `target.tag()` children of `parent` with `desired`
///
/// # Errors
/// Propagates errors from [`MergeTarget::update`].
pub fn merge<T: MergeTarget>(
    target: &T,
    parent: &mut Element,
    desired: &[T::Item],
    cx: &ConvertContext<'_>,
) -> ConvertResult<MergeOutcome> {
    let tag = target.tag();
    let mut existing: Vec<Existing> = parent
        .indexed_elements(tag)
        .map(|(index, element)| Existing {
            index,
            key: target.element_key(element, cx),
            owned: target.is_owned(element, cx),
            claimed: false,
        })
        .collect();

    let mut outcome = MergeOutcome {
        foreign: existing.iter().filter(|e| !e.owned).count(),
        ..MergeOutcome::default()
    };

    let mut matches: Vec<Option<usize>> = Vec::with_capacity(desired.len());
    for item in desired {
        let key = target.item_key(item);
        let slot = existing
            .iter_mut()
            .find(|e| e.owned && !e.claimed && e.key == key)
            .map(|e| {
                e.claimed = true;
                e.index
            });
        matches.push(slot);
    }

    let mut orphans: Vec<&Existing> = existing.iter().filter(|e| e.owned && !e.claimed).collect();
    tracing::debug!(
        tag,
        matched = matches.iter().flatten().count(),
        orphaned = orphans.len(),
        new = matches.iter().filter(|m| m.is_none()).count(),
        foreign = outcome.foreign,
        "merge classified"
    );

    orphans.sort_by(|a, b| b.index.cmp(&a.index));
    for orphan in orphans {
        let detached = parent
            .detach_element(orphan.index)
            .ok_or_else(|| ConvertError::missing_element(tag, parent.name()))?;
        tracing::debug!(tag, key = %orphan.key, "removed orphaned element");
        let shift = detached.span.len();
        for index in matches.iter_mut().flatten() {
            if *index > detached.span.start {
                *index -= shift;
            }
        }
        outcome.removed += 1;
    }

    for (item, slot) in desired.iter().zip(&matches) {
        if let Some(index) = *slot {
            let parent_name = parent.name().to_owned();
            let element = parent
                .element_at_mut(index)
                .ok_or_else(|| ConvertError::missing_element(tag, &parent_name))?;
            outcome += target.update(element, item, cx)?;
            outcome.updated += 1;
        }
    }

    for (item, slot) in desired.iter().zip(&matches) {
        if slot.is_none() {
            let index = parent.append_element(target.create(item, cx));
            let parent_name = parent.name().to_owned();
            let element = parent
                .element_at_mut(index)
                .ok_or_else(|| ConvertError::missing_element(tag, &parent_name))?;
            outcome += target.update(element, item, cx)?;
            outcome.created += 1;
            tracing::debug!(tag, key = %target.item_key(item), "created element");
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReconcileOptions;
    use crate::properties::Properties;
    use catalina_xml::Document;
    use pretty_assertions::assert_eq;

    /// `<Item key=".." value=".."/>`, owned unless `foreign="true"`
    struct Items;

    impl MergeTarget for Items {
        type Item = (&'static str, &'static str);

        fn tag(&self) -> &'static str {
            "Item"
        }

        fn item_key(&self, item: &Self::Item) -> String {
            item.0.to_owned()
        }

        fn element_key(&self, element: &Element, cx: &ConvertContext<'_>) -> String {
            cx.properties
                .resolve(element.attribute("key").unwrap_or_default())
                .to_owned()
        }

        fn is_owned(&self, element: &Element, _cx: &ConvertContext<'_>) -> bool {
            element.attribute("foreign") != Some("true")
        }

        fn create(&self, item: &Self::Item, _cx: &ConvertContext<'_>) -> Element {
            Element::new("Item").with_attribute("key", item.0)
        }

        fn update(
            &self,
            element: &mut Element,
            item: &Self::Item,
            _cx: &ConvertContext<'_>,
        ) -> ConvertResult<MergeOutcome> {
            element.set_attribute("value", item.1);
            Ok(MergeOutcome::default())
        }
    }

    fn run(input: &str, desired: &[(&'static str, &'static str)]) -> (String, MergeOutcome) {
        let properties = Properties::new().with("k", "b");
        let options = ReconcileOptions::default();
        let cx = ConvertContext::new(&properties, &options);
        let mut doc = Document::parse(input).unwrap();
        let outcome = merge(&Items, doc.root_mut(), desired, &cx).unwrap();
        (doc.to_xml_string().unwrap(), outcome)
    }

    #[test]
    fn update_remove_and_create() {
        let input = "<r>\n  <Item key=\"a\"/>\n  <Other/>\n  <Item key=\"x\"/>\n</r>";
        let (out, outcome) = run(input, &[("a", "1"), ("c", "3")]);
        assert_eq!(
            out,
            "<r>\n  <Item key=\"a\" value=\"1\"/>\n  <Other/>\n  <Item key=\"c\" value=\"3\"/>\n</r>"
        );
        assert_eq!(
            outcome,
            MergeOutcome {
                updated: 1,
                created: 1,
                removed: 1,
                foreign: 0
            }
        );
    }

    #[test]
    fn foreign_elements_survive() {
        let input = "<r>\n  <Item key=\"a\" foreign=\"true\"/>\n  <Item key=\"b\"/>\n</r>";
        let (out, outcome) = run(input, &[]);
        assert_eq!(out, "<r>\n  <Item key=\"a\" foreign=\"true\"/>\n</r>");
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.foreign, 1);
    }

    #[test]
    fn surplus_duplicates_are_orphaned() {
        let input = "<r>\n  <Item key=\"a\"/>\n  <Item key=\"a\"/>\n</r>";
        let (out, outcome) = run(input, &[("a", "1")]);
        assert_eq!(out, "<r>\n  <Item key=\"a\" value=\"1\"/>\n</r>");
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.updated, 1);
    }

    #[test]
    fn keys_resolve_placeholders() {
        let input = "<r>\n  <Item key=\"${k}\"/>\n</r>";
        let (out, outcome) = run(input, &[("b", "2")]);
        assert_eq!(out, "<r>\n  <Item key=\"${k}\" value=\"2\"/>\n</r>");
        assert!(outcome.is_structurally_stable());
    }

    #[test]
    fn removal_before_update_keeps_indices_valid() {
        let input = "<r>\n  <Item key=\"x\"/>\n  <Item key=\"y\"/>\n  <Item key=\"a\"/>\n</r>";
        let (out, _) = run(input, &[("a", "1")]);
        assert_eq!(out, "<r>\n  <Item key=\"a\" value=\"1\"/>\n</r>");
    }
}
