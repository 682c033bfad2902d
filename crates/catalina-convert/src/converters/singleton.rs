//! Optional singleton children matched by `className`

use super::names::CLASS_NAME;
use crate::error::{ConvertError, ConvertResult};
use crate::merge::MergeOutcome;
use catalina_xml::Element;

/// Where a newly created singleton goes
#[derive(Debug, Clone, Copy)]
pub(crate) enum Placement {
    /// After the last sibling with this tag, else before the first `anchor`,
    /// else at the end
    AfterLast { tag: &'static str, anchor: &'static str },
    /// At the end of the parent
    Append,
}

impl Placement {
    /// Insert `element` into `parent`, returning its child index
    pub(crate) fn insert(self, parent: &mut Element, element: Element) -> usize {
        match self {
            Self::AfterLast { tag, anchor } => {
                if let Some(last) = parent.element_indices(tag).last().copied() {
                    parent.insert_element_after(last, element)
                } else if let Some(before) = parent.first_child_index(anchor) {
                    parent.insert_element_before(before, element)
                } else {
                    parent.append_element(element)
                }
            }
            Self::Append => parent.append_element(element),
        }
    }
}

/// Child index of the first `tag` element whose `className` is `class`
pub(crate) fn find_by_class(parent: &Element, tag: &str, class: &str) -> Option<usize> {
    parent
        .indexed_elements(tag)
        .find(|(_, el)| el.attribute(CLASS_NAME) == Some(class))
        .map(|(index, _)| index)
}

/// Element matched by [`find_by_class`]
pub(crate) fn element_by_class<'a>(parent: &'a Element, tag: &str, class: &str) -> Option<&'a Element> {
    find_by_class(parent, tag, class).and_then(|index| parent.element_at(index))
}

/// Create, update or remove a singleton so that its presence equals `enabled`
pub(crate) fn sync_singleton<F>(
    parent: &mut Element,
    tag: &'static str,
    class: &'static str,
    enabled: bool,
    placement: Placement,
    populate: F,
) -> ConvertResult<MergeOutcome>
where
    F: FnOnce(&mut Element) -> ConvertResult<()>,
{
    let found = find_by_class(parent, tag, class);
    let (index, outcome) = match (enabled, found) {
        (false, None) => return Ok(MergeOutcome::default()),
        (false, Some(index)) => {
            parent.detach_element(index);
            tracing::debug!(tag, class, "removed disabled singleton");
            return Ok(MergeOutcome::removed());
        }
        (true, Some(index)) => (index, MergeOutcome::updated()),
        (true, None) => {
            let element = Element::new(tag).with_attribute(CLASS_NAME, class);
            let index = placement.insert(parent, element);
            tracing::debug!(tag, class, "created singleton");
            (index, MergeOutcome::created())
        }
    };
    let parent_name = parent.name().to_owned();
    let element = parent
        .element_at_mut(index)
        .ok_or_else(|| ConvertError::missing_element(tag, &parent_name))?;
    populate(element)?;
    Ok(outcome)
}
