//! Selection detection, target stamping and revalidation.

use std::sync::atomic::{AtomicU64, Ordering};

use pagelens_config::ReplacementConfig;
use pagelens_protocols::{
    ElementKind, NodeId, PageError, PageInspector, PageMutator, SelectionContext, StaleSelection,
    TargetId,
};
use tracing::{debug, warn};

use super::editable::{
    contenteditable_host, control_is_editable, control_kind, element_kind, is_editable,
    is_password,
};
use super::text_map::TextMap;
use crate::util::slice_chars;

static NEXT_TARGET: AtomicU64 = AtomicU64::new(1);

/// Next process-unique target identifier.
fn allocate_target() -> TargetId {
    let n = NEXT_TARGET.fetch_add(1, Ordering::Relaxed);
    TargetId::new(format!("pl-target-{n}"))
}

/// Finds the user's selection and re-finds its element later.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    target_attribute: String,
}

impl SelectionTracker {
    pub fn new(config: &ReplacementConfig) -> Self {
        Self {
            target_attribute: config.target_attribute.clone(),
        }
    }

    pub fn target_attribute(&self) -> &str {
        &self.target_attribute
    }

    /// Current selection, checked in order: focused text input, focused
    /// textarea, live selection inside a content-editable region, any other
    /// non-blank live selection.
    ///
    /// Editable surfaces get a target stamp so the selection can be found
    /// again at replacement time.
    pub fn detect<P: PageMutator + ?Sized>(
        &self,
        page: &mut P,
    ) -> Result<Option<SelectionContext>, PageError> {
        if let Some(context) = self.detect_in_control(page)? {
            return Ok(Some(context));
        }

        let Some(live) = page.selection() else {
            return Ok(None);
        };
        if live.text.is_empty() {
            return Ok(None);
        }

        if let Some(range) = live.range.filter(|r| !r.is_collapsed()) {
            if let Some((host, editable)) = contenteditable_host(&*page, range.start.node) {
                let map = TextMap::build(&*page, host);
                let offsets = map
                    .offset_of(&*page, range.start)
                    .zip(map.offset_of(&*page, range.end));
                let target = if editable {
                    Some(self.stamp(page, host)?)
                } else {
                    None
                };
                debug!(editable, "Selection inside content-editable region");
                return Ok(Some(SelectionContext::new(
                    live.text,
                    ElementKind::ContentEditable,
                    editable,
                    offsets,
                    target,
                )));
            }
        }

        if live.text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(SelectionContext::plain(live.text)))
    }

    fn detect_in_control<P: PageMutator + ?Sized>(
        &self,
        page: &mut P,
    ) -> Result<Option<SelectionContext>, PageError> {
        let Some(active) = page.active_element() else {
            return Ok(None);
        };
        let Some(kind) = control_kind(&*page, active) else {
            return Ok(None);
        };
        if is_password(&*page, active) {
            debug!("Focused password input is never read");
            return Ok(None);
        }
        let Some((start, end)) = page.selection_range(active).filter(|(s, e)| s < e) else {
            return Ok(None);
        };

        let value = page.value(active).unwrap_or_default();
        let text = slice_chars(&value, start, end);
        let editable = control_is_editable(&*page, active);
        let target = if editable {
            Some(self.stamp(page, active)?)
        } else {
            None
        };
        debug!(kind = %kind, start, end, "Selection inside form control");
        Ok(Some(SelectionContext::new(
            text,
            kind,
            editable,
            Some((start, end)),
            target,
        )))
    }

    /// Selected text alone, read without stamping anything. Password
    /// inputs are skipped.
    pub fn selected_text<P: PageInspector + ?Sized>(&self, page: &P) -> Option<String> {
        let in_control = page.active_element().and_then(|active| {
            control_kind(page, active)?;
            if is_password(page, active) {
                return None;
            }
            let (start, end) = page.selection_range(active).filter(|(s, e)| s < e)?;
            Some(slice_chars(&page.value(active)?, start, end))
        });
        in_control.or_else(|| {
            page.selection()
                .map(|live| live.text)
                .filter(|text| !text.trim().is_empty())
        })
    }

    /// Stamp `node` with a target id, reusing an existing stamp.
    pub fn stamp<P: PageMutator + ?Sized>(
        &self,
        page: &mut P,
        node: NodeId,
    ) -> Result<TargetId, PageError> {
        if let Some(existing) = page.attribute(node, &self.target_attribute) {
            return Ok(TargetId::new(existing));
        }
        let id = allocate_target();
        page.set_attribute(node, &self.target_attribute, id.as_str())?;
        Ok(id)
    }

    /// Connected element carrying `id`.
    pub fn find_target<P: PageInspector + ?Sized>(&self, page: &P, id: &TargetId) -> Option<NodeId> {
        let selector = format!("[{}]", self.target_attribute);
        match page.query_all(&selector) {
            Ok(nodes) => nodes.into_iter().find(|node| {
                page.attribute(*node, &self.target_attribute).as_deref() == Some(id.as_str())
                    && page.is_connected(*node)
            }),
            Err(e) => {
                warn!(error = %e, "Target lookup failed");
                None
            }
        }
    }

    /// Remove every target stamp. Returns how many were removed.
    pub fn cleanup<P: PageMutator + ?Sized>(&self, page: &mut P) -> Result<usize, PageError> {
        let stamped = page.query_all(&format!("[{}]", self.target_attribute))?;
        for node in &stamped {
            page.remove_attribute(*node, &self.target_attribute)?;
        }
        debug!(count = stamped.len(), "Target stamps removed");
        Ok(stamped.len())
    }

    /// Check that `context` still describes a usable selection and return
    /// its element.
    pub fn validate<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        context: &SelectionContext,
    ) -> Result<NodeId, StaleSelection> {
        let element = self.resolve(page, context)?;
        match context.element_type {
            ElementKind::Input | ElementKind::Textarea => {
                let has_selection = page
                    .selection_range(element)
                    .is_some_and(|(start, end)| start < end);
                if !has_selection {
                    return Err(StaleSelection::SelectionCollapsed);
                }
            }
            ElementKind::ContentEditable => {
                let range = page
                    .selection()
                    .and_then(|live| live.range)
                    .filter(|r| !r.is_collapsed())
                    .ok_or(StaleSelection::SelectionCollapsed)?;
                if !page.contains(element, range.start.node) || !page.contains(element, range.end.node)
                {
                    return Err(StaleSelection::SelectionMoved);
                }
            }
            ElementKind::Other => return Err(StaleSelection::NotEditable),
        }
        Ok(element)
    }

    /// The target element, provided it still exists, is of the captured
    /// kind, and is editable.
    pub fn resolve<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        context: &SelectionContext,
    ) -> Result<NodeId, StaleSelection> {
        let id = context
            .target_element_id
            .as_ref()
            .ok_or(StaleSelection::MissingTargetId)?;
        let element = self
            .find_target(page, id)
            .ok_or_else(|| StaleSelection::TargetGone(id.to_string()))?;

        let found = element_kind(page, element);
        if found != context.element_type {
            return Err(StaleSelection::KindMismatch {
                expected: context.element_type.to_string(),
                found: page.tag_name(element).unwrap_or_default(),
            });
        }
        if !is_editable(page, element, found) {
            return Err(StaleSelection::NotEditable);
        }
        Ok(element)
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
