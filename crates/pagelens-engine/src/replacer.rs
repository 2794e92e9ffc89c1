//! In-place replacement of a captured selection, with a clipboard fallback.

use pagelens_protocols::{
    BoundaryPoint, Clipboard, DomEvent, DomRange, ElementKind, NodeId, PageError, PageInspector,
    PageMutator, ReplaceError, SelectionContext, StaleSelection, TextReplacementResult,
};
use tracing::{debug, info, warn};

use crate::selection::{SelectionTracker, TextMap};
use crate::util::{char_len, find_chars, slice_chars};

const EDIT_EVENTS: [DomEvent; 3] = [DomEvent::Input, DomEvent::Change, DomEvent::KeyUp];

/// Off-screen styling for the legacy copy buffer.
const COPY_BUFFER_STYLE: &str = "position:fixed;top:0;left:-9999px;opacity:0";

/// Writes new text over a previously captured selection.
///
/// Every attempt ends in exactly one result: the text was written in place,
/// or nothing was mutated and the text went to the clipboard instead.
#[derive(Debug, Clone)]
pub struct TextReplacer {
    tracker: SelectionTracker,
}

impl TextReplacer {
    pub fn new(tracker: SelectionTracker) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    pub fn replace<P, C>(
        &self,
        page: &mut P,
        clipboard: &mut C,
        context: &SelectionContext,
        new_text: &str,
    ) -> TextReplacementResult
    where
        P: PageMutator + ?Sized,
        C: Clipboard + ?Sized,
    {
        match self.try_replace(page, context, new_text) {
            Ok(()) => {
                info!(kind = %context.element_type, chars = char_len(new_text), "Selection replaced");
                TextReplacementResult::replaced()
            }
            Err(err) => {
                warn!(error = %err, "Replacement not possible, copying to clipboard");
                let copied = copy_to_clipboard(page, clipboard, new_text);
                TextReplacementResult::fallback(err.to_string(), copied)
            }
        }
    }

    /// Skip replacement entirely and hand `new_text` to the clipboard.
    pub fn copy_instead<P, C>(
        &self,
        page: &mut P,
        clipboard: &mut C,
        reason: &str,
        new_text: &str,
    ) -> TextReplacementResult
    where
        P: PageMutator + ?Sized,
        C: Clipboard + ?Sized,
    {
        warn!(reason, "Copying to clipboard without replacing");
        let copied = copy_to_clipboard(page, clipboard, new_text);
        TextReplacementResult::fallback(reason, copied)
    }

    fn try_replace<P: PageMutator + ?Sized>(
        &self,
        page: &mut P,
        context: &SelectionContext,
        new_text: &str,
    ) -> Result<(), ReplaceError> {
        match context.element_type {
            ElementKind::Input | ElementKind::Textarea => {
                self.replace_in_control(page, context, new_text)
            }
            ElementKind::ContentEditable => self.replace_in_editable(page, context, new_text),
            ElementKind::Other => Err(ReplaceError::Unsupported(
                context.element_type.to_string(),
            )),
        }
    }

    fn replace_in_control<P: PageMutator + ?Sized>(
        &self,
        page: &mut P,
        context: &SelectionContext,
        new_text: &str,
    ) -> Result<(), ReplaceError> {
        let element = self.tracker.resolve(&*page, context)?;
        let value = page.value(element).unwrap_or_default();
        let (start, end) = locate_in_control(&*page, element, &value, context)?;

        let mut spliced = slice_chars(&value, 0, start);
        spliced.push_str(new_text);
        spliced.push_str(&slice_chars(&value, end, char_len(&value)));

        let caret = start + char_len(new_text);
        page.focus(element)?;
        page.set_value(element, &spliced)?;
        page.set_selection_range(element, caret, caret)?;
        dispatch_edit_events(page, element)?;
        debug!(start, end, caret, "Spliced control value");
        Ok(())
    }

    fn replace_in_editable<P: PageMutator + ?Sized>(
        &self,
        page: &mut P,
        context: &SelectionContext,
        new_text: &str,
    ) -> Result<(), ReplaceError> {
        let host = self.tracker.resolve(&*page, context)?;
        let map = TextMap::build(&*page, host);
        let range = match live_range_within(&*page, host) {
            Some(range) => anchor_in_text(&*page, &map, range)?,
            None => relocate(&map, context)?,
        };
        let start = map
            .offset_of(&*page, range.start)
            .ok_or(StaleSelection::TextNotFound)?;

        let inserted = page.replace_range(&range, new_text)?;
        page.normalize(host)?;

        let rebuilt = TextMap::build(&*page, host);
        let caret = rebuilt
            .point_at(start + char_len(new_text), true)
            .or_else(|| rebuilt.point_at(start, false))
            .unwrap_or(BoundaryPoint::new(host, page.children(host).len()));
        page.set_selection(Some(DomRange::collapsed(caret)))?;
        dispatch_edit_events(page, host)?;
        debug!(?inserted, start, "Replaced content-editable range");
        Ok(())
    }
}

/// Char range of the captured text inside a control's current value.
fn locate_in_control<P: PageInspector + ?Sized>(
    page: &P,
    element: NodeId,
    value: &str,
    context: &SelectionContext,
) -> Result<(usize, usize), StaleSelection> {
    let denotes = |(start, end): (usize, usize)| {
        start < end && slice_chars(value, start, end) == context.selected_text
    };
    if let Some(range) = context.captured_range().filter(|r| denotes(*r)) {
        return Ok(range);
    }
    match page.selection_range(element) {
        Some(range) if denotes(range) => Ok(range),
        Some((start, end)) if start < end => Err(StaleSelection::TextNotFound),
        _ => Err(StaleSelection::SelectionCollapsed),
    }
}

/// Live selection, if it is non-collapsed and entirely inside `host`.
fn live_range_within<P: PageInspector + ?Sized>(page: &P, host: NodeId) -> Option<DomRange> {
    page.selection()
        .and_then(|live| live.range)
        .filter(|range| !range.is_collapsed())
        .filter(|range| page.contains(host, range.start.node) && page.contains(host, range.end.node))
}

/// Re-anchor both ends of `range` in text nodes. Select-all and
/// triple-click ranges sit on element boundaries.
fn anchor_in_text<P: PageInspector + ?Sized>(
    page: &P,
    map: &TextMap,
    range: DomRange,
) -> Result<DomRange, StaleSelection> {
    let start = map.offset_of(page, range.start).ok_or(StaleSelection::TextNotFound)?;
    let end = map.offset_of(page, range.end).ok_or(StaleSelection::TextNotFound)?;
    if start >= end {
        return Ok(range);
    }
    map.point_at(start, false)
        .zip(map.point_at(end, true))
        .map(|(s, e)| DomRange::new(s, e))
        .ok_or(StaleSelection::TextNotFound)
}

/// Find the captured text again: captured offsets, then an exact search,
/// then a search for the trimmed text.
fn relocate(map: &TextMap, context: &SelectionContext) -> Result<DomRange, StaleSelection> {
    let wanted = context.selected_text.as_str();
    if wanted.is_empty() {
        return Err(StaleSelection::SelectionCollapsed);
    }
    let text = map.text();

    let at_captured = context
        .captured_range()
        .filter(|(start, end)| slice_chars(text, *start, *end) == wanted);
    let (start, end) = at_captured
        .or_else(|| find_chars(text, wanted).map(|pos| (pos, pos + char_len(wanted))))
        .or_else(|| {
            let trimmed = wanted.trim();
            if trimmed.is_empty() {
                return None;
            }
            find_chars(text, trimmed).map(|pos| (pos, pos + char_len(trimmed)))
        })
        .ok_or(StaleSelection::TextNotFound)?;

    let range = map
        .point_at(start, false)
        .zip(map.point_at(end, true))
        .map(|(s, e)| DomRange::new(s, e))
        .ok_or(StaleSelection::TextNotFound)?;
    debug!(start, end, "Relocated selection by text");
    Ok(range)
}

fn dispatch_edit_events<P: PageMutator + ?Sized>(
    page: &mut P,
    node: NodeId,
) -> Result<(), PageError> {
    for event in EDIT_EVENTS {
        page.dispatch_event(node, event)?;
    }
    Ok(())
}

/// Modern clipboard first, then the copy command over a hidden textarea.
fn copy_to_clipboard<P, C>(page: &mut P, clipboard: &mut C, text: &str) -> bool
where
    P: PageMutator + ?Sized,
    C: Clipboard + ?Sized,
{
    match clipboard.write_text(text) {
        Ok(()) => return true,
        Err(e) => debug!(error = %e, "Clipboard write refused, trying copy command"),
    }
    match legacy_copy(page, text) {
        Ok(copied) => copied,
        Err(e) => {
            warn!(error = %e, "Copy command failed");
            false
        }
    }
}

fn legacy_copy<P: PageMutator + ?Sized>(page: &mut P, text: &str) -> Result<bool, PageError> {
    let body = page
        .body()
        .ok_or_else(|| PageError::OperationFailed("document has no body".to_string()))?;
    let previous_focus = page.active_element();
    let previous_selection = page.selection().and_then(|live| live.range);

    let buffer = page.create_element("textarea");
    page.set_attribute(buffer, "style", COPY_BUFFER_STYLE)?;
    page.set_attribute(buffer, "readonly", "")?;
    page.set_value(buffer, text)?;
    page.append_child(body, buffer)?;

    let copied = select_and_copy(page, buffer, char_len(text));
    page.remove_node(buffer)?;

    if let Some(node) = previous_focus.filter(|n| page.is_connected(*n)) {
        page.focus(node)?;
    }
    if let Some(range) = previous_selection {
        if page.is_connected(range.start.node) && page.is_connected(range.end.node) {
            page.set_selection(Some(range))?;
        }
    }
    copied
}

fn select_and_copy<P: PageMutator + ?Sized>(
    page: &mut P,
    buffer: NodeId,
    len: usize,
) -> Result<bool, PageError> {
    page.focus(buffer)?;
    page.set_selection_range(buffer, 0, len)?;
    page.exec_copy()
}

#[cfg(test)]
#[path = "replacer_tests.rs"]
mod tests;
