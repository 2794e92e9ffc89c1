//! Flat char offsets over the text nodes of a subtree.

use pagelens_protocols::{BoundaryPoint, NodeId, PageInspector};

use crate::util::char_len;

#[derive(Debug, Clone, Copy)]
struct Segment {
    node: NodeId,
    start: usize,
    len: usize,
}

/// The text of a subtree laid end to end, with the mapping back to text
/// node positions.
#[derive(Debug, Clone)]
pub struct TextMap {
    text: String,
    segments: Vec<Segment>,
    /// Subtree nodes in document order, root first.
    order: Vec<NodeId>,
    /// `before[i]`: chars contributed by `order[..i]`.
    before: Vec<usize>,
}

impl TextMap {
    pub fn build<P: PageInspector + ?Sized>(page: &P, root: NodeId) -> Self {
        let mut text = String::new();
        let mut segments = Vec::new();
        let mut order = Vec::new();
        let mut before = vec![0];
        let mut total = 0;

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(data) = page.text_data(id) {
                let len = char_len(&data);
                segments.push(Segment {
                    node: id,
                    start: total,
                    len,
                });
                text.push_str(&data);
                total += len;
            } else {
                stack.extend(page.children(id).into_iter().rev());
            }
            before.push(total);
        }

        Self {
            text,
            segments,
            order,
            before,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.segments.last().map_or(0, |s| s.start + s.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat offset of a boundary point inside the subtree.
    pub fn offset_of<P: PageInspector + ?Sized>(
        &self,
        page: &P,
        point: BoundaryPoint,
    ) -> Option<usize> {
        if let Some(segment) = self.segments.iter().find(|s| s.node == point.node) {
            return (point.offset <= segment.len).then_some(segment.start + point.offset);
        }

        let idx = self.order.iter().position(|id| *id == point.node)?;
        let children = page.children(point.node);
        match children.get(point.offset) {
            Some(child) => {
                let child_idx = self.order.iter().position(|id| id == child)?;
                Some(self.before[child_idx])
            }
            // Past the last child: everything up to the end of the subtree.
            None if point.offset == children.len() => {
                let end = self.order[idx + 1..]
                    .iter()
                    .position(|id| !page.contains(point.node, *id))
                    .map_or(self.order.len(), |p| idx + 1 + p);
                Some(self.before[end])
            }
            None => None,
        }
    }

    /// Text position of flat offset `offset`. At a boundary between two
    /// text nodes a start point lands in the later node and an end point in
    /// the earlier one.
    pub fn point_at(&self, offset: usize, is_end: bool) -> Option<BoundaryPoint> {
        let hit = |s: &&Segment| {
            if is_end {
                s.start < offset && offset <= s.start + s.len
            } else {
                s.start <= offset && offset < s.start + s.len
            }
        };
        let segment = self
            .segments
            .iter()
            .find(hit)
            .or_else(|| {
                // Empty nodes and the very ends of the text.
                self.segments
                    .iter()
                    .find(|s| s.start <= offset && offset <= s.start + s.len)
            })?;
        Some(BoundaryPoint::new(segment.node, offset - segment.start))
    }
}
