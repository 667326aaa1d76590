use crate::typedef::FrameId;
use std::collections::HashMap;

use super::replacer::Replacer;

#[derive(Debug)]
struct LruNode {
    is_evictable: bool,
    last_accessed_timestamp: u64,
}

#[derive(Debug, Default)]
pub struct LruReplacer {
    node_store: HashMap<FrameId, LruNode>,
    evictable_count: usize, // Tracks evictable nodes
    current_timestamp: u64,
}

impl LruReplacer {
    pub fn new() -> Self {
        Self::default()
    }

    fn advance_timestamp(&mut self) -> u64 {
        let old_timestamp = self.current_timestamp;
        self.current_timestamp += 1;
        old_timestamp
    }

    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) {
        if let Some(node) = self.node_store.get_mut(&frame_id) {
            match (node.is_evictable, evictable) {
                (false, true) => self.evictable_count += 1,
                (true, false) => self.evictable_count -= 1,
                _ => {}
            }
            node.is_evictable = evictable;
        }
    }
}

impl Replacer for LruReplacer {
    /// Evicts the least recently used evictable frame.
    fn evict(&mut self) -> Option<FrameId> {
        let victim = self
            .node_store
            .iter()
            .filter(|(_, node)| node.is_evictable)
            .min_by_key(|(_, node)| node.last_accessed_timestamp)
            .map(|(frame_id, _)| *frame_id)?;
        self.node_store.remove(&victim);
        self.evictable_count -= 1;
        Some(victim)
    }

    fn pin(&mut self, frame_id: FrameId) {
        self.set_evictable(frame_id, false);
    }

    fn unpin(&mut self, frame_id: FrameId) {
        self.set_evictable(frame_id, true);
    }

    fn record_access(&mut self, frame_id: FrameId) {
        let timestamp = self.advance_timestamp();
        self.node_store
            .entry(frame_id)
            .and_modify(|node| node.last_accessed_timestamp = timestamp)
            .or_insert(LruNode {
                is_evictable: false,
                last_accessed_timestamp: timestamp,
            });
    }

    fn remove(&mut self, frame_id: FrameId) {
        if let Some(node) = self.node_store.remove(&frame_id) {
            if node.is_evictable {
                self.evictable_count -= 1;
            }
        }
    }

    fn evictable_count(&self) -> usize {
        self.evictable_count
    }
}

#[cfg(test)]
mod tests {
    use super::LruReplacer;
    use crate::replacer::replacer::Replacer;

    #[test]
    fn test_evicts_least_recently_used() {
        let mut replacer = LruReplacer::new();
        for frame_id in 0..4 {
            replacer.record_access(frame_id);
            replacer.unpin(frame_id);
        }
        // Touch frame 0 again so frame 1 becomes the oldest.
        replacer.record_access(0);
        assert_eq!(replacer.evictable_count(), 4);

        assert_eq!(replacer.evict(), Some(1));
        assert_eq!(replacer.evict(), Some(2));
        assert_eq!(replacer.evict(), Some(3));
        assert_eq!(replacer.evict(), Some(0));
        assert_eq!(replacer.evict(), None);
        assert_eq!(replacer.evictable_count(), 0);
    }

    #[test]
    fn test_pinned_frames_are_skipped() {
        let mut replacer = LruReplacer::new();
        replacer.record_access(0);
        replacer.record_access(1);
        // New frames start pinned.
        assert_eq!(replacer.evictable_count(), 0);
        assert_eq!(replacer.evict(), None);

        replacer.unpin(1);
        replacer.unpin(1);
        assert_eq!(replacer.evictable_count(), 1);
        assert_eq!(replacer.evict(), Some(1));

        replacer.unpin(0);
        replacer.pin(0);
        assert_eq!(replacer.evict(), None);
    }

    #[test]
    fn test_remove() {
        let mut replacer = LruReplacer::new();
        replacer.record_access(0);
        replacer.unpin(0);
        replacer.record_access(1);

        replacer.remove(0);
        replacer.remove(1);
        replacer.remove(7);
        assert_eq!(replacer.evictable_count(), 0);
        assert_eq!(replacer.evict(), None);
    }
}
