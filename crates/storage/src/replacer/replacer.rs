use std::fmt::Debug;

use crate::typedef::FrameId;

/// Chooses which cached page the buffer pool gives up when it needs a frame.
pub trait Replacer: Send + Sync + Debug {
    /// Marks a frame as evictable: nobody outside the pool holds its page.
    fn unpin(&mut self, frame_id: FrameId);

    /// Marks a frame as not evictable.
    fn pin(&mut self, frame_id: FrameId);

    /// Records an access to the frame, starting to track it (pinned) if it is new.
    fn record_access(&mut self, frame_id: FrameId);

    /// Picks an evictable frame, stops tracking it and returns it. `None` if every tracked
    /// frame is pinned.
    fn evict(&mut self) -> Option<FrameId>;

    /// Returns the number of evictable frames.
    fn evictable_count(&self) -> usize;

    /// Stops tracking a frame, pinned or not.
    fn remove(&mut self, frame_id: FrameId);
}
