//! Latest-frame mailbox

use std::sync::Arc;

use parking_lot::Mutex;

use crate::analysis::SpectrumFrame;

/// Single shared slot holding the most recent [`SpectrumFrame`]
///
/// The lock only ever guards an `Arc` swap or clone. Frames are built
/// before `publish` and the replaced frame is dropped after the lock is
/// released.
#[derive(Debug, Default)]
pub struct SpectrumSlot {
    frame: Mutex<Arc<SpectrumFrame>>,
}

impl SpectrumSlot {
    pub fn new(initial: SpectrumFrame) -> Self {
        Self {
            frame: Mutex::new(Arc::new(initial)),
        }
    }

    /// Replace the current frame
    pub fn publish(&self, frame: SpectrumFrame) {
        let frame = Arc::new(frame);
        let previous = std::mem::replace(&mut *self.frame.lock(), frame);
        drop(previous);
    }

    /// Latest published frame; may be one tick stale
    pub fn snapshot(&self) -> Arc<SpectrumFrame> {
        Arc::clone(&self.frame.lock())
    }
}
