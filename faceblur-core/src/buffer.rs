//! Temporal smoothing of detections.
//!
//! Detectors miss a face for a frame or two now and then. The pipeline blurs
//! the union of the boxes found in the last [`BUFFER_CAPACITY`] frames, which
//! hides those gaps.

use crate::detection::DetectionBox;
use std::collections::VecDeque;

/// Number of frames whose detections are kept.
pub const BUFFER_CAPACITY: usize = 3;

/// Fixed-capacity FIFO of per-frame detection sets.
#[derive(Debug, Clone, Default)]
pub struct TemporalBoxBuffer {
    frames: VecDeque<Vec<DetectionBox>>,
}

impl TemporalBoxBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: VecDeque::with_capacity(BUFFER_CAPACITY + 1),
        }
    }

    /// Records the boxes of the current frame, evicting the oldest frame
    /// once more than [`BUFFER_CAPACITY`] are held.
    pub fn push(&mut self, boxes: Vec<DetectionBox>) {
        self.frames.push_back(boxes);
        while self.frames.len() > BUFFER_CAPACITY {
            self.frames.pop_front();
        }
    }

    /// Boxes from every buffered frame.
    pub fn all_boxes(&self) -> impl Iterator<Item = &DetectionBox> {
        self.frames.iter().flatten()
    }

    /// Number of buffered frames (not boxes).
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(tag: i32) -> Vec<DetectionBox> {
        vec![DetectionBox {
            x1: tag,
            y1: 0,
            x2: tag + 10,
            y2: 10,
            class_id: 0,
            confidence: 0.9,
        }]
    }

    #[test]
    fn test_fifo_eviction() {
        let mut buffer = TemporalBoxBuffer::new();
        for tag in 0..4 {
            buffer.push(tagged(tag));
        }
        assert_eq!(buffer.len(), 3);
        let mut tags: Vec<i32> = buffer.all_boxes().map(|b| b.x1).collect();
        tags.sort_unstable();
        assert_eq!(tags, vec![1, 2, 3]);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buffer = TemporalBoxBuffer::new();
        assert!(buffer.is_empty());
        for tag in 0..50 {
            buffer.push(if tag % 2 == 0 { tagged(tag) } else { Vec::new() });
            assert!(buffer.len() <= BUFFER_CAPACITY);
        }
    }

    #[test]
    fn test_empty_frames_still_occupy_a_slot() {
        let mut buffer = TemporalBoxBuffer::new();
        buffer.push(tagged(7));
        buffer.push(Vec::new());
        buffer.push(Vec::new());
        assert_eq!(buffer.all_boxes().count(), 1);
        buffer.push(Vec::new());
        assert_eq!(buffer.all_boxes().count(), 0);
    }
}
