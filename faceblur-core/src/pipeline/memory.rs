//! In-memory frame streams.
//!
//! Let the pipeline run without the media tool: frames come from a `Vec`
//! and processed frames are collected into one.

use super::{Frame, FrameSink, FrameSource};
use crate::error::{CoreError, CoreResult};
use crate::external::StreamInfo;
use std::collections::VecDeque;

/// Frame source backed by a list of frames.
#[derive(Debug, Clone)]
pub struct MemoryFrameSource {
    info: StreamInfo,
    frames: VecDeque<Frame>,
    closed: bool,
}

impl MemoryFrameSource {
    /// Source whose stream info is derived from the first frame.
    #[must_use]
    pub fn new(frames: Vec<Frame>, fps: f64) -> Self {
        let (width, height) = frames.first().map_or((0, 0), |f| f.dimensions());
        let info = Self::info_for(width, height, fps, frames.len() as u64);
        Self::with_info(frames, info)
    }

    #[must_use]
    pub fn with_info(frames: Vec<Frame>, info: StreamInfo) -> Self {
        Self {
            info,
            frames: frames.into(),
            closed: false,
        }
    }

    /// Stream info for a silent video of `frame_count` frames.
    #[must_use]
    pub fn info_for(width: u32, height: u32, fps: f64, frame_count: u64) -> StreamInfo {
        StreamInfo {
            width,
            height,
            fps,
            frame_count: Some(frame_count),
            duration_secs: (fps > 0.0).then(|| frame_count as f64 / fps),
            has_audio: false,
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FrameSource for MemoryFrameSource {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn next_frame(&mut self) -> CoreResult<Option<Frame>> {
        if self.closed {
            return Err(CoreError::FrameDecode("read from a closed source".to_string()));
        }
        Ok(self.frames.pop_front())
    }

    fn close(&mut self) -> CoreResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// Frame sink collecting every written frame.
#[derive(Debug, Clone, Default)]
pub struct MemoryFrameSink {
    frames: Vec<Frame>,
    finished: bool,
}

impl MemoryFrameSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for MemoryFrameSink {
    fn write_frame(&mut self, frame: &Frame) -> CoreResult<()> {
        if self.finished {
            return Err(CoreError::InvalidState("write after finish".to_string()));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> CoreResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_yields_frames_in_order() {
        let frames: Vec<Frame> = (0..3u8).map(|v| Frame::from_pixel(4, 2, image::Rgb([v, v, v]))).collect();
        let mut source = MemoryFrameSource::new(frames, 30.0);
        assert_eq!(source.info().width, 4);
        assert_eq!(source.info().height, 2);
        assert_eq!(source.info().frame_count, Some(3));

        for expected in 0..3u8 {
            let frame = source.next_frame().unwrap().unwrap();
            assert_eq!(frame.get_pixel(0, 0)[0], expected);
        }
        assert!(source.next_frame().unwrap().is_none());

        source.close().unwrap();
        assert!(source.is_closed());
        assert!(source.next_frame().is_err());
    }

    #[test]
    fn test_sink_rejects_writes_after_finish() {
        let mut sink = MemoryFrameSink::new();
        let frame = Frame::new(2, 2);
        sink.write_frame(&frame).unwrap();
        sink.finish().unwrap();
        assert!(sink.write_frame(&frame).is_err());
        assert_eq!(sink.into_frames().len(), 1);
    }
}
