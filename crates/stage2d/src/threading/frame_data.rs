//! # Frame Data
//!
//! [`FrameData`] is the flattened snapshot of one frame: camera transform,
//! viewport, clear color and the ordered command list. [`FrameDataBuffer`]
//! ping-pongs two of them between a producer and a consumer.
//!
//! ## Slot discipline
//!
//! A single atomic holds the write index; the read index is always its
//! complement, so the two can never name the same slot. [`FrameDataBuffer::swap`]
//! flips the index with acquire-release ordering, publishing everything written
//! to the old write slot to whoever next loads the index. Each slot also sits
//! behind its own mutex, which keeps access safe even if a consumer holds a
//! read guard across a swap.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::foundation::math::{Color, Mat4};
use crate::render::{RenderCommand, Viewport};

/// Snapshot of one frame's drawable state
#[derive(Debug, Clone)]
pub struct FrameData {
    /// Base view-projection matrix
    pub view_projection: Mat4,
    /// Pixel viewport
    pub viewport: Viewport,
    /// Clear color
    pub clear_color: Color,
    /// Ordered render commands
    pub render_commands: Vec<RenderCommand>,
    /// Producer-assigned, monotonically increasing frame number
    pub frame_number: u64,
}

impl Default for FrameData {
    fn default() -> Self {
        Self {
            view_projection: Mat4::identity(),
            viewport: Viewport::default(),
            clear_color: Color::BLACK,
            render_commands: Vec::new(),
            frame_number: 0,
        }
    }
}

impl FrameData {
    /// Reset for reuse, keeping the command list's allocation
    pub fn clear(&mut self) {
        self.view_projection = Mat4::identity();
        self.viewport = Viewport::default();
        self.clear_color = Color::BLACK;
        self.render_commands.clear();
        self.frame_number = 0;
    }

    /// Append a command
    pub fn push(&mut self, command: RenderCommand) {
        self.render_commands.push(command);
    }

    /// Number of commands
    pub fn command_count(&self) -> usize {
        self.render_commands.len()
    }
}

/// Two-slot frame buffer shared by a producer and a consumer
#[derive(Debug)]
pub struct FrameDataBuffer {
    buffers: [Mutex<FrameData>; 2],
    write_index: AtomicUsize,
}

impl Default for FrameDataBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDataBuffer {
    /// Create a buffer with write slot 0 and read slot 1
    pub fn new() -> Self {
        Self {
            buffers: [Mutex::new(FrameData::default()), Mutex::new(FrameData::default())],
            write_index: AtomicUsize::new(0),
        }
    }

    /// Slot the producer may fill
    pub fn write_index(&self) -> usize {
        self.write_index.load(Ordering::Acquire)
    }

    /// Slot the consumer may read
    pub fn read_index(&self) -> usize {
        1 - self.write_index()
    }

    /// Producer access to the write slot
    pub fn write_buffer(&self) -> MutexGuard<'_, FrameData> {
        self.buffers[self.write_index()].lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consumer access to the most recently published slot
    pub fn read_buffer(&self) -> MutexGuard<'_, FrameData> {
        loop {
            let index = self.read_index();
            let guard = self.buffers[index].lock().unwrap_or_else(PoisonError::into_inner);
            // A swap between the load and the lock turns this slot into the
            // write slot; only return it if it is still the published one.
            if self.read_index() == index {
                return guard;
            }
        }
    }

    /// Publish the write slot as the new read slot and flip to the other one.
    /// Producer only, once per frame, after all writes are done.
    pub fn swap(&self) {
        let previous = self.write_index.fetch_xor(1, Ordering::AcqRel);
        log::trace!("FrameDataBuffer swap: published slot {previous}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_index_scenario() {
        let buffer = FrameDataBuffer::new();
        assert_eq!((buffer.write_index(), buffer.read_index()), (0, 1));
        buffer.swap();
        assert_eq!((buffer.write_index(), buffer.read_index()), (1, 0));
        buffer.swap();
        assert_eq!((buffer.write_index(), buffer.read_index()), (0, 1));
    }

    #[test]
    fn test_write_and_read_never_alias() {
        let buffer = FrameDataBuffer::new();
        for _ in 0..16 {
            {
                let write = buffer.write_buffer();
                let read = buffer.read_buffer();
                assert!(!std::ptr::eq(&*write, &*read));
            }
            assert_ne!(buffer.write_index(), buffer.read_index());
            buffer.swap();
        }
    }

    #[test]
    fn test_swap_publishes_written_frame() {
        let buffer = FrameDataBuffer::new();
        {
            let mut frame = buffer.write_buffer();
            frame.frame_number = 7;
            frame.clear_color = Color::RED;
        }
        buffer.swap();
        let read = buffer.read_buffer();
        assert_eq!(read.frame_number, 7);
        assert_eq!(read.clear_color, Color::RED);
    }

    #[test]
    fn test_frame_numbers_monotonic_across_threads() {
        let buffer = Arc::new(FrameDataBuffer::new());
        let consumer_buffer = Arc::clone(&buffer);

        let consumer = std::thread::spawn(move || {
            let mut last = 0;
            for _ in 0..2_000 {
                let seen = consumer_buffer.read_buffer().frame_number;
                assert!(seen >= last, "frame number went backwards: {seen} < {last}");
                last = seen;
            }
        });

        for number in 1..=2_000 {
            {
                let mut frame = buffer.write_buffer();
                frame.clear();
                frame.frame_number = number;
            }
            buffer.swap();
        }
        consumer.join().unwrap();
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut frame = FrameData::default();
        frame.push(RenderCommand::ViewProjection(Mat4::identity()));
        let capacity = frame.render_commands.capacity();
        frame.clear();
        assert_eq!(frame.command_count(), 0);
        assert_eq!(frame.render_commands.capacity(), capacity);
    }
}
