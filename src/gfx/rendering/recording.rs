//! A headless backend that records what it is asked to do.

use std::collections::HashMap;

use super::backend::{BufferId, BufferKind, DrawCall, RenderBackend, Topology};

#[derive(Debug, Clone)]
pub struct RecordedBuffer {
    pub kind: BufferKind,
    pub label: String,
    pub data: Vec<u8>,
    pub writes: usize,
}

impl RecordedBuffer {
    /// Number of whole vertices or indices in the latest contents, or
    /// `None` if the bytes do not match the buffer's element size.
    pub fn element_count(&self) -> Option<usize> {
        match self.kind {
            BufferKind::Vertex(layout) => layout.vertex_count(self.data.len()),
            BufferKind::Index => {
                let size = std::mem::size_of::<u32>();
                (self.data.len() % size == 0).then(|| self.data.len() / size)
            }
        }
    }
}

/// Keeps every buffer's latest contents and every draw call in order.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    buffers: HashMap<BufferId, RecordedBuffer>,
    draws: Vec<DrawCall>,
    next_id: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self, id: BufferId) -> Option<&RecordedBuffer> {
        self.buffers.get(&id)
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Total number of buffer writes across all buffers.
    pub fn write_count(&self) -> usize {
        self.buffers.values().map(|b| b.writes).sum()
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Triangles drawn since the last [`RecordingBackend::clear_draws`].
    pub fn triangle_count(&self) -> u32 {
        self.draws
            .iter()
            .filter(|d| d.topology == Topology::Triangles)
            .map(DrawCall::primitive_count)
            .sum()
    }

    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn create_buffer(&mut self, kind: BufferKind, label: &str) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.buffers.insert(
            id,
            RecordedBuffer {
                kind,
                label: label.to_string(),
                data: Vec::new(),
                writes: 0,
            },
        );
        id
    }

    fn write_buffer(&mut self, id: BufferId, data: &[u8]) {
        match self.buffers.get_mut(&id) {
            Some(buffer) => {
                if let BufferKind::Vertex(layout) = buffer.kind {
                    if layout.vertex_count(data.len()).is_none() {
                        log::warn!(
                            "{} bytes written to vertex buffer `{}` with stride {}",
                            data.len(),
                            buffer.label,
                            layout.array_stride
                        );
                    }
                }
                buffer.data = data.to_vec();
                buffer.writes += 1;
            }
            None => log::warn!("write to unknown buffer {id:?}"),
        }
    }

    fn draw(&mut self, call: &DrawCall) {
        self.draws.push(call.clone());
    }
}
