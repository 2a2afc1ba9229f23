/// Opaque id of a requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// One-shot "call me before the next paint" primitive.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;

    /// Deregister a pending request. Unknown or already-run handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Pending frame requests for a single owner, drained once per display tick.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every request due this tick. Requests made while dispatching
    /// them are left for the next tick.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|&h| h != handle);
    }
}
