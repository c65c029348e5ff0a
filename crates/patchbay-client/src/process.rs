//! Real-time process callback registration point.
//!
//! A client registers one process handler before activation. An external
//! driver takes it with [`Client::take_process_callback`](crate::Client::take_process_callback)
//! and calls it once per block on its real-time thread. No driver lives in
//! this crate.
//!
//! ## Real-Time Safety
//!
//! The handler runs on the audio thread. It must not allocate, lock, or block,
//! and it never runs on the notification thread.

/// What the driver should do after a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Keep calling the handler.
    Continue,
    /// Stop calling the handler.
    Quit,
}

/// Timing of the block being processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessScope {
    n_frames: u32,
    frame_time: u64,
}

impl ProcessScope {
    /// Describe a block of `n_frames` starting at `frame_time`.
    pub fn new(n_frames: u32, frame_time: u64) -> Self {
        Self {
            n_frames,
            frame_time,
        }
    }

    /// Frames in this block.
    pub fn n_frames(&self) -> u32 {
        self.n_frames
    }

    /// Frame count since the driver started, at the start of this block.
    pub fn frame_time(&self) -> u64 {
        self.frame_time
    }
}

/// Per-block audio handler.
pub trait ProcessHandler: Send {
    /// Process one block.
    fn process(&mut self, scope: &ProcessScope) -> Control;
}

impl<F> ProcessHandler for F
where
    F: FnMut(&ProcessScope) -> Control + Send,
{
    fn process(&mut self, scope: &ProcessScope) -> Control {
        self(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_handlers() {
        let mut frames = 0u64;
        let mut handler = move |scope: &ProcessScope| {
            frames += u64::from(scope.n_frames());
            if frames >= 1024 {
                Control::Quit
            } else {
                Control::Continue
            }
        };
        let scope = ProcessScope::new(512, 0);
        assert_eq!(handler.process(&scope), Control::Continue);
        assert_eq!(handler.process(&scope), Control::Quit);
    }
}
