use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::debug;

use crate::camera::FrameSource;
use crate::common::Frame;
use crate::error::AcquisitionError;

/// Frames pushed by an in-process producer. Each fetch drains the channel
/// and keeps only the newest frame.
pub struct ChannelFrameSource {
    frame_rx: mpsc::Receiver<Frame>,
    closed: bool,
}

impl ChannelFrameSource {
    pub fn new(frame_rx: mpsc::Receiver<Frame>) -> Self {
        Self {
            frame_rx,
            closed: false,
        }
    }

    /// Producers should `try_send` and drop frames when the buffer is full.
    pub fn channel(buffer: usize) -> (mpsc::Sender<Frame>, Self) {
        let (frame_tx, frame_rx) = mpsc::channel(buffer.max(1));
        (frame_tx, Self::new(frame_rx))
    }
}

#[async_trait]
impl FrameSource for ChannelFrameSource {
    async fn fetch_frame(&mut self) -> Result<Frame, AcquisitionError> {
        let mut latest = None;
        loop {
            match self.frame_rx.try_recv() {
                Ok(frame) => latest = Some(frame),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.closed {
                        debug!("Frame producer disconnected");
                    }
                    self.closed = true;
                    break;
                }
            }
        }
        match latest {
            Some(frame) => Ok(frame),
            None if self.closed => Err(AcquisitionError::Closed),
            None => Err(AcquisitionError::Unavailable),
        }
    }

    fn is_opened(&self) -> bool {
        !self.closed
    }

    async fn stop(&mut self) {
        self.frame_rx.close();
    }
}
