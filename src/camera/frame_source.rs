use async_trait::async_trait;

use crate::common::Frame;
use crate::error::AcquisitionError;

/// A camera, or anything else that can hand the detection loop a frame.
#[async_trait]
pub trait FrameSource: Send {
    /// Latest available frame. Must not wait for the next capture.
    async fn fetch_frame(&mut self) -> Result<Frame, AcquisitionError>;

    fn is_opened(&self) -> bool;

    async fn stop(&mut self) {}
}
