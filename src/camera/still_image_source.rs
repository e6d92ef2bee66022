use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::camera::FrameSource;
use crate::common::Frame;
use crate::error::AcquisitionError;

/// Re-reads and decodes an image file on every fetch, e.g. a snapshot that
/// an external capture tool keeps overwriting.
pub struct StillImageSource {
    path: PathBuf,
    source_id: Uuid,
    opened: bool,
}

impl StillImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source_id: Uuid::new_v4(),
            opened: false,
        }
    }
}

#[async_trait]
impl FrameSource for StillImageSource {
    async fn fetch_frame(&mut self) -> Result<Frame, AcquisitionError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(source) => {
                self.opened = false;
                return Err(AcquisitionError::Io {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        };
        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .inspect_err(|_| self.opened = false)?;
        let image = decoded.inspect_err(|_| self.opened = false)?;
        if !self.opened {
            info!(
                "Opened frame source {} ({}x{})",
                self.path.display(),
                image.width(),
                image.height()
            );
            self.opened = true;
        }
        Ok(Frame::from_image(self.source_id, image))
    }

    fn is_opened(&self) -> bool {
        self.opened
    }
}
