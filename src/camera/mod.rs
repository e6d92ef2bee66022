mod channel_source;
mod frame_source;
mod still_image_source;

pub use channel_source::ChannelFrameSource;
pub use frame_source::FrameSource;
pub use still_image_source::StillImageSource;
