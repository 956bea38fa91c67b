//! Frame sources feeding the monitor loop

pub mod memory;
pub mod sequence;

#[cfg(feature = "opencv")]
pub mod capture;

pub use memory::MemorySource;
pub use sequence::ImageSequenceSource;

#[cfg(feature = "opencv")]
pub use capture::CaptureSource;

use crate::Result;
use image::DynamicImage;

/// Supplier of one color frame per request
///
/// `Ok(None)` signals end of stream. Errors are terminal for the loop;
/// reconnecting is the source's own business.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>>;

    /// Human readable description used in logs
    fn name(&self) -> String;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        (**self).next_frame()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}
