//! Whole-animation helpers built on [`GifEncoder`].
//!
//! These drive a session over a sequence of frames, giving the caller a hook
//! to adjust, skip or stop on each frame before it is encoded.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::encode::{EncodeError, EncoderConfig, FrameMetadata, GifEncoder};
use crate::frame::RawFrame;

/// What to do with a frame after the per-frame hook has seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    /// Encode the (possibly modified) frame
    Encode,
    /// Drop this frame and continue
    Skip,
    /// Stop before this frame; the animation is still finished
    Abort,
}

/// Encode a sequence of frames into `sink` and return it.
///
/// `hook` is called with each frame's position in `frames` and may modify the
/// frame in place. Every encoded frame uses `metadata`.
pub fn encode_animation<W, I, F>(
    sink: W,
    frames: I,
    config: EncoderConfig,
    metadata: &FrameMetadata,
    hook: F,
) -> Result<W, EncodeError>
where
    W: Write,
    I: IntoIterator<Item = RawFrame>,
    F: FnMut(usize, &mut RawFrame) -> FrameAction,
{
    let mut encoder = GifEncoder::new(config);
    encoder.open(sink)?;
    drive(&mut encoder, frames, metadata, hook)?;
    encoder.finish()
}

/// Like [`encode_animation`], but writes to a newly created file.
pub fn save_animation<P, I, F>(
    path: P,
    frames: I,
    config: EncoderConfig,
    metadata: &FrameMetadata,
    hook: F,
) -> Result<(), EncodeError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = RawFrame>,
    F: FnMut(usize, &mut RawFrame) -> FrameAction,
{
    let mut encoder = GifEncoder::new(config);
    encoder.open_path(path)?;
    drive(&mut encoder, frames, metadata, hook)?;
    encoder.finish()?;
    Ok(())
}

fn drive<W, I, F>(
    encoder: &mut GifEncoder<W>,
    frames: I,
    metadata: &FrameMetadata,
    mut hook: F,
) -> Result<(), EncodeError>
where
    W: Write,
    I: IntoIterator<Item = RawFrame>,
    F: FnMut(usize, &mut RawFrame) -> FrameAction,
{
    let mut skipped = 0usize;
    let mut aborted = false;

    for (index, mut frame) in frames.into_iter().enumerate() {
        match hook(index, &mut frame) {
            FrameAction::Encode => encoder.add_frame(&frame, metadata)?,
            FrameAction::Skip => skipped += 1,
            FrameAction::Abort => {
                aborted = true;
                break;
            }
        }
    }

    info!(
        encoded = encoder.frame_count(),
        skipped, aborted, "Animation frames processed"
    );
    Ok(())
}
