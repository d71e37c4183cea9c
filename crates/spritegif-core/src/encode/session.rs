//! Frame-by-frame encoding session.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use super::container::{ContainerState, ContainerWriter, GraphicControl};
use super::types::{EncoderConfig, FrameMetadata, PaletteMode};
use super::EncodeError;
use crate::frame::{fit_to_canvas, RawFrame};
use crate::quantize::ColorQuantizer;

/// Canvas used when neither the config nor the first frame gives a usable size.
pub const DEFAULT_CANVAS: (u16, u16) = (320, 240);

/// Builds an animated GIF one frame at a time.
///
/// The session owns its sink between [`GifEncoder::open`] and
/// [`GifEncoder::finish`]; `finish` hands the sink back and resets the encoder
/// so it can be used again.
///
/// # Example
///
/// ```ignore
/// let mut encoder = GifEncoder::new(EncoderConfig::new().with_repeat(Some(0)));
/// encoder.open(Vec::new())?;
/// encoder.add_frame(&frame, &FrameMetadata::new().with_delay_ms(100))?;
/// let bytes = encoder.finish()?;
/// ```
pub struct GifEncoder<W: Write> {
    config: EncoderConfig,
    canvas: Option<(u16, u16)>,
    writer: Option<ContainerWriter<W>>,
    global: Option<ColorQuantizer>,
    frames_written: usize,
}

impl<W: Write> GifEncoder<W> {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            canvas: config.canvas_size.map(|(w, h)| normalize_canvas(w, h)),
            config,
            writer: None,
            global: None,
            frames_written: 0,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Frames written since the last `open`.
    pub fn frame_count(&self) -> usize {
        self.frames_written
    }

    /// The canvas size, if one has been set or adopted from the first frame.
    pub fn canvas_size(&self) -> Option<(u16, u16)> {
        self.canvas
    }

    /// Attach a sink and write the GIF signature.
    pub fn open(&mut self, sink: W) -> Result<(), EncodeError> {
        if self.writer.is_some() {
            return Err(EncodeError::AlreadyOpen);
        }
        let mut writer = ContainerWriter::new(sink)?;
        writer.start()?;
        self.writer = Some(writer);
        info!(
            repeat = ?self.config.repeat,
            quality = self.config.quality,
            "Opened GIF encoder"
        );
        Ok(())
    }

    /// Set the canvas size. Has no effect once the logical screen is written.
    ///
    /// A zero width becomes 320 and a zero height becomes 240.
    pub fn set_canvas_size(&mut self, width: u16, height: u16) {
        if self.canvas_locked() {
            warn!(width, height, "Canvas size is fixed after the first frame; ignoring");
            return;
        }
        let canvas = normalize_canvas(width, height);
        debug!(width = canvas.0, height = canvas.1, "Set canvas size");
        self.canvas = Some(canvas);
    }

    /// Quantize, compress and write one frame.
    ///
    /// The first frame fixes the canvas size (unless one was set) and its
    /// palette becomes the global color table. Later frames carry their own
    /// local color table unless `metadata.palette` is [`PaletteMode::Global`].
    ///
    /// On error the frame counter is unchanged. The canvas and global palette
    /// are fixed as soon as the logical screen reaches the sink, so a retry
    /// after a failed first frame continues the same stream.
    pub fn add_frame(
        &mut self,
        frame: &RawFrame,
        metadata: &FrameMetadata,
    ) -> Result<(), EncodeError> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(EncodeError::NotOpen);
        };

        let screen_pending = writer.state() == ContainerState::Started;
        let (width, height) = if screen_pending {
            match self.canvas {
                Some(canvas) => canvas,
                None => canvas_for_frame(frame)?,
            }
        } else {
            writer.canvas()
        };
        let fitted = fit_to_canvas(frame, width as u32, height as u32, self.config.fit)?;

        if screen_pending {
            let quantizer = ColorQuantizer::new(fitted.pixels(), self.config.quality)?;
            writer.write_screen(width, height, quantizer.palette(), self.config.repeat)?;
            self.canvas = Some((width, height));
            self.global = Some(quantizer);
        }

        // The first image in the stream always uses the global table.
        let use_global = writer.state() == ContainerState::FirstFrame
            || metadata.palette == PaletteMode::Global;
        let mut fresh = None;
        let (quantizer, local) = match self.global.as_mut() {
            Some(global) if use_global => (global, false),
            _ => (
                fresh.insert(ColorQuantizer::new(fitted.pixels(), self.config.quality)?),
                true,
            ),
        };

        let indexed = quantizer.index_frame(&fitted);
        let control = GraphicControl {
            delay: metadata.delay,
            disposal: metadata.resolved_disposal(),
            transparent_index: metadata.transparent.map(|color| quantizer.classify(color)),
        };
        let local_palette = if local { Some(quantizer.palette()) } else { None };
        let bytes = writer.write_frame(&indexed, &control, local_palette)?;

        debug!(
            frame = self.frames_written,
            width,
            height,
            colors = quantizer.palette().used_count(),
            palette = ?metadata.palette,
            transparent = ?control.transparent_index,
            disposal = ?control.disposal,
            bytes,
            "Wrote frame"
        );

        self.frames_written += 1;
        Ok(())
    }

    /// Write the trailer and return the sink.
    ///
    /// The encoder is reset whether or not the final write succeeds.
    pub fn finish(&mut self) -> Result<W, EncodeError> {
        let writer = self.writer.take().ok_or(EncodeError::NotOpen)?;
        let frames = self.frames_written;
        self.reset();
        let sink = writer.finish()?;
        info!(frames, "Finished GIF");
        Ok(sink)
    }

    fn canvas_locked(&self) -> bool {
        self.frames_written > 0
            || self
                .writer
                .as_ref()
                .is_some_and(|writer| writer.state() != ContainerState::Started)
    }

    fn reset(&mut self) {
        self.canvas = self.config.canvas_size.map(|(w, h)| normalize_canvas(w, h));
        self.global = None;
        self.frames_written = 0;
    }
}

impl GifEncoder<BufWriter<File>> {
    /// Create (or truncate) a file and open it as the sink.
    pub fn open_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), EncodeError> {
        if self.is_open() {
            return Err(EncodeError::AlreadyOpen);
        }
        let file = File::create(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Created output file");
        self.open(BufWriter::new(file))
    }
}

fn normalize_canvas(width: u16, height: u16) -> (u16, u16) {
    (
        if width == 0 { DEFAULT_CANVAS.0 } else { width },
        if height == 0 { DEFAULT_CANVAS.1 } else { height },
    )
}

fn canvas_for_frame(frame: &RawFrame) -> Result<(u16, u16), EncodeError> {
    let too_large = || EncodeError::CanvasTooLarge {
        width: frame.width(),
        height: frame.height(),
    };
    let width = u16::try_from(frame.width()).map_err(|_| too_large())?;
    let height = u16::try_from(frame.height()).map_err(|_| too_large())?;
    Ok(normalize_canvas(width, height))
}


// =============================================================================
// Property-Based Tests
// =============================================================================

#[cfg(test)]
mod proptests {
    use super::tests::{decode, encode, solid};
    use super::*;
    use crate::Rgb;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_encoding_is_deterministic(
            width in 1u32..12,
            height in 1u32..12,
            seed in any::<u8>(),
        ) {
            let pixels: Vec<u8> = (0..width * height * 3)
                .map(|i| (i as u8).wrapping_mul(seed).wrapping_add(seed))
                .collect();
            let frame = RawFrame::new(width, height, pixels).unwrap();
            let frames = [(frame, FrameMetadata::new().with_delay_ms(40))];
            let a = encode(EncoderConfig::default(), &frames);
            let b = encode(EncoderConfig::default(), &frames);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_frame_count_and_delays_survive(delays in prop::collection::vec(any::<u16>(), 1..6)) {
            let frames: Vec<_> = delays
                .iter()
                .map(|&delay| {
                    let meta = FrameMetadata { delay, ..FrameMetadata::new() };
                    (solid(3, 2, Rgb::new(delay as u8, 0, 0)), meta)
                })
                .collect();
            let (_, _, decoded) = decode(encode(EncoderConfig::default(), &frames));
            prop_assert_eq!(decoded.len(), delays.len());
            for (frame, delay) in decoded.iter().zip(&delays) {
                prop_assert_eq!(frame.delay, *delay);
            }
        }
    }
}
