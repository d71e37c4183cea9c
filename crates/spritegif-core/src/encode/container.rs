//! GIF89a block writer.
//!
//! Blocks must appear in a fixed order: signature, logical screen (with the
//! global color table and optional loop extension), then per frame a Graphic
//! Control Extension, Image Descriptor, optional local color table and image
//! data, and finally the trailer. [`ContainerWriter`] tracks where it is in that
//! sequence and rejects out-of-order calls without writing anything.

use std::io::Write;

use tracing::debug;

use super::lzw::LzwEncoder;
use super::types::DisposalMethod;
use super::EncodeError;
use crate::frame::IndexedFrame;
use crate::quantize::Palette;

const SIGNATURE: &[u8; 6] = b"GIF89a";

const EXTENSION_INTRODUCER: u8 = 0x21;
const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;
const APPLICATION_LABEL: u8 = 0xFF;
const IMAGE_SEPARATOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;

// Global table present, 8-bit color resolution, unsorted, 256 entries
const SCREEN_FLAGS: u8 = 0x80 | 0x70 | 0x07;
// Local table present, not interlaced, unsorted, 256 entries
const LOCAL_TABLE_FLAGS: u8 = 0x80 | 0x07;

const PALETTE_DEPTH: u8 = 8;

/// Position in the GIF block sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Nothing written yet
    NotStarted,
    /// Signature written; logical screen next
    Started,
    /// Screen written; the first frame is indexed against the global table
    FirstFrame,
    /// At least one frame written
    PerFrame,
    /// Trailer written
    Finished,
}

/// Graphic Control Extension contents for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphicControl {
    /// Centiseconds
    pub delay: u16,
    pub disposal: DisposalMethod,
    pub transparent_index: Option<u8>,
}

impl GraphicControl {
    fn packed(&self) -> u8 {
        (self.disposal.code() << 2) | self.transparent_index.is_some() as u8
    }
}

/// Writes GIF89a blocks to a byte sink in order.
pub struct ContainerWriter<W: Write> {
    sink: W,
    state: ContainerState,
    canvas: (u16, u16),
    lzw: LzwEncoder,
}

impl<W: Write> ContainerWriter<W> {
    pub fn new(sink: W) -> Result<Self, EncodeError> {
        Ok(Self {
            sink,
            state: ContainerState::NotStarted,
            canvas: (0, 0),
            lzw: LzwEncoder::new(PALETTE_DEPTH)?,
        })
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    pub fn canvas(&self) -> (u16, u16) {
        self.canvas
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Write the `GIF89a` signature.
    pub fn start(&mut self) -> Result<(), EncodeError> {
        self.require_state(&[ContainerState::NotStarted], "write the signature")?;
        self.sink.write_all(SIGNATURE)?;
        self.state = ContainerState::Started;
        Ok(())
    }

    /// Write the Logical Screen Descriptor and global color table, followed by
    /// the Netscape loop extension when `repeat` is set.
    pub fn write_screen(
        &mut self,
        width: u16,
        height: u16,
        palette: &Palette,
        repeat: Option<u16>,
    ) -> Result<(), EncodeError> {
        self.require_state(&[ContainerState::Started], "write the logical screen")?;
        if width == 0 || height == 0 {
            return Err(EncodeError::InvalidDimensions {
                width: width as u32,
                height: height as u32,
            });
        }

        let mut block = Vec::with_capacity(7 + 768 + 19);
        block.extend_from_slice(&width.to_le_bytes());
        block.extend_from_slice(&height.to_le_bytes());
        // Flags, background color index, pixel aspect ratio
        block.extend_from_slice(&[SCREEN_FLAGS, 0, 0]);
        block.extend_from_slice(&palette.to_color_table());

        if let Some(count) = repeat {
            block.extend_from_slice(&[EXTENSION_INTRODUCER, APPLICATION_LABEL, 11]);
            block.extend_from_slice(b"NETSCAPE2.0");
            block.extend_from_slice(&[3, 1]);
            block.extend_from_slice(&count.to_le_bytes());
            block.push(0);
        }

        self.sink.write_all(&block)?;
        self.canvas = (width, height);
        self.state = ContainerState::FirstFrame;
        debug!(width, height, ?repeat, "Wrote logical screen");
        Ok(())
    }

    /// Write one frame: control extension, image descriptor, optional local
    /// color table and LZW image data.
    ///
    /// The first frame must use the global table, so `local_palette` is only
    /// accepted once a frame has been written. Returns the number of bytes
    /// written.
    pub fn write_frame(
        &mut self,
        frame: &IndexedFrame,
        control: &GraphicControl,
        local_palette: Option<&Palette>,
    ) -> Result<usize, EncodeError> {
        self.require_state(
            &[ContainerState::FirstFrame, ContainerState::PerFrame],
            "write a frame",
        )?;
        if self.state == ContainerState::FirstFrame && local_palette.is_some() {
            return Err(EncodeError::InvalidState {
                operation: "write a local color table for the first frame",
                state: self.state,
            });
        }
        let (canvas_width, canvas_height) = self.canvas;
        if frame.width != canvas_width as u32 || frame.height != canvas_height as u32 {
            return Err(EncodeError::DimensionMismatch {
                canvas_width,
                canvas_height,
                actual_width: frame.width,
                actual_height: frame.height,
            });
        }

        let mut block = Vec::with_capacity(8 + 10 + 768 + frame.indices.len());
        block.extend_from_slice(&[EXTENSION_INTRODUCER, GRAPHIC_CONTROL_LABEL, 4]);
        block.push(control.packed());
        block.extend_from_slice(&control.delay.to_le_bytes());
        block.push(control.transparent_index.unwrap_or(0));
        block.push(0);

        block.push(IMAGE_SEPARATOR);
        block.extend_from_slice(&[0, 0, 0, 0]);
        block.extend_from_slice(&canvas_width.to_le_bytes());
        block.extend_from_slice(&canvas_height.to_le_bytes());
        match local_palette {
            Some(palette) => {
                block.push(LOCAL_TABLE_FLAGS);
                block.extend_from_slice(&palette.to_color_table());
            }
            None => block.push(0),
        }

        self.lzw.encode(&frame.indices, &mut block)?;
        self.sink.write_all(&block)?;
        self.state = ContainerState::PerFrame;
        Ok(block.len())
    }

    /// Write the trailer, flush, and hand back the sink.
    pub fn finish(mut self) -> Result<W, EncodeError> {
        self.require_state(
            &[
                ContainerState::Started,
                ContainerState::FirstFrame,
                ContainerState::PerFrame,
            ],
            "write the trailer",
        )?;
        self.sink.write_all(&[TRAILER])?;
        self.sink.flush()?;
        self.state = ContainerState::Finished;
        Ok(self.sink)
    }

    fn require_state(
        &self,
        allowed: &[ContainerState],
        operation: &'static str,
    ) -> Result<(), EncodeError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(EncodeError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rgb;

    fn two_color_palette() -> Palette {
        Palette::from_colors(&[Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)])
    }

    fn started() -> ContainerWriter<Vec<u8>> {
        let mut writer = ContainerWriter::new(Vec::new()).unwrap();
        writer.start().unwrap();
        writer
    }

    #[test]
    fn test_signature() {
        let writer = started();
        assert_eq!(writer.state(), ContainerState::Started);
        assert_eq!(writer.get_ref().as_slice(), b"GIF89a");
    }

    #[test]
    fn test_logical_screen_layout() {
        let mut writer = started();
        writer
            .write_screen(0x0102, 0x0304, &two_color_palette(), None)
            .unwrap();
        let out = writer.get_ref();

        assert_eq!(&out[6..13], &[0x02, 0x01, 0x04, 0x03, 0xF7, 0, 0]);
        assert_eq!(&out[13..19], &[255, 0, 0, 0, 0, 255]);
        assert_eq!(out.len(), 13 + 768);
        assert_eq!(writer.state(), ContainerState::FirstFrame);
        assert_eq!(writer.canvas(), (0x0102, 0x0304));
    }

    #[test]
    fn test_netscape_loop_extension() {
        let mut writer = started();
        writer
            .write_screen(1, 1, &two_color_palette(), Some(0x0203))
            .unwrap();
        let out = writer.get_ref();
        let ext = &out[13 + 768..];
        let mut expected = vec![0x21, 0xFF, 0x0B];
        expected.extend_from_slice(b"NETSCAPE2.0");
        expected.extend_from_slice(&[0x03, 0x01, 0x03, 0x02, 0x00]);
        assert_eq!(ext, expected.as_slice());
    }

    #[test]
    fn test_frame_blocks() {
        let mut writer = started();
        writer.write_screen(2, 2, &two_color_palette(), None).unwrap();
        let header_len = writer.get_ref().len();

        let frame = IndexedFrame::new(2, 2, vec![0, 1, 1, 0]);
        let control = GraphicControl {
            delay: 0x0A0B,
            disposal: DisposalMethod::RestoreBackground,
            transparent_index: Some(1),
        };
        writer.write_frame(&frame, &control, None).unwrap();

        let out = &writer.get_ref()[header_len..];
        assert_eq!(&out[..8], &[0x21, 0xF9, 0x04, 0x09, 0x0B, 0x0A, 0x01, 0x00]);
        assert_eq!(&out[8..18], &[0x2C, 0, 0, 0, 0, 2, 0, 2, 0, 0x00]);
        // Image data begins with the minimum code size and ends with a terminator
        assert_eq!(out[18], 8);
        assert_eq!(*out.last().unwrap(), 0);
        assert_eq!(writer.state(), ContainerState::PerFrame);
    }

    #[test]
    fn test_local_color_table() {
        let mut writer = started();
        writer.write_screen(1, 1, &two_color_palette(), None).unwrap();
        let frame = IndexedFrame::new(1, 1, vec![0]);
        writer
            .write_frame(&frame, &GraphicControl::default(), None)
            .unwrap();
        let before = writer.get_ref().len();

        let local = Palette::from_colors(&[Rgb::new(9, 8, 7)]);
        writer
            .write_frame(&frame, &GraphicControl::default(), Some(&local))
            .unwrap();
        let out = &writer.get_ref()[before..];
        assert_eq!(out[17], 0x87);
        assert_eq!(&out[18..21], &[9, 8, 7]);
        assert_eq!(out[18 + 768], 8);
    }

    #[test]
    fn test_first_frame_rejects_local_table() {
        let mut writer = started();
        writer.write_screen(1, 1, &two_color_palette(), None).unwrap();
        let before = writer.get_ref().len();
        let result = writer.write_frame(
            &IndexedFrame::new(1, 1, vec![0]),
            &GraphicControl::default(),
            Some(&two_color_palette()),
        );
        assert!(matches!(result, Err(EncodeError::InvalidState { .. })));
        assert_eq!(writer.get_ref().len(), before);
        assert_eq!(writer.state(), ContainerState::FirstFrame);
    }

    #[test]
    fn test_out_of_order_calls_write_nothing() {
        let mut writer = ContainerWriter::new(Vec::new()).unwrap();
        let frame = IndexedFrame::new(1, 1, vec![0]);

        assert!(matches!(
            writer.write_screen(1, 1, &Palette::default(), None),
            Err(EncodeError::InvalidState {
                state: ContainerState::NotStarted,
                ..
            })
        ));
        assert!(writer
            .write_frame(&frame, &GraphicControl::default(), None)
            .is_err());
        assert!(writer.get_ref().is_empty());

        writer.start().unwrap();
        assert!(writer.start().is_err());
        assert!(writer
            .write_frame(&frame, &GraphicControl::default(), None)
            .is_err());
        assert_eq!(writer.get_ref().len(), 6);
    }

    #[test]
    fn test_finish_before_start_fails() {
        let writer = ContainerWriter::new(Vec::new()).unwrap();
        assert!(matches!(
            writer.finish(),
            Err(EncodeError::InvalidState {
                state: ContainerState::NotStarted,
                ..
            })
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut writer = started();
        writer.write_screen(4, 4, &Palette::default(), None).unwrap();
        let result = writer.write_frame(
            &IndexedFrame::new(2, 2, vec![0; 4]),
            &GraphicControl::default(),
            None,
        );
        assert!(matches!(
            result,
            Err(EncodeError::DimensionMismatch {
                canvas_width: 4,
                actual_width: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_screen_rejected() {
        let mut writer = started();
        assert!(matches!(
            writer.write_screen(0, 5, &Palette::default(), None),
            Err(EncodeError::InvalidDimensions { .. })
        ));
        assert_eq!(writer.state(), ContainerState::Started);
    }

    #[test]
    fn test_finish_writes_trailer() {
        let mut writer = started();
        writer.write_screen(1, 1, &Palette::default(), None).unwrap();
        writer
            .write_frame(
                &IndexedFrame::new(1, 1, vec![0]),
                &GraphicControl::default(),
                None,
            )
            .unwrap();
        let out = writer.finish().unwrap();
        assert_eq!(*out.last().unwrap(), 0x3B);
    }

    #[test]
    fn test_decodes_with_reference_decoder() {
        let mut writer = started();
        writer.write_screen(2, 1, &two_color_palette(), Some(0)).unwrap();
        writer
            .write_frame(
                &IndexedFrame::new(2, 1, vec![0, 1]),
                &GraphicControl {
                    delay: 7,
                    ..Default::default()
                },
                None,
            )
            .unwrap();
        let out = writer.finish().unwrap();

        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::Indexed);
        let mut decoder = options.read_info(std::io::Cursor::new(out)).unwrap();
        assert_eq!(decoder.width(), 2);
        assert_eq!(decoder.repeat(), gif::Repeat::Infinite);
        let frame = decoder.read_next_frame().unwrap().unwrap();
        assert_eq!(frame.delay, 7);
        assert_eq!(&frame.buffer[..], &[0, 1]);
        assert!(decoder.read_next_frame().unwrap().is_none());
    }
}
