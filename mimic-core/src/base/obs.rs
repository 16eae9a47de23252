//! Observation frame.
use crate::error::MimicError;
use anyhow::Result;
use ndarray::Array3;
use std::path::Path;

/// An image-like observation with `(height, width, channels)` layout.
///
/// Frames are immutable once produced by an environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame(Array3<u8>);

impl Frame {
    /// Wraps a raw pixel array as a frame.
    pub fn new(data: Array3<u8>) -> Self {
        Self(data)
    }

    /// An all-zero frame.
    pub fn zeros(height: usize, width: usize, channels: usize) -> Self {
        Self(Array3::zeros((height, width, channels)))
    }

    /// Returns `[height, width, channels]`.
    pub fn shape(&self) -> [usize; 3] {
        let s = self.0.shape();
        [s[0], s[1], s[2]]
    }

    /// Raw pixel data.
    pub fn data(&self) -> &Array3<u8> {
        &self.0
    }

    /// Encodes the frame as a PNG file.
    ///
    /// Only 1- and 3-channel frames can be encoded.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let [h, w, c] = self.shape();
        let color = match c {
            1 => image::ColorType::L8,
            3 => image::ColorType::Rgb8,
            _ => {
                return Err(MimicError::Shape {
                    expected: [h, w, 3],
                    actual: [h, w, c],
                }
                .into())
            }
        };
        let data = self.0.as_standard_layout();
        let buf = data.as_slice().expect("standard layout");
        image::save_buffer(path.as_ref(), buf, w as u32, h as u32, color)?;
        Ok(())
    }

    /// Decodes a PNG file written by [`Frame::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref())?;
        let data = match img {
            image::DynamicImage::ImageLuma8(buf) => {
                let (w, h) = (buf.width() as usize, buf.height() as usize);
                Array3::from_shape_vec((h, w, 1), buf.into_raw())?
            }
            other => {
                let buf = other.to_rgb8();
                let (w, h) = (buf.width() as usize, buf.height() as usize);
                Array3::from_shape_vec((h, w, 3), buf.into_raw())?
            }
        };
        Ok(Self(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use tempdir::TempDir;

    #[test]
    fn test_save_load_roundtrip() -> Result<()> {
        let dir = TempDir::new("frame")?;
        let path = dir.path().join("f.png");
        let data = Array3::from_shape_fn((4, 6, 3), |(i, j, k)| (i * 31 + j * 7 + k) as u8);
        let frame = Frame::new(data);
        frame.save(&path)?;
        let loaded = Frame::load(&path)?;
        assert_eq!(frame, loaded);
        Ok(())
    }

    #[test]
    fn test_save_rejects_odd_channel_count() {
        let dir = TempDir::new("frame").unwrap();
        let frame = Frame::zeros(4, 4, 2);
        assert!(frame.save(dir.path().join("f.png")).is_err());
    }
}
