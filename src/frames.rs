//! Extracted frame sequence loading.
//!
//! The extractor leaves a directory of numbered PNGs; this module turns them
//! into 1-bit matrices for the encoder. A pixel is lit when its luma exceeds
//! the configured threshold. Rows are flipped vertically on load: PNG row 0
//! is the top of the picture, while board row 0 sits at the bottom of the
//! generated screen.

use std::path::{Path, PathBuf};

use crate::error::{AppResult, ReelError};

/// A single video frame reduced to one bit per pixel.
///
/// Row-major, row 0 at the bottom of the picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFrame {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl BitFrame {
    /// An all-dark frame. Frame 0 of a video is delta-encoded against this.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width as usize) * (height as usize)],
        }
    }

    /// Whether the pixel at (`x`, `y`) is lit. `y` counts from the bottom.
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[(y * self.width + x) as usize]
    }

    fn from_luma(image: &image::GrayImage, threshold: u8) -> Self {
        let (width, height) = image.dimensions();
        let mut bits = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                bits.push(image.get_pixel(x, height - 1 - y).0[0] > threshold);
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }
}

/// An ordered, uniformly sized sequence of extracted frames on disk.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    paths: Vec<PathBuf>,
    width: u32,
    height: u32,
    luma_threshold: u8,
}

impl FrameSequence {
    /// Scan `dir` for `.png` frames, sorted by file name.
    ///
    /// The first frame fixes the sequence dimensions; an empty directory is
    /// an error.
    pub fn scan(dir: &Path, luma_threshold: u8) -> AppResult<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        paths.retain(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        });
        paths.sort();

        let first = paths
            .first()
            .ok_or_else(|| ReelError::EmptyFrameSequence(dir.to_path_buf()))?;
        let (width, height) = image::open(first)?.to_luma8().dimensions();

        Ok(Self {
            paths,
            width,
            height,
            luma_threshold,
        })
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the sequence holds no frames.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Width shared by every frame, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height shared by every frame, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frame files in playback order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Decode and threshold one frame.
    ///
    /// Fails with [`ReelError::FrameSizeMismatch`] if the frame's dimensions
    /// differ from the sequence's.
    pub fn load(&self, path: &Path) -> AppResult<BitFrame> {
        let luma = image::open(path)?.to_luma8();
        let (got_width, got_height) = luma.dimensions();
        if (got_width, got_height) != (self.width, self.height) {
            return Err(ReelError::FrameSizeMismatch {
                path: path.to_path_buf(),
                got_width,
                got_height,
                want_width: self.width,
                want_height: self.height,
            });
        }
        Ok(BitFrame::from_luma(&luma, self.luma_threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn write_frame(dir: &Path, name: &str, width: u32, height: u32, lit: &[(u32, u32)]) {
        let mut img = GrayImage::from_pixel(width, height, Luma([0u8]));
        for &(x, y) in lit {
            img.put_pixel(x, y, Luma([255u8]));
        }
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn scan_sorts_and_sizes() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "frame_00002.png", 4, 3, &[]);
        write_frame(dir.path(), "frame_00001.png", 4, 3, &[]);
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let seq = FrameSequence::scan(dir.path(), 127).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!((seq.width(), seq.height()), (4, 3));
        assert!(seq.paths()[0].ends_with("frame_00001.png"));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FrameSequence::scan(dir.path(), 127).unwrap_err();
        assert!(matches!(err, ReelError::EmptyFrameSequence(_)));
    }

    #[test]
    fn load_flips_vertically() {
        let dir = tempfile::tempdir().unwrap();
        // Lit pixel at PNG coordinates (1, 0): top row.
        write_frame(dir.path(), "frame_00001.png", 3, 2, &[(1, 0)]);

        let seq = FrameSequence::scan(dir.path(), 127).unwrap();
        let frame = seq.load(&seq.paths()[0].clone()).unwrap();
        assert!(frame.get(1, 1), "top PNG row should become top board row");
        assert!(!frame.get(1, 0));
        assert!(!frame.get(0, 1));
    }

    #[test]
    fn size_mismatch_names_the_offender() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "frame_00001.png", 4, 3, &[]);
        write_frame(dir.path(), "frame_00002.png", 5, 3, &[]);

        let seq = FrameSequence::scan(dir.path(), 127).unwrap();
        let err = seq.load(&seq.paths()[1].clone()).unwrap_err();
        assert!(err.to_string().contains("frame_00002.png"));
    }

    #[test]
    fn threshold_is_strict() {
        let dir = tempfile::tempdir().unwrap();
        let mut img = GrayImage::from_pixel(2, 1, Luma([127u8]));
        img.put_pixel(1, 0, Luma([128u8]));
        img.save(dir.path().join("frame_00001.png")).unwrap();

        let seq = FrameSequence::scan(dir.path(), 127).unwrap();
        let frame = seq.load(&seq.paths()[0].clone()).unwrap();
        assert!(!frame.get(0, 0), "exactly-threshold luma stays dark");
        assert!(frame.get(1, 0));
    }
}
