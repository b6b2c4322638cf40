use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::video::domain::frame_sink::FrameSink;

/// Writes annotated frames as `frame_XXXXXX.png` and aligned crops as
/// `aligned_XXXXXX.png`, numbered by frame index.
pub struct ImageDirectorySink {
    dir: PathBuf,
    written: usize,
}

impl ImageDirectorySink {
    pub fn create(dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: 0,
        })
    }

    fn save(&self, frame: &Frame, prefix: &str) -> Result<(), Box<dyn std::error::Error>> {
        let path = self.dir.join(format!("{prefix}_{:06}.png", frame.index()));
        let image = frame
            .to_rgb_image()
            .ok_or("Failed to create image from frame data")?;
        image.save(&path)?;
        Ok(())
    }
}

impl FrameSink for ImageDirectorySink {
    fn write(
        &mut self,
        annotated: &Frame,
        aligned: Option<&Frame>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.save(annotated, "frame")?;
        if let Some(crop) = aligned {
            self.save(crop, "aligned")?;
        }
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Wrote {} frame(s) to {}", self.written, self.dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(width: u32, height: u32, value: u8, index: usize) -> Frame {
        Frame::new(vec![value; (width * height * 3) as usize], width, height, 3, index)
    }

    #[test]
    fn test_writes_frame_and_aligned_crop() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut sink = ImageDirectorySink::create(&out).unwrap();

        sink.write(&make_frame(64, 48, 10, 3), Some(&make_frame(32, 32, 200, 3)))
            .unwrap();
        sink.write(&make_frame(64, 48, 10, 4), None).unwrap();
        sink.finish().unwrap();

        assert!(out.join("frame_000003.png").exists());
        assert!(out.join("aligned_000003.png").exists());
        assert!(out.join("frame_000004.png").exists());
        assert!(!out.join("aligned_000004.png").exists());

        let crop = image::open(out.join("aligned_000003.png")).unwrap().to_rgb8();
        assert_eq!(crop.dimensions(), (32, 32));
        assert_eq!(crop.get_pixel(5, 5).0, [200, 200, 200]);
    }

    #[test]
    fn test_non_rgb_frame_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ImageDirectorySink::create(dir.path()).unwrap();
        let gray = Frame::new(vec![0u8; 16], 4, 4, 1, 0);
        assert!(sink.write(&gray, None).is_err());
    }
}
