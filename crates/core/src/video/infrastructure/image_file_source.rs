use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;

/// Serves still images as frames: one file, or every image in a directory
/// in file-name order.
///
/// Images are decoded lazily with the `image` crate and converted to RGB8.
pub struct ImageFileSource {
    pending: VecDeque<PathBuf>,
    total: usize,
    next_index: usize,
}

impl ImageFileSource {
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let files = if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_image_file(p))
                .collect();
            files.sort();
            if files.is_empty() {
                return Err(format!("No images found in {}", path.display()).into());
            }
            files
        } else if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            return Err(format!("Input not found: {}", path.display()).into());
        };

        log::info!("Reading {} image(s) from {}", files.len(), path.display());
        Ok(Self {
            total: files.len(),
            pending: files.into(),
            next_index: 0,
        })
    }
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

impl FrameSource for ImageFileSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };
        let image = image::open(&path)
            .map_err(|e| format!("Failed to decode {}: {e}", path.display()))?
            .to_rgb8();
        let frame = Frame::from_rgb_image(image, self.next_index);
        self.next_index += 1;
        Ok(Some(frame))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.total)
    }
}
