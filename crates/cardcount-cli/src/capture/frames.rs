use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// One encoded camera image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub label: String,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

impl Frame {
    /// Frame with no image data, for backends that never look at pixels.
    pub fn placeholder(sequence: u64) -> Self {
        Self {
            label: format!("frame-{sequence}"),
            bytes: Vec::new(),
            mime: "application/octet-stream",
        }
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("failed to read frame {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("no image files found in {0:?}")]
    NoImages(PathBuf),
}

pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Frame, FrameError>;
}

/// Images from disk: a single file re-read on every capture, or a directory
/// whose images are served in name order, wrapping at the end.
#[derive(Debug, Clone)]
pub struct DiskFrames {
    paths: Vec<PathBuf>,
    next: usize,
}

impl DiskFrames {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FrameError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Ok(Self {
                paths: vec![path.to_path_buf()],
                next: 0,
            });
        }

        let entries = fs::read_dir(path).map_err(|source| FrameError::Read {
            source,
            path: path.to_path_buf(),
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| FrameError::Read {
                source,
                path: path.to_path_buf(),
            })?;
            let candidate = entry.path();
            if candidate.is_file() && is_image(&candidate) {
                paths.push(candidate);
            }
        }
        if paths.is_empty() {
            return Err(FrameError::NoImages(path.to_path_buf()));
        }
        paths.sort();
        Ok(Self { paths, next: 0 })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for DiskFrames {
    fn next_frame(&mut self) -> Result<Frame, FrameError> {
        let path = &self.paths[self.next % self.paths.len()];
        self.next = (self.next + 1) % self.paths.len();
        let bytes = fs::read(path).map_err(|source| FrameError::Read {
            source,
            path: path.clone(),
        })?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "frame".to_string());
        Ok(Frame {
            mime: mime_for(path),
            label,
            bytes,
        })
    }
}

/// Source used with the simulated backend.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderFrames {
    sequence: u64,
}

impl FrameSource for PlaceholderFrames {
    fn next_frame(&mut self) -> Result<Frame, FrameError> {
        self.sequence += 1;
        Ok(Frame::placeholder(self.sequence))
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn is_image(path: &Path) -> bool {
    extension(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn mime_for(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("png") => "image/png",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_frames_cycle_in_name_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("b.jpg"), b"second").expect("write");
        fs::write(dir.path().join("a.jpg"), b"first").expect("write");
        fs::write(dir.path().join("notes.txt"), b"skip me").expect("write");

        let mut frames = DiskFrames::open(dir.path()).expect("open dir");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames.next_frame().unwrap().bytes, b"first");
        assert_eq!(frames.next_frame().unwrap().bytes, b"second");
        let wrapped = frames.next_frame().unwrap();
        assert_eq!(wrapped.label, "a.jpg");
        assert_eq!(wrapped.mime, "image/jpeg");
    }

    #[test]
    fn single_file_is_reread_each_time() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("camera.png");
        fs::write(&path, b"one").expect("write");
        let mut frames = DiskFrames::open(&path).expect("open file");
        assert_eq!(frames.next_frame().unwrap().bytes, b"one");
        fs::write(&path, b"two").expect("rewrite");
        let frame = frames.next_frame().unwrap();
        assert_eq!(frame.bytes, b"two");
        assert_eq!(frame.mime, "image/png");
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(matches!(
            DiskFrames::open(dir.path()),
            Err(FrameError::NoImages(_))
        ));
    }

    #[test]
    fn missing_file_fails_at_capture_time() {
        let mut frames = DiskFrames::open("does/not/exist.jpg").expect("lazy open");
        assert!(matches!(frames.next_frame(), Err(FrameError::Read { .. })));
    }
}
