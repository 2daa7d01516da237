use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use image::DynamicImage;
use tracing::{debug, error};

use crate::error::{Result, SegmeterError};

/// Identifies one load request; only the newest one is applied.
pub type LoadGeneration = u64;

pub enum LoadEvent {
    Decoded {
        generation: LoadGeneration,
        path: PathBuf,
        image: DynamicImage,
    },
    Failed {
        generation: LoadGeneration,
        error: SegmeterError,
    },
}

/// Decodes images on worker threads and hands them back to the frame loop.
pub struct ImageLoader {
    tx: Sender<LoadEvent>,
    rx: Receiver<LoadEvent>,
}

impl Default for ImageLoader {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel::<LoadEvent>();
        Self { tx, rx }
    }
}

impl ImageLoader {
    pub fn request(&self, generation: LoadGeneration, path: PathBuf) {
        let tx = self.tx.clone();
        debug!(generation, path = %path.display(), "decoding image");
        let spawned = thread::Builder::new()
            .name("image-decode".to_string())
            .spawn(move || {
                let event = match decode(&path) {
                    Ok(image) => LoadEvent::Decoded {
                        generation,
                        path,
                        image,
                    },
                    Err(error) => LoadEvent::Failed { generation, error },
                };
                // The receiver only goes away when the app shuts down.
                let _ = tx.send(event);
            });
        if let Err(err) = spawned {
            error!("cannot spawn decode thread: {err}");
        }
    }

    pub fn try_recv(&self) -> Option<LoadEvent> {
        self.rx.try_recv().ok()
    }
}

pub fn decode(path: &Path) -> Result<DynamicImage> {
    let image = image::open(path).map_err(|source| SegmeterError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    if image.width() == 0 || image.height() == 0 {
        return Err(SegmeterError::EmptyImage {
            path: path.to_path_buf(),
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    use image::{DynamicImage, RgbaImage};

    use super::{decode, ImageLoader, LoadEvent};
    use crate::error::SegmeterError;

    fn wait_for(loader: &ImageLoader) -> LoadEvent {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(event) = loader.try_recv() {
                return event;
            }
            assert!(Instant::now() < deadline, "decode thread did not answer");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn temp_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!("segmeter-{}-{name}.png", std::process::id()));
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([10, 20, 30, 255]),
        ))
        .save(&path)
        .expect("write test image");
        path
    }

    #[test]
    fn decode_missing_file_is_an_error() {
        let err = decode(&PathBuf::from("/definitely/not/here.png")).expect_err("missing file");
        assert!(matches!(err, SegmeterError::Decode { .. }));
    }

    #[test]
    fn loader_delivers_decoded_image() {
        let path = temp_png("loader", 12, 7);
        let loader = ImageLoader::default();
        loader.request(3, path.clone());

        match wait_for(&loader) {
            LoadEvent::Decoded {
                generation, image, ..
            } => {
                assert_eq!(generation, 3);
                assert_eq!((image.width(), image.height()), (12, 7));
            }
            LoadEvent::Failed { error, .. } => panic!("unexpected failure: {error}"),
        }
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn loader_reports_failures() {
        let loader = ImageLoader::default();
        loader.request(1, PathBuf::from("/definitely/not/here.png"));
        assert!(matches!(
            wait_for(&loader),
            LoadEvent::Failed { generation: 1, .. }
        ));
    }
}
