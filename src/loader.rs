use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use exif::{In, Reader, Tag, Value};
use log::{debug, error, warn};

use crate::error::SlideshowError;
use crate::slide::SlideId;

pub struct LoadRequest {
    pub id: SlideId,
    pub source: PathBuf,
}

/// Raw file contents read off the main thread. Decoding into a texture has
/// to happen on the render thread.
#[derive(Debug)]
pub struct FetchedImage {
    pub id: SlideId,
    pub source: PathBuf,
    pub bytes: Vec<u8>,
    pub extension: String,
    /// EXIF orientation tag, 1 when absent
    pub orientation: u16,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(FetchedImage),
    Failed { id: SlideId, error: SlideshowError },
}

/// Reads slide files on worker threads and hands the results back to the
/// frame loop through a channel.
pub struct ImageLoader {
    results: Receiver<FetchOutcome>,
    outstanding: usize,
    workers: Vec<JoinHandle<()>>,
}

impl ImageLoader {
    pub fn spawn(requests: Vec<LoadRequest>, threads: usize) -> Self {
        let outstanding = requests.len();
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<FetchOutcome>();

        for request in requests {
            // The receiver is alive until this function returns
            let _ = job_tx.send(request);
        }
        drop(job_tx);

        let mut workers = Vec::new();
        for i in 0..threads.clamp(1, outstanding.max(1)) {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            match thread::Builder::new()
                .name(format!("image-loader-{i}"))
                .spawn(move || work(jobs, results))
            {
                Ok(handle) => workers.push(handle),
                Err(e) => error!("Could not start image loader thread: {}", e),
            }
        }

        // Nothing could be spawned: read everything here rather than never
        if workers.is_empty() {
            warn!("Loading {} images on the main thread", outstanding);
            work(job_rx, result_tx);
        }

        Self {
            results: result_rx,
            outstanding,
            workers,
        }
    }

    /// Finished fetches, without blocking.
    pub fn poll(&mut self) -> Vec<FetchOutcome> {
        let ready: Vec<FetchOutcome> = self.results.try_iter().collect();
        self.outstanding = self.outstanding.saturating_sub(ready.len());
        if self.outstanding == 0 && !self.workers.is_empty() {
            for worker in self.workers.drain(..) {
                let _ = worker.join();
            }
            debug!("Image loader finished");
        }
        ready
    }

    pub fn is_finished(&self) -> bool {
        self.outstanding == 0
    }

    #[cfg(test)]
    fn next(&mut self, timeout: std::time::Duration) -> Option<FetchOutcome> {
        let outcome = self.results.recv_timeout(timeout).ok()?;
        self.outstanding = self.outstanding.saturating_sub(1);
        Some(outcome)
    }
}

fn work(jobs: Receiver<LoadRequest>, results: Sender<FetchOutcome>) {
    for request in jobs.iter() {
        if results.send(fetch(request)).is_err() {
            // Nobody is listening anymore
            break;
        }
    }
}

pub fn fetch(request: LoadRequest) -> FetchOutcome {
    let LoadRequest { id, source } = request;
    let bytes = match fs::read(&source) {
        Ok(bytes) => bytes,
        Err(error) => {
            return FetchOutcome::Failed {
                id,
                error: SlideshowError::Io { path: source, error },
            };
        }
    };

    let extension = source
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    // EXIF only works reliably for JPEG
    let orientation = if extension == "jpg" || extension == "jpeg" {
        read_orientation(&bytes).unwrap_or_else(|e| {
            debug!("No EXIF orientation for {}: {}", source.display(), e);
            1
        })
    } else {
        1
    };

    FetchOutcome::Fetched(FetchedImage {
        id,
        source,
        bytes,
        extension,
        orientation,
    })
}

pub fn read_orientation(bytes: &[u8]) -> Result<u16, exif::Error> {
    let exif = Reader::new().read_from_container(&mut Cursor::new(bytes))?;
    let orientation = exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| match &field.value {
            Value::Short(values) => values.first().copied(),
            _ => None,
        })
        .unwrap_or(1);
    Ok(orientation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn collect(loader: &mut ImageLoader, n: usize) -> Vec<FetchOutcome> {
        (0..n)
            .map(|_| loader.next(Duration::from_secs(5)).expect("loader result"))
            .collect()
    }

    #[test]
    fn reads_files_and_reports_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.PNG");
        fs::write(&present, b"not really a png").unwrap();
        let missing = dir.path().join("missing.jpg");

        let mut loader = ImageLoader::spawn(
            vec![
                LoadRequest { id: SlideId(0), source: present },
                LoadRequest { id: SlideId(1), source: missing },
            ],
            2,
        );
        let mut outcomes = collect(&mut loader, 2);
        assert!(loader.is_finished());

        outcomes.sort_by_key(|o| match o {
            FetchOutcome::Fetched(image) => image.id,
            FetchOutcome::Failed { id, .. } => *id,
        });
        match &outcomes[0] {
            FetchOutcome::Fetched(image) => {
                assert_eq!(image.bytes, b"not really a png");
                assert_eq!(image.extension, "png");
                assert_eq!(image.orientation, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            &outcomes[1],
            FetchOutcome::Failed { id: SlideId(1), error: SlideshowError::Io { .. } }
        ));
    }

    #[test]
    fn jpeg_without_exif_defaults_to_upright() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        fs::write(&path, [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

        match fetch(LoadRequest { id: SlideId(4), source: path }) {
            FetchOutcome::Fetched(image) => assert_eq!(image.orientation, 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_request_list_finishes_immediately() {
        let mut loader = ImageLoader::spawn(Vec::new(), 4);
        assert!(loader.is_finished());
        assert!(loader.poll().is_empty());
    }

    #[test]
    fn poll_drains_everything_eventually() {
        let dir = tempfile::tempdir().unwrap();
        let requests = (0..6)
            .map(|i| {
                let path = dir.path().join(format!("{i}.bmp"));
                fs::write(&path, [i as u8]).unwrap();
                LoadRequest { id: SlideId(i), source: path }
            })
            .collect();
        let mut loader = ImageLoader::spawn(requests, 3);

        let mut seen = 0;
        for _ in 0..500 {
            seen += loader.poll().len();
            if loader.is_finished() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(seen, 6);
        assert!(loader.is_finished());
    }
}
