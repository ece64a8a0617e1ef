use filetime::FileTime;
use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::spawn_blocking;
use tokio::time::{MissedTickBehavior, interval_at};

use crate::common::errors::ServeError;
use crate::common::{CHUNK_SIZE, MAX_CREATE_ATTEMPTS};
use crate::operations::naming::allocate_filename;

/// One file of a multipart submission.
pub struct UploadPart<R> {
    /// Already sanitized to a single path component.
    pub filename: String,
    pub size: u64,
    /// Client modification time, milliseconds since the epoch.
    pub last_modified: Option<u64>,
    pub reader: R,
}

/// Persists uploaded streams into one directory under collision-free names.
pub struct UploadIngester {
    directory: PathBuf,
    progress_interval: Duration,
}

impl UploadIngester {
    pub fn new(directory: impl Into<PathBuf>, progress_interval: Duration) -> Self {
        Self {
            directory: directory.into(),
            progress_interval: progress_interval.max(Duration::from_millis(1)),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Copy one part to disk and return where it landed.
    ///
    /// With a `progress` sender, every `progress_interval` the copy is still
    /// running a percent value is sent. A failed copy leaves the partial file
    /// in place.
    pub async fn ingest<R>(
        &self,
        mut part: UploadPart<R>,
        progress: Option<&UnboundedSender<u8>>,
    ) -> Result<PathBuf, ServeError>
    where
        R: AsyncRead + Unpin,
    {
        let start_time = Instant::now();
        let (path, mut file) = create_exclusive(&self.directory.join(&part.filename)).await?;

        let written = AtomicU64::new(0);
        let outcome = {
            let copy = copy_in_chunks(&mut part.reader, &mut file, &written);
            tokio::pin!(copy);

            let mut ticker = interval_at(
                tokio::time::Instant::now() + self.progress_interval,
                self.progress_interval,
            );
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    result = &mut copy => break result,
                    _ = ticker.tick(), if progress.is_some() => {
                        if let Some(sender) = progress {
                            let _ = sender.send(percent(written.load(Ordering::Relaxed), part.size));
                        }
                    }
                }
            }
        };
        drop(file);

        if let Err(source) = outcome {
            return Err(ServeError::Ingest { path, source });
        }

        if let Some(last_modified) = part.last_modified {
            let target = path.clone();
            let restored = spawn_blocking(move || set_last_modified_time(&target, last_modified))
                .await
                .map_err(io::Error::other)
                .and_then(|result| result);
            if let Err(err) = restored {
                warn!("Could not restore modification time of {:?}: {}", path, err);
            }
        }

        info!(duration = &*format!("{:?}", start_time.elapsed());
            "Stored upload {:?} ({} bytes)",
            path,
            written.load(Ordering::Relaxed),
        );
        Ok(path)
    }
}

fn percent(written: u64, total: u64) -> u8 {
    match total {
        0 => 100,
        total => (written.saturating_mul(100) / total).min(100) as u8,
    }
}

/// Allocate a free name and claim it with an exclusive create, retrying when
/// a concurrent upload claimed the same name first.
async fn create_exclusive(desired: &Path) -> Result<(PathBuf, File), ServeError> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        let owned = desired.to_path_buf();
        let candidate = spawn_blocking(move || allocate_filename(&owned))
            .await
            .map_err(|err| ServeError::Ingest {
                path: desired.to_path_buf(),
                source: io::Error::other(err),
            })?;

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => return Ok((candidate, file)),
            Err(err)
                if err.kind() == io::ErrorKind::AlreadyExists && attempts < MAX_CREATE_ATTEMPTS =>
            {
                warn!("{:?} was claimed concurrently, allocating again", candidate);
            }
            Err(source) => {
                return Err(ServeError::Ingest {
                    path: candidate,
                    source,
                });
            }
        }
    }
}

async fn copy_in_chunks<R, W>(reader: &mut R, writer: &mut W, written: &AtomicU64) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let read = reader.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        writer.write_all(&buffer[..read]).await?;
        written.fetch_add(read as u64, Ordering::Relaxed);
    }
    writer.flush().await
}

fn set_last_modified_time(path: &Path, last_modified_ms: u64) -> io::Result<()> {
    let mtime = FileTime::from_unix_time((last_modified_ms / 1000) as i64, 0);
    filetime::set_file_mtime(path, mtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::TempDir;
    use tokio::io::ReadBuf;
    use tokio::sync::mpsc;

    fn part(name: &str, bytes: &'static [u8]) -> UploadPart<&'static [u8]> {
        UploadPart {
            filename: name.to_string(),
            size: bytes.len() as u64,
            last_modified: None,
            reader: bytes,
        }
    }

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "gone")))
        }
    }

    #[tokio::test]
    async fn stores_content_byte_for_byte() {
        let tmp = TempDir::new().unwrap();
        let ingester = UploadIngester::new(tmp.path(), Duration::from_secs(1));
        let path = ingester.ingest(part("report.pdf", b"%PDF-1.7"), None).await.unwrap();
        assert_eq!(path, tmp.path().join("report.pdf"));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn second_upload_with_same_name_is_numbered() {
        let tmp = TempDir::new().unwrap();
        let ingester = UploadIngester::new(tmp.path(), Duration::from_secs(1));
        ingester.ingest(part("report.pdf", b"first"), None).await.unwrap();
        let second = ingester.ingest(part("report.pdf", b"second"), None).await.unwrap();
        assert_eq!(second, tmp.path().join("report (1).pdf"));
        assert_eq!(fs::read(tmp.path().join("report.pdf")).unwrap(), b"first");
        assert_eq!(fs::read(second).unwrap(), b"second");
    }

    #[tokio::test]
    async fn concurrent_uploads_never_share_a_name() {
        let tmp = TempDir::new().unwrap();
        let ingester = UploadIngester::new(tmp.path(), Duration::from_secs(1));
        let bodies: [&'static [u8]; 4] = [b"0", b"1", b"2", b"3"];
        let results = futures::future::join_all(
            bodies.iter().map(|body| ingester.ingest(part("same.txt", *body), None)),
        )
        .await;
        let mut paths: Vec<_> = results.into_iter().map(Result::unwrap).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 4);
        let mut contents: Vec<_> = paths.iter().map(|p| fs::read(p).unwrap()).collect();
        contents.sort();
        assert_eq!(contents, vec![b"0".to_vec(), b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]);
    }

    #[tokio::test]
    async fn failed_copy_keeps_partial_file() {
        let tmp = TempDir::new().unwrap();
        let ingester = UploadIngester::new(tmp.path(), Duration::from_secs(1));
        let broken = UploadPart {
            filename: "broken.bin".to_string(),
            size: 10,
            last_modified: None,
            reader: FailingReader,
        };
        let result = ingester.ingest(broken, None).await;
        assert!(matches!(result, Err(ServeError::Ingest { .. })));
        assert!(tmp.path().join("broken.bin").exists());
    }

    #[tokio::test]
    async fn missing_directory_is_an_ingest_error() {
        let tmp = TempDir::new().unwrap();
        let ingester = UploadIngester::new(tmp.path().join("nope"), Duration::from_secs(1));
        let result = ingester.ingest(part("a.txt", b"a"), None).await;
        assert!(matches!(result, Err(ServeError::Ingest { .. })));
    }

    #[tokio::test]
    async fn slow_copies_report_progress() {
        let tmp = TempDir::new().unwrap();
        let ingester = UploadIngester::new(tmp.path(), Duration::from_millis(10));
        let (mut client, server) = tokio::io::duplex(64);
        tokio::spawn(async move {
            for _ in 0..10 {
                client.write_all(&[7u8; 100]).await.unwrap();
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
        });

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let slow = UploadPart {
            filename: "slow.bin".to_string(),
            size: 1000,
            last_modified: None,
            reader: server,
        };
        let path = ingester.ingest(slow, Some(&sender)).await.unwrap();
        drop(sender);

        let mut reports = Vec::new();
        while let Some(value) = receiver.recv().await {
            reports.push(value);
        }
        assert!(!reports.is_empty());
        assert!(reports.iter().all(|value| *value <= 100));
        assert!(reports.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(fs::read(path).unwrap().len(), 1000);
    }

    #[tokio::test]
    async fn fast_copies_stay_silent() {
        let tmp = TempDir::new().unwrap();
        let ingester = UploadIngester::new(tmp.path(), Duration::from_secs(5));
        let (sender, mut receiver) = mpsc::unbounded_channel();
        ingester.ingest(part("quick.txt", b"quick"), Some(&sender)).await.unwrap();
        drop(sender);
        assert_eq!(receiver.recv().await, None);
    }

    #[tokio::test]
    async fn restores_client_modification_time() {
        let tmp = TempDir::new().unwrap();
        let ingester = UploadIngester::new(tmp.path(), Duration::from_secs(1));
        let mut dated = part("old.txt", b"old");
        dated.last_modified = Some(1_000_000_000_000);
        let path = ingester.ingest(dated, None).await.unwrap();
        let metadata = fs::metadata(path).unwrap();
        assert_eq!(
            FileTime::from_last_modification_time(&metadata).unix_seconds(),
            1_000_000_000
        );
    }

    #[test]
    fn percent_is_bounded() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(50, 200), 25);
        assert_eq!(percent(300, 200), 100);
    }
}
