use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use mcpkg_core::digest::{Algo, Digest};
use mcpkg_core::McError;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::NetClient;
use crate::error::NetError;

/// Outcome of one completed fetch, matching the original `McPkgNetDlResult`
/// fields a caller inspects after a future resolves.
#[derive(Debug, Clone)]
pub struct DlResult {
    pub http_code: u16,
    pub bytes_written: u64,
    pub outfile: PathBuf,
}

/// Configuration for [`Downloader::new`]: how many workers pull from the
/// shared queue, how deep the queue is before `fetch` rejects new work, and
/// where output files land.
#[derive(Debug, Clone)]
pub struct DownloaderCfg {
    pub parallel: usize,
    pub queue: usize,
    pub download_dir: Option<PathBuf>,
}

impl Default for DownloaderCfg {
    fn default() -> Self {
        DownloaderCfg {
            parallel: 4,
            queue: 16,
            download_dir: None,
        }
    }
}

struct Task {
    path: String,
    query: Option<String>,
    out_name: String,
    expected_digest: Option<Digest>,
    reply: oneshot::Sender<Result<DlResult, McError>>,
}

/// Handle to one in-flight or completed fetch. Consuming `wait` by value
/// means a second wait is a compile error, not a runtime misuse to guard
/// against.
pub struct DownloadFuture {
    rx: oneshot::Receiver<Result<DlResult, McError>>,
}

impl DownloadFuture {
    /// Wait for the result. `timeout == Duration::ZERO` waits indefinitely,
    /// matching the original's `timeout_ms == 0` convention.
    pub async fn wait(self, timeout: Duration) -> Result<DlResult, McError> {
        if timeout.is_zero() {
            self.rx
                .await
                .unwrap_or_else(|_| Err(NetError::WorkerLost.into()))
        } else {
            match tokio::time::timeout(timeout, self.rx).await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(NetError::WorkerLost.into()),
                Err(_) => Err(McError::Timeout),
            }
        }
    }
}

enum StreamingHash {
    Sha1(sha1_smol::Sha1),
    Sha256(sha2::Sha256),
    Sha512(sha2::Sha512),
    Md5(md5::Md5),
}

impl StreamingHash {
    fn for_algo(algo: Algo) -> Self {
        match algo {
            Algo::Sha1 => StreamingHash::Sha1(sha1_smol::Sha1::new()),
            Algo::Sha256 => StreamingHash::Sha256(sha2::Digest::new()),
            Algo::Sha512 => StreamingHash::Sha512(sha2::Digest::new()),
            Algo::Md5 => StreamingHash::Md5(md5::Digest::new()),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            StreamingHash::Sha1(h) => h.update(chunk),
            StreamingHash::Sha256(h) => sha2::Digest::update(h, chunk),
            StreamingHash::Sha512(h) => sha2::Digest::update(h, chunk),
            StreamingHash::Md5(h) => md5::Digest::update(h, chunk),
        }
    }

    fn finish_hex(self) -> String {
        match self {
            StreamingHash::Sha1(h) => h.digest().to_string(),
            StreamingHash::Sha256(h) => hex_encode(&sha2::Digest::finalize(h)),
            StreamingHash::Sha512(h) => hex_encode(&sha2::Digest::finalize(h)),
            StreamingHash::Md5(h) => hex_encode(&md5::Digest::finalize(h)),
        }
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// A bounded worker pool fetching packages over HTTP. Closing the
/// downloader (dropping it) closes the task channel; workers observe the
/// closed channel at their next receive and exit without aborting whatever
/// request they are already in the middle of.
pub struct Downloader {
    tx: mpsc::Sender<Task>,
    workers: Vec<JoinHandle<()>>,
}

impl Downloader {
    pub fn new(client: NetClient, cfg: DownloaderCfg) -> Self {
        let (tx, rx) = mpsc::channel(cfg.queue.max(1));
        let rx = Arc::new(AsyncMutex::new(rx));
        let client = Arc::new(client);
        let download_dir = Arc::new(cfg.download_dir.unwrap_or_else(|| PathBuf::from(".")));

        let mut workers = Vec::with_capacity(cfg.parallel.max(1));
        for _ in 0..cfg.parallel.max(1) {
            let rx = Arc::clone(&rx);
            let client = Arc::clone(&client);
            let download_dir = Arc::clone(&download_dir);
            workers.push(tokio::spawn(worker_loop(rx, client, download_dir)));
        }

        Downloader { tx, workers }
    }

    /// Enqueue a fetch; fails immediately (no waiting) if the queue is full
    /// or the downloader is shutting down.
    pub fn fetch(
        &self,
        path: impl Into<String>,
        query: Option<String>,
        out_name: impl Into<String>,
    ) -> Result<DownloadFuture, McError> {
        self.fetch_checked(path, query, out_name, None)
    }

    /// Like [`Downloader::fetch`], additionally verifying the downloaded
    /// bytes against `expected` once the body is fully written.
    pub fn fetch_checked(
        &self,
        path: impl Into<String>,
        query: Option<String>,
        out_name: impl Into<String>,
        expected: Option<Digest>,
    ) -> Result<DownloadFuture, McError> {
        let path = path.into();
        let out_name = out_name.into();
        if path.is_empty() {
            return Err(McError::InvalidArgument("path must not be empty".into()));
        }
        if out_name.is_empty() {
            return Err(McError::InvalidArgument("out_name must not be empty".into()));
        }

        let (reply, rx) = oneshot::channel();
        let task = Task {
            path,
            query,
            out_name,
            expected_digest: expected,
            reply,
        };
        debug!(path = %task.path, "enqueue fetch");
        self.tx.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => McError::from(NetError::QueueFull),
            mpsc::error::TrySendError::Closed(_) => McError::from(NetError::ShuttingDown),
        })?;
        Ok(DownloadFuture { rx })
    }

    /// Stop accepting new work and wait for in-flight workers to drain.
    pub async fn shutdown(self) {
        drop(self.tx);
        for w in self.workers {
            let _ = w.await;
        }
    }
}

async fn worker_loop(
    rx: Arc<AsyncMutex<mpsc::Receiver<Task>>>,
    client: Arc<NetClient>,
    download_dir: Arc<PathBuf>,
) {
    loop {
        let task = {
            let mut guard = rx.lock().await;
            guard.recv().await
        };
        let Some(task) = task else { break };
        let out_name = task.out_name.clone();
        let result = run_fetch(&client, &download_dir, &task).await;
        if let Err(e) = &result {
            warn!(out_name = %out_name, error = %e, "fetch failed");
        }
        let _ = task.reply.send(result);
    }
}

async fn run_fetch(
    client: &NetClient,
    download_dir: &Path,
    task: &Task,
) -> Result<DlResult, McError> {
    let url = client.resolve_url(&task.path, task.query.as_deref());
    let outfile = download_dir.join(&task.out_name);

    let fut = client.http().get(&url).send();
    let response = tokio::time::timeout(client.operation_timeout(), fut)
        .await
        .map_err(|_| McError::Timeout)?
        .map_err(NetError::Request)?;

    let http_code = response.status().as_u16();
    if !response.status().is_success() {
        return Err(NetError::BadStatus(http_code).into());
    }

    tokio::fs::create_dir_all(download_dir)
        .await
        .map_err(|source| NetError::Io {
            path: download_dir.to_path_buf(),
            source,
        })?;

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!("{}.part-", task.out_name))
        .tempfile_in(download_dir)
        .map_err(|source| NetError::Io {
            path: download_dir.to_path_buf(),
            source,
        })?;
    let tmp_path = tmp.path().to_path_buf();

    let mut file = tokio::fs::File::from_std(
        tmp.as_file_mut()
            .try_clone()
            .map_err(|source| NetError::Io {
                path: tmp_path.clone(),
                source,
            })?,
    );

    let mut hasher = task.expected_digest.as_ref().map(|d| StreamingHash::for_algo(d.algo));
    let mut bytes_written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk: Bytes = chunk.map_err(NetError::Request)?;
        if let Some(h) = &mut hasher {
            h.update(&chunk);
        }
        file.write_all(&chunk).await.map_err(|source| NetError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        bytes_written += chunk.len() as u64;
    }
    file.flush().await.map_err(|source| NetError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    drop(file);

    if let (Some(hasher), Some(expected)) = (hasher, &task.expected_digest) {
        let actual = hasher.finish_hex();
        if !actual.eq_ignore_ascii_case(&expected.hex) {
            return Err(NetError::DigestMismatch {
                expected: expected.hex.clone(),
                actual,
            }
            .into());
        }
    }

    tmp.persist(&outfile)
        .map_err(|e| NetError::Io {
            path: outfile.clone(),
            source: e.error,
        })?;

    Ok(DlResult {
        http_code,
        bytes_written,
        outfile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn downloader_for(server: &MockServer, dir: &Path) -> Downloader {
        let cfg = crate::client::NetClientCfg::new(server.uri());
        let client = NetClient::new(&cfg).unwrap();
        Downloader::new(
            client,
            DownloaderCfg {
                parallel: 2,
                queue: 4,
                download_dir: Some(dir.to_path_buf()),
            },
        )
    }

    #[tokio::test]
    async fn empty_path_or_out_name_is_rejected_before_enqueue() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let dl = downloader_for(&server, dir.path()).await;

        let err = dl.fetch("", None, "out.txt").unwrap_err();
        assert!(matches!(err, McError::InvalidArgument(_)));

        let err = dl.fetch("/rfc/rfc9110.txt", None, "").unwrap_err();
        assert!(matches!(err, McError::InvalidArgument(_)));

        dl.shutdown().await;
    }

    #[tokio::test]
    async fn successful_fetch_writes_file_and_reports_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rfc/rfc9110.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello rfc"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dl = downloader_for(&server, dir.path()).await;

        let fut = dl
            .fetch("/rfc/rfc9110.txt", None, "out.txt")
            .unwrap();
        let result = fut.wait(Duration::from_secs(5)).await.unwrap();

        assert_eq!(result.http_code, 200);
        assert_eq!(result.bytes_written, "hello rfc".len() as u64);
        assert!(result.outfile.exists());
        dl.shutdown().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dl = downloader_for(&server, dir.path()).await;

        let fut = dl.fetch("/missing.txt", None, "missing.txt").unwrap();
        let err = fut.wait(Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, McError::Protocol(_)));
        dl.shutdown().await;
    }

    #[tokio::test]
    async fn digest_mismatch_is_rejected_and_no_file_left_behind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pkg.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not the real bytes"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dl = downloader_for(&server, dir.path()).await;

        let wrong = Digest::new(Algo::Sha256, "0".repeat(64));
        let fut = dl
            .fetch_checked("/pkg.jar", None, "pkg.jar", Some(wrong))
            .unwrap();
        let err = fut.wait(Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, McError::Protocol(_)));
        assert!(!dir.path().join("pkg.jar").exists());
        dl.shutdown().await;
    }

    #[tokio::test]
    async fn queue_full_rejects_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cfg = crate::client::NetClientCfg::new(server.uri());
        let client = NetClient::new(&cfg).unwrap();
        let dl = Downloader::new(
            client,
            DownloaderCfg {
                parallel: 1,
                queue: 1,
                download_dir: Some(dir.path().to_path_buf()),
            },
        );

        // First two occupy the one worker slot and the one queue slot.
        let _f1 = dl.fetch("/a", None, "a").unwrap();
        let _f2 = dl.fetch("/b", None, "b").unwrap();
        let err = dl.fetch("/c", None, "c").unwrap_err();
        assert!(matches!(err, McError::RateLimit));
    }
}
