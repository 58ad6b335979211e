//! Off-thread sample decoding and publishing.
//!
//! [`BackgroundLoader`] owns one worker thread. Requests arrive over a
//! channel, the worker decodes the whole file into memory, publishes it into
//! the shared [`BufferHotSwap`] and reports back through the request's
//! [`LoadTask`]. The worker is the only thread that ever publishes, so the
//! slot's single-writer rule holds no matter how many threads ask for loads.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use symphonia::core::audio::SampleBuffer as InterleavedBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info, warn};

use super::buffer::{SampleBuffer, SampleInfo};
use super::swap::{BufferHotSwap, RetiredBuffers};

/// How often an idle worker checks for retired buffers it can release.
pub const DEFAULT_RETIRE_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: SymphoniaError,
    },
    #[error("{path} has no decodable audio track")]
    NoAudioTrack { path: PathBuf },
    #[error("{path} decoded to zero frames")]
    Empty { path: PathBuf },
    #[error("failed to start sample loader thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("sample loader worker has exited")]
    WorkerExited,
}

/// Decode an audio file completely into memory.
///
/// The buffer is named after the file stem. No streaming: arbitrarily large
/// files are read in full.
pub fn decode_file(path: &Path) -> Result<SampleBuffer, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_source(Box::new(file), path)
}

fn decode_source(source: Box<dyn MediaSource>, path: &Path) -> Result<SampleBuffer, LoadError> {
    let decode_err = |source: SymphoniaError| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let mss = MediaSourceStream::new(source, Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(decode_err)?;

    let mut format = probed.format;
    let (codec_params, track_id) = {
        let track = format
            .tracks()
            .iter()
            .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| LoadError::NoAudioTrack {
                path: path.to_path_buf(),
            })?;
        (track.codec_params.clone(), track.id)
    };

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(decode_err)?;

    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
    let mut channel_count = codec_params.channels.map(|c| c.count()).unwrap_or(0);
    let mut interleaved: Vec<f32> = Vec::new();
    let mut scratch: Option<(InterleavedBuffer<f32>, u64)> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(decode_err(err)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                warn!(path = %path.display(), reason, "skipping corrupt packet");
                continue;
            }
            Err(err) => return Err(decode_err(err)),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channel_count = spec.channels.count();

        let frames = decoded.capacity() as u64;
        if scratch.as_ref().map_or(true, |(_, capacity)| *capacity < frames) {
            scratch = Some((InterleavedBuffer::<f32>::new(frames, spec), frames));
        }
        if let Some((buffer, _)) = scratch.as_mut() {
            buffer.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(buffer.samples());
        }
    }

    let buffer = SampleBuffer::from_interleaved(&interleaved, channel_count, sample_rate);
    if buffer.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(buffer.with_name(name))
}

pub type LoadResult = Result<SampleInfo, LoadError>;

enum LoaderCommand {
    Load {
        path: PathBuf,
        responder: Sender<LoadResult>,
    },
    Publish {
        buffer: SampleBuffer,
        responder: Sender<LoadResult>,
    },
    Shutdown,
}

/// Pending result of a load request.
///
/// The result is delivered on whichever thread calls [`wait`](Self::wait) or
/// [`try_take`](Self::try_take); the worker never calls back into user code.
#[derive(Debug)]
pub struct LoadTask {
    rx: Receiver<LoadResult>,
    taken: bool,
}

impl LoadTask {
    fn new() -> (Sender<LoadResult>, Self) {
        let (tx, rx) = bounded(1);
        (tx, Self { rx, taken: false })
    }

    /// Block until the worker has finished with this request.
    pub fn wait(self) -> LoadResult {
        self.rx.recv().unwrap_or(Err(LoadError::WorkerExited))
    }

    /// Like [`wait`](Self::wait) with an upper bound. `None` on timeout.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<LoadResult> {
        if self.taken {
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(result) => {
                self.taken = true;
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.taken = true;
                Some(Err(LoadError::WorkerExited))
            }
        }
    }

    /// Non-blocking poll. Yields the result exactly once.
    pub fn try_take(&mut self) -> Option<LoadResult> {
        if self.taken {
            return None;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.taken = true;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.taken = true;
                Some(Err(LoadError::WorkerExited))
            }
        }
    }
}

/// Decodes files on a dedicated thread and publishes them for playback.
pub struct BackgroundLoader {
    commands: Sender<LoaderCommand>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundLoader {
    pub fn spawn(slot: Arc<BufferHotSwap>, retire_interval: Duration) -> Result<Self, LoadError> {
        let (tx, rx) = unbounded();
        let handle = thread::Builder::new()
            .name("sample-loader".into())
            .spawn(move || worker(rx, slot, retire_interval))
            .map_err(LoadError::Spawn)?;

        Ok(Self {
            commands: tx,
            handle: Some(handle),
        })
    }

    /// Decode `path` and make it the current sample. On failure the previous
    /// sample stays current.
    pub fn load(&self, path: impl Into<PathBuf>) -> LoadTask {
        let (responder, task) = LoadTask::new();
        let path = path.into();
        info!(path = %path.display(), "queueing sample load");
        // A send failure drops the responder, which the task reports as
        // `WorkerExited`.
        let _ = self.commands.send(LoaderCommand::Load { path, responder });
        task
    }

    /// Publish an already built buffer through the same single writer.
    pub fn publish(&self, buffer: SampleBuffer) -> LoadTask {
        let (responder, task) = LoadTask::new();
        let _ = self
            .commands
            .send(LoaderCommand::Publish { buffer, responder });
        task
    }
}

impl Drop for BackgroundLoader {
    fn drop(&mut self) {
        let _ = self.commands.send(LoaderCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("sample loader thread panicked");
            }
        }
    }
}

impl std::fmt::Debug for BackgroundLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundLoader")
            .field("running", &self.handle.is_some())
            .finish()
    }
}

fn worker(rx: Receiver<LoaderCommand>, slot: Arc<BufferHotSwap>, retire_interval: Duration) {
    let mut retired = RetiredBuffers::new();

    loop {
        match rx.recv_timeout(retire_interval) {
            Ok(LoaderCommand::Load { path, responder }) => {
                let started = Instant::now();
                let result = decode_file(&path).map(|buffer| {
                    info!(
                        path = %path.display(),
                        channels = buffer.channel_count(),
                        frames = buffer.frame_count(),
                        sample_rate = buffer.sample_rate(),
                        memory_kb = buffer.memory_size() / 1024,
                        elapsed_ms = started.elapsed().as_millis(),
                        "sample decoded"
                    );
                    publish(&slot, &mut retired, buffer)
                });
                if let Err(err) = &result {
                    warn!(path = %path.display(), error = %err, "sample load failed, keeping previous sample");
                }
                let _ = responder.send(result);
            }
            Ok(LoaderCommand::Publish { buffer, responder }) => {
                let _ = responder.send(Ok(publish(&slot, &mut retired, buffer)));
            }
            Ok(LoaderCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        retired.collect();
    }

    debug!(pending = retired.len(), "sample loader stopped");
}

fn publish(slot: &BufferHotSwap, retired: &mut RetiredBuffers, buffer: SampleBuffer) -> SampleInfo {
    let info = buffer.info();
    retired.retire(slot.publish(Arc::new(buffer)));
    debug!(name = %info.name, "published sample buffer");
    info
}
