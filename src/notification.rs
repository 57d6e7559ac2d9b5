//! Asynchronous delivery of spoken notifications.
//!
//! Speech synthesis is slow and blocking, so messages are handed to a single
//! background worker through an unbounded FIFO channel. The frame loop only
//! ever enqueues; it never waits for a message to be spoken.
//!
//! ```no_run
//! use face_guidance::notification::{create_synthesizer, NotificationChannel};
//!
//! # fn main() -> face_guidance::Result<()> {
//! let synthesizer = create_synthesizer("log", 150, 0.9)?;
//! let mut channel = NotificationChannel::spawn(synthesizer, true)?;
//!
//! channel.enqueue("Move Left")?;
//! channel.set_enabled(false); // drained but not spoken
//! channel.enqueue("Move Up")?;
//!
//! channel.join()?;
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};
use std::{
    panic::{self, AssertUnwindSafe},
    process::{Command, Stdio},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

/// Trait for speech synthesis backends
pub trait SpeechSynthesizer: Send {
    /// Speak `text`, blocking until done
    ///
    /// # Errors
    ///
    /// Returns an error if the backend failed for this message.
    fn speak(&mut self, text: &str) -> Result<()>;

    /// Get backend name
    fn name(&self) -> &str;
}

/// Backend that discards every message
pub struct SilentSynthesizer;

impl SpeechSynthesizer for SilentSynthesizer {
    fn speak(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "SilentSynthesizer"
    }
}

/// Backend that writes messages to the log instead of speaking them
pub struct LogSynthesizer;

impl SpeechSynthesizer for LogSynthesizer {
    fn speak(&mut self, text: &str) -> Result<()> {
        info!("Speaking: {text}");
        Ok(())
    }

    fn name(&self) -> &str {
        "LogSynthesizer"
    }
}

/// Backend that runs an external text-to-speech program per message
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    /// Run `program` with `args` followed by the message text
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `espeak` with the given words-per-minute rate and volume in [0, 1]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn espeak(rate: u32, volume: f64) -> Self {
        // espeak amplitude runs from 0 to 200, 100 being normal.
        let amplitude = (volume.clamp(0.0, 1.0) * 200.0).round() as u32;
        Self::new(
            "espeak",
            vec!["-s".to_string(), rate.to_string(), "-a".to_string(), amplitude.to_string()],
        )
    }

    /// macOS `say` with the given words-per-minute rate
    #[must_use]
    pub fn say(rate: u32) -> Self {
        Self::new("say", vec!["-r".to_string(), rate.to_string()])
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&mut self, text: &str) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| Error::Speech(format!("Failed to run {}: {e}", self.program)))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Speech(format!("{} exited with {status}", self.program)))
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Create a speech backend by name
///
/// # Errors
///
/// Returns an error for unknown backend names.
pub fn create_synthesizer(backend: &str, rate: u32, volume: f64) -> Result<Box<dyn SpeechSynthesizer>> {
    if let Some(program) = backend.strip_prefix("command:") {
        if program.is_empty() {
            return Err(Error::ConfigError("Speech command must not be empty".to_string()));
        }
        return Ok(Box::new(CommandSynthesizer::new(program, Vec::new())));
    }

    match backend.to_lowercase().as_str() {
        "none" | "silent" => Ok(Box::new(SilentSynthesizer)),
        "log" => Ok(Box::new(LogSynthesizer)),
        "espeak" => Ok(Box::new(CommandSynthesizer::espeak(rate, volume))),
        "say" => Ok(Box::new(CommandSynthesizer::say(rate))),
        _ => Err(Error::ConfigError(format!("Unknown speech backend: {backend}"))),
    }
}

enum Message {
    Speak(String),
    Shutdown,
}

#[derive(Default)]
struct Shared {
    enabled: AtomicBool,
    closed: AtomicBool,
    delivered: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

/// Delivery counters of a notification channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Messages handed to the synthesizer successfully
    pub delivered: u64,
    /// Messages drained while voice was disabled
    pub skipped: u64,
    /// Messages the synthesizer failed on
    pub failed: u64,
}

/// Producer handle of a notification channel, cheap to clone across threads
#[derive(Clone)]
pub struct Notifier {
    sender: Sender<Message>,
    shared: Arc<Shared>,
}

impl Notifier {
    /// Queue `text` for the speech worker
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] once the channel has been shut down.
    pub fn enqueue(&self, text: impl Into<String>) -> Result<()> {
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(Error::ChannelClosed);
        }
        self.sender
            .send(Message::Speak(text.into()))
            .map_err(|_| Error::ChannelClosed)
    }
}

/// Single-consumer speech queue with its own enable flag
pub struct NotificationChannel {
    notifier: Notifier,
    worker: Option<JoinHandle<()>>,
}

impl NotificationChannel {
    /// Start the speech worker thread
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn spawn(synthesizer: Box<dyn SpeechSynthesizer>, enabled: bool) -> Result<Self> {
        let (sender, receiver) = unbounded();
        let shared = Arc::new(Shared::default());
        shared.enabled.store(enabled, Ordering::SeqCst);

        info!("Starting speech worker with {} backend", synthesizer.name());
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("speech-worker".to_string())
            .spawn(move || run_worker(&receiver, synthesizer, &worker_shared))?;

        Ok(Self {
            notifier: Notifier { sender, shared },
            worker: Some(worker),
        })
    }

    /// Queue `text` for the speech worker
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] once the channel has been shut down.
    pub fn enqueue(&self, text: impl Into<String>) -> Result<()> {
        self.notifier.enqueue(text)
    }

    /// Producer handle usable from other threads
    #[must_use]
    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    /// Enable or disable speech; disabled messages are drained unspoken
    pub fn set_enabled(&self, enabled: bool) {
        self.notifier.shared.enabled.store(enabled, Ordering::SeqCst);
        info!("Voice {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Flip the enable flag and return the new value
    pub fn toggle(&self) -> bool {
        let enabled = !self.notifier.shared.enabled.fetch_xor(true, Ordering::SeqCst);
        info!("Voice {}", if enabled { "enabled" } else { "disabled" });
        enabled
    }

    /// Whether messages are currently spoken
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.notifier.shared.enabled.load(Ordering::SeqCst)
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.notifier.shared.closed.load(Ordering::SeqCst)
    }

    /// Messages waiting for the worker
    #[must_use]
    pub fn pending(&self) -> usize {
        self.notifier.sender.len()
    }

    /// Delivery counters so far
    #[must_use]
    pub fn stats(&self) -> ChannelStats {
        let shared = &self.notifier.shared;
        ChannelStats {
            delivered: shared.delivered.load(Ordering::SeqCst),
            skipped: shared.skipped.load(Ordering::SeqCst),
            failed: shared.failed.load(Ordering::SeqCst),
        }
    }

    /// Ask the worker to stop after the messages already queued.
    ///
    /// Later calls are no-ops. Messages enqueued afterwards are rejected.
    pub fn shutdown(&self) {
        if self.notifier.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Sending shutdown to speech worker");
        // The worker may already be gone if it panicked outside a message.
        let _ = self.notifier.sender.send(Message::Shutdown);
    }

    /// Shut down and wait for the worker to drain and exit
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread panicked.
    pub fn join(&mut self) -> Result<()> {
        self.shutdown();
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| Error::Speech("Speech worker panicked".to_string()))?;
        }
        Ok(())
    }
}

impl Drop for NotificationChannel {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(receiver: &Receiver<Message>, mut synthesizer: Box<dyn SpeechSynthesizer>, shared: &Shared) {
    for message in receiver {
        let text = match message {
            Message::Shutdown => break,
            Message::Speak(text) => text,
        };

        if !shared.enabled.load(Ordering::SeqCst) {
            debug!("Voice disabled, dropping {text:?}");
            shared.skipped.fetch_add(1, Ordering::SeqCst);
            continue;
        }

        match panic::catch_unwind(AssertUnwindSafe(|| synthesizer.speak(&text))) {
            Ok(Ok(())) => {
                shared.delivered.fetch_add(1, Ordering::SeqCst);
            }
            Ok(Err(e)) => {
                warn!("Voice error: {e}");
                shared.failed.fetch_add(1, Ordering::SeqCst);
            }
            Err(_) => {
                warn!("Speech backend {} panicked on {text:?}", synthesizer.name());
                shared.failed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
    debug!("Speech worker stopped");
}
