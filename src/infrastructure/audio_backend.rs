//! Simulated audio backend.
//!
//! Stands in for the platform player: setup takes a configurable delay and
//! can be told to fail; playback only moves flags and logs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{AudioSession, Track};

/// [`AudioSession`] that produces no sound.
pub struct SimulatedAudioSession {
    setup_delay: Duration,
    fail_setup: bool,
    queue: Mutex<Vec<Track>>,
    playing: AtomicBool,
    disposed: AtomicBool,
    dispose_calls: AtomicUsize,
}

impl SimulatedAudioSession {
    #[must_use]
    pub fn new(setup_delay: Duration) -> Self {
        Self {
            setup_delay,
            fail_setup: false,
            queue: Mutex::new(Vec::new()),
            playing: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            dispose_calls: AtomicUsize::new(0),
        }
    }

    /// Make `setup()` reject.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail_setup = true;
        self
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn dispose_calls(&self) -> usize {
        self.dispose_calls.load(Ordering::SeqCst)
    }

    /// Titles of queued tracks.
    #[must_use]
    pub fn queued(&self) -> Vec<String> {
        self.queue.lock().iter().map(|t| t.title.clone()).collect()
    }
}

#[async_trait]
impl AudioSession for SimulatedAudioSession {
    async fn setup(&self) -> anyhow::Result<()> {
        tokio::time::sleep(self.setup_delay).await;
        if self.fail_setup {
            anyhow::bail!("simulated player refused to initialize");
        }
        tracing::debug!("Simulated player ready");
        Ok(())
    }

    fn enqueue(&self, track: Track) {
        tracing::debug!(title = %track.title, url = %track.url, "Track queued");
        self.queue.lock().push(track);
    }

    async fn play(&self) -> anyhow::Result<()> {
        if self.is_disposed() {
            anyhow::bail!("player already released");
        }
        self.playing.store(true, Ordering::SeqCst);
        tracing::info!("♪ playing");
        Ok(())
    }

    async fn pause(&self) -> anyhow::Result<()> {
        self.playing.store(false, Ordering::SeqCst);
        tracing::info!("♪ paused");
        Ok(())
    }

    fn dispose(&self) {
        self.dispose_calls.fetch_add(1, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
        self.disposed.store(true, Ordering::SeqCst);
        self.queue.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setup_and_playback_flags() {
        let session = SimulatedAudioSession::new(Duration::ZERO);
        session.setup().await.unwrap();
        session.enqueue(Track {
            id: "t".into(),
            title: "Theme".into(),
            url: "asset://theme".into(),
        });
        session.play().await.unwrap();
        assert!(session.is_playing());
        assert_eq!(session.queued(), vec!["Theme".to_string()]);

        session.dispose();
        assert!(!session.is_playing());
        assert!(session.play().await.is_err());
    }

    #[tokio::test]
    async fn test_failing_setup() {
        let session = SimulatedAudioSession::new(Duration::ZERO).failing();
        assert!(session.setup().await.is_err());
    }
}
