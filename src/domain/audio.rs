//! Audio session state machine.
//!
//! Three sources race to drive the session: setup completion, the user's
//! mute toggle, and app lifecycle transitions. Each event reconciles
//! against the recorded intent rather than against the other sources.
//!
//! ```text
//! Uninitialized -> SettingUp -> Ready <-> Playing <-> Paused
//!        any state --(unmount)--> Disposed
//! ```
//!
//! [`AudioMachine::handle`] is pure: it returns the side effects the caller
//! has to perform on the real session.

use serde::Serialize;

use super::models::AppLifecycle;

/// Lifecycle state of the audio session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AudioState {
    #[default]
    Uninitialized,
    SettingUp,
    Ready,
    Playing,
    Paused,
    /// Terminal.
    Disposed,
}

impl AudioState {
    #[must_use]
    pub const fn is_disposed(self) -> bool {
        matches!(self, Self::Disposed)
    }
}

impl std::fmt::Display for AudioState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::SettingUp => "setting-up",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    Mount,
    /// Setup finished for the mount identified by `generation`.
    SetupSucceeded { generation: u64 },
    SetupFailed { generation: u64, reason: String },
    /// User mute toggle; `true` means music on.
    Toggle(bool),
    Lifecycle(AppLifecycle),
    /// `play()` was rejected by the backend.
    PlaybackFailed { reason: String },
    Unmount,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEffect {
    /// Run `setup()` + enqueue, tagging completion with `generation`.
    BeginSetup { generation: u64 },
    Play,
    Pause,
    Dispose,
    /// Send a failure to the observability sink.
    ReportFailure { reason: String },
}

/// Authoritative audio state plus recorded intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioMachine {
    state: AudioState,
    intent: bool,
    generation: u64,
}

impl AudioMachine {
    /// Create an unmounted machine with the given initial intent.
    #[must_use]
    pub const fn new(intent: bool) -> Self {
        Self {
            state: AudioState::Uninitialized,
            intent,
            generation: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> AudioState {
        self.state
    }

    /// Last requested on/off.
    #[must_use]
    pub const fn intent(&self) -> bool {
        self.intent
    }

    /// Generation of the current mount.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply one event and return the effects to run, in order.
    pub fn handle(&mut self, event: AudioEvent) -> Vec<AudioEffect> {
        use AudioState as S;

        let before = self.state;
        let effects = match event {
            AudioEvent::Mount => {
                if self.state == S::Uninitialized {
                    self.generation += 1;
                    self.state = S::SettingUp;
                    vec![AudioEffect::BeginSetup {
                        generation: self.generation,
                    }]
                } else {
                    Vec::new()
                }
            }
            AudioEvent::SetupSucceeded { generation } => {
                if self.is_pending(generation) {
                    self.state = S::Ready;
                    self.reconcile_to_intent()
                } else {
                    tracing::debug!(generation, state = %self.state, "Ignoring stale setup completion");
                    Vec::new()
                }
            }
            AudioEvent::SetupFailed { generation, reason } => {
                if self.is_pending(generation) {
                    self.state = S::Disposed;
                    vec![AudioEffect::ReportFailure { reason }, AudioEffect::Dispose]
                } else {
                    tracing::debug!(generation, state = %self.state, "Ignoring stale setup failure");
                    Vec::new()
                }
            }
            AudioEvent::Toggle(on) => {
                self.intent = on;
                match (self.state, on) {
                    (S::Ready | S::Paused, true) => {
                        self.state = S::Playing;
                        vec![AudioEffect::Play]
                    }
                    (S::Playing, false) => {
                        self.state = S::Paused;
                        vec![AudioEffect::Pause]
                    }
                    _ => Vec::new(),
                }
            }
            AudioEvent::Lifecycle(AppLifecycle::Foreground) => {
                if matches!(self.state, S::Ready | S::Paused) {
                    self.reconcile_to_intent()
                } else {
                    Vec::new()
                }
            }
            // Backgrounding leaves playback to the OS audio session.
            AudioEvent::Lifecycle(AppLifecycle::Background) => Vec::new(),
            AudioEvent::PlaybackFailed { reason } => {
                if self.state == S::Playing {
                    self.state = S::Paused;
                }
                vec![AudioEffect::ReportFailure { reason }]
            }
            AudioEvent::Unmount => {
                if self.state == S::Disposed {
                    Vec::new()
                } else {
                    self.state = S::Disposed;
                    vec![AudioEffect::Dispose]
                }
            }
        };

        if before != self.state {
            tracing::debug!(from = %before, to = %self.state, intent = self.intent, "Audio state transition");
        }

        effects
    }

    const fn is_pending(&self, generation: u64) -> bool {
        matches!(self.state, AudioState::SettingUp) && generation == self.generation
    }

    fn reconcile_to_intent(&mut self) -> Vec<AudioEffect> {
        if self.intent {
            self.state = AudioState::Playing;
            vec![AudioEffect::Play]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted(intent: bool) -> (AudioMachine, u64) {
        let mut machine = AudioMachine::new(intent);
        let effects = machine.handle(AudioEvent::Mount);
        assert_eq!(effects, vec![AudioEffect::BeginSetup { generation: 1 }]);
        let generation = machine.generation();
        (machine, generation)
    }

    #[test]
    fn test_toggle_on_before_setup_plays_once_ready() {
        let (mut m, generation) = mounted(false);
        assert!(m.handle(AudioEvent::Toggle(true)).is_empty());
        assert_eq!(m.state(), AudioState::SettingUp);

        let effects = m.handle(AudioEvent::SetupSucceeded { generation });
        assert_eq!(effects, vec![AudioEffect::Play]);
        assert_eq!(m.state(), AudioState::Playing);
    }

    #[test]
    fn test_toggle_off_before_setup_stays_ready() {
        let (mut m, generation) = mounted(true);
        m.handle(AudioEvent::Toggle(false));

        assert!(m.handle(AudioEvent::SetupSucceeded { generation }).is_empty());
        assert_eq!(m.state(), AudioState::Ready);
    }

    #[test]
    fn test_toggle_between_playing_and_paused() {
        let (mut m, generation) = mounted(true);
        m.handle(AudioEvent::SetupSucceeded { generation });

        assert_eq!(m.handle(AudioEvent::Toggle(false)), vec![AudioEffect::Pause]);
        assert_eq!(m.state(), AudioState::Paused);
        assert_eq!(m.handle(AudioEvent::Toggle(true)), vec![AudioEffect::Play]);
        assert_eq!(m.state(), AudioState::Playing);
        // Repeating the same intent is a no-op.
        assert!(m.handle(AudioEvent::Toggle(true)).is_empty());
    }

    #[test]
    fn test_setup_failure_disposes_and_reports() {
        let (mut m, generation) = mounted(true);
        let effects = m.handle(AudioEvent::SetupFailed {
            generation,
            reason: "no output device".into(),
        });
        assert_eq!(
            effects,
            vec![
                AudioEffect::ReportFailure {
                    reason: "no output device".into()
                },
                AudioEffect::Dispose
            ]
        );
        assert_eq!(m.state(), AudioState::Disposed);
        assert!(m.handle(AudioEvent::Toggle(true)).is_empty());
    }

    #[test]
    fn test_unmount_during_setup_ignores_late_completion() {
        let (mut m, generation) = mounted(true);
        assert_eq!(m.handle(AudioEvent::Unmount), vec![AudioEffect::Dispose]);
        assert_eq!(m.state(), AudioState::Disposed);

        assert!(m.handle(AudioEvent::SetupSucceeded { generation }).is_empty());
        assert!(m
            .handle(AudioEvent::SetupFailed {
                generation,
                reason: "late".into()
            })
            .is_empty());
        assert_eq!(m.state(), AudioState::Disposed);
        assert!(m.handle(AudioEvent::Unmount).is_empty());
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let (mut m, generation) = mounted(true);
        assert!(m
            .handle(AudioEvent::SetupSucceeded {
                generation: generation + 7
            })
            .is_empty());
        assert_eq!(m.state(), AudioState::SettingUp);
    }

    #[test]
    fn test_background_does_not_pause_but_foreground_reconciles() {
        let (mut m, generation) = mounted(false);
        m.handle(AudioEvent::SetupSucceeded { generation });
        assert_eq!(m.state(), AudioState::Ready);

        assert!(m
            .handle(AudioEvent::Lifecycle(AppLifecycle::Background))
            .is_empty());
        // Intent is off, so foreground leaves it alone.
        assert!(m
            .handle(AudioEvent::Lifecycle(AppLifecycle::Foreground))
            .is_empty());

        m.handle(AudioEvent::Toggle(true));
        assert!(m
            .handle(AudioEvent::Lifecycle(AppLifecycle::Background))
            .is_empty());
        assert_eq!(m.state(), AudioState::Playing);
    }

    #[test]
    fn test_foreground_resumes_after_playback_failure() {
        let (mut m, generation) = mounted(true);
        m.handle(AudioEvent::SetupSucceeded { generation });
        m.handle(AudioEvent::PlaybackFailed {
            reason: "interrupted".into(),
        });
        assert_eq!(m.state(), AudioState::Paused);
        assert!(m.intent());

        let effects = m.handle(AudioEvent::Lifecycle(AppLifecycle::Foreground));
        assert_eq!(effects, vec![AudioEffect::Play]);
        assert_eq!(m.state(), AudioState::Playing);
    }

    #[test]
    fn test_mount_only_once() {
        let (mut m, _) = mounted(true);
        assert!(m.handle(AudioEvent::Mount).is_empty());
        assert_eq!(m.generation(), 1);
    }
}
