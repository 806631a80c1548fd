//! Onboarding Core - language sync, onboarding music, and the onboarding
//! carousel behind a localized mobile front end.
//!
//! The [`application`] layer holds the three controllers:
//!   - [`application::SyncBridge`] keeps the persisted language and the
//!     translation engine's locale in step without feedback loops.
//!   - [`application::AudioSessionController`] owns the onboarding music
//!     session and its setup/teardown state machine.
//!   - [`application::OnboardingCarouselController`] drives the slides and
//!     commits the onboarding flag exactly once.
//!
//! Collaborators are reached through the traits in [`domain::ports`]; the
//! [`infrastructure`] layer provides SQLite, in-memory, and simulated
//! implementations.

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
