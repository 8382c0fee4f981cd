//! Best-effort prevention of display sleep.
//!
//! The strategy prefers a screen wake lock and falls back to a looping silent
//! audio source. Neither capability is required: every failure is logged and
//! the display keeps running without one.

pub mod system;
pub mod wav;

use crate::errors::PlatformError;
use crate::models::{KeepAwakeMode, KeepAwakeStatus};
use std::future::Future;
use tracing::{debug, info, warn};

pub use system::{AplayLoop, InhibitLock};

pub trait WakeLock {
    fn request(&mut self) -> impl Future<Output = Result<(), PlatformError>> + Send;
    fn release(&mut self);
    /// False once the platform has revoked the lock.
    fn is_held(&mut self) -> bool;
}

pub trait SilentAudio {
    fn start(&mut self) -> impl Future<Output = Result<(), PlatformError>> + Send;
    fn is_playing(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible { Visibility::Visible } else { Visibility::Hidden }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Held {
    Nothing,
    WakeLock,
    Audio,
}

pub struct KeepAwake<L, A> {
    lock: L,
    audio: A,
    held: Held,
    visibility: Visibility,
    interaction_armed: bool,
    awaiting_interaction: bool,
}

impl<L: WakeLock, A: SilentAudio> KeepAwake<L, A> {
    /// The one-time interaction retry is armed from the start.
    pub fn new(lock: L, audio: A) -> Self {
        Self {
            lock,
            audio,
            held: Held::Nothing,
            visibility: Visibility::Visible,
            interaction_armed: true,
            awaiting_interaction: false,
        }
    }

    pub async fn acquire(&mut self) -> KeepAwakeMode {
        match self.lock.request().await {
            Ok(()) => {
                info!("screen wake lock acquired");
                self.held = Held::WakeLock;
                self.awaiting_interaction = false;
                return self.mode();
            }
            Err(err) => debug!("wake lock not available ({err}), trying silent audio"),
        }

        match self.audio.start().await {
            Ok(()) => {
                info!("silent audio keepalive started");
                self.held = Held::Audio;
                self.awaiting_interaction = false;
            }
            Err(PlatformError::NeedsInteraction) => {
                debug!("silent audio needs a user interaction first");
                self.held = Held::Nothing;
                self.awaiting_interaction = self.interaction_armed;
            }
            Err(err) => {
                warn!("silent audio keepalive failed: {err}");
                self.held = Held::Nothing;
            }
        }
        self.mode()
    }

    /// First touch or click. Only the first call does anything.
    pub async fn on_user_interaction(&mut self) -> KeepAwakeMode {
        if !self.interaction_armed {
            return self.mode();
        }
        self.interaction_armed = false;
        self.awaiting_interaction = false;

        if self.is_held() {
            return self.mode();
        }
        debug!("user interaction, retrying keep-awake");
        self.acquire().await
    }

    pub async fn on_visibility_change(&mut self, visibility: Visibility) -> KeepAwakeMode {
        self.visibility = visibility;
        match visibility {
            Visibility::Hidden => {
                // Hidden pages lose their wake lock.
                if self.held == Held::WakeLock {
                    self.lock.release();
                    self.held = Held::Nothing;
                    debug!("wake lock released while hidden");
                }
                self.mode()
            }
            Visibility::Visible => {
                if self.is_held() {
                    return self.mode();
                }
                self.acquire().await
            }
        }
    }

    /// Periodic check: a handle that died while visible is re-acquired.
    pub async fn keep_alive(&mut self) -> KeepAwakeMode {
        if self.visibility != Visibility::Visible || self.held == Held::Nothing {
            return self.mode();
        }
        if self.is_held() {
            return self.mode();
        }
        debug!(held = ?self.held, "keep-awake handle lost, re-acquiring");
        self.held = Held::Nothing;
        self.acquire().await
    }

    pub fn status(&self) -> KeepAwakeStatus {
        KeepAwakeStatus {
            mode: self.mode(),
            visible: self.visibility == Visibility::Visible,
        }
    }

    fn is_held(&mut self) -> bool {
        match self.held {
            Held::Nothing => false,
            Held::WakeLock => self.lock.is_held(),
            Held::Audio => self.audio.is_playing(),
        }
    }

    fn mode(&self) -> KeepAwakeMode {
        match self.held {
            Held::WakeLock => KeepAwakeMode::WakeLock,
            Held::Audio => KeepAwakeMode::Audio,
            Held::Nothing if self.awaiting_interaction => KeepAwakeMode::AwaitingInteraction,
            Held::Nothing => KeepAwakeMode::Idle,
        }
    }
}
