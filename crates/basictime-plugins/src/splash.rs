//! Splash pictures shown before the title screen.
//!
//! [`boot_scene`] decides where the engine goes after boot. When the splash
//! runs, [`SplashSequence`] is advanced once per frame: each picture fades
//! in, stays for the splash duration, and fades out, then the next picture
//! follows. After the last picture the sequence is finished and the engine
//! moves to the title.

use basictime_core::config::{BootMode, SplashConfig};
use basictime_core::game::Scene;
use tracing::debug;

/// Scene to enter after boot.
///
/// Battle tests go straight to battle and event tests to the map. Otherwise
/// the splash runs when it is enabled and has pictures, else the title.
pub fn boot_scene(config: &SplashConfig, mode: BootMode) -> Scene {
    match mode {
        BootMode::BattleTest => Scene::Battle,
        BootMode::EventTest => Scene::Map,
        BootMode::Normal if config.enabled && has_pictures(config) => Scene::Splash,
        BootMode::Normal => Scene::Title,
    }
}

fn has_pictures(config: &SplashConfig) -> bool {
    config.pictures.iter().any(|p| !p.trim().is_empty())
}

/// Stage of the current picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplashPhase {
    /// Picture fading in.
    FadeIn,
    /// Picture fully shown.
    Show,
    /// Picture fading out.
    FadeOut,
    /// All pictures shown.
    Done,
}

/// Frame-driven splash state machine.
#[derive(Debug, Clone)]
pub struct SplashSequence {
    pictures: Vec<String>,
    index: usize,
    phase: SplashPhase,
    remaining: u32,
    fade_duration: u32,
    splash_duration: u32,
}

impl SplashSequence {
    /// Start the sequence at the first picture. Blank picture names are
    /// dropped.
    pub fn new(config: &SplashConfig) -> Self {
        let pictures: Vec<String> = config
            .pictures
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
            .collect();
        let phase = if pictures.is_empty() {
            SplashPhase::Done
        } else {
            SplashPhase::FadeIn
        };
        let mut sequence = Self {
            pictures,
            index: 0,
            phase,
            remaining: config.fade_duration,
            fade_duration: config.fade_duration,
            splash_duration: config.splash_duration,
        };
        sequence.skip_elapsed();
        sequence
    }

    /// Picture currently on screen.
    pub fn current_picture(&self) -> Option<&str> {
        if self.phase == SplashPhase::Done {
            return None;
        }
        self.pictures.get(self.index).map(String::as_str)
    }

    /// Current stage.
    pub const fn phase(&self) -> SplashPhase {
        self.phase
    }

    /// Frames left in the current stage.
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether every picture has been shown.
    pub fn is_finished(&self) -> bool {
        self.phase == SplashPhase::Done
    }

    /// Frames the whole sequence takes.
    pub fn total_frames(&self) -> u64 {
        let per_picture = u64::from(self.fade_duration)
            .saturating_mul(2)
            .saturating_add(u64::from(self.splash_duration));
        u64::try_from(self.pictures.len())
            .unwrap_or(u64::MAX)
            .saturating_mul(per_picture)
    }

    /// Advance one frame and return the resulting stage.
    pub fn update(&mut self) -> SplashPhase {
        if self.phase != SplashPhase::Done {
            self.remaining = self.remaining.saturating_sub(1);
            self.skip_elapsed();
        }
        self.phase
    }

    /// Move through every stage whose frames are used up.
    fn skip_elapsed(&mut self) {
        while self.remaining == 0 && self.phase != SplashPhase::Done {
            self.next_phase();
        }
    }

    fn next_phase(&mut self) {
        match self.phase {
            SplashPhase::FadeIn => {
                self.phase = SplashPhase::Show;
                self.remaining = self.splash_duration;
            }
            SplashPhase::Show => {
                self.phase = SplashPhase::FadeOut;
                self.remaining = self.fade_duration;
            }
            SplashPhase::FadeOut => {
                self.index = self.index.saturating_add(1);
                if self.index >= self.pictures.len() {
                    debug!("Splash finished");
                    self.phase = SplashPhase::Done;
                } else {
                    debug!(picture = ?self.current_picture(), "Next splash picture");
                    self.phase = SplashPhase::FadeIn;
                    self.remaining = self.fade_duration;
                }
            }
            SplashPhase::Done => {}
        }
    }
}
