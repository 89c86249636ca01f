#![forbid(unsafe_code)]

//! Background character spawner.
//!
//! Decorative sprites that cross the screen every so often ("invasions")
//! or on demand through the secret commands. The spawner owns every sprite
//! and every pending spawn; nothing outlives [`Spawner::shutdown`].
//!
//! # Invariants
//!
//! - A sprite is removed once [`SPRITE_LIFETIME`] has elapsed since it
//!   spawned, whether or not its crossing finished.
//! - At most one invasion is scheduled at a time.
//! - A detached spawner never creates sprites.

use std::time::Duration;

use crate::command::SecretCommand;
use crate::config::SPRITE_LIFETIME;
use crate::dispatch::SecretHandler;
use crate::output::{LineStyle, OutputLine, OutputView};
use crate::rng::Rng;
use crate::timer::Timers;

/// Seconds between invasions, drawn uniformly.
pub const INVASION_INTERVAL_SECS: (f64, f64) = (15.0, 60.0);

/// Characters per invasion.
pub const INVASION_SIZE: std::ops::RangeInclusive<u32> = 3..=6;

/// Sprite speed relative to the base crossing time.
pub const SPEED_MULTIPLIER: (f64, f64) = (0.8, 1.2);

/// Vertical placement as a percentage of screen height.
pub const TOP_PERCENT: (f64, f64) = (10.0, 80.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKind {
    Runner,
    Chaser,
    /// Bounces while crossing.
    Hopper,
}

impl MotionKind {
    /// Crossing time at speed multiplier 1.0.
    #[must_use]
    pub const fn base_duration(self) -> Duration {
        match self {
            Self::Runner => Duration::from_secs(15),
            Self::Chaser => Duration::from_secs(18),
            Self::Hopper => Duration::from_secs(12),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Character {
    pub glyph: &'static str,
    pub motion: MotionKind,
    pub color: Rgb,
}

pub const PACMAN: usize = 0;
pub const RABBIT: usize = 1;
pub const GHOST: usize = 2;
pub const COOKIES: usize = 3;
pub const TABLE_FLIP: usize = 4;
pub const DANCERS: usize = 5;
pub const COOKIE_MONSTER: usize = 6;
pub const RUNNER: usize = 7;

pub const CATALOG: [Character; 8] = [
    Character {
        glyph: "ᗧ●●●●>",
        motion: MotionKind::Runner,
        color: Rgb(255, 255, 0),
    },
    Character {
        glyph: "🐰",
        motion: MotionKind::Hopper,
        color: Rgb(255, 255, 255),
    },
    Character {
        glyph: "ᗤ ●",
        motion: MotionKind::Chaser,
        color: Rgb(0, 255, 255),
    },
    Character {
        glyph: "◉ ◉ ◉ ◉",
        motion: MotionKind::Runner,
        color: Rgb(139, 69, 19),
    },
    Character {
        glyph: "(╯°□°）╯",
        motion: MotionKind::Runner,
        color: Rgb(255, 102, 0),
    },
    Character {
        glyph: "└[∵┌]└[ ∵ ]┘[┐∵]┘",
        motion: MotionKind::Runner,
        color: Rgb(0, 255, 0),
    },
    Character {
        glyph: "●●●ᗣ",
        motion: MotionKind::Chaser,
        color: Rgb(0, 128, 255),
    },
    Character {
        glyph: "ᕕ( ᐛ )ᕗ",
        motion: MotionKind::Runner,
        color: Rgb(255, 0, 255),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(u64);

#[derive(Debug, Clone)]
pub struct Sprite {
    id: SpriteId,
    character: usize,
    direction: Direction,
    top_percent: f32,
    crossing: Duration,
    spawned_at: Duration,
}

impl Sprite {
    #[must_use]
    pub fn id(&self) -> SpriteId {
        self.id
    }

    #[must_use]
    pub fn character(&self) -> &'static Character {
        &CATALOG[self.character]
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn top_percent(&self) -> f32 {
        self.top_percent
    }

    /// Time to cross the screen once.
    #[must_use]
    pub fn crossing(&self) -> Duration {
        self.crossing
    }

    #[must_use]
    pub fn spawned_at(&self) -> Duration {
        self.spawned_at
    }

    #[must_use]
    pub fn expires_at(&self) -> Duration {
        self.spawned_at + SPRITE_LIFETIME
    }

    /// Crossing progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, now: Duration) -> f32 {
        if self.crossing.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.spawned_at).as_secs_f32();
        (elapsed / self.crossing.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Leftmost column at `now`. The sprite starts fully off-screen on its
    /// entry side and ends fully off-screen on the other.
    #[must_use]
    pub fn column(&self, now: Duration, screen_width: u16, glyph_width: u16) -> i32 {
        let travel = f32::from(screen_width) + f32::from(glyph_width);
        let offset = (self.progress(now) * travel).round() as i32;
        let glyph = i32::from(glyph_width);
        match self.direction {
            Direction::LeftToRight => offset - glyph,
            Direction::RightToLeft => i32::from(screen_width) - offset,
        }
    }

    /// Screen row for a screen of `screen_height` rows.
    #[must_use]
    pub fn row(&self, now: Duration, screen_height: u16) -> u16 {
        let base = (f32::from(screen_height) * self.top_percent / 100.0) as u16;
        base.saturating_sub(self.hop(now))
    }

    /// Hoppers lift one row for half of each hop.
    fn hop(&self, now: Duration) -> u16 {
        if self.character().motion != MotionKind::Hopper {
            return 0;
        }
        const HOPS_PER_CROSSING: f32 = 16.0;
        let phase = (self.progress(now) * HOPS_PER_CROSSING).fract();
        u16::from(phase < 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpawnEvent {
    Invasion,
    Staggered,
}

#[derive(Debug)]
pub struct Spawner {
    attached: bool,
    sprites: Vec<Sprite>,
    timers: Timers<SpawnEvent>,
    rng: Rng,
    next_id: u64,
}

impl Spawner {
    /// Start the spawner at `now`. A detached spawner schedules nothing and
    /// refuses secret spawns.
    #[must_use]
    pub fn new(attached: bool, rng: Rng, now: Duration) -> Self {
        let mut spawner = Self {
            attached,
            sprites: Vec::new(),
            timers: Timers::new(),
            rng,
            next_id: 0,
        };
        if attached {
            spawner.schedule_invasion(now);
        } else {
            tracing::warn!("no sprite layer, background characters disabled");
        }
        spawner
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    #[must_use]
    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    /// Earliest of the next scheduled spawn and the next sprite expiry.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        let expiry = self.sprites.iter().map(Sprite::expires_at).min();
        match (self.timers.next_deadline(), expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run due spawns and reap expired sprites. Returns `true` if the
    /// sprite set changed.
    pub fn advance(&mut self, now: Duration) -> bool {
        let before = self.sprites.len();
        let mut spawned = false;
        while let Some((_, event)) = self.timers.pop_due(now) {
            match event {
                SpawnEvent::Invasion => {
                    self.invade(now);
                    self.schedule_invasion(now);
                }
                SpawnEvent::Staggered => {
                    let pick = self.rng.below(CATALOG.len());
                    self.spawn(pick, now);
                }
            }
            spawned = true;
        }
        self.sprites.retain(|sprite| sprite.expires_at() > now);
        spawned || self.sprites.len() != before
    }

    /// Spawn 3..=6 random characters, the `i`-th after `i * U(0, 1)` seconds.
    pub fn invade(&mut self, now: Duration) {
        if !self.attached {
            return;
        }
        let size = self.rng.in_range(INVASION_SIZE);
        tracing::debug!(size, "invasion");
        for i in 0..size {
            let delay = Duration::from_secs_f64(f64::from(i) * self.rng.unit());
            if delay.is_zero() {
                let pick = self.rng.below(CATALOG.len());
                self.spawn(pick, now);
            } else {
                self.timers.schedule(now + delay, SpawnEvent::Staggered);
            }
        }
    }

    /// Spawn one catalog character at `now`. Returns `None` when detached.
    pub fn spawn(&mut self, character: usize, now: Duration) -> Option<SpriteId> {
        if !self.attached || character >= CATALOG.len() {
            return None;
        }
        let id = SpriteId(self.next_id);
        self.next_id += 1;
        let direction = if self.rng.chance(0.5) {
            Direction::LeftToRight
        } else {
            Direction::RightToLeft
        };
        let top_percent = self.rng.between(TOP_PERCENT.0, TOP_PERCENT.1) as f32;
        let multiplier = self.rng.between(SPEED_MULTIPLIER.0, SPEED_MULTIPLIER.1);
        let base = CATALOG[character].motion.base_duration();
        let crossing = Duration::from_secs_f64(base.as_secs_f64() / multiplier);
        tracing::trace!(
            glyph = CATALOG[character].glyph,
            ?direction,
            top_percent,
            crossing_ms = crossing.as_millis() as u64,
            "sprite spawned"
        );
        self.sprites.push(Sprite {
            id,
            character,
            direction,
            top_percent,
            crossing,
            spawned_at: now,
        });
        Some(id)
    }

    /// Remove every sprite and cancel every pending spawn. The spawner is
    /// detached afterwards.
    pub fn shutdown(&mut self) {
        let sprites = self.sprites.len();
        let pending = self.timers.len();
        self.sprites.clear();
        self.timers.clear();
        self.attached = false;
        tracing::debug!(sprites, pending, "spawner shut down");
    }

    fn schedule_invasion(&mut self, now: Duration) {
        let secs = self
            .rng
            .between(INVASION_INTERVAL_SECS.0, INVASION_INTERVAL_SECS.1);
        self.timers
            .schedule(now + Duration::from_secs_f64(secs), SpawnEvent::Invasion);
    }
}

/// Announcement line and catalog entry for each secret command.
fn secret_effect(command: SecretCommand) -> (&'static str, LineStyle, Option<usize>) {
    match command {
        SecretCommand::Pacman => ("👾 Pac-Man spotted!", LineStyle::Warning, Some(PACMAN)),
        SecretCommand::Rabbit => (
            "🐰 Following the white rabbit...",
            LineStyle::Success,
            Some(RABBIT),
        ),
        SecretCommand::Ghost => ("👻 Ghost in the machine!", LineStyle::Error, Some(GHOST)),
        SecretCommand::Cookies => (
            "🍪 Cookie trail detected!",
            LineStyle::Warning,
            Some(COOKIES),
        ),
        SecretCommand::TableFlip => (
            "(╯°□°）╯ Hacker rage mode activated!",
            LineStyle::Error,
            Some(TABLE_FLIP),
        ),
        SecretCommand::Dance => (
            "💃 Dance party in the terminal!",
            LineStyle::Success,
            Some(DANCERS),
        ),
        SecretCommand::Chase => (
            "🏃 Cookie monster on the hunt!",
            LineStyle::Warning,
            Some(COOKIE_MONSTER),
        ),
        SecretCommand::Runner => (
            "🏃 Someone's in a hurry!",
            LineStyle::Success,
            Some(RUNNER),
        ),
        SecretCommand::Spawn => ("🎲 Summoning mini-invasion...", LineStyle::Warning, None),
    }
}

impl SecretHandler for Spawner {
    fn run_secret(&mut self, command: SecretCommand, view: &mut OutputView, now: Duration) {
        let (announcement, style, character) = secret_effect(command);
        view.push(OutputLine::styled(announcement, style));
        if !self.attached {
            view.push(OutputLine::styled(
                "Background animation system not initialized!",
                LineStyle::Error,
            ));
            return;
        }
        match character {
            Some(index) => {
                self.spawn(index, now);
            }
            None => self.invade(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn spawner() -> Spawner {
        Spawner::new(true, Rng::new(11), Duration::ZERO)
    }

    #[test]
    fn first_invasion_is_scheduled_in_window() {
        let s = spawner();
        let deadline = s.next_deadline().expect("invasion scheduled");
        assert!(deadline >= Duration::from_secs(15) && deadline <= Duration::from_secs(60));
        assert!(s.sprites().is_empty());
    }

    #[test]
    fn invasion_spawns_three_to_six_within_stagger_window() {
        let mut s = spawner();
        let at = s.next_deadline().expect("scheduled");
        s.advance(at);
        // Latest stagger is (size - 1) * U(0,1) < 5 s.
        s.advance(at + Duration::from_secs(5));
        let count = s.sprites().len();
        assert!((3..=6).contains(&count), "spawned {count}");
        assert!(s.next_deadline().is_some_and(|d| d > at));
    }

    #[test]
    fn sprite_parameters_are_in_range() {
        let mut s = spawner();
        for i in 0..200 {
            s.spawn(i % CATALOG.len(), Duration::ZERO);
        }
        for sprite in s.sprites() {
            assert!((10.0..=80.0).contains(&sprite.top_percent()));
            let base = sprite.character().motion.base_duration().as_secs_f64();
            let crossing = sprite.crossing().as_secs_f64();
            assert!(crossing >= base / 1.2 - 1e-6 && crossing <= base / 0.8 + 1e-6);
        }
    }

    #[test]
    fn sprites_are_reaped_after_lifetime() {
        let mut s = spawner();
        s.timers.clear();
        s.spawn(PACMAN, ms(1000));
        assert!(!s.advance(ms(20_999)));
        assert_eq!(s.sprites().len(), 1);
        assert!(s.advance(ms(21_000)));
        assert!(s.sprites().is_empty());
    }

    #[test]
    fn progress_and_column_follow_direction() {
        let sprite = Sprite {
            id: SpriteId(0),
            character: PACMAN,
            direction: Direction::LeftToRight,
            top_percent: 50.0,
            crossing: Duration::from_secs(10),
            spawned_at: Duration::ZERO,
        };
        assert_eq!(sprite.column(Duration::ZERO, 80, 6), -6);
        assert_eq!(sprite.column(Duration::from_secs(10), 80, 6), 80);
        assert_eq!(sprite.progress(Duration::from_secs(30)), 1.0);

        let back = Sprite {
            direction: Direction::RightToLeft,
            ..sprite
        };
        assert_eq!(back.column(Duration::ZERO, 80, 6), 80);
        assert_eq!(back.column(Duration::from_secs(10), 80, 6), -6);
        assert_eq!(back.row(Duration::ZERO, 40), 20);
    }

    #[test]
    fn secret_command_spawns_its_character() {
        let mut s = spawner();
        let mut view = OutputView::new();
        s.run_secret(SecretCommand::Rabbit, &mut view, ms(0));
        assert_eq!(s.sprites().len(), 1);
        assert_eq!(s.sprites()[0].character().glyph, "🐰");
        assert_eq!(view.lines()[0].plain_text(), "🐰 Following the white rabbit...");
    }

    #[test]
    fn detached_spawner_reports_not_initialized() {
        let mut s = Spawner::new(false, Rng::new(1), Duration::ZERO);
        assert_eq!(s.next_deadline(), None);
        let mut view = OutputView::new();
        s.run_secret(SecretCommand::Ghost, &mut view, ms(0));
        assert!(s.sprites().is_empty());
        let texts: Vec<String> = view.lines().iter().map(OutputLine::plain_text).collect();
        assert_eq!(
            texts,
            vec![
                "👻 Ghost in the machine!",
                "Background animation system not initialized!"
            ]
        );
    }

    #[test]
    fn shutdown_cancels_staggers_and_sprites() {
        let mut s = spawner();
        let mut view = OutputView::new();
        for _ in 0..5 {
            s.run_secret(SecretCommand::Spawn, &mut view, ms(0));
        }
        assert!(!s.sprites().is_empty());
        s.shutdown();
        assert!(s.sprites().is_empty());
        assert_eq!(s.next_deadline(), None);
        assert!(!s.advance(Duration::from_secs(120)));
        assert!(s.sprites().is_empty());
    }
}
