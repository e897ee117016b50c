use super::broadcaster::Broadcaster;
use super::timer::{Scheduler, TimerHandle, TimerId};
use crate::config::RoundTiming;
use crate::messages::ServerToClient;
use rand::Rng;
use tracing::{debug, info};

pub const WINNING_WORDS: [&str; 24] = [
    "HELLO", "WORLD", "MUSIC", "BEATS", "DANCE", "PARTY", "SMART", "QUICK", "JAZZY", "BLUES",
    "ROCKS", "SOUND", "VOICE", "RHYTHM", "MELODY", "CHORD", "PIANO", "GUITAR", "DRUMS", "BASS",
    "SONG", "TUNE", "NOTE", "KEY",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// No round running and no restart pending
    Idle,
    Active { remaining: u32 },
    /// Round resolved, restart timer armed
    Paused,
}

/// Owns the single shared round and the timers that drive it.
///
/// Holds at most one countdown and one restart timer at a time. Firings for
/// any other timer id are stale and get ignored.
pub struct RoundCoordinator<S> {
    scheduler: S,
    timing: RoundTiming,
    round_number: u32,
    phase: RoundPhase,
    outcome: Option<&'static str>,
    countdown: Option<TimerHandle>,
    restart: Option<TimerHandle>,
    next_timer: u64,
}

impl<S: Scheduler> RoundCoordinator<S> {
    pub fn new(scheduler: S, timing: RoundTiming) -> Self {
        Self {
            scheduler,
            timing,
            round_number: 1,
            phase: RoundPhase::Idle,
            outcome: None,
            countdown: None,
            restart: None,
            next_timer: 0,
        }
    }

    #[cfg(test)]
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    #[cfg(test)]
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    #[cfg(test)]
    pub fn outcome(&self) -> Option<&'static str> {
        self.outcome
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        matches!(self.phase, RoundPhase::Active { .. })
    }

    pub fn countdown_timer(&self) -> Option<TimerId> {
        self.countdown.as_ref().map(TimerHandle::id)
    }

    pub fn restart_timer(&self) -> Option<TimerId> {
        self.restart.as_ref().map(TimerHandle::id)
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn snapshot(&self) -> ServerToClient {
        let (is_round_active, time_remaining) = match self.phase {
            RoundPhase::Active { remaining } => (true, remaining),
            RoundPhase::Idle | RoundPhase::Paused => (false, 0),
        };
        ServerToClient::GameState {
            round_number: self.round_number,
            is_round_active,
            time_remaining,
            winning_word: self.outcome,
        }
    }

    /// Starts a round when nothing is running or pending and someone is
    /// connected. Returns whether a round started.
    pub fn start_if_idle(&mut self, clients: usize, broadcaster: &Broadcaster) -> bool {
        match self.phase {
            RoundPhase::Idle if clients > 0 => {
                self.begin_round(broadcaster);
                true
            }
            RoundPhase::Idle => false,
            RoundPhase::Active { .. } | RoundPhase::Paused => {
                debug!(
                    "Round {} already running or pending, not starting another",
                    self.round_number
                );
                false
            }
        }
    }

    pub fn on_timer(&mut self, timer: TimerId, clients: usize, broadcaster: &Broadcaster) {
        if self.countdown_timer() == Some(timer) {
            self.tick(broadcaster);
        } else if self.restart_timer() == Some(timer) {
            self.restart(clients, broadcaster);
        } else {
            debug!("Ignoring stale {}", timer);
        }
    }

    /// Cancels pending timers and leaves the round idle.
    pub fn shutdown(&mut self) {
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel();
        }
        if let Some(mut restart) = self.restart.take() {
            restart.cancel();
        }
        self.phase = RoundPhase::Idle;
    }

    fn begin_round(&mut self, broadcaster: &Broadcaster) {
        self.round_number += 1;
        self.outcome = None;
        self.phase = RoundPhase::Active {
            remaining: self.timing.round_secs,
        };

        info!("Starting round {}", self.round_number);

        broadcaster.broadcast(ServerToClient::RoundStart {
            round_number: self.round_number,
        });

        let id = self.next_timer_id();
        self.countdown = Some(self.scheduler.every(id, self.timing.tick));
    }

    fn tick(&mut self, broadcaster: &Broadcaster) {
        let RoundPhase::Active { remaining } = self.phase else {
            return;
        };
        let remaining = remaining.saturating_sub(1);
        self.phase = RoundPhase::Active { remaining };

        broadcaster.broadcast(ServerToClient::TimerUpdate {
            time_remaining: remaining,
        });

        if remaining == 0 {
            self.resolve(broadcaster);
        }
    }

    fn resolve(&mut self, broadcaster: &Broadcaster) {
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel();
        }

        let winning_word = WINNING_WORDS[rand::rng().random_range(0..WINNING_WORDS.len())];
        self.outcome = Some(winning_word);
        self.phase = RoundPhase::Paused;

        info!(
            "Round {} ended. Winning word: {}",
            self.round_number, winning_word
        );

        broadcaster.broadcast(ServerToClient::RoundEnd {
            round_number: self.round_number,
            winning_word,
        });

        let id = self.next_timer_id();
        self.restart = Some(self.scheduler.once(id, self.timing.pause));
    }

    fn restart(&mut self, clients: usize, broadcaster: &Broadcaster) {
        // One-shot: it already fired, the handle only needs to go
        self.restart = None;
        if self.phase != RoundPhase::Paused {
            return;
        }

        if clients > 0 {
            self.begin_round(broadcaster);
        } else {
            info!("No clients connected, waiting for the next join");
            self.phase = RoundPhase::Idle;
        }
    }

    fn next_timer_id(&mut self) -> TimerId {
        self.next_timer += 1;
        TimerId::new(self.next_timer)
    }
}
