/// Reload notification counter
///
/// A single process-wide counter of images currently being retried, paired
/// with the display state of the on-screen indicator. The service is
/// constructed once at startup and passed by reference wherever retries
/// begin or settle; each increment/decrement applies the counter change and
/// the display refresh as one step, so an `update` call never exposes a
/// half-applied notification to other messages.

/// What the indicator currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    /// Indicator collapsed and invisible
    Hidden,
    /// "Reloading images: N"
    Reloading(u32),
    /// "Offline: N", entered when a retry begins without connectivity
    Offline(u32),
}

/// Outcome of a display refresh
///
/// `hide_after` carries the generation to arm the hide timer with when the
/// count has just returned to 0. The caller schedules the delay and posts
/// the generation back via `hide_elapsed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refresh {
    pub hide_after: Option<u64>,
}

/// Counter plus indicator state
#[derive(Debug)]
pub struct Notifications {
    count: u32,
    state: NotificationState,
    /// Bumped on every refresh; a pending hide timer whose generation no
    /// longer matches has been implicitly cancelled.
    generation: u64,
}

impl Notifications {
    pub fn new() -> Self {
        Self {
            count: 0,
            state: NotificationState::Hidden,
            generation: 0,
        }
    }

    /// A retry began. Shows the offline mode instead of a numeric count when
    /// connectivity is absent at this moment.
    pub fn increment(&mut self, online: bool) -> Refresh {
        self.count += 1;
        self.refresh(!online)
    }

    /// A retry's reload settled (success or failure).
    pub fn decrement(&mut self) -> Refresh {
        debug_assert!(self.count > 0, "decrement below zero");
        self.count = self.count.saturating_sub(1);
        self.refresh(false)
    }

    /// Update the visible state and cancel any pending hide timer. When the
    /// count is 0 the indicator stays briefly visible and the caller is told
    /// to arm a fresh hide timer.
    fn refresh(&mut self, offline: bool) -> Refresh {
        self.generation += 1;

        self.state = if offline {
            NotificationState::Offline(self.count)
        } else {
            NotificationState::Reloading(self.count)
        };

        Refresh {
            hide_after: (self.count == 0).then_some(self.generation),
        }
    }

    /// The hide delay elapsed. Hides the indicator only if no refresh
    /// happened since the timer was armed. Returns whether it hid.
    pub fn hide_elapsed(&mut self, generation: u64) -> bool {
        if generation == self.generation && self.count == 0 {
            self.state = NotificationState::Hidden;
            true
        } else {
            false
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn state(&self) -> NotificationState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new()
    }
}
