/// Gate for per-frame pointer sampling while a measurement is live.
/// Once invalidated it never runs again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContinuousSampler {
    state: SamplerState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum SamplerState {
    #[default]
    Idle,
    Running,
    Invalidated,
}

impl ContinuousSampler {
    /// Returns false if the sampler has been invalidated.
    pub fn start(&mut self) -> bool {
        if self.state == SamplerState::Invalidated {
            return false;
        }
        self.state = SamplerState::Running;
        true
    }

    pub fn stop(&mut self) {
        if self.state == SamplerState::Running {
            self.state = SamplerState::Idle;
        }
    }

    pub fn invalidate(&mut self) {
        self.state = SamplerState::Invalidated;
    }

    pub fn is_running(&self) -> bool {
        self.state == SamplerState::Running
    }

    pub fn is_invalidated(&self) -> bool {
        self.state == SamplerState::Invalidated
    }
}

/// Position within a looping clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackClock {
    duration_secs: f32,
    position_secs: f32,
    playing: bool,
}

impl PlaybackClock {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            position_secs: 0.0,
            playing: false,
        }
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Flip play/pause. Returns the new playing state.
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn restart(&mut self) {
        self.position_secs = 0.0;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position_secs(&self) -> f32 {
        self.position_secs
    }

    /// Advance by `dt` while playing. Returns how many times the clip wrapped.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.playing || !dt.is_finite() || dt <= 0.0 || !(self.duration_secs > 0.0) {
            return 0;
        }
        let position = self.position_secs + dt;
        let loops = (position / self.duration_secs).floor();
        self.position_secs = position.rem_euclid(self.duration_secs);
        // Saturating float-to-int cast.
        loops as u32
    }
}
