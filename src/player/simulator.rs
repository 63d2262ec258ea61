//! The playback state machine and its time-advancement algorithm.
//!
//! Time only passes when the owner calls [`PlaybackSimulator::advance_time`].
//! Every call stops at the first boundary it meets (ready, fail, done) and
//! reports how much of the budget was actually consumed.

use std::fmt;

use log::{debug, trace};

use crate::media::{Content, MediaTrack, playable_window};

use super::types::{Extent, Millis, Repeat, SimEvent, SimParams, SimState, TrackState};

/// A fake media player for a single, possibly looping, track.
#[derive(Debug, Clone)]
pub struct PlaybackSimulator {
    params: SimParams,
    buffering_remaining: Millis,
    position: Millis,
    completed_plays: u32,
    state: SimState,
    ready_dispatched: bool,
}

impl PlaybackSimulator {
    /// Create an idle simulator. `Repeat::Times(0)` is treated as a single play.
    pub fn new(mut params: SimParams) -> Self {
        if params.repeat == Repeat::Times(0) {
            params.repeat = Repeat::Times(1);
        }

        Self {
            buffering_remaining: params.initial_delay,
            position: params.start,
            completed_plays: 0,
            state: SimState::Idle,
            ready_dispatched: false,
            params,
        }
    }

    /// Build a simulator for `track` played against the fake `content`.
    pub fn from_track(track: &MediaTrack, content: &Content) -> Self {
        let (start, duration) = playable_window(track, content);
        Self::new(SimParams {
            requested_duration: track.duration,
            repeat: track.repeat(),
            fail_after: content.fail_after,
            start,
            duration,
            initial_delay: content.initial_delay,
        })
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Load status for event handlers of the consuming component.
    pub fn track_state(&self) -> TrackState {
        if self.state == SimState::Failed {
            TrackState::Failed
        } else if self.buffering_remaining == 0 {
            TrackState::Ready
        } else {
            TrackState::NotReady
        }
    }

    pub fn position(&self) -> Millis {
        self.position
    }

    /// The requested duration, which is not necessarily the playable window.
    pub fn duration(&self) -> Millis {
        self.params.requested_duration
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn completed_plays(&self) -> u32 {
        self.completed_plays
    }

    pub fn buffering_remaining(&self) -> Millis {
        self.buffering_remaining
    }

    pub fn start(&self) -> Millis {
        self.params.start
    }

    /// Last position of the playable window, or `None` for unbounded content.
    pub fn end(&self) -> Option<Millis> {
        self.params
            .duration
            .finite()
            .map(|d| self.params.start.saturating_add(d))
    }

    /// True until the track is done or failed.
    pub fn is_active(&self) -> bool {
        matches!(self.state, SimState::Idle | SimState::Playing)
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.state, SimState::Done | SimState::Failed)
    }

    pub fn is_playing(&self) -> bool {
        self.state == SimState::Playing
    }

    /// At the very start of the window and no pass completed yet.
    pub fn at_start(&self) -> bool {
        self.position == self.params.start && self.completed_plays == 0
    }

    pub fn play(&mut self) -> bool {
        self.state == SimState::Idle && self.transition(SimState::Playing)
    }

    pub fn pause(&mut self) -> bool {
        self.state == SimState::Playing && self.transition(SimState::Idle)
    }

    /// Move to the start and clear the pass counter.
    ///
    /// Unbounded content cannot be rewound once it has been finished.
    pub fn rewind(&mut self) -> bool {
        match self.state {
            SimState::Failed => return false,
            SimState::Done if self.params.duration.is_unbounded() => return false,
            _ => {}
        }
        if self.at_start() {
            return false;
        }

        self.position = self.params.start;
        self.completed_plays = 0;
        self.transition(SimState::Idle);
        true
    }

    /// Force the track to done. Unbounded content parks the play head at the start.
    pub fn finish(&mut self) -> bool {
        if self.is_ended() {
            return false;
        }

        self.position = self.end().unwrap_or(self.params.start);
        self.exhaust_repeats();
        self.transition(SimState::Done)
    }

    /// Move the play head to `offset` past the window start, clipped to the window.
    ///
    /// Landing on the end of the last pass finishes the track; leaving the end
    /// of a finished track makes it idle again.
    pub fn seek(&mut self, offset: i64) -> bool {
        if self.state == SimState::Failed {
            return false;
        }

        let target = self.clip_position(self.params.start.saturating_add_signed(offset));
        if target == self.position {
            return false;
        }

        let was_done = self.state == SimState::Done;
        self.position = target;

        let last_pass = !self
            .params
            .repeat
            .allows_another(self.completed_plays.saturating_add(1));
        if self.position_at_end(target) && last_pass {
            self.exhaust_repeats();
            self.transition(SimState::Done);
        } else if was_done {
            // Back inside the last pass.
            self.completed_plays = self.completed_plays.saturating_sub(1);
            self.transition(SimState::Idle);
        }
        true
    }

    /// Reset the pass counter. Only a finished track with completed passes reports an effect.
    pub fn clear_repeat(&mut self) -> bool {
        if self.state == SimState::Failed {
            return false;
        }

        let reopened = self.state == SimState::Done && self.completed_plays >= 1;
        self.completed_plays = 0;
        if reopened {
            self.transition(SimState::Idle);
        }
        reopened
    }

    /// Let up to `max` milliseconds pass and report what stopped the clock.
    ///
    /// Returns the event and the time actually consumed, which never exceeds `max`.
    pub fn advance_time(&mut self, max: Millis) -> (SimEvent, Millis) {
        if self.is_ended() {
            return (SimEvent::NoReport, 0);
        }

        if self.buffering_remaining > max {
            self.buffering_remaining -= max;
            return (SimEvent::TimeUpdate, max);
        }

        if !self.ready_dispatched {
            let consumed = self.buffering_remaining;
            self.buffering_remaining = 0;
            self.ready_dispatched = true;
            trace!("track ready after {consumed}ms of buffering");
            return (SimEvent::TrackReady, consumed);
        }

        if self.state != SimState::Playing {
            return (SimEvent::NoReport, max);
        }

        self.play_for(max)
    }

    fn play_for(&mut self, budget: Millis) -> (SimEvent, Millis) {
        let start = self.params.start;

        if self.params.duration == Extent::Finite(0) {
            // Nothing to play: skip every pass.
            self.position = start;
            self.transition(SimState::Done);
            trace!("empty window at {start}, track done");
            return (SimEvent::TrackDone, 0);
        }

        let mut elapsed: Millis = 0;
        loop {
            let remaining = budget - elapsed;
            let end = self.end();
            let to_end = end.map(|end| end.saturating_sub(self.position));

            if let Some(limit) = self.params.fail_after {
                let to_fail = limit.saturating_sub(self.played());
                if to_fail <= remaining && to_end.is_none_or(|to_end| to_fail <= to_end) {
                    self.position = self.position.saturating_add(to_fail);
                    elapsed += to_fail;
                    self.transition(SimState::Failed);
                    trace!("track failed at {} after {elapsed}ms", self.position);
                    return (SimEvent::TrackFail, elapsed);
                }
            }

            match (end, to_end) {
                (Some(end), Some(to_end)) if to_end <= remaining => {
                    elapsed += to_end;
                    self.completed_plays = self.completed_plays.saturating_add(1);
                    if self.params.repeat.allows_another(self.completed_plays) {
                        self.position = start;
                        elapsed += self.skip_free_laps(budget - elapsed);
                        continue;
                    }
                    self.position = end;
                    self.transition(SimState::Done);
                    trace!("track done at {end} after {elapsed}ms");
                    return (SimEvent::TrackDone, elapsed);
                }
                _ => {
                    self.position = self.position.saturating_add(remaining);
                    return (SimEvent::TimeUpdate, budget);
                }
            }
        }
    }

    /// Fold whole passes of an endless loop into the counter instead of walking them.
    ///
    /// Only applies when nothing but the loop end can interrupt playback. The last
    /// lap is always left to the regular loop. Returns the time consumed.
    fn skip_free_laps(&mut self, remaining: Millis) -> Millis {
        let (Repeat::Forever, None, Extent::Finite(window)) = (
            self.params.repeat,
            self.params.fail_after,
            self.params.duration,
        ) else {
            return 0;
        };

        let laps = (remaining / window).saturating_sub(1);
        let counted = u32::try_from(laps).unwrap_or(u32::MAX);
        self.completed_plays = self.completed_plays.saturating_add(counted);
        laps * window
    }

    /// Content time played so far, across completed passes.
    fn played(&self) -> Millis {
        let within = self.position.saturating_sub(self.params.start);
        match self.params.duration {
            Extent::Finite(window) => u64::from(self.completed_plays)
                .saturating_mul(window)
                .saturating_add(within),
            Extent::Unbounded => within,
        }
    }

    /// Clamp `position` into the playable window.
    pub fn clip_position(&self, position: Millis) -> Millis {
        let position = position.max(self.params.start);
        match self.end() {
            Some(end) => position.min(end),
            None => position,
        }
    }

    /// True if `position` is the end of a bounded window.
    pub fn position_at_end(&self, position: Millis) -> bool {
        self.end() == Some(position)
    }

    /// Set the pass counter to its maximum, as a finished track has it.
    fn exhaust_repeats(&mut self) {
        if let Repeat::Times(n) = self.params.repeat {
            self.completed_plays = n;
        }
    }

    /// Single place where the lifecycle changes. `Failed` never changes again.
    fn transition(&mut self, to: SimState) -> bool {
        if self.state == SimState::Failed || self.state == to {
            return false;
        }
        debug!("playback {} -> {} at {}", self.state, to, self.position);
        self.state = to;
        true
    }
}

impl fmt::Display for PlaybackSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state={} track={} pos={} start={}",
            self.state,
            self.track_state(),
            self.position,
            self.params.start
        )?;
        match self.params.duration {
            Extent::Finite(d) => write!(f, " duration={d}")?,
            Extent::Unbounded => f.write_str(" duration=unbounded")?,
        }
        match self.params.repeat {
            Repeat::Times(n) => write!(f, " plays={}/{}", self.completed_plays, n)?,
            Repeat::Forever => write!(f, " plays={}/forever", self.completed_plays)?,
        }
        write!(f, " buffering={}", self.buffering_remaining)?;
        if let Some(limit) = self.params.fail_after {
            write!(f, " fail_after={limit}")?;
        }
        Ok(())
    }
}
