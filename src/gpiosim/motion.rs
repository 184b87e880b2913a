use crate::{pin::Pin, timer::OneShot};
use log::debug;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionVisual {
    NoMotion,
    Motion,
    Wait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Detecting,
    Cooldown,
}

/// Debounce plus refractory cycle for a PIR-style sensor.
///
/// A proximity signal while idle drives the pin high and arms the hold
/// timer; further signals restart that timer instead of stacking new ones,
/// so continuous proximity holds detection indefinitely. Once signals stop
/// for `delay`, the pin drops and a cooldown of `block` begins during which
/// every signal is ignored.
#[derive(Clone)]
pub struct MotionDetector {
    inner: Arc<MotionInner>,
}

struct MotionInner {
    pin: Pin,
    delay: Duration,
    block: Duration,
    state: Mutex<MotionState>,
}

struct MotionState {
    phase: Phase,
    epoch: u64,
    timer: Option<OneShot>,
}

impl MotionDetector {
    #[must_use]
    pub fn new(pin: Pin, delay: Duration, block: Duration) -> Self {
        Self {
            inner: Arc::new(MotionInner {
                pin,
                delay,
                block,
                state: Mutex::new(MotionState {
                    phase: Phase::Idle,
                    epoch: 0,
                    timer: None,
                }),
            }),
        }
    }

    /// Proximity signal from the pointer.
    pub fn signal(&self) {
        let inner = &self.inner;
        let mut state = inner.state.lock().unwrap();

        match state.phase {
            Phase::Cooldown => {}
            Phase::Idle => {
                debug!("motion detected on pin {}", inner.pin.id());
                inner.pin.drive_high();
                state.phase = Phase::Detecting;
                MotionInner::arm_hold(inner, &mut state);
            }
            Phase::Detecting => {
                // Restarts the hold timer; the replaced handle cancels it.
                MotionInner::arm_hold(inner, &mut state);
            }
        }
    }

    #[must_use]
    pub fn visual(&self) -> MotionVisual {
        match self.inner.state.lock().unwrap().phase {
            Phase::Idle => MotionVisual::NoMotion,
            Phase::Detecting => MotionVisual::Motion,
            Phase::Cooldown => MotionVisual::Wait,
        }
    }
}

impl MotionInner {
    fn arm_hold(inner: &Arc<Self>, state: &mut MotionState) {
        state.epoch += 1;
        let epoch = state.epoch;

        let this = Arc::clone(inner);
        state.timer = Some(OneShot::schedule(inner.delay, move || {
            this.hold_elapsed(epoch);
        }));
    }

    fn hold_elapsed(self: &Arc<Self>, epoch: u64) {
        let mut state = self.state.lock().unwrap();
        if state.epoch != epoch || state.phase != Phase::Detecting {
            return;
        }

        debug!("motion gone on pin {}, cooling down", self.pin.id());
        self.pin.drive_low();
        state.phase = Phase::Cooldown;

        state.epoch += 1;
        let epoch = state.epoch;

        let this = Arc::clone(self);
        state.timer = Some(OneShot::schedule(self.block, move || {
            this.block_elapsed(epoch);
        }));
    }

    fn block_elapsed(&self, epoch: u64) {
        let mut state = self.state.lock().unwrap();
        if state.epoch != epoch || state.phase != Phase::Cooldown {
            return;
        }

        state.phase = Phase::Idle;
        state.timer = None;
    }
}
