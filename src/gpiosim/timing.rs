use crate::{
    pin::{Pin, PinState},
    timer::OneShot,
};
use log::debug;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

/// Seconds stored as raw `f64` bits so UI writes land without a lock.
/// Negative inputs clamp to zero.
struct AtomicSeconds(AtomicU64);

impl AtomicSeconds {
    fn new(secs: f64) -> Self {
        Self(AtomicU64::new(secs.max(0.0).to_bits()))
    }

    fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    fn set(&self, secs: f64) {
        self.0.store(secs.max(0.0).to_bits(), Ordering::Release);
    }
}

/// Ultrasonic trigger/echo pair. A rising edge on the trigger schedules a
/// pulse on the echo pin: high `echo_time` seconds after the trigger, low
/// after another `echo_time`. Re-triggering supersedes whatever pulse is
/// pending or in flight; only the latest trigger's pulse is ever observed.
#[derive(Clone)]
pub struct TriggerPin {
    inner: Arc<TriggerInner>,
}

struct TriggerInner {
    echo: Pin,
    echo_time: AtomicSeconds,
    pulse: Mutex<PulseSlot>,
}

#[derive(Default)]
struct PulseSlot {
    epoch: u64,
    pending: Option<OneShot>,
}

impl TriggerPin {
    /// Installs the echo behavior on `trigger`. `echo_time` changes apply
    /// to the next trigger, never to a pulse already scheduled.
    #[must_use]
    pub fn attach(trigger: &Pin, echo: Pin, echo_time: f64) -> Self {
        let inner = Arc::new(TriggerInner {
            echo,
            echo_time: AtomicSeconds::new(echo_time),
            pulse: Mutex::new(PulseSlot::default()),
        });

        let hook = Arc::clone(&inner);
        trigger.set_write_hook(move |prev, next| {
            if !prev.is_high() && next.is_high() {
                TriggerInner::fire(&hook);
            }
        });

        Self { inner }
    }

    pub fn set_echo_time(&self, secs: f64) {
        self.inner.echo_time.set(secs);
    }

    #[must_use]
    pub fn echo_time(&self) -> f64 {
        self.inner.echo_time.get()
    }
}

impl TriggerInner {
    fn fire(inner: &Arc<Self>) {
        // Captured once per trigger; the pulse width reuses it.
        let echo_time = inner.echo_time.get();

        let mut slot = inner.pulse.lock().unwrap();
        slot.epoch += 1;

        // Superseding an in-flight pulse leaves the echo line low.
        if slot.pending.take().is_some() && inner.echo.is_high() {
            inner.echo.drive_low();
        }

        if echo_time <= 0.0 {
            drop(slot);
            inner.echo.drive_high();
            inner.echo.drive_low();
            return;
        }

        debug!("echo pulse in {echo_time}s");

        let epoch = slot.epoch;
        let delay = Duration::from_secs_f64(echo_time);
        let rise = Arc::clone(inner);
        slot.pending = Some(OneShot::schedule(delay, move || {
            TriggerInner::begin_pulse(&rise, epoch, delay);
        }));
    }

    fn begin_pulse(inner: &Arc<Self>, epoch: u64, width: Duration) {
        let mut slot = inner.pulse.lock().unwrap();
        if slot.epoch != epoch {
            return;
        }

        inner.echo.drive_high();

        let fall = Arc::clone(inner);
        slot.pending = Some(OneShot::schedule(width, move || {
            fall.end_pulse(epoch);
        }));
    }

    fn end_pulse(&self, epoch: u64) {
        let mut slot = self.pulse.lock().unwrap();
        if slot.epoch != epoch {
            return;
        }

        self.echo.drive_low();
        slot.pending = None;
    }
}

/// Light-dependent charging pin. Its observed value is a pure function of
/// elapsed time since the last discharge, clamped to `[0, 1]` and recomputed
/// on every read rather than sampled on a timer.
#[derive(Clone)]
pub struct ChargingPin {
    inner: Arc<ChargingInner>,
}

struct ChargingInner {
    epoch: Instant,
    charge_time: AtomicSeconds,
    /// Nanoseconds since `epoch` of the last discharge.
    reset_at: AtomicU64,
}

impl ChargingPin {
    /// Installs the charging behavior on `pin`: reads yield the computed
    /// analog value, driving the pin low discharges it.
    #[must_use]
    pub fn attach(pin: &Pin, charge_time: f64) -> Self {
        let inner = Arc::new(ChargingInner {
            epoch: Instant::now(),
            charge_time: AtomicSeconds::new(charge_time),
            reset_at: AtomicU64::new(0),
        });

        let read = Arc::clone(&inner);
        pin.set_read_hook(move || PinState::Analog(read.value()));

        let write = Arc::clone(&inner);
        pin.set_write_hook(move |_prev, next| {
            if !next.is_high() {
                write.discharge();
            }
        });

        Self { inner }
    }

    /// Affects the future charge rate only.
    pub fn set_charge_time(&self, secs: f64) {
        self.inner.charge_time.set(secs);
    }

    #[must_use]
    pub fn charge_time(&self) -> f64 {
        self.inner.charge_time.get()
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.inner.value()
    }

    pub fn discharge(&self) {
        self.inner.discharge();
    }
}

impl ChargingInner {
    fn value(&self) -> f64 {
        let now = self.epoch.elapsed().as_nanos() as u64;
        let since_reset = now.saturating_sub(self.reset_at.load(Ordering::Acquire));

        let charge_time = self.charge_time.get();
        if charge_time <= 0.0 {
            return 1.0;
        }

        (Duration::from_nanos(since_reset).as_secs_f64() / charge_time).min(1.0)
    }

    fn discharge(&self) {
        let now = self.epoch.elapsed().as_nanos() as u64;
        self.reset_at.store(now, Ordering::Release);
    }
}

#[cfg(test)]
mod test {
    use super::AtomicSeconds;

    #[test]
    fn negative_seconds_clamp_to_zero() {
        let secs = AtomicSeconds::new(-2.0);
        assert_eq!(0.0, secs.get());

        secs.set(-0.5);
        assert_eq!(0.0, secs.get());

        secs.set(0.25);
        assert_eq!(0.25, secs.get());
    }
}
