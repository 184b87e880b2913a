use log::{debug, warn};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, OnceLock,
    },
    time::{Duration, Instant},
};

/// Logic level of a simulated line: plain digital, or an analog-like
/// fraction in `[0, 1]` (PWM duty, capacitor charge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinState {
    Digital(bool),
    Analog(f64),
}

/// Analog values in `[0, 1]` never set the sign bit, so bit 63 is free to
/// tag the digital case and the whole state fits one atomic word.
const DIGITAL_TAG: u64 = 1 << 63;

impl PinState {
    fn pack(self) -> u64 {
        match self {
            PinState::Digital(level) => DIGITAL_TAG | u64::from(level),
            PinState::Analog(value) => {
                // Adding 0.0 folds -0.0 to +0.0, keeping the sign bit clear.
                let value = if value.is_nan() { 0.0 } else { value };
                (value.clamp(0.0, 1.0) + 0.0).to_bits()
            }
        }
    }

    fn unpack(bits: u64) -> Self {
        if bits & DIGITAL_TAG == 0 {
            PinState::Analog(f64::from_bits(bits))
        } else {
            PinState::Digital(bits & 1 == 1)
        }
    }

    #[must_use]
    pub fn is_high(self) -> bool {
        match self {
            PinState::Digital(level) => level,
            PinState::Analog(value) => value > 0.0,
        }
    }
}

type WriteHook = Box<dyn Fn(PinState, PinState) + Send + Sync>;
type ReadHook = Box<dyn Fn() -> PinState + Send + Sync>;

struct PinCell {
    id: u8,
    bits: AtomicU64,
    /// Nanoseconds since the factory epoch of the last write.
    changed_at: AtomicU64,
    epoch: Instant,
    write_hook: OnceLock<WriteHook>,
    read_hook: OnceLock<ReadHook>,
}

/// A simulated hardware line. Handles are cheap clones of one shared cell,
/// so the control thread, the GUI loop and timer callbacks all observe the
/// same state without locks.
#[derive(Clone)]
pub struct Pin(Arc<PinCell>);

impl Pin {
    fn new(id: u8, epoch: Instant) -> Self {
        Self(Arc::new(PinCell {
            id,
            bits: AtomicU64::new(PinState::Digital(false).pack()),
            changed_at: AtomicU64::new(0),
            epoch,
            write_hook: OnceLock::new(),
            read_hook: OnceLock::new(),
        }))
    }

    #[must_use]
    pub fn id(&self) -> u8 {
        self.0.id
    }

    #[must_use]
    pub fn state(&self) -> PinState {
        if let Some(hook) = self.0.read_hook.get() {
            return hook();
        }

        PinState::unpack(self.0.bits.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn is_high(&self) -> bool {
        self.state().is_high()
    }

    pub fn set_state(&self, state: PinState) {
        let prev = PinState::unpack(self.0.bits.swap(state.pack(), Ordering::AcqRel));

        let nanos = self.0.epoch.elapsed().as_nanos() as u64;
        self.0.changed_at.store(nanos, Ordering::Release);

        debug!("pin {} <- {:?}", self.0.id, state);

        if let Some(hook) = self.0.write_hook.get() {
            hook(prev, state);
        }
    }

    pub fn drive_high(&self) {
        self.set_state(PinState::Digital(true));
    }

    pub fn drive_low(&self) {
        self.set_state(PinState::Digital(false));
    }

    /// Time of the last write, relative to the factory epoch.
    #[must_use]
    pub fn last_change(&self) -> Duration {
        Duration::from_nanos(self.0.changed_at.load(Ordering::Acquire))
    }

    /// Runs after every write with the previous and the new state. One hook
    /// per pin, installed at circuit construction.
    pub(crate) fn set_write_hook<F>(&self, hook: F)
    where
        F: Fn(PinState, PinState) + Send + Sync + 'static,
    {
        if self.0.write_hook.set(Box::new(hook)).is_err() {
            warn!("pin {}: write hook already installed", self.0.id);
        }
    }

    /// Replaces the stored state on reads; used by pins whose observed value
    /// is a function of elapsed time.
    pub(crate) fn set_read_hook<F>(&self, hook: F)
    where
        F: Fn() -> PinState + Send + Sync + 'static,
    {
        if self.0.read_hook.set(Box::new(hook)).is_err() {
            warn!("pin {}: read hook already installed", self.0.id);
        }
    }
}

struct FactoryInner {
    epoch: Instant,
    pins: Mutex<HashMap<u8, Pin>>,
}

/// Creates pins on first lookup and hands out the same shared pin for the
/// same id thereafter.
#[derive(Clone)]
pub struct PinFactory {
    inner: Arc<FactoryInner>,
}

impl PinFactory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FactoryInner {
                epoch: Instant::now(),
                pins: Mutex::new(HashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn pin(&self, id: u8) -> Pin {
        let mut pins = self.inner.pins.lock().unwrap();

        pins.entry(id)
            .or_insert_with(|| Pin::new(id, self.inner.epoch))
            .clone()
    }
}

impl Default for PinFactory {
    fn default() -> Self {
        Self::new()
    }
}
