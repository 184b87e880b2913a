use crate::{
    geom::{Point, Rect},
    infrared::{InfraredEmitter, InfraredReceiver, RemoteLayout},
    motion::{MotionDetector, MotionVisual},
    pin::{Pin, PinFactory, PinState},
    setup::{
        ButtonSetup, BuzzerSetup, DistanceSensorSetup, EmitterSetup, LcdSetup, LedSetup,
        LightSensorSetup, MotionSensorSetup, ReceiverSetup,
    },
    timing::{ChargingPin, TriggerPin},
};
use log::debug;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

const LED_SIZE: (f64, f64) = (30.0, 30.0);
const BUZZER_SIZE: (f64, f64) = (50.0, 33.0);
const BUTTON_SIZE: (f64, f64) = (30.0, 30.0);
const MOTION_SIZE: (f64, f64) = (80.0, 60.0);
const DISTANCE_SIZE: (f64, f64) = (86.0, 50.0);
const LIGHT_SIZE: (f64, f64) = (75.0, 150.0);
const EMITTER_SIZE: (f64, f64) = (50.0, 30.0);

const SLIDER_LENGTH: f64 = 150.0;
const SLIDER_THICKNESS: f64 = 20.0;

const SPEED_OF_SOUND: f64 = 343.26; // m/s

const KEY_PADDING: f64 = 8.0;

/// What the frontend should draw for a device right now.
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    Led(LedVisual),
    Buzzer(bool),
    Button(bool),
    Lcd(Vec<String>),
    Motion(MotionVisual),
    Sensor,
    RemotePanel,
    Emitter(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LedVisual {
    Off,
    On,
    /// Intensity-scaled "on" image for a PWM duty in `(0, 1)`.
    Dimmed(f64),
}

pub struct Led {
    name: String,
    origin: Point,
    pin: Pin,
    previous: Option<PinState>,
    visual: LedVisual,
}

impl Led {
    pub(crate) fn new(pins: &PinFactory, setup: &LedSetup) -> Self {
        Self {
            name: setup.name.clone(),
            origin: Point::new(setup.x, setup.y),
            pin: pins.pin(setup.pin),
            previous: None,
            visual: LedVisual::Off,
        }
    }

    fn update(&mut self) {
        let state = self.pin.state();
        if self.previous == Some(state) {
            return;
        }

        self.visual = match state {
            PinState::Analog(duty) => LedVisual::Dimmed(duty),
            PinState::Digital(true) => LedVisual::On,
            PinState::Digital(false) => LedVisual::Off,
        };
        self.previous = Some(state);

        debug!("led {:?} -> {:?}", self.name, self.visual);
    }

    #[must_use]
    pub fn visual(&self) -> LedVisual {
        self.visual
    }
}

pub struct Buzzer {
    name: String,
    origin: Point,
    pin: Pin,
    previous: Option<PinState>,
    on: bool,
}

impl Buzzer {
    pub(crate) fn new(pins: &PinFactory, setup: &BuzzerSetup) -> Self {
        Self {
            name: setup.name.clone(),
            origin: Point::new(setup.x, setup.y),
            pin: pins.pin(setup.pin),
            previous: None,
            on: false,
        }
    }

    fn update(&mut self) {
        let state = self.pin.state();
        if self.previous == Some(state) {
            return;
        }

        self.on = matches!(state, PinState::Digital(true));
        self.previous = Some(state);

        debug!("buzzer {:?} -> {}", self.name, self.on);
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }
}

/// Panel push button wired active-low: pressed drives the pin low,
/// releasing drives it high again.
pub struct PushButton {
    name: String,
    origin: Point,
    pin: Pin,
    previous: Option<PinState>,
    pressed: bool,
    held: bool,
}

impl PushButton {
    pub(crate) fn new(pins: &PinFactory, setup: &ButtonSetup) -> Self {
        let pin = pins.pin(setup.pin);
        pin.drive_high();

        Self {
            name: setup.name.clone(),
            origin: Point::new(setup.x, setup.y),
            pin,
            previous: None,
            pressed: false,
            held: false,
        }
    }

    fn update(&mut self) {
        let state = self.pin.state();
        if self.previous == Some(state) {
            return;
        }

        self.pressed = !state.is_high();
        self.previous = Some(state);
    }

    pub fn press(&mut self) {
        self.held = true;
        self.pin.drive_low();
    }

    pub fn release(&mut self) {
        if self.held {
            self.held = false;
            self.pin.drive_high();
        }
    }

    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, BUTTON_SIZE.0, BUTTON_SIZE.1)
    }
}

const LCD_MARGIN: f64 = 8.0;
const CHAR_WIDTH: f64 = 12.0;
const CHAR_HEIGHT: f64 = 16.0;
const CHAR_X_GAP: f64 = 3.0;
const CHAR_Y_GAP: f64 = 5.0;

struct LcdShared {
    pins: Vec<u8>,
    columns: usize,
    lines: usize,
    grid: Mutex<Vec<String>>,
}

/// Address-qualified write channel shared between the display adapter and
/// the control thread. Updates addressed to other pins are ignored.
#[derive(Clone)]
pub struct LcdChannel {
    inner: Arc<LcdShared>,
}

impl LcdChannel {
    fn new(pins: Vec<u8>, columns: usize, lines: usize) -> Self {
        Self {
            inner: Arc::new(LcdShared {
                pins,
                columns,
                lines,
                grid: Mutex::new(vec![String::new(); lines]),
            }),
        }
    }

    pub fn update_text(&self, pins: &[u8], text: &str) {
        if pins != self.inner.pins {
            return;
        }

        *self.inner.grid.lock().unwrap() =
            compose_grid(text, self.inner.columns, self.inner.lines);
    }

    #[must_use]
    pub fn grid(&self) -> Vec<String> {
        self.inner.grid.lock().unwrap().clone()
    }

    #[must_use]
    pub fn pins(&self) -> &[u8] {
        &self.inner.pins
    }
}

/// Renders `text` into a fixed character grid. `\n` starts the next line;
/// characters past the last column or line are consumed but not shown.
fn compose_grid(text: &str, columns: usize, lines: usize) -> Vec<String> {
    let mut grid = vec![String::new(); lines];
    let mut line = 0;
    let mut column = 0;

    for character in text.chars() {
        if character == '\n' {
            line += 1;
            column = 0;
            continue;
        }

        if line < lines && column < columns {
            grid[line].push(character);
        }

        column += 1;
    }

    grid
}

pub struct Lcd {
    name: String,
    origin: Point,
    channel: LcdChannel,
}

impl Lcd {
    pub(crate) fn new(setup: &LcdSetup) -> Self {
        Self {
            name: setup.name.clone(),
            origin: Point::new(setup.x, setup.y),
            channel: LcdChannel::new(setup.pins.clone(), setup.columns, setup.lines),
        }
    }

    #[must_use]
    pub fn channel(&self) -> LcdChannel {
        self.channel.clone()
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.channel.inner.columns
    }

    #[must_use]
    pub fn lines(&self) -> usize {
        self.channel.inner.lines
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        let columns = self.columns() as f64;
        let lines = self.lines() as f64;

        Rect::new(
            self.origin.x,
            self.origin.y,
            LCD_MARGIN * 2.0 + columns * CHAR_WIDTH + (columns - 1.0) * CHAR_X_GAP,
            LCD_MARGIN * 2.0 + lines * CHAR_HEIGHT + (lines - 1.0) * CHAR_Y_GAP,
        )
    }
}

pub struct MotionSensor {
    name: String,
    origin: Point,
    detector: MotionDetector,
    radius: f64,
    previous: Option<MotionVisual>,
    visual: MotionVisual,
}

impl MotionSensor {
    pub(crate) fn new(pins: &PinFactory, setup: &MotionSensorSetup) -> Self {
        let detector = MotionDetector::new(
            pins.pin(setup.pin),
            Duration::from_secs_f64(setup.delay_duration.max(0.0)),
            Duration::from_secs_f64(setup.block_duration.max(0.0)),
        );

        Self {
            name: setup.name.clone(),
            origin: Point::new(setup.x, setup.y),
            detector,
            radius: setup.detection_radius,
            previous: None,
            visual: MotionVisual::NoMotion,
        }
    }

    fn update(&mut self) {
        let phase = self.detector.visual();
        if self.previous == Some(phase) {
            return;
        }

        self.visual = phase;
        self.previous = Some(phase);

        debug!("motion sensor {:?} -> {:?}", self.name, self.visual);
    }

    pub fn signal_if_near(&self, pointer: Point) {
        if pointer.distance(self.bounds().center()) < self.radius {
            self.detector.signal();
        }
    }

    #[must_use]
    pub fn visual(&self) -> MotionVisual {
        self.visual
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, MOTION_SIZE.0, MOTION_SIZE.1)
    }
}

pub struct DistanceSensor {
    name: String,
    origin: Point,
    trigger: TriggerPin,
    min_distance: f64,
    max_distance: f64,
    distance: f64,
}

impl DistanceSensor {
    pub(crate) fn new(pins: &PinFactory, setup: &DistanceSensorSetup) -> Self {
        let echo = pins.pin(setup.echo_pin);
        let trigger = TriggerPin::attach(&pins.pin(setup.trigger_pin), echo, 0.004);

        let mut sensor = Self {
            name: setup.name.clone(),
            origin: Point::new(setup.x, setup.y),
            trigger,
            min_distance: setup.min_distance.max(0.0),
            max_distance: setup.max_distance.max(setup.min_distance.max(0.0)),
            distance: 0.0,
        };

        sensor.set_distance((sensor.min_distance + sensor.max_distance) / 2.0);
        sensor
    }

    /// Programs the echo round-trip time for a target `cm` away.
    pub fn set_distance(&mut self, cm: f64) {
        let cm = cm.clamp(self.min_distance, self.max_distance);
        self.distance = cm;

        let meters = cm / 100.0;
        self.trigger.set_echo_time(meters * 2.0 / SPEED_OF_SOUND);
    }

    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Slider position as a fraction of the range.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.max_distance <= self.min_distance {
            return 0.0;
        }

        (self.distance - self.min_distance) / (self.max_distance - self.min_distance)
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, DISTANCE_SIZE.0, DISTANCE_SIZE.1)
    }

    #[must_use]
    pub fn slider(&self) -> Rect {
        Rect::new(
            self.origin.x + 100.0,
            self.origin.y,
            SLIDER_LENGTH,
            SLIDER_THICKNESS,
        )
    }

    pub fn slider_changed(&mut self, at: Point) {
        let track = self.slider();
        let fraction = ((at.x - track.x) / track.w).clamp(0.0, 1.0);

        self.set_distance(self.min_distance + fraction * (self.max_distance - self.min_distance));
    }
}

const AMBIENT_MAX: f64 = 90.0;
const INITIAL_AMBIENT: f64 = 30.0;

pub struct LightSensor {
    name: String,
    origin: Point,
    charging: ChargingPin,
    ambient: f64,
}

impl LightSensor {
    pub(crate) fn new(pins: &PinFactory, setup: &LightSensorSetup) -> Self {
        let charging = ChargingPin::attach(&pins.pin(setup.pin), INITIAL_AMBIENT / 10_000.0);

        let mut sensor = Self {
            name: setup.name.clone(),
            origin: Point::new(setup.x, setup.y),
            charging,
            ambient: 0.0,
        };

        sensor.set_ambient(INITIAL_AMBIENT);
        sensor
    }

    /// Ambient darkness on the slider scale; higher values charge slower.
    pub fn set_ambient(&mut self, value: f64) {
        let value = value.clamp(0.0, AMBIENT_MAX);
        self.ambient = value;
        self.charging.set_charge_time(value / 10_000.0);
    }

    #[must_use]
    pub fn ambient(&self) -> f64 {
        self.ambient
    }

    #[must_use]
    pub fn fraction(&self) -> f64 {
        self.ambient / AMBIENT_MAX
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, LIGHT_SIZE.0, LIGHT_SIZE.1)
    }

    #[must_use]
    pub fn slider(&self) -> Rect {
        Rect::new(
            self.origin.x + 90.0,
            self.origin.y,
            SLIDER_THICKNESS,
            SLIDER_LENGTH,
        )
    }

    pub fn slider_changed(&mut self, at: Point) {
        let track = self.slider();
        let fraction = ((at.y - track.y) / track.h).clamp(0.0, 1.0);

        self.set_ambient(fraction * AMBIENT_MAX);
    }
}

/// On-screen remote: a grid of keys whose presses feed the receiver queue.
pub struct ReceiverPanel {
    name: String,
    origin: Point,
    layout: RemoteLayout,
    receiver: InfraredReceiver,
    keys: Vec<(Rect, String)>,
}

impl ReceiverPanel {
    pub(crate) fn new(setup: &ReceiverSetup) -> Self {
        let receiver = InfraredReceiver::new(&setup.config, &setup.remote_control);
        let origin = Point::new(setup.x, setup.y);

        let layout = &setup.remote_control;
        let mut keys = Vec::new();

        for (i, row) in layout.key_rows.iter().enumerate() {
            for (j, key) in row.iter().enumerate() {
                let Some(key) = key else { continue };

                let cell_w = f64::from(layout.key_width) + KEY_PADDING * 2.0;
                let cell_h = f64::from(layout.key_height) + KEY_PADDING * 2.0;

                let rect = Rect::new(
                    origin.x + j as f64 * cell_w + KEY_PADDING,
                    origin.y + i as f64 * cell_h + KEY_PADDING,
                    f64::from(layout.key_width),
                    f64::from(layout.key_height),
                );

                keys.push((rect, key.resolve_code()));
            }
        }

        Self {
            name: setup.name.clone(),
            origin,
            layout: setup.remote_control.clone(),
            receiver,
            keys,
        }
    }

    /// Appends the pressed key's code, if the point hits one.
    pub fn press(&self, at: Point) {
        for (rect, code) in &self.keys {
            if rect.contains(at) {
                self.receiver.key_press(code);
                return;
            }
        }
    }

    #[must_use]
    pub fn receiver(&self) -> InfraredReceiver {
        self.receiver.clone()
    }

    #[must_use]
    pub fn keys(&self) -> &[(Rect, String)] {
        &self.keys
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            f64::from(self.layout.width),
            f64::from(self.layout.height),
        )
    }
}

pub struct EmitterDevice {
    name: String,
    origin: Point,
    emitter: InfraredEmitter,
    previous: Option<bool>,
    on: bool,
}

impl EmitterDevice {
    pub(crate) fn new(setup: &EmitterSetup) -> Self {
        Self {
            name: setup.name.clone(),
            origin: Point::new(setup.x, setup.y),
            emitter: InfraredEmitter::new(setup.remote_controls.clone()),
            previous: None,
            on: false,
        }
    }

    fn update(&mut self) {
        let transmitting = self.emitter.is_transmitting();
        if self.previous == Some(transmitting) {
            return;
        }

        self.on = transmitting;
        self.previous = Some(transmitting);

        debug!("emitter {:?} -> {}", self.name, self.on);
    }

    #[must_use]
    pub fn emitter(&self) -> InfraredEmitter {
        self.emitter.clone()
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, EMITTER_SIZE.0, EMITTER_SIZE.1)
    }
}

/// The closed set of board devices, dispatched through one reconciliation
/// entry point.
pub enum Device {
    Led(Led),
    Buzzer(Buzzer),
    Button(PushButton),
    Lcd(Lcd),
    MotionSensor(MotionSensor),
    DistanceSensor(DistanceSensor),
    LightSensor(LightSensor),
    InfraredReceiver(ReceiverPanel),
    InfraredEmitter(EmitterDevice),
}

impl Device {
    /// Reconciles the visual representation with current pin state. Devices
    /// whose visuals never change from polling are a no-op.
    pub fn update(&mut self) {
        use Device::*;

        match self {
            Led(d) => d.update(),
            Buzzer(d) => d.update(),
            Button(d) => d.update(),
            MotionSensor(d) => d.update(),
            InfraredEmitter(d) => d.update(),
            Lcd(_) | DistanceSensor(_) | LightSensor(_) | InfraredReceiver(_) => {}
        }
    }

    #[must_use]
    pub fn visual(&self) -> Visual {
        use Device::*;

        match self {
            Led(d) => Visual::Led(d.visual()),
            Buzzer(d) => Visual::Buzzer(d.is_on()),
            Button(d) => Visual::Button(d.is_pressed()),
            Lcd(d) => Visual::Lcd(d.channel.grid()),
            MotionSensor(d) => Visual::Motion(d.visual()),
            DistanceSensor(_) | LightSensor(_) => Visual::Sensor,
            InfraredReceiver(_) => Visual::RemotePanel,
            InfraredEmitter(d) => Visual::Emitter(d.is_on()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        use Device::*;

        match self {
            Led(d) => &d.name,
            Buzzer(d) => &d.name,
            Button(d) => &d.name,
            Lcd(d) => &d.name,
            MotionSensor(d) => &d.name,
            DistanceSensor(d) => &d.name,
            LightSensor(d) => &d.name,
            InfraredReceiver(d) => &d.name,
            InfraredEmitter(d) => &d.name,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        use Device::*;

        match self {
            Led(d) => Rect::new(d.origin.x, d.origin.y, LED_SIZE.0, LED_SIZE.1),
            Buzzer(d) => Rect::new(d.origin.x, d.origin.y, BUZZER_SIZE.0, BUZZER_SIZE.1),
            Button(d) => d.bounds(),
            Lcd(d) => d.bounds(),
            MotionSensor(d) => d.bounds(),
            DistanceSensor(d) => d.bounds(),
            LightSensor(d) => d.bounds(),
            InfraredReceiver(d) => d.bounds(),
            InfraredEmitter(d) => d.bounds(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::compose_grid;
    use pretty_assertions::assert_eq;

    #[test]
    fn grid_wraps_on_newline() {
        assert_eq!(
            vec!["hello".to_owned(), "world".to_owned()],
            compose_grid("hello\nworld", 16, 2)
        );
    }

    #[test]
    fn grid_drops_overflowing_characters() {
        assert_eq!(
            vec!["abcd".to_owned(), "ef".to_owned()],
            compose_grid("abcdXYZ\nef\nthird line", 4, 2)
        );
    }

    #[test]
    fn grid_clears_missing_lines() {
        assert_eq!(
            vec!["hi".to_owned(), String::new()],
            compose_grid("hi", 16, 2)
        );
    }
}
