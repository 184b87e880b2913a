#![allow(clippy::missing_errors_doc, clippy::enum_glob_use)]

#[cfg(test)]
extern crate pretty_assertions;

mod device;
mod geom;
mod infrared;
mod motion;
mod pin;
mod setup;
mod timer;
mod timing;

pub use device::{
    Buzzer, Device, DistanceSensor, EmitterDevice, Lcd, LcdChannel, Led, LedVisual, LightSensor,
    MotionSensor, PushButton, ReceiverPanel, Visual,
};
pub use geom::{Point, Rect};
pub use infrared::{
    InfraredEmitter, InfraredReceiver, RemoteControls, RemoteKey, RemoteLayout, SendReport,
};
pub use motion::{MotionDetector, MotionVisual};
pub use pin::{Pin, PinFactory, PinState};
pub use setup::{
    BoardSetup, ButtonSetup, BuzzerSetup, DistanceSensorSetup, EmitterSetup, LcdSetup, LedSetup,
    LightSensorSetup, MotionSensorSetup, ReceiverSetup,
};
pub use timing::{ChargingPin, TriggerPin};

use log::debug;
use std::thread::{self, JoinHandle};

/// A simulated board: the pin factory plus the flat registry of visual
/// device adapters. Constructed explicitly from a [`BoardSetup`] and passed
/// by reference to whatever needs it.
///
/// The circuit itself lives on the GUI actor: the frontend calls [`tick`]
/// every 10 ms and routes pointer input through the `pointer_*` entry
/// points, while control code runs on the thread started by
/// [`spawn_control`] and only touches the shared handles inside [`BoardIo`].
///
/// [`tick`]: Circuit::tick
/// [`spawn_control`]: Circuit::spawn_control
pub struct Circuit {
    name: String,
    width: u32,
    height: u32,
    pins: PinFactory,
    devices: Vec<Device>,
    lcds: Vec<LcdChannel>,
    receiver: Option<InfraredReceiver>,
    emitter: Option<InfraredEmitter>,
}

impl Circuit {
    #[must_use]
    pub fn new(setup: BoardSetup) -> Self {
        let pins = PinFactory::new();
        let mut devices = Vec::new();

        devices.extend(setup.leds.iter().map(|s| Device::Led(device::Led::new(&pins, s))));
        devices.extend(
            setup
                .buzzers
                .iter()
                .map(|s| Device::Buzzer(device::Buzzer::new(&pins, s))),
        );
        devices.extend(
            setup
                .lcds
                .iter()
                .map(|s| Device::Lcd(device::Lcd::new(s))),
        );
        devices.extend(
            setup
                .buttons
                .iter()
                .map(|s| Device::Button(device::PushButton::new(&pins, s))),
        );
        devices.extend(
            setup
                .distance_sensors
                .iter()
                .map(|s| Device::DistanceSensor(device::DistanceSensor::new(&pins, s))),
        );
        devices.extend(
            setup
                .light_sensors
                .iter()
                .map(|s| Device::LightSensor(device::LightSensor::new(&pins, s))),
        );
        devices.extend(
            setup
                .motion_sensors
                .iter()
                .map(|s| Device::MotionSensor(device::MotionSensor::new(&pins, s))),
        );

        if let Some(s) = &setup.infrared_receiver {
            devices.push(Device::InfraredReceiver(device::ReceiverPanel::new(s)));
        }

        if let Some(s) = &setup.infrared_emitter {
            devices.push(Device::InfraredEmitter(device::EmitterDevice::new(s)));
        }

        let lcds = devices
            .iter()
            .filter_map(|d| match d {
                Device::Lcd(lcd) => Some(lcd.channel()),
                _ => None,
            })
            .collect();

        let receiver = devices.iter().find_map(|d| match d {
            Device::InfraredReceiver(panel) => Some(panel.receiver()),
            _ => None,
        });

        let emitter = devices.iter().find_map(|d| match d {
            Device::InfraredEmitter(e) => Some(e.emitter()),
            _ => None,
        });

        debug!("circuit {:?} with {} devices", setup.name, devices.len());

        Self {
            name: setup.name,
            width: setup.width,
            height: setup.height,
            pins,
            devices,
            lcds,
            receiver,
            emitter,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pins(&self) -> &PinFactory {
        &self.pins
    }

    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// One polling pass: every registered adapter reconciles exactly once.
    pub fn tick(&mut self) {
        for device in &mut self.devices {
            device.update();
        }
    }

    /// Broadcasts a text write to every display; only the one whose pins
    /// match applies it.
    pub fn update_text(&self, pins: &[u8], text: &str) {
        for lcd in &self.lcds {
            lcd.update_text(pins, text);
        }
    }

    pub fn pointer_moved(&mut self, at: Point, pressed: bool) {
        for device in &mut self.devices {
            match device {
                Device::MotionSensor(sensor) => sensor.signal_if_near(at),
                Device::DistanceSensor(sensor) if pressed && sensor.slider().contains(at) => {
                    sensor.slider_changed(at);
                }
                Device::LightSensor(sensor) if pressed && sensor.slider().contains(at) => {
                    sensor.slider_changed(at);
                }
                _ => {}
            }
        }
    }

    pub fn pointer_pressed(&mut self, at: Point) {
        for device in &mut self.devices {
            match device {
                Device::Button(button) if button.bounds().contains(at) => button.press(),
                Device::InfraredReceiver(panel) => panel.press(at),
                Device::DistanceSensor(sensor) if sensor.slider().contains(at) => {
                    sensor.slider_changed(at);
                }
                Device::LightSensor(sensor) if sensor.slider().contains(at) => {
                    sensor.slider_changed(at);
                }
                _ => {}
            }
        }
    }

    pub fn pointer_released(&mut self, _at: Point) {
        for device in &mut self.devices {
            if let Device::Button(button) = device {
                button.release();
            }
        }
    }

    /// Handle bundle for the control thread.
    #[must_use]
    pub fn io(&self) -> BoardIo {
        BoardIo {
            pins: self.pins.clone(),
            lcds: self.lcds.clone(),
            receiver: self.receiver.clone(),
            emitter: self.emitter.clone(),
        }
    }

    /// Starts the user's control program on its own thread. The thread is
    /// never joined: closing the window exits the process and takes it down.
    pub fn spawn_control<F>(&self, f: F) -> JoinHandle<()>
    where
        F: FnOnce(BoardIo) + Send + 'static,
    {
        let io = self.io();

        thread::Builder::new()
            .name("control".into())
            .spawn(move || f(io))
            .expect("failed to spawn control thread")
    }
}

/// Shared handles a control program works with: pins, display channels and
/// the infrared endpoints. Everything here is safe to use while the GUI
/// actor polls concurrently.
#[derive(Clone)]
pub struct BoardIo {
    pins: PinFactory,
    lcds: Vec<LcdChannel>,
    receiver: Option<InfraredReceiver>,
    emitter: Option<InfraredEmitter>,
}

impl BoardIo {
    #[must_use]
    pub fn pin(&self, id: u8) -> Pin {
        self.pins.pin(id)
    }

    pub fn update_text(&self, pins: &[u8], text: &str) {
        for lcd in &self.lcds {
            lcd.update_text(pins, text);
        }
    }

    #[must_use]
    pub fn infrared_receiver(&self) -> Option<&InfraredReceiver> {
        self.receiver.as_ref()
    }

    #[must_use]
    pub fn infrared_emitter(&self) -> Option<&InfraredEmitter> {
        self.emitter.as_ref()
    }
}
