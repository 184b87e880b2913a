use crate::infrared::{RemoteControls, RemoteLayout};

/// Declarative description of a board: window geometry plus one list per
/// device kind. Unfilled fields keep the defaults below.
#[derive(Debug, Clone)]
pub struct BoardSetup {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub leds: Vec<LedSetup>,
    pub buzzers: Vec<BuzzerSetup>,
    pub buttons: Vec<ButtonSetup>,
    pub lcds: Vec<LcdSetup>,
    pub motion_sensors: Vec<MotionSensorSetup>,
    pub distance_sensors: Vec<DistanceSensorSetup>,
    pub light_sensors: Vec<LightSensorSetup>,
    pub infrared_receiver: Option<ReceiverSetup>,
    pub infrared_emitter: Option<EmitterSetup>,
}

impl Default for BoardSetup {
    fn default() -> Self {
        Self {
            name: "Virtual GPIO".to_owned(),
            width: 500,
            height: 500,
            leds: Vec::new(),
            buzzers: Vec::new(),
            buttons: Vec::new(),
            lcds: Vec::new(),
            motion_sensors: Vec::new(),
            distance_sensors: Vec::new(),
            light_sensors: Vec::new(),
            infrared_receiver: None,
            infrared_emitter: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LedSetup {
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub pin: u8,
}

#[derive(Debug, Clone)]
pub struct BuzzerSetup {
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub pin: u8,
}

#[derive(Debug, Clone)]
pub struct ButtonSetup {
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub pin: u8,
}

#[derive(Debug, Clone)]
pub struct LcdSetup {
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub pins: Vec<u8>,
    pub columns: usize,
    pub lines: usize,
}

#[derive(Debug, Clone)]
pub struct MotionSensorSetup {
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub pin: u8,
    /// Pointer-to-widget-center distance below which motion registers, px.
    pub detection_radius: f64,
    /// Seconds of signal silence before detection ends.
    pub delay_duration: f64,
    /// Cooldown seconds during which new signals are ignored.
    pub block_duration: f64,
}

impl Default for MotionSensorSetup {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            name: String::new(),
            pin: 0,
            detection_radius: 50.0,
            delay_duration: 5.0,
            block_duration: 3.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DistanceSensorSetup {
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub trigger_pin: u8,
    pub echo_pin: u8,
    /// Slider range, centimeters.
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for DistanceSensorSetup {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            name: String::new(),
            trigger_pin: 0,
            echo_pin: 0,
            min_distance: 0.0,
            max_distance: 50.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LightSensorSetup {
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub pin: u8,
}

#[derive(Debug, Clone)]
pub struct ReceiverSetup {
    pub x: f64,
    pub y: f64,
    pub name: String,
    /// Config name reported to application code.
    pub config: String,
    pub remote_control: RemoteLayout,
}

#[derive(Debug, Clone)]
pub struct EmitterSetup {
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub remote_controls: RemoteControls,
}
