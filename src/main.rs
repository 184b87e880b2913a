mod sdl;

use clap::{Parser, ValueEnum};
use gpiosim::{
    BoardIo, BoardSetup, ButtonSetup, BuzzerSetup, Circuit, DistanceSensorSetup, EmitterSetup,
    LcdSetup, LedSetup, LightSensorSetup, MotionSensorSetup, Pin, PinState, ReceiverSetup,
    RemoteControls, RemoteKey, RemoteLayout,
};
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::{
    fs,
    path::PathBuf,
    thread::sleep,
    time::{Duration, Instant},
};

#[derive(Parser)]
#[command(about = "Simulated GPIO board with an SDL front panel")]
struct Args {
    /// Demo board to run
    #[arg(value_enum, default_value_t = Demo::Blink)]
    demo: Demo,

    /// Remote definition file overriding the built-in table
    #[arg(long)]
    remotes: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Demo {
    /// Blinking LEDs, push button and buzzer
    Blink,
    /// Motion, distance and light sensors reporting to an LCD
    Sensors,
    /// Infrared remote feeding an emitter
    Remote,
}

fn main() {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("failed to init logger");

    let remotes = match args.remotes {
        Some(path) => {
            let text = fs::read_to_string(&path).expect("failed to read remote definitions");
            RemoteControls::from_str(&text).expect("failed to parse remote definitions")
        }
        None => default_remotes(),
    };

    let (setup, control): (BoardSetup, fn(BoardIo)) = match args.demo {
        Demo::Blink => (blink_board(), blink_control),
        Demo::Sensors => (sensors_board(), sensors_control),
        Demo::Remote => (remote_board(remotes), remote_control),
    };

    let circuit = Circuit::new(setup);
    let _control = circuit.spawn_control(control);

    sdl::run(circuit);
}

fn blink_board() -> BoardSetup {
    BoardSetup {
        name: "Blink".to_owned(),
        width: 320,
        height: 300,
        leds: vec![
            LedSetup {
                x: 50.0,
                y: 80.0,
                name: "LED".to_owned(),
                pin: 21,
            },
            LedSetup {
                x: 120.0,
                y: 80.0,
                name: "PWM LED".to_owned(),
                pin: 22,
            },
        ],
        buzzers: vec![BuzzerSetup {
            x: 50.0,
            y: 180.0,
            name: "Buzzer".to_owned(),
            pin: 4,
        }],
        buttons: vec![ButtonSetup {
            x: 200.0,
            y: 80.0,
            name: "Button".to_owned(),
            pin: 11,
        }],
        ..BoardSetup::default()
    }
}

fn blink_control(io: BoardIo) {
    let led = io.pin(21);
    let pwm = io.pin(22);
    let buzzer = io.pin(4);
    let button = io.pin(11);

    let mut on = false;
    let mut duty = 0.0;

    loop {
        on = !on;
        led.set_state(PinState::Digital(on));

        duty = if duty >= 1.0 { 0.0 } else { duty + 0.1 };
        pwm.set_state(PinState::Analog(duty));

        // The buzzer sounds while the button is held (active-low wiring).
        for _ in 0..6 {
            buzzer.set_state(PinState::Digital(!button.is_high()));
            sleep(Duration::from_millis(50));
        }
    }
}

fn sensors_board() -> BoardSetup {
    BoardSetup {
        name: "Sensor Playground".to_owned(),
        width: 560,
        height: 480,
        lcds: vec![LcdSetup {
            x: 40.0,
            y: 40.0,
            name: "LCD".to_owned(),
            pins: vec![2, 3],
            columns: 16,
            lines: 2,
        }],
        motion_sensors: vec![MotionSensorSetup {
            x: 330.0,
            y: 60.0,
            name: "PIR".to_owned(),
            pin: 17,
            delay_duration: 2.0,
            block_duration: 3.0,
            ..MotionSensorSetup::default()
        }],
        distance_sensors: vec![DistanceSensorSetup {
            x: 40.0,
            y: 320.0,
            name: "Sonar".to_owned(),
            trigger_pin: 23,
            echo_pin: 24,
            ..DistanceSensorSetup::default()
        }],
        light_sensors: vec![LightSensorSetup {
            x: 330.0,
            y: 200.0,
            name: "LDR".to_owned(),
            pin: 25,
        }],
        ..BoardSetup::default()
    }
}

fn sensors_control(io: BoardIo) {
    let trigger = io.pin(23);
    let echo = io.pin(24);
    let light = io.pin(25);
    let motion = io.pin(17);

    loop {
        let line1 = match measure_distance(&trigger, &echo) {
            Some(cm) => format!("dist {cm:5.1} cm"),
            None => "dist  ---".to_owned(),
        };

        let line2 = format!(
            "light {:3.0}% {}",
            measure_light(&light),
            if motion.is_high() { "PIR!" } else { "" }
        );

        io.update_text(&[2, 3], &format!("{line1}\n{line2}"));

        sleep(Duration::from_millis(500));
    }
}

/// Fires the trigger and times the echo pulse, like an HC-SR04 driver.
fn measure_distance(trigger: &Pin, echo: &Pin) -> Option<f64> {
    const SPEED_OF_SOUND: f64 = 343.26; // m/s

    trigger.drive_high();
    trigger.drive_low();

    let deadline = Instant::now() + Duration::from_secs(1);

    while !echo.is_high() {
        if Instant::now() > deadline {
            return None;
        }
        sleep(Duration::from_micros(200));
    }

    let rise = Instant::now();
    while echo.is_high() {
        if Instant::now() > deadline {
            return None;
        }
        sleep(Duration::from_micros(200));
    }

    let round_trip = rise.elapsed().as_secs_f64();
    Some(round_trip * SPEED_OF_SOUND / 2.0 * 100.0)
}

/// Discharges the capacitor and times the recharge; quicker is brighter.
fn measure_light(pin: &Pin) -> f64 {
    let limit = Duration::from_millis(20);

    pin.drive_low();
    let start = Instant::now();

    while start.elapsed() < limit {
        if let PinState::Analog(value) = pin.state() {
            if value >= 1.0 {
                break;
            }
        }
        sleep(Duration::from_micros(200));
    }

    let charge = start.elapsed().min(limit);
    100.0 * (1.0 - charge.as_secs_f64() / limit.as_secs_f64())
}

fn default_remotes() -> RemoteControls {
    let mut remotes = RemoteControls::new();
    remotes.insert(
        "remote1",
        &[
            "KEY_1",
            "KEY_2",
            "KEY_3",
            "KEY_4",
            "KEY_5",
            "KEY_6",
            "KEY_7",
            "KEY_8",
            "KEY_9",
            "KEY_0",
            "KEY_POWER",
        ],
    );

    remotes
}

fn remote_board(remote_controls: RemoteControls) -> BoardSetup {
    let digit = |n: u32| Some(RemoteKey::new(&n.to_string()));

    let layout = RemoteLayout {
        width: 190,
        height: 240,
        key_width: 40,
        key_height: 30,
        key_rows: vec![
            vec![digit(1), digit(2), digit(3)],
            vec![digit(4), digit(5), digit(6)],
            vec![digit(7), digit(8), digit(9)],
            vec![
                None,
                digit(0),
                Some(RemoteKey::with_code("PWR", "KEY_POWER")),
            ],
        ],
    };

    BoardSetup {
        name: "Infrared".to_owned(),
        width: 560,
        height: 360,
        infrared_receiver: Some(ReceiverSetup {
            x: 40.0,
            y: 40.0,
            name: "Receiver".to_owned(),
            config: "lirc0".to_owned(),
            remote_control: layout,
        }),
        infrared_emitter: Some(EmitterSetup {
            x: 330.0,
            y: 120.0,
            name: "Emitter".to_owned(),
            remote_controls,
        }),
        ..BoardSetup::default()
    }
}

fn remote_control(io: BoardIo) {
    let receiver = io
        .infrared_receiver()
        .expect("board has a receiver")
        .clone();
    let emitter = io.infrared_emitter().expect("board has an emitter").clone();

    info!("receiver config: {}", receiver.config_name());
    info!("emitter remotes: {:?}", emitter.list_remotes());

    loop {
        while let Some(code) = receiver.get_next_code() {
            info!("received {code}, relaying");
            emitter.send_once("remote1", &[code.as_str()], 1);
        }

        sleep(Duration::from_millis(100));
    }
}
