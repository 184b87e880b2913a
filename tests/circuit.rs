extern crate gpiosim;

use gpiosim::{
    BoardSetup, ButtonSetup, Circuit, Device, DistanceSensorSetup, EmitterSetup, LcdSetup,
    LedSetup, LightSensorSetup, MotionSensorSetup, PinState, Point, ReceiverSetup, RemoteControls,
    RemoteKey, RemoteLayout, Visual,
};
use pretty_assertions::assert_eq;

fn led(x: f64, name: &str, pin: u8) -> LedSetup {
    LedSetup {
        x,
        y: 50.0,
        name: name.to_owned(),
        pin,
    }
}

fn visuals(circuit: &Circuit) -> Vec<Visual> {
    circuit.devices().iter().map(Device::visual).collect()
}

#[test]
fn empty_board_ticks() {
    let mut circuit = Circuit::new(BoardSetup::default());

    circuit.tick();
    circuit.tick();

    assert_eq!("Virtual GPIO", circuit.name());
    assert!(circuit.devices().is_empty());
}

#[test]
fn a_pin_flip_only_changes_its_own_adapter() {
    let setup = BoardSetup {
        leds: vec![led(40.0, "red", 10), led(90.0, "green", 11), led(140.0, "blue", 12)],
        ..BoardSetup::default()
    };

    let mut circuit = Circuit::new(setup);
    circuit.tick();

    let before = visuals(&circuit);

    circuit.io().pin(11).drive_high();
    circuit.tick();

    let after = visuals(&circuit);

    let changed: Vec<usize> = (0..before.len())
        .filter(|&i| before[i] != after[i])
        .collect();

    assert_eq!(vec![1], changed);
    assert_eq!(Visual::Led(gpiosim::LedVisual::On), after[1]);
}

#[test]
fn led_tracks_pwm_duty() {
    let setup = BoardSetup {
        leds: vec![led(40.0, "pwm", 18)],
        ..BoardSetup::default()
    };

    let mut circuit = Circuit::new(setup);

    circuit.io().pin(18).set_state(PinState::Analog(0.4));
    circuit.tick();

    assert_eq!(
        vec![Visual::Led(gpiosim::LedVisual::Dimmed(0.4))],
        visuals(&circuit)
    );
}

#[test]
fn button_press_is_active_low() {
    let setup = BoardSetup {
        buttons: vec![ButtonSetup {
            x: 200.0,
            y: 80.0,
            name: "B1".to_owned(),
            pin: 11,
        }],
        ..BoardSetup::default()
    };

    let mut circuit = Circuit::new(setup);
    let pin = circuit.io().pin(11);

    // Released buttons idle high (pull-up wiring).
    assert!(pin.is_high());

    circuit.pointer_pressed(Point::new(215.0, 95.0));
    assert!(!pin.is_high());

    circuit.tick();
    assert_eq!(vec![Visual::Button(true)], visuals(&circuit));

    circuit.pointer_released(Point::new(215.0, 95.0));
    assert!(pin.is_high());

    circuit.tick();
    assert_eq!(vec![Visual::Button(false)], visuals(&circuit));
}

#[test]
fn presses_outside_the_button_do_nothing() {
    let setup = BoardSetup {
        buttons: vec![ButtonSetup {
            x: 200.0,
            y: 80.0,
            name: "B1".to_owned(),
            pin: 11,
        }],
        ..BoardSetup::default()
    };

    let mut circuit = Circuit::new(setup);

    circuit.pointer_pressed(Point::new(50.0, 50.0));
    assert!(circuit.io().pin(11).is_high());
}

#[test]
fn update_text_is_address_filtered() {
    let lcd = |x, pins: Vec<u8>, name: &str| LcdSetup {
        x,
        y: 40.0,
        name: name.to_owned(),
        pins,
        columns: 16,
        lines: 2,
    };

    let setup = BoardSetup {
        lcds: vec![lcd(40.0, vec![2, 3], "left"), lcd(300.0, vec![4, 5], "right")],
        ..BoardSetup::default()
    };

    let circuit = Circuit::new(setup);
    circuit.update_text(&[2, 3], "hello\nworld");

    let grids: Vec<Vec<String>> = circuit
        .devices()
        .iter()
        .map(|d| match d.visual() {
            Visual::Lcd(grid) => grid,
            other => panic!("unexpected visual {other:?}"),
        })
        .collect();

    assert_eq!(
        vec![
            vec!["hello".to_owned(), "world".to_owned()],
            vec![String::new(), String::new()],
        ],
        grids
    );
}

#[test]
fn control_handles_reach_the_display() {
    let setup = BoardSetup {
        lcds: vec![LcdSetup {
            x: 40.0,
            y: 40.0,
            name: "LCD".to_owned(),
            pins: vec![2, 3],
            columns: 8,
            lines: 1,
        }],
        ..BoardSetup::default()
    };

    let circuit = Circuit::new(setup);
    let io = circuit.io();

    io.update_text(&[2, 3], "ready");
    io.update_text(&[9, 9], "ignored");

    assert_eq!(
        vec![Visual::Lcd(vec!["ready".to_owned()])],
        visuals(&circuit)
    );
}

#[test]
fn pointer_proximity_triggers_the_motion_sensor() {
    let setup = BoardSetup {
        motion_sensors: vec![MotionSensorSetup {
            x: 330.0,
            y: 60.0,
            name: "PIR".to_owned(),
            pin: 17,
            ..MotionSensorSetup::default()
        }],
        ..BoardSetup::default()
    };

    let mut circuit = Circuit::new(setup);
    let pin = circuit.io().pin(17);

    // Far away: nothing happens.
    circuit.pointer_moved(Point::new(50.0, 400.0), false);
    assert!(!pin.is_high());

    // Within the detection radius of the widget center (370, 90).
    circuit.pointer_moved(Point::new(360.0, 100.0), false);
    assert!(pin.is_high());
}

#[test]
fn distance_slider_programs_the_echo_time() {
    let setup = BoardSetup {
        distance_sensors: vec![DistanceSensorSetup {
            x: 40.0,
            y: 300.0,
            name: "Sonar".to_owned(),
            trigger_pin: 23,
            echo_pin: 24,
            ..DistanceSensorSetup::default()
        }],
        ..BoardSetup::default()
    };

    let mut circuit = Circuit::new(setup);

    let distance = |circuit: &Circuit| match &circuit.devices()[0] {
        Device::DistanceSensor(sensor) => sensor.distance(),
        _ => unreachable!(),
    };

    // Initialized to the midpoint of 0..50 cm.
    assert_eq!(25.0, distance(&circuit));

    // Drag to the far right end of the track at (140, 300) + 150x20.
    circuit.pointer_pressed(Point::new(290.0, 310.0));
    assert_eq!(50.0, distance(&circuit));

    circuit.pointer_moved(Point::new(140.0, 310.0), true);
    assert_eq!(0.0, distance(&circuit));
}

#[test]
fn light_slider_adjusts_the_charge_time() {
    let setup = BoardSetup {
        light_sensors: vec![LightSensorSetup {
            x: 330.0,
            y: 200.0,
            name: "LDR".to_owned(),
            pin: 25,
        }],
        ..BoardSetup::default()
    };

    let mut circuit = Circuit::new(setup);

    let ambient = |circuit: &Circuit| match &circuit.devices()[0] {
        Device::LightSensor(sensor) => sensor.ambient(),
        _ => unreachable!(),
    };

    assert_eq!(30.0, ambient(&circuit));

    // Slider track sits at (420, 200), 20x150; drag to the bottom.
    circuit.pointer_pressed(Point::new(430.0, 350.0));
    assert_eq!(90.0, ambient(&circuit));
}

#[test]
fn remote_key_press_feeds_the_receiver_queue() {
    let layout = RemoteLayout {
        width: 190,
        height: 120,
        key_width: 40,
        key_height: 30,
        key_rows: vec![vec![Some(RemoteKey::new("1")), Some(RemoteKey::new("2"))]],
    };

    let setup = BoardSetup {
        infrared_receiver: Some(ReceiverSetup {
            x: 40.0,
            y: 40.0,
            name: "Receiver".to_owned(),
            config: "lirc0".to_owned(),
            remote_control: layout,
        }),
        ..BoardSetup::default()
    };

    let mut circuit = Circuit::new(setup);
    let receiver = circuit.io().infrared_receiver().unwrap().clone();

    // Second key's cell starts one key-width plus padding to the right:
    // (40 + 56 + 8, 40 + 8) -> 40x30.
    circuit.pointer_pressed(Point::new(110.0, 60.0));

    assert_eq!(Some("KEY_2".to_owned()), receiver.get_next_code());
    assert_eq!(None, receiver.get_next_code());
}

#[test]
fn emitter_visual_reconciles_from_sends() {
    let mut remotes = RemoteControls::new();
    remotes.insert("tv", &["KEY_POWER"]);

    let setup = BoardSetup {
        infrared_emitter: Some(EmitterSetup {
            x: 330.0,
            y: 120.0,
            name: "Emitter".to_owned(),
            remote_controls: remotes,
        }),
        ..BoardSetup::default()
    };

    let mut circuit = Circuit::new(setup);
    let emitter = circuit.io().infrared_emitter().unwrap().clone();

    circuit.tick();
    assert_eq!(vec![Visual::Emitter(false)], visuals(&circuit));

    emitter.send_once("tv", &["KEY_POWER"], 1).unwrap();
    circuit.tick();
    assert_eq!(vec![Visual::Emitter(true)], visuals(&circuit));
}
