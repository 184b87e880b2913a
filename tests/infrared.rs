extern crate gpiosim;

use gpiosim::{InfraredEmitter, InfraredReceiver, RemoteControls, RemoteKey, RemoteLayout};
use pretty_assertions::assert_eq;
use std::{thread::sleep, time::Duration};

fn layout() -> RemoteLayout {
    RemoteLayout {
        width: 190,
        height: 120,
        key_width: 40,
        key_height: 30,
        key_rows: vec![
            vec![
                Some(RemoteKey::new("1")),
                Some(RemoteKey::new("2")),
                Some(RemoteKey::new("3")),
            ],
            vec![None, Some(RemoteKey::with_code("PWR", "KEY_POWER")), None],
        ],
    }
}

fn remotes() -> RemoteControls {
    let mut remotes = RemoteControls::new();
    remotes.insert("remote1", &["KEY_UP", "KEY_DOWN", "KEY_POWER"]);
    remotes
}

#[test]
fn receiver_queue_preserves_press_order() {
    let receiver = InfraredReceiver::new("lirc0", &layout());

    assert_eq!("lirc0", receiver.config_name());
    assert_eq!(None, receiver.get_next_code());

    receiver.key_press("KEY_1");
    receiver.key_press("KEY_2");
    receiver.key_press("KEY_1");

    assert_eq!(Some("KEY_1".to_owned()), receiver.get_next_code());
    assert_eq!(Some("KEY_2".to_owned()), receiver.get_next_code());
    assert_eq!(Some("KEY_1".to_owned()), receiver.get_next_code());
    assert_eq!(None, receiver.get_next_code());
}

#[test]
fn clear_codes_empties_the_queue() {
    let receiver = InfraredReceiver::new("lirc0", &layout());

    receiver.key_press("KEY_1");
    receiver.key_press("KEY_POWER");
    receiver.clear_codes();

    assert_eq!(None, receiver.get_next_code());
}

#[test]
fn layout_derives_the_key_code_list() {
    let receiver = InfraredReceiver::new("lirc0", &layout());

    assert_eq!(
        &["KEY_1", "KEY_2", "KEY_3", "KEY_POWER"],
        receiver.key_codes()
    );
}

#[test]
fn send_reports_each_code_and_pulses_the_visual() {
    let emitter = InfraredEmitter::new(remotes());

    assert!(!emitter.is_transmitting());

    let report = emitter
        .send_once("remote1", &["KEY_UP", "BOGUS"], 1)
        .unwrap();

    assert_eq!(vec!["KEY_UP".to_owned()], report.transmitted);
    assert_eq!(vec!["BOGUS".to_owned()], report.rejected);
    assert!(emitter.is_transmitting());

    // The transmit visual reverts on its own after one second.
    sleep(Duration::from_millis(1300));
    assert!(!emitter.is_transmitting());
}

#[test]
fn unknown_remote_aborts_without_visual_change() {
    let emitter = InfraredEmitter::new(remotes());

    assert_eq!(None, emitter.send_once("unknown_remote", &["KEY_UP"], 1));
    assert!(!emitter.is_transmitting());
    assert_eq!(None, emitter.list_codes("unknown_remote"));
}

#[test]
fn all_invalid_codes_do_not_pulse() {
    let emitter = InfraredEmitter::new(remotes());

    let report = emitter.send_once("remote1", &["BOGUS", "WORSE"], 1).unwrap();

    assert!(report.transmitted.is_empty());
    assert_eq!(2, report.rejected.len());
    assert!(!emitter.is_transmitting());
}

#[test]
fn resend_restarts_the_off_timer() {
    let emitter = InfraredEmitter::new(remotes());

    emitter.send_once("remote1", &["KEY_UP"], 1).unwrap();
    sleep(Duration::from_millis(600));

    emitter.send_once("remote1", &["KEY_DOWN"], 1).unwrap();

    // The first send's timer would have expired by now; the re-armed one
    // keeps the visual lit.
    sleep(Duration::from_millis(550));
    assert!(emitter.is_transmitting());

    sleep(Duration::from_millis(650));
    assert!(!emitter.is_transmitting());
}

#[test]
fn list_remotes_reflects_the_table() {
    let emitter = InfraredEmitter::new(remotes());

    assert_eq!(vec!["remote1"], emitter.list_remotes());
    assert_eq!(
        Some(&["KEY_UP".to_owned(), "KEY_DOWN".to_owned(), "KEY_POWER".to_owned()][..]),
        emitter.list_codes("remote1")
    );
}
