use criterion::*;
use gpiosim::{BoardSetup, Circuit, LedSetup, PinState};

fn criterion_benchmark(c: &mut Criterion) {
    let leds = (0..32)
        .map(|i| LedSetup {
            x: f64::from(i) * 40.0,
            y: 50.0,
            name: format!("led{i}"),
            pin: i as u8,
        })
        .collect();

    let mut circuit = Circuit::new(BoardSetup {
        leds,
        ..BoardSetup::default()
    });

    let io = circuit.io();

    c.bench_function("tick", move |b| {
        let mut duty = 0.0;

        b.iter(|| {
            duty = if duty >= 1.0 { 0.0 } else { duty + 0.01 };
            io.pin(7).set_state(PinState::Analog(duty));

            circuit.tick();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
