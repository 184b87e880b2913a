use gpiosim::{Circuit, Device, Lcd, LedVisual, MotionVisual, Point};
use log::info;
use sdl2::{
    event::Event,
    gfx::framerate::FPSManager,
    keyboard::Keycode,
    mouse::MouseButton,
    pixels::Color,
    rect::Rect,
    render::Canvas,
    video::Window,
    EventPump,
};
use std::process;

const BACKGROUND: Color = Color::RGB(250, 250, 250);
const SENSOR_BODY: Color = Color::RGB(70, 90, 120);
const SLIDER_TRACK: Color = Color::RGB(220, 220, 220);
const SLIDER_KNOB: Color = Color::RGB(90, 90, 90);
const KNOB_SIZE: f64 = 10.0;

pub fn run(mut circuit: Circuit) {
    let sdl_context = sdl2::init().unwrap();
    let video_subsystem = sdl_context.video().unwrap();
    video_subsystem.text_input().stop();

    let mut window = video_subsystem
        .window(circuit.name(), circuit.width(), circuit.height())
        .position_centered()
        .build()
        .unwrap();

    window.raise();

    let mut canvas = window.into_canvas().accelerated().build().unwrap();
    let mut event_pump = sdl_context.event_pump().unwrap();

    let mut fps_manager = FPSManager::new();
    fps_manager
        .set_framerate(100)
        .expect("failed to set tick rate");

    let mut held = false;

    loop {
        handle_input(&mut circuit, &mut event_pump, &mut held);

        circuit.tick();

        canvas.set_draw_color(BACKGROUND);
        canvas.clear();

        for device in circuit.devices() {
            draw_device(&mut canvas, device);
        }

        canvas.present();
        fps_manager.delay();
    }
}

fn handle_input(circuit: &mut Circuit, event_pump: &mut EventPump, held: &mut bool) {
    for event in event_pump.poll_iter() {
        match event {
            Event::Quit { .. }
            | Event::KeyDown {
                keycode: Some(Keycode::Escape),
                ..
            } => {
                // Hard termination: pending timers and the control thread
                // die with the process.
                info!("window closed, terminating");
                process::exit(0);
            }
            Event::MouseMotion { x, y, .. } => {
                circuit.pointer_moved(point(x, y), *held);
            }
            Event::MouseButtonDown {
                mouse_btn: MouseButton::Left,
                x,
                y,
                ..
            } => {
                *held = true;
                circuit.pointer_pressed(point(x, y));
            }
            Event::MouseButtonUp {
                mouse_btn: MouseButton::Left,
                x,
                y,
                ..
            } => {
                *held = false;
                circuit.pointer_released(point(x, y));
            }
            _ => {}
        }
    }
}

fn point(x: i32, y: i32) -> Point {
    Point::new(f64::from(x), f64::from(y))
}

fn draw_device(canvas: &mut Canvas<Window>, device: &Device) {
    let bounds = device.bounds();

    match device {
        Device::Led(led) => fill(canvas, bounds, led_color(led.visual())),
        Device::Buzzer(buzzer) => {
            let color = if buzzer.is_on() {
                Color::RGB(255, 140, 0)
            } else {
                Color::RGB(190, 190, 190)
            };
            fill(canvas, bounds, color);
        }
        Device::Button(button) => {
            let color = if button.is_pressed() {
                Color::RGB(60, 60, 60)
            } else {
                Color::RGB(130, 130, 130)
            };
            fill(canvas, bounds, color);
        }
        Device::Lcd(lcd) => draw_lcd(canvas, lcd),
        Device::MotionSensor(sensor) => fill(canvas, bounds, motion_color(sensor.visual())),
        Device::DistanceSensor(sensor) => {
            fill(canvas, bounds, SENSOR_BODY);
            draw_slider(canvas, sensor.slider(), sensor.fraction(), true);
        }
        Device::LightSensor(sensor) => {
            fill(canvas, bounds, SENSOR_BODY);
            draw_slider(canvas, sensor.slider(), sensor.fraction(), false);
        }
        Device::InfraredReceiver(panel) => {
            fill(canvas, bounds, Color::RGB(40, 40, 40));

            for (key, _) in panel.keys() {
                fill(canvas, *key, Color::RGB(200, 200, 200));
            }
        }
        Device::InfraredEmitter(emitter) => {
            let color = if emitter.is_on() {
                Color::RGB(230, 40, 40)
            } else {
                Color::RGB(90, 90, 90)
            };
            fill(canvas, bounds, color);
        }
    }
}

fn led_color(visual: LedVisual) -> Color {
    let duty = match visual {
        LedVisual::Off => 0.0,
        LedVisual::On => 1.0,
        LedVisual::Dimmed(duty) => duty.clamp(0.0, 1.0),
    };

    Color::RGB(90 + (duty * 165.0) as u8, 30, 30)
}

fn motion_color(visual: MotionVisual) -> Color {
    match visual {
        MotionVisual::NoMotion => Color::RGB(120, 120, 120),
        MotionVisual::Motion => Color::RGB(40, 200, 60),
        MotionVisual::Wait => Color::RGB(230, 190, 40),
    }
}

// Character cell metrics of the HD44780-style display.
const LCD_MARGIN: f64 = 8.0;
const CHAR_WIDTH: f64 = 12.0;
const CHAR_HEIGHT: f64 = 16.0;
const CHAR_X_GAP: f64 = 3.0;
const CHAR_Y_GAP: f64 = 5.0;

fn draw_lcd(canvas: &mut Canvas<Window>, lcd: &Lcd) {
    let bounds = lcd.bounds();
    fill(canvas, bounds, Color::RGB(130, 224, 7));

    let grid = lcd.channel().grid();

    for line in 0..lcd.lines() {
        for column in 0..lcd.columns() {
            let lit = grid
                .get(line)
                .is_some_and(|row| !row.chars().nth(column).unwrap_or(' ').is_whitespace());

            let cell = gpiosim::Rect::new(
                bounds.x + LCD_MARGIN + column as f64 * (CHAR_WIDTH + CHAR_X_GAP),
                bounds.y + LCD_MARGIN + line as f64 * (CHAR_HEIGHT + CHAR_Y_GAP),
                CHAR_WIDTH,
                CHAR_HEIGHT,
            );

            let color = if lit {
                Color::RGB(30, 50, 10)
            } else {
                Color::RGB(114, 208, 0)
            };
            fill(canvas, cell, color);
        }
    }
}

fn draw_slider(canvas: &mut Canvas<Window>, track: gpiosim::Rect, fraction: f64, horizontal: bool) {
    fill(canvas, track, SLIDER_TRACK);

    let knob = if horizontal {
        gpiosim::Rect::new(
            track.x + fraction * (track.w - KNOB_SIZE),
            track.y,
            KNOB_SIZE,
            track.h,
        )
    } else {
        gpiosim::Rect::new(
            track.x,
            track.y + fraction * (track.h - KNOB_SIZE),
            track.w,
            KNOB_SIZE,
        )
    };

    fill(canvas, knob, SLIDER_KNOB);
}

fn fill(canvas: &mut Canvas<Window>, rect: gpiosim::Rect, color: Color) {
    canvas.set_draw_color(color);
    canvas
        .fill_rect(Rect::new(
            rect.x as i32,
            rect.y as i32,
            rect.w as u32,
            rect.h as u32,
        ))
        .expect("failed to fill rect");
}
