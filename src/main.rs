use clap::Parser;
use minifb::{Key, MouseButton};

mod annotate;
mod args;
mod calibration;
mod config;
mod dispatch;
mod font;
mod logger;
mod output;
mod recorder;
mod session;
mod snap;
mod source;
mod targets;
mod types;
mod wire;

use annotate::Canvas;
use args::Args;
use config::AppConfig;
use dispatch::UdpDispatcher;
use output::WindowOutput;
use recorder::Recorder;
use session::Session;
use types::{Frame, KeyCommand, PixelPoint, PointerButton, PointerEvent};

const WINDOW_TITLE: &str = "Live Ultrasound Video Capture";

fn key_command(key: Key) -> Option<KeyCommand> {
    match key {
        Key::R => Some(KeyCommand::ToggleRecording),
        Key::C => Some(KeyCommand::ToggleCalibration),
        Key::T => Some(KeyCommand::ToggleTargeting),
        Key::H => Some(KeyCommand::ToggleAnnotations),
        Key::Q | Key::Escape => Some(KeyCommand::Quit),
        _ => None,
    }
}

/// Tracks mouse button state across frames so each press yields
/// exactly one pointer event.
#[derive(Default)]
struct MouseButtons {
    left: bool,
    right: bool,
    middle: bool,
}

impl MouseButtons {
    fn pressed(&mut self, window: &WindowOutput) -> Vec<PointerButton> {
        let mut pressed = Vec::new();
        for (button, held) in [
            (PointerButton::Left, &mut self.left),
            (PointerButton::Right, &mut self.right),
            (PointerButton::Middle, &mut self.middle),
        ] {
            let down = window.mouse_down(match button {
                PointerButton::Left => MouseButton::Left,
                PointerButton::Right => MouseButton::Right,
                PointerButton::Middle => MouseButton::Middle,
            });
            if down && !*held {
                pressed.push(button);
            }
            *held = down;
        }
        pressed
    }
}

fn list_cameras() -> anyhow::Result<()> {
    let cameras = nokhwa::query(nokhwa::utils::ApiBackend::Auto)?;
    println!("Available Cameras:");
    println!("{:<5} | {:<30} | {:<10}", "Index", "Name", "Misc");
    println!("{}", "-".repeat(60));
    for cam in cameras {
        println!(
            "{:<5} | {:<30} | {:?}",
            cam.index(),
            cam.human_name(),
            cam.misc()
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.list {
        return list_cameras();
    }

    let config = AppConfig::load(args.config.as_deref())?;
    let width = config.video_capture.width;
    let height = config.video_capture.height;

    let mut source = source::open(&config.video_capture)?;
    logger::info(&format!("Opened video source: {}", source.name()));

    let udp = &config.udp_communication;
    let mut dispatcher =
        UdpDispatcher::bind(udp.local_addr(), udp.remote_addr(), udp.wire_format()?)?;
    logger::info(&format!(
        "UDP dispatcher bound; targets go to {}",
        dispatcher.remote()
    ));

    let mut recorder = Recorder::new(&config.video_recording.directory);
    let mut session = Session::new(
        PixelPoint::new(width as i32 / 2, height as i32 / 2),
        snap::DEFAULT_SEARCH_RADIUS,
    );
    let mut window = WindowOutput::new(
        WINDOW_TITLE,
        width as usize,
        height as usize,
        source.fps_hint(),
    )?;
    let mut buttons = MouseButtons::default();

    logger::log("=================================================");
    logger::info("Starting live ultrasound video capture");
    logger::info("Press 'r' to start/stop recording, 'c' to toggle calibration mode, 't' to toggle targeting mode");
    logger::info("Press 'h' to hide/show annotations (not available in calibration and targeting modes)");
    logger::info("Press 'q' to quit");
    logger::info(&format!(
        "Recordings will be saved in the '{}' folder",
        config.video_recording.directory.display()
    ));
    logger::log("=================================================");

    'capture: while window.is_open() {
        let frame = match source.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                logger::error(&format!("Failed to capture frame: {:#}", e));
                break;
            }
        };

        // Pointer input against the raw frame (the snapper must not see
        // annotation pixels).
        let mouse = window
            .mouse_pos()
            .map(|(x, y)| PixelPoint::new(x as i32, y as i32));
        session.set_mouse_position(mouse);
        if let Some(pos) = mouse {
            let ctrl = window.is_key_down(Key::LeftCtrl) || window.is_key_down(Key::RightCtrl);
            for button in buttons.pressed(&window) {
                let event = PointerEvent::new(button, pos, ctrl);
                session.handle_pointer(event, &frame, &mut dispatcher);
            }
        }

        for key in window.keys_pressed() {
            match key_command(key) {
                Some(KeyCommand::ToggleRecording) => {
                    if let Err(e) = recorder.toggle() {
                        logger::error(&format!("Recording toggle failed: {:#}", e));
                    }
                }
                Some(KeyCommand::ToggleCalibration) => {
                    session.toggle_calibration();
                }
                Some(KeyCommand::ToggleTargeting) => {
                    session.toggle_targeting();
                }
                Some(KeyCommand::ToggleAnnotations) => {
                    session.toggle_annotations();
                }
                Some(KeyCommand::Quit) => {
                    logger::info("Quitting...");
                    break 'capture;
                }
                None => {}
            }
        }

        // Annotate, record the annotated frame, then add the
        // display-only recording indicator.
        let mut display = frame.into_raw();
        let mut canvas = Canvas::new(&mut display, width, height);
        annotate::render(&mut canvas, &session);
        if recorder.is_recording() {
            if let Some(annotated) = Frame::from_raw(width, height, display.clone()) {
                recorder.write_frame(&annotated);
            }
            let mut canvas = Canvas::new(&mut display, width, height);
            annotate::draw_recording_indicator(&mut canvas);
        }

        window.update(&display)?;
    }

    logger::log("Capture session ended.");
    Ok(())
}
