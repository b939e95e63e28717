use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossbeam_channel::{unbounded, Receiver};
use rdev::{listen, simulate, Button, EventType, Key};

use crate::capture::InputInjector;
use crate::error::PickError;
use crate::geometry::Point;
use crate::picker::{PointerButton, PointerEvent};

/// Maps a configured page key name to the key that is synthesized.
pub fn parse_key(name: &str) -> Option<Key> {
    let key = match name.trim().to_ascii_lowercase().as_str() {
        "pagedown" | "pgdn" => Key::PageDown,
        "pageup" | "pgup" => Key::PageUp,
        "space" => Key::Space,
        "right" => Key::RightArrow,
        "left" => Key::LeftArrow,
        "down" => Key::DownArrow,
        "up" => Key::UpArrow,
        "enter" | "return" => Key::Return,
        "home" => Key::Home,
        "end" => Key::End,
        "tab" => Key::Tab,
        _ => return None,
    };
    Some(key)
}

/// Sends key events to whichever window has focus. Delivery is not verified.
#[derive(Debug, Default)]
pub struct SystemKeyboard;

impl InputInjector for SystemKeyboard {
    fn press_key(&mut self, key: Key) -> Result<()> {
        send(&EventType::KeyPress(key))?;
        send(&EventType::KeyRelease(key))
    }
}

fn send(event: &EventType) -> Result<()> {
    simulate(event).map_err(|e| anyhow!("failed to simulate {:?}: {:?}", event, e))?;
    // Some platforms drop events that arrive back to back.
    thread::sleep(Duration::from_millis(20));
    Ok(())
}

/// Button transitions from the system-wide pointer hook.
///
/// Iteration blocks until the next transition. It ends when the hook thread
/// goes away or when the hook reports a failure; in the latter case
/// [`PointerListener::take_failure`] returns the error.
pub struct PointerListener {
    rx: Receiver<Result<PointerEvent, PickError>>,
    failure: Option<PickError>,
    failed: bool,
}

impl PointerListener {
    fn new(rx: Receiver<Result<PointerEvent, PickError>>) -> Self {
        Self {
            rx,
            failure: None,
            failed: false,
        }
    }

    /// Error reported by the hook, if iteration ended because of one.
    pub fn take_failure(&mut self) -> Option<PickError> {
        self.failure.take()
    }
}

impl Iterator for PointerListener {
    type Item = PointerEvent;

    fn next(&mut self) -> Option<PointerEvent> {
        if self.failed {
            return None;
        }
        match self.rx.recv() {
            Ok(Ok(event)) => Some(event),
            Ok(Err(e)) => {
                self.failed = true;
                self.failure = Some(e);
                None
            }
            Err(_) => None,
        }
    }
}

/// Turns raw hook events into button transitions stamped with the cursor
/// position.
///
/// `rdev` button events carry no coordinates, so the last move position is
/// tracked. Transitions seen before the first move have no known position
/// and are dropped.
#[derive(Debug, Default)]
struct CursorTracker {
    position: Option<Point>,
}

impl CursorTracker {
    fn observe(&mut self, event_type: EventType) -> Option<PointerEvent> {
        let (button, pressed) = match event_type {
            EventType::MouseMove { x, y } => {
                self.position = Some(Point::new(x as i32, y as i32));
                return None;
            }
            EventType::ButtonPress(button) => (button, true),
            EventType::ButtonRelease(button) => (button, false),
            _ => return None,
        };
        let Some(position) = self.position else {
            log::debug!("ignoring {:?} before the cursor position is known", button);
            return None;
        };
        Some(PointerEvent {
            position,
            button: pointer_button(button),
            pressed,
        })
    }
}

/// Starts the system-wide pointer hook on its own thread.
///
/// `rdev` cannot remove its hook, so once started it stays installed for the
/// rest of the process, including for library callers that drop the returned
/// listener; later events are then discarded. The `pick` subcommand exits right
/// after the pick, which releases it.
pub fn spawn_pointer_listener() -> Result<PointerListener, PickError> {
    let (tx, rx) = unbounded::<Result<PointerEvent, PickError>>();
    let failure_tx = tx.clone();

    thread::Builder::new()
        .name("pointer-hook".into())
        .spawn(move || {
            let mut tracker = CursorTracker::default();
            let result = listen(move |event| {
                if let Some(transition) = tracker.observe(event.event_type) {
                    let _ = tx.send(Ok(transition));
                }
            });
            // rdev may keep the callback (and its sender) alive after a
            // failed start, so the error is sent rather than signalled by
            // disconnecting.
            if let Err(e) = result {
                log::error!("pointer hook stopped: {:?}", e);
                let _ = failure_tx.send(Err(PickError::Listener(format!("{:?}", e))));
            }
        })
        .map_err(|e| PickError::Listener(e.to_string()))?;

    Ok(PointerListener::new(rx))
}

fn pointer_button(button: Button) -> PointerButton {
    match button {
        Button::Left => PointerButton::Primary,
        Button::Right => PointerButton::Secondary,
        Button::Middle => PointerButton::Middle,
        Button::Unknown(_) => PointerButton::Other,
    }
}
