use crate::surface::Position;

use super::{GestureEvent, InputDevice, PointerInput};

/// Window after a touch start in which a contact-count change means the
/// user is tapping or pinching, not drawing. Seconds.
pub const TOUCH_DISAMBIGUATION_WINDOW: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
enum MachineState {
    Idle,
    Owned { device: InputDevice, started_at: f64 },
}

/// Normalizes raw input-device events into down/move/up/cancel gestures.
///
/// At most one transaction is active at a time and it is owned by exactly
/// one device; input from the other device is ignored until the owner
/// finishes. Malformed continuations from the owner (a buttonless mouse
/// move, touch contact faults inside the disambiguation window) cancel the
/// transaction rather than erroring.
pub struct GestureStateMachine {
    state: MachineState,
    passthrough: Option<Box<dyn Fn(Position) -> bool>>,
}

impl Default for GestureStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureStateMachine {
    pub fn new() -> Self {
        Self {
            state: MachineState::Idle,
            passthrough: None,
        }
    }

    /// Designated-region opt-out: positions the predicate claims are left
    /// to other UI, and no transaction starts from them.
    pub fn set_passthrough(&mut self, predicate: impl Fn(Position) -> bool + 'static) {
        self.passthrough = Some(Box::new(predicate));
    }

    pub fn clear_passthrough(&mut self) {
        self.passthrough = None;
    }

    pub fn owner(&self) -> Option<InputDevice> {
        match self.state {
            MachineState::Idle => None,
            MachineState::Owned { device, .. } => Some(device),
        }
    }

    /// Reset to idle without emitting anything. Used on detach.
    pub fn reset(&mut self) {
        self.state = MachineState::Idle;
    }

    /// Feed one normalized input; returns the gesture to dispatch, if any.
    pub fn process(&mut self, input: PointerInput) -> Option<GestureEvent> {
        match self.state {
            MachineState::Idle => self.process_idle(input),
            MachineState::Owned { device, started_at } => {
                if input.device() != device {
                    // Exclusivity: the other device is ignored until the
                    // owning transaction ends.
                    return None;
                }
                match device {
                    InputDevice::Mouse => self.process_owned_mouse(input),
                    InputDevice::Touch => self.process_owned_touch(input, started_at),
                }
            }
        }
    }

    fn process_idle(&mut self, input: PointerInput) -> Option<GestureEvent> {
        let start = match input {
            PointerInput::MouseDown { pos, time } => Some((pos, time, InputDevice::Mouse)),
            PointerInput::TouchStart {
                pos,
                contacts: 1,
                time,
            } => Some((pos, time, InputDevice::Touch)),
            _ => None,
        };
        let (pos, time, device) = start?;
        if let Some(predicate) = &self.passthrough {
            if predicate(pos) {
                return None;
            }
        }
        log::trace!("gesture down: {device:?} at {pos:?}");
        self.state = MachineState::Owned {
            device,
            started_at: time,
        };
        Some(GestureEvent::Down(pos))
    }

    fn process_owned_mouse(&mut self, input: PointerInput) -> Option<GestureEvent> {
        match input {
            PointerInput::MouseMove {
                pos,
                any_button: true,
                ..
            } => Some(GestureEvent::Move(pos)),
            PointerInput::MouseMove {
                any_button: false, ..
            } => {
                // The press vanished without an up event.
                self.cancel("mouse buttons released without up")
            }
            PointerInput::MouseUp { pos, .. } => {
                log::trace!("gesture up: mouse at {pos:?}");
                self.state = MachineState::Idle;
                Some(GestureEvent::Up(pos))
            }
            // A second button press during the transaction is a
            // continuation, not a new gesture.
            PointerInput::MouseDown { .. } => None,
            _ => None,
        }
    }

    fn process_owned_touch(&mut self, input: PointerInput, started_at: f64) -> Option<GestureEvent> {
        match input {
            PointerInput::TouchStart { contacts, time, .. } | PointerInput::TouchMove { contacts, time, .. }
                if contacts != 1 =>
            {
                if time - started_at <= TOUCH_DISAMBIGUATION_WINDOW {
                    // Early extra contact: a tap or pinch, not a stroke.
                    self.cancel("contact count changed inside disambiguation window")
                } else {
                    // Late extra contacts mute moves until the count
                    // returns to exactly one.
                    None
                }
            }
            PointerInput::TouchStart { .. } => None,
            PointerInput::TouchMove { pos, .. } => Some(GestureEvent::Move(pos)),
            PointerInput::TouchEnd {
                pos,
                contacts,
                time,
            } => {
                if contacts == 0 {
                    log::trace!("gesture up: touch at {pos:?}");
                    self.state = MachineState::Idle;
                    Some(GestureEvent::Up(pos))
                } else if contacts != 1 && time - started_at <= TOUCH_DISAMBIGUATION_WINDOW {
                    self.cancel("contact lifted inside disambiguation window")
                } else {
                    // A secondary contact lifted; the transaction resumes
                    // once exactly one contact remains.
                    None
                }
            }
            PointerInput::TouchCancel { .. } => self.cancel("touch cancel from host"),
            _ => None,
        }
    }

    fn cancel(&mut self, reason: &str) -> Option<GestureEvent> {
        log::trace!("gesture cancel: {reason}");
        self.state = MachineState::Idle;
        Some(GestureEvent::Cancel)
    }
}
