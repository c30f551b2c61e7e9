use std::collections::HashSet;

use egui::Pos2;

use crate::surface::Position;

mod gestures;
pub use gestures::{GestureStateMachine, TOUCH_DISAMBIGUATION_WINDOW};

/// The input device that originated a pointer event. A gesture transaction
/// is owned by exactly one device for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDevice {
    Mouse,
    Touch,
}

/// A normalized raw input event. Timestamps are seconds on the host's
/// monotonic input clock; the gesture machine never reads a wall clock, so
/// transitions are reproducible under test.
#[derive(Debug, Clone, Copy)]
pub enum PointerInput {
    MouseDown {
        pos: Position,
        time: f64,
    },
    MouseMove {
        pos: Position,
        /// Whether any mouse button is still held.
        any_button: bool,
        time: f64,
    },
    MouseUp {
        pos: Position,
        time: f64,
    },
    TouchStart {
        pos: Position,
        /// Active contacts including this one.
        contacts: usize,
        time: f64,
    },
    TouchMove {
        pos: Position,
        contacts: usize,
        time: f64,
    },
    TouchEnd {
        pos: Position,
        /// Active contacts remaining after this one lifted.
        contacts: usize,
        time: f64,
    },
    TouchCancel {
        time: f64,
    },
}

impl PointerInput {
    pub fn device(&self) -> InputDevice {
        match self {
            Self::MouseDown { .. } | Self::MouseMove { .. } | Self::MouseUp { .. } => {
                InputDevice::Mouse
            }
            _ => InputDevice::Touch,
        }
    }

    pub fn time(&self) -> f64 {
        match self {
            Self::MouseDown { time, .. }
            | Self::MouseMove { time, .. }
            | Self::MouseUp { time, .. }
            | Self::TouchStart { time, .. }
            | Self::TouchMove { time, .. }
            | Self::TouchEnd { time, .. }
            | Self::TouchCancel { time } => *time,
        }
    }

    pub fn pos(&self) -> Option<Position> {
        match self {
            Self::MouseDown { pos, .. }
            | Self::MouseMove { pos, .. }
            | Self::MouseUp { pos, .. }
            | Self::TouchStart { pos, .. }
            | Self::TouchMove { pos, .. }
            | Self::TouchEnd { pos, .. } => Some(*pos),
            Self::TouchCancel { .. } => None,
        }
    }
}

/// A normalized gesture emitted by the state machine. Per transaction the
/// machine guarantees exactly one `Down`, zero or more `Move`, then exactly
/// one of `Up` / `Cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    Down(Position),
    Move(Position),
    Up(Position),
    Cancel,
}

/// Converts raw egui frame input into our `PointerInput` stream. Touch
/// contacts are tracked by id so events carry an accurate contact count;
/// while any touch is active, synthesized pointer events are dropped so a
/// stroke is never double-fed from both devices.
pub struct InputCollector {
    active_touches: HashSet<u64>,
    mouse_button_down: bool,
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl InputCollector {
    pub fn new() -> Self {
        Self {
            active_touches: HashSet::new(),
            mouse_button_down: false,
        }
    }

    pub fn collect(
        &mut self,
        ctx: &egui::Context,
        to_logical: impl Fn(Pos2) -> Position,
    ) -> Vec<PointerInput> {
        let mut out = Vec::new();
        ctx.input(|input| {
            let now = input.time;
            for event in &input.events {
                match event {
                    egui::Event::PointerButton { pos, pressed, .. } => {
                        if !self.active_touches.is_empty() {
                            continue;
                        }
                        if *pressed {
                            self.mouse_button_down = true;
                            out.push(PointerInput::MouseDown {
                                pos: to_logical(*pos),
                                time: now,
                            });
                        } else {
                            self.mouse_button_down = false;
                            out.push(PointerInput::MouseUp {
                                pos: to_logical(*pos),
                                time: now,
                            });
                        }
                    }
                    egui::Event::PointerMoved(pos) => {
                        if !self.active_touches.is_empty() {
                            continue;
                        }
                        out.push(PointerInput::MouseMove {
                            pos: to_logical(*pos),
                            any_button: self.mouse_button_down,
                            time: now,
                        });
                    }
                    egui::Event::Touch { id, phase, pos, .. } => {
                        let pos = to_logical(*pos);
                        match phase {
                            egui::TouchPhase::Start => {
                                self.active_touches.insert(id.0);
                                out.push(PointerInput::TouchStart {
                                    pos,
                                    contacts: self.active_touches.len(),
                                    time: now,
                                });
                            }
                            egui::TouchPhase::Move => {
                                out.push(PointerInput::TouchMove {
                                    pos,
                                    contacts: self.active_touches.len(),
                                    time: now,
                                });
                            }
                            egui::TouchPhase::End => {
                                self.active_touches.remove(&id.0);
                                out.push(PointerInput::TouchEnd {
                                    pos,
                                    contacts: self.active_touches.len(),
                                    time: now,
                                });
                            }
                            egui::TouchPhase::Cancel => {
                                self.active_touches.remove(&id.0);
                                out.push(PointerInput::TouchCancel { time: now });
                            }
                        }
                    }
                    _ => {}
                }
            }
        });
        out
    }
}
