use log::{debug, trace};
use serde::Deserialize;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::camera::{CameraLimits, OrbitCamera, ZoomTarget};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Radians per pixel of drag.
    pub drag_sensitivity: f32,
    pub pixel_wheel_scale: f32,
    pub line_wheel_scale: f32,
    pub page_wheel_scale: f32,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.005,
            pixel_wheel_scale: 0.001,
            line_wheel_scale: 0.03,
            page_wheel_scale: 1.0,
        }
    }
}

/// Vertical wheel movement in the unit the device reported it in.
///
/// Positive values scroll toward the user and zoom in, negative ones zoom out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelDelta {
    Pixel(f32),
    Line(f32),
    Page(f32),
}

impl WheelDelta {
    pub fn normalized(self, settings: &InputSettings) -> f32 {
        match self {
            WheelDelta::Pixel(d) => d * settings.pixel_wheel_scale,
            WheelDelta::Line(d) => d * settings.line_wheel_scale,
            WheelDelta::Page(d) => d * settings.page_wheel_scale,
        }
    }
}

// winit reports positive y for scrolling away from the user.
impl From<MouseScrollDelta> for WheelDelta {
    fn from(delta: MouseScrollDelta) -> Self {
        match delta {
            MouseScrollDelta::LineDelta(_, y) => WheelDelta::Line(-y),
            MouseScrollDelta::PixelDelta(position) => WheelDelta::Pixel(-position.y as f32),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved by `(dx, dy)` pixels with the drag button held.
    Drag { dx: f32, dy: f32 },
    /// Wheel turned; `modifier` selects field-of-view zoom instead of radius.
    Wheel { delta: WheelDelta, modifier: bool },
}

/// Applies one input event to the camera.
///
/// Dragging right turns the azimuth negative, dragging down raises the polar
/// angle. Wheel deltas scale the radius (or fov) by `exp(-delta)`.
pub fn apply_input(
    camera: OrbitCamera,
    event: InputEvent,
    settings: &InputSettings,
    limits: &CameraLimits,
) -> OrbitCamera {
    match event {
        InputEvent::Drag { dx, dy } => camera.orbit(
            -dx * settings.drag_sensitivity,
            dy * settings.drag_sensitivity,
            limits,
        ),
        InputEvent::Wheel { delta, modifier } => {
            let target = if modifier {
                ZoomTarget::FieldOfView
            } else {
                ZoomTarget::Radius
            };
            camera.zoom(delta.normalized(settings), target, limits)
        }
    }
}

/// Keeps at most one frame pending no matter how many events arrive.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameRequests {
    pending: bool,
}

impl FrameRequests {
    /// Returns true when the caller should schedule a new frame.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn frame_presented(&mut self) {
        self.pending = false;
    }
}

/// Turns window events into camera updates.
#[derive(Debug, Clone)]
pub struct OrbitController {
    settings: InputSettings,
    limits: CameraLimits,
    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
    zoom_modifier: bool,
    frames: FrameRequests,
}

impl OrbitController {
    pub fn new(settings: InputSettings, limits: CameraLimits) -> Self {
        Self {
            settings,
            limits,
            dragging: false,
            last_cursor: None,
            zoom_modifier: false,
            frames: FrameRequests::default(),
        }
    }

    pub fn frames(&mut self) -> &mut FrameRequests {
        &mut self.frames
    }

    pub fn set_zoom_modifier(&mut self, held: bool) {
        self.zoom_modifier = held;
    }

    /// Tracks pointer state and returns the camera input the event implies.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.set_zoom_modifier(modifiers.state().shift_key());
                None
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                None
            }
            WindowEvent::Focused(false) => {
                self.dragging = false;
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                let last = self.last_cursor.replace(*position);
                match last {
                    Some(last) if self.dragging => Some(InputEvent::Drag {
                        dx: (position.x - last.x) as f32,
                        dy: (position.y - last.y) as f32,
                    }),
                    _ => None,
                }
            }
            WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Wheel {
                delta: (*delta).into(),
                modifier: self.zoom_modifier,
            }),
            _ => None,
        }
    }

    /// Applies an input event. Returns true when a new frame should be
    /// scheduled.
    pub fn handle(&mut self, camera: &mut OrbitCamera, event: InputEvent) -> bool {
        trace!("input {event:?}");
        *camera = apply_input(*camera, event, &self.settings, &self.limits);
        debug!("camera {}", camera.readout());
        self.frames.request()
    }

    pub fn process_window_event(&mut self, camera: &mut OrbitCamera, event: &WindowEvent) -> bool {
        match self.translate(event) {
            Some(input) => self.handle(camera, input),
            None => false,
        }
    }
}
