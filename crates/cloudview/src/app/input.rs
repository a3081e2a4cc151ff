use winit::{
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
};

use cloudview_core::KeyResponse;

use super::App;

/// Radians of orbit per pixel of mouse motion.
const ORBIT_SPEED: f32 = 0.01;
/// Pan distance per pixel, as a fraction of the camera's focal distance.
const PAN_SPEED: f32 = 0.002;
/// Dolly fraction per wheel line.
const DOLLY_PER_LINE: f32 = 0.1;

impl App<'_> {
    pub(super) fn handle_input(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_down = modifiers.state().shift_key();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.left_mouse_down = pressed,
                    MouseButton::Right => self.right_mouse_down = pressed,
                    _ => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let delta_x = (position.x - self.mouse_pos.0) as f32;
                let delta_y = (position.y - self.mouse_pos.1) as f32;
                self.mouse_pos = (position.x, position.y);

                let is_rotate = self.left_mouse_down && !self.shift_down;
                let is_pan = self.right_mouse_down || (self.left_mouse_down && self.shift_down);

                let camera = self.session.camera_mut();
                if is_rotate {
                    camera.orbit(delta_x * ORBIT_SPEED, delta_y * ORBIT_SPEED);
                    self.request_redraw();
                } else if is_pan {
                    let scale = camera.distance() * PAN_SPEED;
                    camera.pan(-delta_x * scale, delta_y * scale);
                    self.request_redraw();
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
                };
                let factor = (lines * DOLLY_PER_LINE).clamp(-0.9, 0.9);
                self.session.camera_mut().dolly(factor);
                self.request_redraw();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                match event.logical_key {
                    Key::Named(NamedKey::Escape) => self.close(event_loop),
                    Key::Character(ref key) if key.as_str() == "q" => self.close(event_loop),
                    Key::Character(ref key) => {
                        if self.session.handle_key(key.as_str()) == KeyResponse::Handled {
                            self.request_redraw();
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }
}
