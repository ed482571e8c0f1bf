//! Interactive 3D surface viewport
//!
//! Renders the surface grid as depth-sorted shaded quads on an iced canvas.
//! Dragging orbits the surface (yaw/pitch), the mouse wheel zooms. The quad
//! shade mixes the photo's luminance with the depth value, so the rendered
//! relief reads like a grayscale surface plot of the depth map.

use cgmath::{Matrix3, Rad, SquareMatrix, Vector3};
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Program, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Theme};
use std::sync::Arc;

use crate::mesh::surface::SurfaceGrid;
use crate::Message;

/// Vertical relief of the surface: depth [0,1] maps to this many scene units.
const DEPTH_RELIEF: f32 = 0.6;

/// Fraction of the viewport the unit scene occupies at zoom 1.0.
const FIT: f32 = 0.38;

/// Canvas renderer for the generated surface.
pub struct SurfaceViewport {
    /// The grid to render.
    pub grid: Arc<SurfaceGrid>,
    /// Orbit angle around the vertical axis, in radians.
    pub yaw: f32,
    /// Orbit angle around the horizontal axis, in radians.
    pub pitch: f32,
    /// Zoom level (1.0 = fit).
    pub zoom: f32,
}

impl SurfaceViewport {
    /// Rotation applied to scene coordinates before projection.
    fn rotation(&self) -> Matrix3<f32> {
        Matrix3::from_angle_x(Rad(self.pitch)) * Matrix3::from_angle_y(Rad(self.yaw))
    }
}

impl Program<Message> for SurfaceViewport {
    type State = DragState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.09, 0.09, 0.11),
        );

        let grid = &self.grid;
        if grid.cols < 2 || grid.rows < 2 {
            return vec![frame.into_geometry()];
        }

        let rotation = if self.pitch == 0.0 && self.yaw == 0.0 {
            Matrix3::identity()
        } else {
            self.rotation()
        };

        let center = Point::new(bounds.width / 2.0, bounds.height / 2.0);
        let scale = self.zoom.max(0.05) * bounds.width.min(bounds.height) * FIT;

        // Rotate and project every vertex once; orthographic projection
        let mut projected = Vec::with_capacity(grid.xs.len());
        let mut depths = Vec::with_capacity(grid.xs.len());
        for i in 0..grid.xs.len() {
            let v = rotation
                * Vector3::new(grid.xs[i], grid.ys[i], (grid.zs[i] - 0.5) * DEPTH_RELIEF);
            projected.push(Point::new(center.x + v.x * scale, center.y - v.y * scale));
            depths.push(v.z);
        }

        // Painter's algorithm: sort quads far to near, then fill in order
        let mut quads: Vec<(f32, [Point; 4], f32)> =
            Vec::with_capacity((grid.cols - 1) * (grid.rows - 1));
        for row in 0..grid.rows - 1 {
            for col in 0..grid.cols - 1 {
                let i00 = grid.index(col, row);
                let i10 = grid.index(col + 1, row);
                let i11 = grid.index(col + 1, row + 1);
                let i01 = grid.index(col, row + 1);

                let depth = (depths[i00] + depths[i10] + depths[i11] + depths[i01]) / 4.0;
                let shade = (grid.luma[i00] + grid.luma[i10] + grid.luma[i11] + grid.luma[i01])
                    / 4.0
                    * 0.5
                    + (grid.zs[i00] + grid.zs[i10] + grid.zs[i11] + grid.zs[i01]) / 4.0 * 0.5;

                quads.push((
                    depth,
                    [projected[i00], projected[i10], projected[i11], projected[i01]],
                    shade,
                ));
            }
        }
        quads.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let edge = Stroke::default()
            .with_color(Color::from_rgba(0.0, 0.0, 0.0, 0.35))
            .with_width(0.5);

        for (_, corners, shade) in &quads {
            let mut builder = canvas::path::Builder::new();
            builder.move_to(corners[0]);
            builder.line_to(corners[1]);
            builder.line_to(corners[2]);
            builder.line_to(corners[3]);
            builder.close();
            let path = builder.build();

            let gray = 0.15 + 0.8 * shade.clamp(0.0, 1.0);
            frame.fill(&path, Color::from_rgb(gray, gray, gray));
            frame.stroke(&path, edge.clone());
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        _bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            // Mouse wheel zooms
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                let zoom_delta = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => y * 0.1,
                    mouse::ScrollDelta::Pixels { y, .. } => y * 0.01,
                };
                return (canvas::event::Status::Captured, Some(Message::Zoom(zoom_delta)));
            }

            // Left button press starts an orbit drag
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(pos) = cursor.position() {
                    state.is_dragging = true;
                    state.last_position = Some(pos);
                    return (canvas::event::Status::Captured, None);
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.is_dragging = false;
                state.last_position = None;
                return (canvas::event::Status::Captured, None);
            }

            // Cursor movement orbits while dragging
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.is_dragging {
                    if let Some(current_pos) = cursor.position() {
                        if let Some(last_pos) = state.last_position {
                            // Screen-space delta to yaw/pitch, radians
                            let delta = cgmath::Vector2::new(
                                (current_pos.x - last_pos.x) * 0.01,
                                (current_pos.y - last_pos.y) * 0.01,
                            );

                            state.last_position = Some(current_pos);
                            return (canvas::event::Status::Captured, Some(Message::Orbit(delta)));
                        }
                    }
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }
}

/// State for orbit drag interactions.
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub is_dragging: bool,
    pub last_position: Option<Point>,
}
