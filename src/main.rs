use iced::widget::{button, container, scrollable, text, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod depth;
mod error;
mod mesh;
mod state;
mod ui;
mod upload;

use config::AppConfig;
use mesh::surface::SurfaceGrid;
use state::session::Session;
use ui::viewport::SurfaceViewport;

/// Main application state
struct DepthStudio {
    /// Directories and model path
    config: AppConfig,
    /// Artifacts of the current session (upload, depth map)
    session: Session,
    /// Decoded widget handle for the uploaded photo
    image_handle: Option<iced::widget::image::Handle>,
    /// Decoded widget handle for the depth map PNG
    depth_handle: Option<iced::widget::image::Handle>,
    /// Generated surface, if any
    surface: Option<Arc<SurfaceGrid>>,
    /// Viewport orbit/zoom
    yaw: f32,
    pitch: f32,
    zoom: f32,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the "Upload Image" button
    PickImage,
    /// Background copy into the assets directory completed
    UploadSaved(Result<PathBuf, String>),
    /// User clicked the "Generate Depth Map" button
    GenerateDepthMap,
    /// Background depth estimation completed
    DepthMapReady(Result<PathBuf, String>),
    /// User clicked the "Generate 3D Model" button
    GenerateModel,
    /// Background surface generation completed
    SurfaceReady(Result<Arc<SurfaceGrid>, String>),
    /// Viewport drag (yaw/pitch delta in radians)
    Orbit(cgmath::Vector2<f32>),
    /// Viewport wheel zoom delta
    Zoom(f32),
}

impl DepthStudio {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = match AppConfig::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("⚠️  Could not read config, using defaults: {}", e);
                AppConfig::default()
            }
        };

        // Both artifact directories must exist before the first action
        let status = match config.ensure_dirs() {
            Ok(()) => "Ready. Upload an image to begin.".to_string(),
            Err(e) => format!("❌ Error preparing directories: {}", e),
        };

        println!(
            "📸 Depth Studio initialized (assets: {}, output: {})",
            config.assets_dir.display(),
            config.output_dir.display()
        );

        (
            DepthStudio {
                config,
                session: Session::new(),
                image_handle: None,
                depth_handle: None,
                surface: None,
                yaw: 0.6,
                pitch: 0.5,
                zoom: 1.0,
                status,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => {
                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select a Photo")
                    .add_filter("Images", &["jpg", "jpeg", "png"])
                    .pick_file();

                if let Some(path) = file {
                    self.status = format!("Saving {}...", path.display());
                    let assets_dir = self.config.assets_dir.clone();

                    return Task::perform(
                        async move {
                            upload::save_upload(path, assets_dir)
                                .await
                                .map_err(|e| e.to_string())
                        },
                        Message::UploadSaved,
                    );
                }

                Task::none()
            }
            Message::UploadSaved(Ok(path)) => {
                self.image_handle = load_handle(&path);
                self.depth_handle = None;
                self.surface = None;
                self.session.set_image(path.clone());

                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.status = format!("📷 Uploaded {}", name);

                Task::none()
            }
            Message::UploadSaved(Err(e)) => {
                self.status = format!("❌ Error saving uploaded file: {}", e);
                Task::none()
            }
            Message::GenerateDepthMap => {
                let Some(image_path) = self.session.image_path().cloned() else {
                    self.status = "⚠️ Upload an image first.".to_string();
                    return Task::none();
                };

                self.status = "🔍 Estimating depth...".to_string();
                let model_path = self.config.resolve_model_path();
                let depth_map_path = self.config.depth_map_path();

                Task::perform(
                    async move {
                        depth::estimator::estimate_to_png(image_path, model_path, depth_map_path)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::DepthMapReady,
                )
            }
            Message::DepthMapReady(Ok(path)) => {
                self.depth_handle = load_handle(&path);
                self.surface = None;
                self.session.set_depth_map(path);

                let when = self
                    .session
                    .depth_generated_at()
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_default();
                self.status = format!("✅ Depth map generated at {}", when);

                Task::none()
            }
            Message::DepthMapReady(Err(e)) => {
                // Error text is already distinct per failure (missing model
                // file, bad depth map shape, decode failure)
                self.status = format!("❌ Error generating depth map: {}", e);
                Task::none()
            }
            Message::GenerateModel => {
                if !self.session.can_generate_model() {
                    self.status = "⚠️ Generate a depth map first.".to_string();
                    return Task::none();
                }

                // Both are Some, guarded above
                let depth_map_path = self.session.depth_map_path().cloned().unwrap_or_default();
                let image_path = self.session.image_path().cloned().unwrap_or_default();
                self.status = "🎨 Generating 3D model...".to_string();

                Task::perform(
                    async move {
                        mesh::surface::generate_surface(depth_map_path, image_path)
                            .await
                            .map(Arc::new)
                            .map_err(|e| e.to_string())
                    },
                    Message::SurfaceReady,
                )
            }
            Message::SurfaceReady(Ok(grid)) => {
                println!(
                    "🌀 Surface grid ready: {}x{} vertices",
                    grid.cols, grid.rows
                );
                self.surface = Some(grid);
                self.status = "✅ 3D model displayed! Drag to orbit, scroll to zoom.".to_string();
                Task::none()
            }
            Message::SurfaceReady(Err(e)) => {
                self.status = format!("❌ Error generating 3D model: {}", e);
                Task::none()
            }
            Message::Orbit(delta) => {
                self.yaw += delta.x;
                // Keep the surface from flipping over the poles
                self.pitch = (self.pitch + delta.y).clamp(-1.5, 1.5);
                Task::none()
            }
            Message::Zoom(delta) => {
                self.zoom = (self.zoom + delta).clamp(0.2, 8.0);
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let mut content: Column<Message> = Column::new()
            .push(text("📸 Image to 3D Reconstruction").size(36))
            .push(button("📤 Upload Image").on_press(Message::PickImage).padding(10));

        if let Some(handle) = &self.image_handle {
            content = content.push(
                iced::widget::image(handle.clone())
                    .width(Length::Fixed(420.0)),
            );
            content = content.push(
                button("🔍 Generate Depth Map")
                    .on_press(Message::GenerateDepthMap)
                    .padding(10),
            );

            if let Some(depth) = &self.depth_handle {
                content = content.push(
                    iced::widget::image(depth.clone())
                        .width(Length::Fixed(420.0)),
                );
            }

            // Always offered once a photo is up; pressing it before a depth
            // map exists produces the warning, not a crash
            content = content.push(
                button("🎨 Generate 3D Model")
                    .on_press(Message::GenerateModel)
                    .padding(10),
            );
        }

        if let Some(grid) = &self.surface {
            let viewport = SurfaceViewport {
                grid: Arc::clone(grid),
                yaw: self.yaw,
                pitch: self.pitch,
                zoom: self.zoom,
            };
            content = content.push(
                iced::widget::canvas::Canvas::new(viewport)
                    .width(Length::Fixed(560.0))
                    .height(Length::Fixed(420.0)),
            );
        }

        content = content
            .push(text(&self.status).size(16))
            .spacing(20)
            .padding(40)
            .align_x(Alignment::Center);

        container(scrollable(content))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Decode a saved artifact into a widget handle.
///
/// The depth map is rewritten at a fixed path, so the handle is built from
/// the file's bytes rather than its path to avoid a stale texture cache.
fn load_handle(path: &PathBuf) -> Option<iced::widget::image::Handle> {
    match std::fs::read(path) {
        Ok(bytes) => Some(iced::widget::image::Handle::from_bytes(bytes)),
        Err(e) => {
            eprintln!("⚠️  Could not read {}: {}", path.display(), e);
            None
        }
    }
}

fn main() -> iced::Result {
    iced::application("Depth Studio", DepthStudio::update, DepthStudio::view)
        .theme(DepthStudio::theme)
        .centered()
        .run_with(DepthStudio::new)
}
