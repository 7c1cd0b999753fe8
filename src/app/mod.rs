// SPDX-License-Identifier: MPL-2.0

//! Main application module for Whistle Meme
//!
//! # Architecture
//!
//! - `flow`: Capture-and-reveal state machine (the core of the app)
//! - `state`: Application state types (AppModel, Message, Flags)
//! - `camera_preview`: Live preview display
//! - `controls`: Permission and capture buttons
//! - `reveal_overlay`: Frozen photo with the fading meme
//! - `view`: Main view rendering
//! - `update`: Message handling
//!
//! # Subscriptions
//!
//! - Config watcher, always on
//! - Camera preview, only while the flow is live
//! - Animation frames, only while the meme fades in

mod camera_preview;
mod controls;
pub mod flow;
mod handlers;
mod reveal_overlay;
mod state;
mod update;
mod view;

use crate::app::flow::{CaptureFlow, FlowState};
use crate::backends::camera::CaptureProvider;
use crate::backends::camera::types::BackendError;
use crate::config::Config;
use crate::constants::{pipeline, timing};
use crate::fl;
use crate::pipelines::photo::PhotoPipeline;
use cosmic::app::context_drawer;
use cosmic::iced::Subscription;
use cosmic::widget::{self, about::About};
use cosmic::{Element, Task};
pub use state::{AppModel, ContextPage, Flags, Message};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

const REPOSITORY: &str = "https://github.com/gergo225/whistle-meme";
const APP_ICON: &[u8] = include_bytes!(
    "../../resources/icons/hicolor/scalable/apps/io.github.gergo225.WhistleMeme.svg"
);

/// Stops the camera preview when the subscription that started it is dropped
struct PreviewGuard(Arc<dyn CaptureProvider>);

impl Drop for PreviewGuard {
    fn drop(&mut self) {
        info!("Camera subscription ended, releasing preview");
        self.0.stop_preview();
    }
}

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = Flags;

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "io.github.gergo225.WhistleMeme";

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(core: cosmic::Core, flags: Self::Flags) -> (Self, Task<cosmic::Action<Self::Message>>) {
        let about = About::default()
            .name(fl!("app-title"))
            .icon(widget::icon::from_svg_bytes(APP_ICON))
            .version(env!("GIT_VERSION"))
            .links([(fl!("repository"), REPOSITORY)])
            .license(env!("CARGO_PKG_LICENSE"));

        let Flags {
            permission,
            camera,
            sound,
            config,
            config_handler,
        } = flags;

        let flow = CaptureFlow::new(permission.is_granted(), sound);
        let photo = PhotoPipeline::new(Arc::clone(&camera));

        let app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            config,
            config_handler,
            flow,
            permission,
            camera,
            photo,
            last_tick: Instant::now(),
        };

        let theme_task = cosmic::command::set_theme(app.config.app_theme.theme());

        (app, theme_task)
    }

    /// Elements to pack at the end of the header bar.
    fn header_end(&self) -> Vec<Element<'_, Self::Message>> {
        vec![
            widget::button::icon(widget::icon::from_name("help-about-symbolic"))
                .on_press(Message::ToggleContextPage(ContextPage::About))
                .into(),
        ]
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match self.context_page {
            ContextPage::About => context_drawer::about(
                &self.about,
                |url| Message::LaunchUrl(url.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            ),
        })
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        use cosmic::iced::futures::{SinkExt, StreamExt};

        let config_sub = self
            .core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config));

        let preview_wanted = self.flow.state() == FlowState::Live && !self.flow.preview_failed();

        let camera_sub = if preview_wanted {
            let camera = Arc::clone(&self.camera);

            Subscription::run_with_id(
                ("camera", camera.device().path.clone()),
                cosmic::iced::stream::channel(
                    pipeline::PREVIEW_CHANNEL_CAPACITY,
                    move |mut output| async move {
                        info!(device = %camera.device().name, "Camera subscription started (PipeWire)");

                        let (sender, mut receiver) = cosmic::iced::futures::channel::mpsc::channel(
                            pipeline::PREVIEW_CHANNEL_CAPACITY,
                        );

                        // Stopping an unbound camera is harmless
                        let _guard = PreviewGuard(Arc::clone(&camera));

                        // Binding waits on GStreamer state changes
                        let start_camera = Arc::clone(&camera);
                        let started =
                            tokio::task::spawn_blocking(move || start_camera.start_preview(sender))
                                .await
                                .map_err(|e| BackendError::Other(e.to_string()))
                                .and_then(|result| result);

                        if let Err(e) = started {
                            error!(error = %e, "Failed to bind camera preview");
                            if output.send(Message::PreviewFailed(e)).await.is_err() {
                                warn!("Failed to report preview failure - channel closed");
                            }
                            return;
                        }

                        let mut frame_count = 0u64;

                        while let Some(frame) = receiver.next().await {
                            frame_count += 1;

                            // Dropping frames is fine for live preview - we want the latest frame
                            if let Err(e) = output.try_send(Message::CameraFrame(Arc::new(frame))) {
                                if e.is_disconnected() {
                                    info!("Output channel disconnected - camera subscription being cancelled");
                                    break;
                                }
                                if frame_count % timing::FRAME_LOG_INTERVAL == 0 {
                                    debug!(frame = frame_count, "Frame dropped (UI channel full)");
                                }
                            }
                        }

                        info!(frames = frame_count, "Camera frame stream ended");
                    },
                ),
            )
        } else {
            Subscription::none()
        };

        let reveal_sub = if self.flow.is_revealing(self.last_tick) {
            cosmic::iced::window::frames().map(Message::RevealTick)
        } else {
            Subscription::none()
        };

        Subscription::batch([config_sub, camera_sub, reveal_sub])
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}
