use iced::alignment::{Horizontal, Vertical};
use iced::widget::{container, image, mouse_area, scrollable, text, Column, Stack};
use iced::{Border, Color, Element, Length, Point, Shadow, Subscription, Task, Theme};
use std::time::Duration;

// Declare the application modules
mod fetch;
mod settings;
mod state;
mod ui;

use fetch::loader::{self, LoadError, LoadedImage};
use settings::Settings;
use state::monitor::{Gallery, GalleryImage, ImageId, LoadPhase, GALLERY_PADDING, GALLERY_SPACING};
use state::notify::Notifications;
use state::retry::{RetryAction, RetryController};
use ui::menu::PagePoint;

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// A load attempt for an image settled, successfully or not
    ImageLoaded(ImageId, Result<LoadedImage, LoadError>),
    /// The fixed delay before a scheduled retry elapsed
    RetryDelayElapsed(ImageId),
    /// The connectivity watcher saw an offline/online edge
    ConnectivityChanged(bool),
    /// The notification hide delay elapsed for the given generation
    HideDelayElapsed(u64),
    /// Cursor entered an image
    CursorEnteredImage(ImageId),
    /// Cursor moved within an image; the position is image-local
    CursorMovedOverImage(ImageId, Point),
    /// Cursor left an image
    CursorExitedImage(ImageId),
    /// Cursor entered an image's hover menu
    CursorEnteredMenu(ImageId),
    /// Cursor left an image's hover menu
    CursorExitedMenu(ImageId),
    /// "Reload Image" was clicked in the hover menu
    ReloadImagePressed(ImageId),
    /// "Reload All Images" was clicked; the id is the menu it came from
    ReloadAllPressed(ImageId),
}

/// Main application state
struct RetryViewer {
    settings: Settings,
    /// The monitored images, in gallery order
    gallery: Gallery,
    /// Per-image retry state machine
    retries: RetryController,
    /// Reload counter and indicator state
    notifications: Notifications,
    /// Cached connectivity flag, maintained by the watcher subscription
    online: bool,
    /// Shared HTTP client for all fetches
    http: reqwest::Client,
}

impl RetryViewer {
    /// Create a new instance of the application and kick off the initial
    /// load of every configured image.
    fn new() -> (Self, Task<Message>) {
        Self::boot(Settings::from_env())
    }

    fn boot(settings: Settings) -> (Self, Task<Message>) {
        let mut app = Self::from_settings(settings);

        tracing::info!(images = app.gallery.len(), "🖼️ gallery initialized");
        if app.gallery.is_empty() {
            tracing::warn!("no images configured; pass URLs on the command line");
        }

        let mut initial = Vec::new();
        for id in app.gallery.ids() {
            initial.push(app.fetch_task(id));
        }

        (app, Task::batch(initial))
    }

    /// Build the application state without any side effects
    fn from_settings(settings: Settings) -> Self {
        let gallery = Gallery::new(settings.images.clone(), settings.menu_area_threshold);

        Self {
            gallery,
            retries: RetryController::new(),
            notifications: Notifications::new(),
            online: true,
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ImageLoaded(id, result) => self.on_settled(id, result),
            Message::RetryDelayElapsed(id) => self.begin_retry(id),
            Message::ConnectivityChanged(online) => self.on_connectivity(online),
            Message::HideDelayElapsed(generation) => {
                self.notifications.hide_elapsed(generation);
                Task::none()
            }
            Message::CursorEnteredImage(id) => {
                if let Some(menu) = self.gallery.menu_mut(id) {
                    menu.over_image = true;
                }
                Task::none()
            }
            Message::CursorMovedOverImage(id, position) => {
                self.anchor_menu(id, position);
                Task::none()
            }
            Message::CursorExitedImage(id) => {
                if let Some(menu) = self.gallery.menu_mut(id) {
                    menu.leave_image();
                }
                Task::none()
            }
            Message::CursorEnteredMenu(id) => {
                if let Some(menu) = self.gallery.menu_mut(id) {
                    menu.over_menu = true;
                }
                Task::none()
            }
            Message::CursorExitedMenu(id) => {
                if let Some(menu) = self.gallery.menu_mut(id) {
                    menu.leave_menu();
                }
                Task::none()
            }
            Message::ReloadImagePressed(id) => {
                if let Some(menu) = self.gallery.menu_mut(id) {
                    menu.suppress();
                }
                self.schedule_retry(id, Duration::ZERO)
            }
            Message::ReloadAllPressed(origin) => {
                if let Some(menu) = self.gallery.menu_mut(origin) {
                    menu.suppress();
                }
                // The duplicate guard makes this safe for images already
                // mid-retry
                let mut tasks = Vec::new();
                for id in self.gallery.ids() {
                    tasks.push(self.begin_retry(id));
                }
                Task::batch(tasks)
            }
        }
    }

    /// A load attempt settled. Completes any retry in flight for the image,
    /// then runs the monitor's success/error path.
    fn on_settled(&mut self, id: ImageId, result: Result<LoadedImage, LoadError>) -> Task<Message> {
        let mut tasks = Vec::new();

        // One-shot completion bound to both outcomes: clear the retrying
        // mark and drop the counter before anything else happens.
        if let Some(refresh) = self.retries.finish(id, &mut self.notifications) {
            if let Some(generation) = refresh.hide_after {
                tasks.push(self.hide_timer(generation));
            }
        }

        match result {
            Ok(loaded) => {
                if let Some(img) = self.gallery.get_mut(id) {
                    tracing::debug!(
                        url = %img.url,
                        width = loaded.width,
                        height = loaded.height,
                        "image loaded"
                    );
                    img.phase = LoadPhase::Loaded;
                    img.handle = Some(loaded.handle);

                    // First successful settle ends monitoring; only manual
                    // reloads can reach this image afterwards
                    let first_success = img.monitored;
                    img.monitored = false;
                    if first_success {
                        self.gallery.attach_menu(id);
                    }
                }
            }
            Err(err) => {
                if let Some(img) = self.gallery.get_mut(id) {
                    tracing::warn!(url = %img.url, %err, "image load failed");
                    img.phase = LoadPhase::Broken;

                    if img.monitored {
                        // The menu is useful even while erroring, and the
                        // fixed delay keeps a persistently broken image
                        // from retrying in a tight loop
                        self.gallery.attach_menu(id);
                        tasks.push(self.schedule_retry(id, self.settings.retry_delay()));
                    }
                }
            }
        }

        Task::batch(tasks)
    }

    /// Request a retry now that its delay elapsed
    fn begin_retry(&mut self, id: ImageId) -> Task<Message> {
        match self
            .retries
            .request_retry(id, self.online, &mut self.notifications)
        {
            RetryAction::AlreadyRetrying => Task::none(),
            RetryAction::Reload => self.fetch_task(id),
            RetryAction::Deferred => {
                tracing::info!(?id, "offline, reload deferred until connectivity returns");
                Task::none()
            }
        }
    }

    /// Connectivity edge from the watcher
    fn on_connectivity(&mut self, online: bool) -> Task<Message> {
        self.online = online;
        if !online {
            return Task::none();
        }

        let restored = self.retries.connectivity_restored();
        if restored.is_empty() {
            return Task::none();
        }

        tracing::info!(
            reloads = restored.len(),
            "connectivity restored, issuing deferred reloads"
        );

        let mut tasks = Vec::new();
        for id in restored {
            tasks.push(self.fetch_task(id));
        }
        Task::batch(tasks)
    }

    /// Compute the menu anchor from the cursor's entry point. The position
    /// is image-local, so translate into page coordinates first.
    fn anchor_menu(&mut self, id: ImageId, position: Point) {
        let Some(geom) = self.gallery.geometry(id) else {
            return;
        };
        if let Some(menu) = self.gallery.menu_mut(id) {
            let cursor = PagePoint {
                x: geom.page_left + position.x,
                y: geom.parent_top + geom.offset_top + position.y,
            };
            menu.ensure_anchor(&geom, cursor);
        }
    }

    /// Issue the fetch for an image
    fn fetch_task(&mut self, id: ImageId) -> Task<Message> {
        let Some(img) = self.gallery.get_mut(id) else {
            return Task::none();
        };
        img.phase = LoadPhase::Loading;
        let url = img.url.clone();

        Task::perform(loader::fetch_image(self.http.clone(), url), move |result| {
            Message::ImageLoaded(id, result)
        })
    }

    /// Request a retry after a delay
    fn schedule_retry(&self, id: ImageId, delay: Duration) -> Task<Message> {
        tracing::debug!(?id, ?delay, "retry scheduled");
        // The sleep must be created inside the future so the timer is
        // registered on the executor that polls it, not in the caller
        Task::perform(
            async move { tokio::time::sleep(delay).await },
            move |_| Message::RetryDelayElapsed(id),
        )
    }

    /// Arm the notification hide timer for a display generation
    fn hide_timer(&self, generation: u64) -> Task<Message> {
        let delay = self.settings.hide_delay();
        Task::perform(
            async move { tokio::time::sleep(delay).await },
            move |_| Message::HideDelayElapsed(generation),
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        if self.gallery.is_empty() {
            return container(
                text("No images configured. Pass URLs on the command line or add them to settings.json.")
                    .size(16),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
        }

        let mut column = Column::new()
            .spacing(GALLERY_SPACING)
            .padding(GALLERY_PADDING);
        for img in self.gallery.iter() {
            column = column.push(self.entry_view(img));
        }

        let gallery = scrollable(column).width(Length::Fill).height(Length::Fill);

        let mut layers = Stack::new()
            .width(Length::Fill)
            .height(Length::Fill)
            .push(gallery);
        if let Some(banner) = ui::notify::overlay(self.notifications.state()) {
            layers = layers.push(banner);
        }

        layers.into()
    }

    /// One gallery entry: the picture (or a placeholder) with the hover
    /// menu stacked over it
    fn entry_view(&self, img: &GalleryImage) -> Element<Message> {
        let id = img.id;
        let width = Length::Fixed(img.display_width);
        let height = Length::Fixed(img.display_height);

        let picture: Element<Message> = match &img.handle {
            Some(handle) => image(handle.clone())
                .width(width)
                .height(height)
                .content_fit(iced::ContentFit::Contain)
                .into(),
            None => {
                let caption = match img.phase {
                    LoadPhase::Loading => "Loading…",
                    _ => "Failed to load",
                };
                container(text(format!("{caption}\n{}", img.url)).size(14))
                    .width(width)
                    .height(height)
                    .align_x(Horizontal::Center)
                    .align_y(Vertical::Center)
                    .style(|_theme: &Theme| container::Style {
                        text_color: Some(Color::from_rgb(0.7, 0.7, 0.7)),
                        background: None,
                        border: Border {
                            color: Color::from_rgb(0.35, 0.35, 0.35),
                            width: 1.0,
                            radius: 0.0.into(),
                        },
                        shadow: Shadow::default(),
                    })
                    .into()
            }
        };

        let mut layers = Stack::new().width(width).height(height).push(picture);
        if let Some(menu) = &img.menu {
            if let Some(geom) = self.gallery.geometry(id) {
                if let Some(overlay) = ui::menu::overlay(id, menu, &geom) {
                    layers = layers.push(overlay);
                }
            }
        }

        mouse_area(layers)
            .on_enter(Message::CursorEnteredImage(id))
            .on_move(move |position| Message::CursorMovedOverImage(id, position))
            .on_exit(Message::CursorExitedImage(id))
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        fetch::connectivity::watch(
            self.settings.probe_url.clone(),
            self.settings.probe_interval(),
        )
        .map(Message::ConnectivityChanged)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    init_tracing();

    iced::application("Retry Image Viewer", RetryViewer::update, RetryViewer::view)
        .subscription(RetryViewer::subscription)
        .theme(RetryViewer::theme)
        .run_with(RetryViewer::new)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("retry_viewer=info")),
        )
        .init();
}
