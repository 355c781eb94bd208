use iced::widget::image as image_widget;
use iced::widget::{button, column, container, horizontal_space, row, slider, text, Column};
use iced::{Alignment, ContentFit, Element, Length, Task, Theme};
use rfd::{AsyncMessageDialog, FileDialog, MessageButtons, MessageLevel};
use std::path::PathBuf;

mod config;
mod filter;
mod pipeline;
mod share;
mod state;

use config::AppConfig;
use filter::{FilterKind, Intensity};
use pipeline::loader::{self, IMAGE_EXTENSIONS};
use pipeline::{LoadTicket, Pipeline, PipelineError, RenderOutcome, SourceImage};
use state::review::{self, SessionReviewPrompt, TapCounter};
use state::settings::{MemorySettings, SettingsStore, SqliteSettings};

/// Main application state
struct Instafilter {
    config: AppConfig,
    /// Photo, filter, intensity and rendered output
    pipeline: Pipeline,
    /// Persisted key-value settings (tap counter)
    settings: Box<dyn SettingsStore>,
    tap_counter: TapCounter,
    review_prompt: SessionReviewPrompt,
    /// Rendered output converted for display
    preview: Option<image_widget::Handle>,
    showing_filter_menu: bool,
    loading: bool,
    /// Last error or confirmation, shown until dismissed
    status: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User tapped the photo area
    PickPhoto,
    /// Background load finished
    PhotoLoaded(LoadTicket, Result<SourceImage, PipelineError>),
    /// Slider moved
    IntensityChanged(f64),
    /// User tapped "Change Filter"
    ChangeFilter,
    /// User confirmed a filter in the menu
    FilterChosen(FilterKind),
    DismissFilterMenu,
    /// Background render finished
    Rendered(RenderOutcome),
    /// User tapped "Share"
    Share,
    /// Background export finished
    Shared(Result<PathBuf, PipelineError>),
    DismissStatus,
    /// Review dialog closed
    ReviewClosed,
}

impl Instafilter {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = AppConfig::load();

        // Without a settings database the app still works; the counter just won't persist
        let settings: Box<dyn SettingsStore> = match SqliteSettings::open(&config.settings_path()) {
            Ok(settings) => Box::new(settings),
            Err(e) => {
                log::warn!("⚠️  Settings unavailable, using in-memory settings: {}", e);
                Box::new(MemorySettings::default())
            }
        };

        let tap_counter = TapCounter::new(config.review_threshold);
        let taps = tap_counter.count(settings.as_ref()).unwrap_or(0);
        log::info!("🎨 Instafilter initialized ({} filter changes so far)", taps);

        let intensity = Intensity::new(config.default_intensity).unwrap_or_default();

        (
            Instafilter {
                config,
                pipeline: Pipeline::new(FilterKind::default(), intensity),
                settings,
                tap_counter,
                review_prompt: SessionReviewPrompt::default(),
                preview: None,
                showing_filter_menu: false,
                loading: false,
                status: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickPhoto => {
                let Some(path) = FileDialog::new()
                    .set_title("Select a Photo")
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_file()
                else {
                    return Task::none();
                };

                let ticket = self.pipeline.begin_load();
                self.loading = true;

                Task::perform(
                    loader::load_photo(path, self.config.working_max_dimension),
                    move |result| Message::PhotoLoaded(ticket, result),
                )
            }
            Message::PhotoLoaded(ticket, result) => {
                match self.pipeline.finish_load(ticket, result) {
                    Ok(true) => {
                        self.loading = false;
                        self.preview = None;
                        self.render()
                    }
                    // A newer pick is still on its way
                    Ok(false) => Task::none(),
                    Err(e) => {
                        self.loading = false;
                        self.report(e);
                        Task::none()
                    }
                }
            }
            Message::IntensityChanged(value) => {
                if !self.pipeline.set_intensity(Intensity::clamped(value)) {
                    return Task::none();
                }
                self.render()
            }
            Message::ChangeFilter => {
                self.showing_filter_menu = true;
                Task::none()
            }
            Message::DismissFilterMenu => {
                self.showing_filter_menu = false;
                Task::none()
            }
            Message::FilterChosen(kind) => {
                self.showing_filter_menu = false;

                review::confirm_filter_change(
                    &mut self.pipeline,
                    kind,
                    &self.tap_counter,
                    self.settings.as_mut(),
                    &mut self.review_prompt,
                );

                Task::batch([self.render(), self.show_review_prompt()])
            }
            Message::Rendered(outcome) => {
                match self.pipeline.accept(outcome) {
                    Ok(true) => {
                        self.preview = self.pipeline.output().map(|output| {
                            let (width, height) = output.dimensions();
                            image_widget::Handle::from_rgba(width, height, output.pixels().as_raw().clone())
                        });
                    }
                    Ok(false) => log::debug!("Discarding stale render"),
                    Err(e) => self.report(e),
                }

                // Pick up anything that changed while this render ran
                self.render()
            }
            Message::Share => {
                let Some(output) = self.pipeline.output().cloned() else {
                    return Task::none();
                };

                let Some(path) = FileDialog::new()
                    .set_title(share::SHARE_PREVIEW_LABEL)
                    .set_file_name(share::suggested_file_name())
                    .save_file()
                else {
                    return Task::none();
                };

                Task::perform(share::export(output, path), Message::Shared)
            }
            Message::Shared(result) => {
                match result {
                    Ok(path) => self.status = Some(format!("Saved to {}", path.display())),
                    Err(e) => self.report(e),
                }
                Task::none()
            }
            Message::DismissStatus => {
                self.status = None;
                Task::none()
            }
            Message::ReviewClosed => Task::none(),
        }
    }

    /// Schedule a render of the current inputs.
    /// No-op without a photo, while a render is running, or when up to date.
    fn render(&mut self) -> Task<Message> {
        let Some(job) = self.pipeline.next_render() else {
            return Task::none();
        };

        log::debug!("Rendering {} with {:?}", job.filter(), job.params());

        Task::perform(job.run_async(), Message::Rendered)
    }

    /// Open the review dialog if a request got through the session throttle
    fn show_review_prompt(&mut self) -> Task<Message> {
        let Some(count) = self.review_prompt.take_pending() else {
            return Task::none();
        };

        log::debug!("Showing review dialog after {} filter changes", count);

        let dialog = AsyncMessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title("Enjoying Instafilter?")
            .set_description("If you like Instafilter, please take a moment to leave a review.")
            .set_buttons(MessageButtons::Ok)
            .show();

        Task::perform(dialog, |_| Message::ReviewClosed)
    }

    fn report(&mut self, error: PipelineError) {
        log::error!("❌ {}", error);
        self.status = Some(error.to_string());
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let photo: Element<Message> = match &self.preview {
            Some(handle) => image_widget(handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => {
                let placeholder: Column<Message> = if self.loading {
                    column![text("Loading photo...").size(24)]
                } else if self.pipeline.has_source() {
                    column![text("Applying filter...").size(24)]
                } else {
                    column![
                        text("No Photo").size(32),
                        text("Tap to import a photo.").size(16),
                    ]
                };

                container(placeholder.spacing(10).align_x(Alignment::Center))
                    .center_x(Length::Fill)
                    .center_y(Length::Fill)
                    .into()
            }
        };

        let picker = button(photo)
            .on_press(Message::PickPhoto)
            .style(button::text)
            .width(Length::Fill)
            .height(Length::Fill);

        let intensity = row![
            text("Intensity"),
            slider(0.0..=1.0, self.pipeline.intensity().value(), Message::IntensityChanged).step(0.01),
        ]
        .spacing(20)
        .align_y(Alignment::Center);

        let mut actions = row![
            button(text(format!("Change Filter ({})", self.pipeline.filter())))
                .on_press(Message::ChangeFilter)
                .padding(10),
            horizontal_space(),
        ]
        .align_y(Alignment::Center);

        if self.pipeline.is_rendering() {
            actions = actions.push(text("Rendering...").size(14)).spacing(10);
        }
        if self.pipeline.output().is_some() {
            actions = actions.push(button("Share").on_press(Message::Share).padding(10));
        }

        let controls: Element<Message> = if self.showing_filter_menu {
            let choices = FilterKind::ALL.into_iter().map(|kind| {
                button(text(kind.label()))
                    .on_press(Message::FilterChosen(kind))
                    .width(Length::Fill)
                    .into()
            });

            Column::with_children(choices)
                .push(
                    button("Cancel")
                        .on_press(Message::DismissFilterMenu)
                        .style(button::secondary)
                        .width(Length::Fill),
                )
                .spacing(8)
                .into()
        } else {
            column![intensity, actions].spacing(20).into()
        };

        let mut content: Column<Message> = column![text("Instafilter").size(32), picker, controls]
            .spacing(20)
            .padding(20);

        if let Some(status) = &self.status {
            content = content.push(
                row![
                    text(status).size(14),
                    horizontal_space(),
                    button("Dismiss").on_press(Message::DismissStatus),
                ]
                .align_y(Alignment::Center),
            );
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application("Instafilter", Instafilter::update, Instafilter::view)
        .theme(Instafilter::theme)
        .centered()
        .run_with(Instafilter::new)
}
