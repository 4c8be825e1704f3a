/// Reload-count indicator overlay
///
/// A small fixed banner in the top-right corner mirroring the notification
/// state: the number of images currently reloading, or the offline notice.
/// Hidden state renders nothing at all.

use iced::alignment::Horizontal;
use iced::widget::{container, text};
use iced::{Border, Color, Element, Length, Padding, Shadow, Theme};

use crate::state::notify::NotificationState;
use crate::Message;

pub fn overlay(state: NotificationState) -> Option<Element<'static, Message>> {
    let label = match state {
        NotificationState::Hidden => return None,
        NotificationState::Reloading(count) => format!("Reloading images: {count}"),
        NotificationState::Offline(count) => format!("Offline: {count}"),
    };

    let banner = container(text(label).size(14))
        .padding(Padding {
            top: 5.0,
            right: 5.0,
            bottom: 5.0,
            left: 5.0,
        })
        .style(|_theme: &Theme| container::Style {
            text_color: Some(Color::WHITE),
            background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.7).into()),
            border: Border::default(),
            shadow: Shadow::default(),
        });

    Some(
        container(banner)
            .width(Length::Fill)
            .align_x(Horizontal::Right)
            .into(),
    )
}
