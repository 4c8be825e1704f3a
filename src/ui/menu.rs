/// Hover reload menu: positioning geometry and overlay widget
///
/// Each qualifying image owns one menu, created lazily on its first settle
/// and reused for every later hover session. The vertical anchor is computed
/// once per session from the cursor's entry point and cached; it is cleared
/// only when the pointer leaves both the image and the menu, so the menu
/// holds still while the cursor travels between the two.

use iced::alignment::Horizontal;
use iced::widget::{button, column, container, mouse_area, text};
use iced::{Border, Color, Element, Length, Padding, Shadow, Theme};

use crate::state::monitor::ImageId;
use crate::Message;

/// Height of the collapsed "···" toggle, also used as the menu height when
/// anchoring (the expanded buttons are revealed only on menu hover)
pub const MENU_HEIGHT: f32 = 24.0;

/// Cursor position in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePoint {
    pub x: f32,
    pub y: f32,
}

/// Where an image sits relative to its positioning ancestor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageGeometry {
    /// Page-relative top edge of the positioning ancestor
    pub parent_top: f32,
    /// Width of the positioning ancestor
    pub parent_width: f32,
    /// Image offset within the ancestor
    pub offset_top: f32,
    pub offset_left: f32,
    /// Page-relative left edge of the image
    pub page_left: f32,
    /// Rendered image size
    pub width: f32,
    pub height: f32,
}

impl ImageGeometry {
    /// Page-relative bottom edge of the image
    fn bottom(&self) -> f32 {
        self.parent_top + self.offset_top + self.height
    }
}

/// Which image edge the menu hugs; the payload is the CSS-style offset from
/// the ancestor's matching edge. Exactly one side is ever set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuSide {
    Left(f32),
    Right(f32),
}

/// A computed menu position, fixed for one hover session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuPlacement {
    /// Top offset within the positioning ancestor
    pub top: f32,
    pub side: MenuSide,
}

/// Place the menu along the inside edge of the image at the level of the
/// cursor's entry point.
///
/// The top edge tracks the cursor but never runs past the image bottom, and
/// room for twice the menu height is reserved so the expanded buttons stay
/// inside the image. The menu hugs whichever horizontal edge the cursor is
/// closer to.
pub fn position_menu(geom: &ImageGeometry, cursor: PagePoint, menu_height: f32) -> MenuPlacement {
    let image_bottom = geom.bottom();

    let top = f32::min(
        cursor.y - geom.parent_top + f32::min(10.0, image_bottom - cursor.y),
        image_bottom - f32::min(2.0 * menu_height, geom.height),
    )
    .round();

    let side = if cursor.x > geom.page_left + geom.width / 2.0 {
        MenuSide::Right(geom.parent_width - (geom.offset_left + geom.width))
    } else {
        MenuSide::Left(geom.offset_left)
    };

    MenuPlacement { top, side }
}

/// Per-image hover menu state
#[derive(Debug, Default)]
pub struct HoverMenu {
    /// Cached position; `Some` for the duration of one hover session
    pub anchor: Option<MenuPlacement>,
    /// Collapsed after an action click, until the pointer leaves
    pub suppressed: bool,
    /// Whether the pointer is currently over the image / the menu
    pub over_image: bool,
    pub over_menu: bool,
}

impl HoverMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute and cache the anchor if this hover session has none yet;
    /// otherwise the position is fixed and the call is a no-op.
    pub fn ensure_anchor(&mut self, geom: &ImageGeometry, cursor: PagePoint) {
        if self.anchor.is_none() {
            self.anchor = Some(position_menu(geom, cursor, MENU_HEIGHT));
        }
    }

    /// The pointer left the image. Restores the menu display; the anchor is
    /// reset only if the pointer did not move onto the menu.
    pub fn leave_image(&mut self) {
        self.over_image = false;
        self.suppressed = false;
        if !self.over_menu {
            self.anchor = None;
        }
    }

    /// The pointer left the menu. Symmetric to `leave_image`.
    pub fn leave_menu(&mut self) {
        self.over_menu = false;
        self.suppressed = false;
        if !self.over_image {
            self.anchor = None;
        }
    }

    /// Hide the menu after one of its actions was clicked
    pub fn suppress(&mut self) {
        self.suppressed = true;
    }

    /// Whether the overlay should be rendered right now
    pub fn visible(&self) -> bool {
        (self.over_image || self.over_menu) && !self.suppressed && self.anchor.is_some()
    }
}

/// Build the menu overlay for one image, positioned inside the image's
/// stacking area according to the cached anchor.
pub fn overlay(id: ImageId, menu: &HoverMenu, geom: &ImageGeometry) -> Option<Element<'static, Message>> {
    if !menu.visible() {
        return None;
    }
    let placement = menu.anchor.as_ref()?;

    // The collapsed toggle is shown while hovering the image; moving onto
    // the menu itself reveals the action buttons.
    let content: Element<'static, Message> = if menu.over_menu {
        column![
            action_button("Reload Image", Message::ReloadImagePressed(id)),
            action_button("Reload All Images", Message::ReloadAllPressed(id)),
        ]
        .into()
    } else {
        container(text("···").size(MENU_HEIGHT - 4.0))
            .padding(Padding {
                top: 0.0,
                right: 5.0,
                bottom: 0.0,
                left: 5.0,
            })
            .style(|_theme: &Theme| container::Style {
                text_color: Some(Color::WHITE),
                background: Some(Color::BLACK.into()),
                border: Border::default(),
                shadow: Shadow::default(),
            })
            .into()
    };

    let hoverable = mouse_area(content)
        .on_enter(Message::CursorEnteredMenu(id))
        .on_exit(Message::CursorExitedMenu(id));

    // The anchor top is relative to the positioning ancestor; the overlay
    // lives inside the image's stack, so translate to image-local space.
    let local_top = (placement.top - geom.offset_top).max(0.0);
    let align = match placement.side {
        MenuSide::Left(_) => Horizontal::Left,
        MenuSide::Right(_) => Horizontal::Right,
    };

    Some(
        container(hoverable)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(align)
            .padding(Padding {
                top: local_top,
                right: 0.0,
                bottom: 0.0,
                left: 0.0,
            })
            .into(),
    )
}

fn action_button(label: &'static str, message: Message) -> Element<'static, Message> {
    button(text(label).size(14))
        .on_press(message)
        .padding(Padding {
            top: 0.0,
            right: 5.0,
            bottom: 0.0,
            left: 5.0,
        })
        .style(|_theme: &Theme, status| {
            let background = match status {
                button::Status::Hovered => Color::from_rgb(0.18, 0.31, 0.31),
                _ => Color::BLACK,
            };
            button::Style {
                background: Some(background.into()),
                text_color: Color::WHITE,
                border: Border::default(),
                shadow: Shadow::default(),
            }
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom() -> ImageGeometry {
        ImageGeometry {
            parent_top: 100.0,
            parent_width: 260.0,
            offset_top: 50.0,
            offset_left: 30.0,
            page_left: 30.0,
            width: 200.0,
            height: 300.0,
        }
    }

    #[test]
    fn test_menu_top_tracks_cursor_entry() {
        // Entering near the top: anchor 10px below the cursor line
        let placement = position_menu(&geom(), PagePoint { x: 50.0, y: 160.0 }, MENU_HEIGHT);
        assert_eq!(placement.top, 70.0);
    }

    #[test]
    fn test_menu_top_clamped_near_image_bottom() {
        // Entering near the bottom edge: the remaining headroom (5px)
        // replaces the usual 10px offset below the cursor line
        let placement = position_menu(&geom(), PagePoint { x: 50.0, y: 445.0 }, MENU_HEIGHT);
        assert_eq!(placement.top, 445.0 - 100.0 + 5.0);
    }

    #[test]
    fn test_tall_menu_clamped_to_image_height() {
        // Twice the menu height exceeds the image height, so the clamp
        // reserves the whole image height below the image bottom (450)
        let placement = position_menu(&geom(), PagePoint { x: 50.0, y: 445.0 }, 160.0);
        assert_eq!(placement.top, 450.0 - 300.0);
    }

    #[test]
    fn test_side_follows_cursor_half() {
        // Image midpoint is at page x 130
        let left = position_menu(&geom(), PagePoint { x: 120.0, y: 200.0 }, MENU_HEIGHT);
        assert_eq!(left.side, MenuSide::Left(30.0));

        let right = position_menu(&geom(), PagePoint { x: 140.0, y: 200.0 }, MENU_HEIGHT);
        // parent_width - (offset_left + width)
        assert_eq!(right.side, MenuSide::Right(30.0));
    }

    #[test]
    fn test_anchor_computed_once_per_session() {
        let mut menu = HoverMenu::new();
        menu.over_image = true;

        menu.ensure_anchor(&geom(), PagePoint { x: 50.0, y: 160.0 });
        let first = menu.anchor;

        // Later cursor movement within the same session changes nothing
        menu.ensure_anchor(&geom(), PagePoint { x: 180.0, y: 400.0 });
        assert_eq!(menu.anchor, first);
    }

    #[test]
    fn test_leaving_image_to_menu_keeps_anchor() {
        let mut menu = HoverMenu::new();
        menu.over_image = true;
        menu.ensure_anchor(&geom(), PagePoint { x: 50.0, y: 160.0 });

        menu.over_menu = true;
        menu.leave_image();
        assert!(menu.anchor.is_some());

        // And back again
        menu.over_image = true;
        menu.leave_menu();
        assert!(menu.anchor.is_some());
    }

    #[test]
    fn test_leaving_both_resets_anchor() {
        let mut menu = HoverMenu::new();
        menu.over_image = true;
        menu.ensure_anchor(&geom(), PagePoint { x: 50.0, y: 160.0 });

        menu.leave_image();
        assert!(menu.anchor.is_none());
        assert!(!menu.visible());
    }

    #[test]
    fn test_action_click_suppresses_until_leave() {
        let mut menu = HoverMenu::new();
        menu.over_image = true;
        menu.over_menu = true;
        menu.ensure_anchor(&geom(), PagePoint { x: 50.0, y: 160.0 });

        menu.suppress();
        assert!(!menu.visible());

        // Leaving restores the display for the next reveal
        menu.leave_menu();
        assert!(!menu.suppressed);
    }
}
