/// Monitored gallery images
///
/// The per-image records behind the viewer: load phase, the last
/// successfully decoded pixels, and the lazily created hover menu. Records
/// are keyed by `ImageId`, assigned once at startup from the configured
/// gallery order; images are never added or removed after setup.

use iced::widget::image::Handle;

use crate::settings::GalleryEntry;
use crate::ui::menu::{HoverMenu, ImageGeometry};

/// Display size used when an entry does not configure one. A broken fetch
/// has no intrinsic size, so layout and the menu-area threshold work from
/// these declared dimensions, like an `<img>` with width/height attributes.
pub const DEFAULT_DISPLAY_WIDTH: f32 = 640.0;
pub const DEFAULT_DISPLAY_HEIGHT: f32 = 360.0;

/// Outer padding of the gallery column
pub const GALLERY_PADDING: f32 = 20.0;
/// Vertical spacing between images
pub const GALLERY_SPACING: f32 = 20.0;

/// Stable identity of a gallery image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub usize);

/// Where an image is in its load lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Fetch in flight, nothing settled yet for the current attempt
    Loading,
    /// Last settle was a successful decode
    Loaded,
    /// Last settle was a failure
    Broken,
}

/// One monitored image
#[derive(Debug)]
pub struct GalleryImage {
    pub id: ImageId,
    pub url: String,
    /// Rendered size in logical pixels
    pub display_width: f32,
    pub display_height: f32,
    pub phase: LoadPhase,
    /// Last good pixels; kept across later failed reloads
    pub handle: Option<Handle>,
    /// Hover menu, created lazily on the first qualifying settle
    pub menu: Option<HoverMenu>,
    /// True until the first successful settle. While set, a failed settle
    /// schedules another delayed retry; afterwards only manual reloads
    /// remain.
    pub monitored: bool,
}

impl GalleryImage {
    fn new(id: ImageId, entry: GalleryEntry) -> Self {
        Self {
            id,
            url: entry.url,
            display_width: entry.width.unwrap_or(DEFAULT_DISPLAY_WIDTH),
            display_height: entry.height.unwrap_or(DEFAULT_DISPLAY_HEIGHT),
            phase: LoadPhase::Loading,
            handle: None,
            menu: None,
            monitored: true,
        }
    }

    /// Pixel area of the rendered image
    pub fn area(&self) -> f32 {
        self.display_width * self.display_height
    }
}

/// Side table of all monitored images, in gallery order
#[derive(Debug)]
pub struct Gallery {
    images: Vec<GalleryImage>,
    /// Minimum area for an image to receive a hover menu
    area_threshold: f32,
}

impl Gallery {
    pub fn new(entries: Vec<GalleryEntry>, area_threshold: f32) -> Self {
        let images = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| GalleryImage::new(ImageId(index), entry))
            .collect();

        Self {
            images,
            area_threshold,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn ids(&self) -> Vec<ImageId> {
        self.images.iter().map(|img| img.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GalleryImage> {
        self.images.iter()
    }

    pub fn get(&self, id: ImageId) -> Option<&GalleryImage> {
        self.images.get(id.0)
    }

    pub fn get_mut(&mut self, id: ImageId) -> Option<&mut GalleryImage> {
        self.images.get_mut(id.0)
    }

    pub fn menu_mut(&mut self, id: ImageId) -> Option<&mut HoverMenu> {
        self.get_mut(id).and_then(|img| img.menu.as_mut())
    }

    /// Attach the hover menu to `id` if it qualifies.
    ///
    /// Skipped for images below the area threshold; idempotent for images
    /// that already carry a menu. Returns whether a menu was created.
    pub fn attach_menu(&mut self, id: ImageId) -> bool {
        let Some(img) = self.images.get_mut(id.0) else {
            return false;
        };

        if img.area() < self.area_threshold || img.menu.is_some() {
            return false;
        }

        img.menu = Some(HoverMenu::new());
        true
    }

    /// Width of the gallery column, the menu's positioning ancestor
    pub fn parent_width(&self) -> f32 {
        let widest = self
            .images
            .iter()
            .map(|img| img.display_width)
            .fold(0.0, f32::max);
        widest + 2.0 * GALLERY_PADDING
    }

    /// Layout geometry of `id` within the gallery column.
    ///
    /// Images stack vertically with fixed padding and spacing, so every
    /// offset is derivable from the display sizes of the preceding entries.
    pub fn geometry(&self, id: ImageId) -> Option<ImageGeometry> {
        let mut offset_top = GALLERY_PADDING;

        for img in &self.images {
            if img.id == id {
                return Some(ImageGeometry {
                    parent_top: 0.0,
                    parent_width: self.parent_width(),
                    offset_top,
                    offset_left: GALLERY_PADDING,
                    page_left: GALLERY_PADDING,
                    width: img.display_width,
                    height: img.display_height,
                });
            }
            offset_top += img.display_height + GALLERY_SPACING;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(w: f32, h: f32) -> GalleryEntry {
        GalleryEntry {
            url: "https://example.com/img.png".to_string(),
            width: Some(w),
            height: Some(h),
        }
    }

    #[test]
    fn test_small_image_gets_no_menu() {
        // 150 * 150 = 22500, below the 40000 threshold
        let mut gallery = Gallery::new(vec![entry(150.0, 150.0)], 40000.0);

        assert!(!gallery.attach_menu(ImageId(0)));
        assert!(gallery.get(ImageId(0)).unwrap().menu.is_none());
    }

    #[test]
    fn test_menu_attach_is_idempotent() {
        let mut gallery = Gallery::new(vec![entry(640.0, 360.0)], 40000.0);

        assert!(gallery.attach_menu(ImageId(0)));
        assert!(!gallery.attach_menu(ImageId(0)));
        assert!(gallery.get(ImageId(0)).unwrap().menu.is_some());
    }

    #[test]
    fn test_geometry_stacks_vertically() {
        let gallery = Gallery::new(vec![entry(640.0, 360.0), entry(320.0, 240.0)], 40000.0);

        let first = gallery.geometry(ImageId(0)).unwrap();
        assert_eq!(first.offset_top, GALLERY_PADDING);
        assert_eq!(first.offset_left, GALLERY_PADDING);

        let second = gallery.geometry(ImageId(1)).unwrap();
        assert_eq!(
            second.offset_top,
            GALLERY_PADDING + 360.0 + GALLERY_SPACING
        );
        assert_eq!(second.width, 320.0);

        // The column is as wide as the widest image plus padding
        assert_eq!(first.parent_width, 640.0 + 2.0 * GALLERY_PADDING);
    }

    #[test]
    fn test_default_display_size() {
        let gallery = Gallery::new(
            vec![GalleryEntry::from_url("https://example.com/img.png")],
            40000.0,
        );
        let img = gallery.get(ImageId(0)).unwrap();
        assert_eq!(img.display_width, DEFAULT_DISPLAY_WIDTH);
        assert_eq!(img.display_height, DEFAULT_DISPLAY_HEIGHT);
    }
}
