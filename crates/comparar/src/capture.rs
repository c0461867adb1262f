//! Screenshot capture and element geometry seams.
//!
//! The engine never knows which automation backend is driving the browser.
//! Backends implement the capabilities they have:
//!
//! ```text
//! ┌──────────────────────────┐   ┌────────────────────────────────┐
//! │ ScreenshotCapable        │◄──│ ElementScreenshotCapable       │
//! │ viewport / full page     │   │ single element                 │
//! └──────────────────────────┘   └────────────────────────────────┘
//! ┌──────────────────────────┐
//! │ BoundingBoxResolver      │   selector -> Region (device px)
//! └──────────────────────────┘
//! ```

use crate::codec::{decode_png, encode_png};
use crate::mask::Region;
use crate::result::{ComparError, ComparResult};
use image::imageops;
use std::collections::HashMap;
use std::path::Path;

/// Backend that can write a screenshot of the page to a file.
pub trait ScreenshotCapable {
    /// Write a PNG of the viewport (or the whole page) to `path`.
    fn save_screenshot(&self, path: &Path, full_page: bool) -> ComparResult<()>;
}

/// Backend that can also write a screenshot of a single element.
pub trait ElementScreenshotCapable: ScreenshotCapable {
    /// Write a PNG of the element matched by `selector` to `path`.
    fn save_element_screenshot(&self, selector: &str, path: &Path) -> ComparResult<()>;
}

/// Resolves a selector to the element's box in device pixels.
///
/// Implementations fail with [`ComparError::ElementNotFound`] or
/// [`ComparError::ElementNotUnique`] unless exactly one element matches.
pub trait BoundingBoxResolver {
    /// Bounding box of the single element matching `selector`
    fn bounding_box(&self, selector: &str) -> ComparResult<Region>;
}

/// Scripted browser for tests.
///
/// Holds one page image and a table of elements in CSS pixels; element boxes
/// are scaled by the device pixel ratio when resolved.
#[derive(Debug, Clone)]
pub struct MockBrowser {
    page: Vec<u8>,
    elements: HashMap<String, Vec<Region>>,
    device_pixel_ratio: f64,
}

impl MockBrowser {
    /// Create a mock whose page renders as the given PNG bytes
    #[must_use]
    pub fn new(page_png: Vec<u8>) -> Self {
        Self {
            page: page_png,
            elements: HashMap::new(),
            device_pixel_ratio: 1.0,
        }
    }

    /// Register an element match for `selector` (CSS pixels)
    #[must_use]
    pub fn with_element(mut self, selector: impl Into<String>, region: Region) -> Self {
        self.elements.entry(selector.into()).or_default().push(region);
        self
    }

    /// Set the device pixel ratio
    #[must_use]
    pub const fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    fn scale(&self, v: u32) -> u32 {
        (f64::from(v) * self.device_pixel_ratio).round() as u32
    }
}

impl ScreenshotCapable for MockBrowser {
    fn save_screenshot(&self, path: &Path, _full_page: bool) -> ComparResult<()> {
        std::fs::write(path, &self.page)?;
        Ok(())
    }
}

impl ElementScreenshotCapable for MockBrowser {
    fn save_element_screenshot(&self, selector: &str, path: &Path) -> ComparResult<()> {
        let region = self.bounding_box(selector)?;
        let page = decode_png(&self.page)?;
        let element = imageops::crop_imm(
            &page,
            region.left,
            region.top,
            region.width,
            region.height,
        )
        .to_image();
        std::fs::write(path, encode_png(&element)?)?;
        Ok(())
    }
}

impl BoundingBoxResolver for MockBrowser {
    fn bounding_box(&self, selector: &str) -> ComparResult<Region> {
        match self.elements.get(selector).map(Vec::as_slice) {
            None | Some([]) => Err(ComparError::ElementNotFound {
                selector: selector.to_string(),
            }),
            Some([region]) => Ok(Region::new(
                self.scale(region.left),
                self.scale(region.top),
                self.scale(region.width),
                self.scale(region.height),
            )),
            Some(many) => Err(ComparError::ElementNotUnique {
                selector: selector.to_string(),
                count: many.len(),
            }),
        }
    }
}
