//! Browser driver abstraction.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   PageDriver trait                       │
//! │  navigate · find · css_value · screenshot · close        │
//! └──────────────┬──────────────────────────┬────────────────┘
//!                │                          │
//!       ┌────────▼────────┐        ┌────────▼────────┐
//!       │  ChromiumDriver │        │   MockDriver    │
//!       │  (feature       │        │  (unit tests)   │
//!       │   `browser`)    │        │                 │
//!       └─────────────────┘        └─────────────────┘
//! ```
//!
//! Drivers are synchronous: one session drives one page, and callers
//! block while the browser works.

use crate::result::{ProofError, ProofResult};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

// =============================================================================
// LOCATORS AND HANDLES
// =============================================================================

/// Strategy for finding DOM elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "lowercase")]
pub enum Locator {
    /// `id` attribute
    Id(String),
    /// Single class name
    Class(String),
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
    /// Tag name
    Tag(String),
}

impl Locator {
    /// Locate by id
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::Id(value.into())
    }

    /// Locate by class name
    #[must_use]
    pub fn class(value: impl Into<String>) -> Self {
        Self::Class(value.into())
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::Css(value.into())
    }

    /// Locate by XPath
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::XPath(value.into())
    }

    /// Locate by tag name
    #[must_use]
    pub fn tag(value: impl Into<String>) -> Self {
        Self::Tag(value.into())
    }

    /// Equivalent CSS selector, if one exists
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(format!("#{id}")),
            Self::Class(class) => Some(format!(".{class}")),
            Self::Css(css) | Self::Tag(css) => Some(css.clone()),
            Self::XPath(_) => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(v) => write!(f, "id={v}"),
            Self::Class(v) => write!(f, "class={v}"),
            Self::Css(v) => write!(f, "css={v}"),
            Self::XPath(v) => write!(f, "xpath={v}"),
            Self::Tag(v) => write!(f, "tag={v}"),
        }
    }
}

/// Bounding box in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a rect
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Snapshot of a located element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Locator that found the element
    pub locator: Locator,
    /// Position among the locator's matches
    pub index: usize,
    /// Lowercase tag name
    pub tag_name: String,
    /// Bounding box when located
    pub rect: Rect,
    /// Text content
    pub text: Option<String>,
}

// =============================================================================
// DRIVER TRAIT
// =============================================================================

/// Synchronous control of one browser page
pub trait PageDriver {
    /// Load a URL
    fn navigate(&mut self, url: &str) -> ProofResult<()>;

    /// URL currently loaded
    fn current_url(&self) -> ProofResult<String>;

    /// First element matching the locator, if any
    fn find_element(&self, locator: &Locator) -> ProofResult<Option<ElementHandle>>;

    /// Every element matching the locator
    fn find_elements(&self, locator: &Locator) -> ProofResult<Vec<ElementHandle>>;

    /// Click an element
    fn click(&mut self, element: &ElementHandle) -> ProofResult<()>;

    /// Type into an element
    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> ProofResult<()>;

    /// Computed CSS property value as the browser reports it
    fn css_value(&self, element: &ElementHandle, property: &str) -> ProofResult<String>;

    /// Run JavaScript and return its JSON result
    fn execute_script(&mut self, script: &str) -> ProofResult<serde_json::Value>;

    /// Full-page PNG screenshot
    fn screenshot(&mut self) -> ProofResult<Vec<u8>>;

    /// Resize the viewport
    fn set_window_size(&mut self, width: u32, height: u32) -> ProofResult<()>;

    /// Shut the browser down
    fn close(&mut self) -> ProofResult<()>;
}

/// Save a screenshot as `<dir>/<test_name>_<unix_seconds>.png`
pub fn capture_screenshot<D: PageDriver + ?Sized>(
    driver: &mut D,
    dir: &Path,
    test_name: &str,
) -> ProofResult<PathBuf> {
    let png = driver.screenshot()?;
    std::fs::create_dir_all(dir)?;

    let safe_name: String = test_name
        .replace("::", "_")
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    let stamp = chrono::Utc::now().timestamp();
    let path = dir.join(format!("{safe_name}_{stamp}.png"));
    std::fs::write(&path, png)?;
    tracing::info!(path = %path.display(), "saved failure screenshot");
    Ok(path)
}

// =============================================================================
// SESSION GUARD
// =============================================================================

/// Owns a driver and closes it when dropped
#[derive(Debug)]
pub struct DriverSession<D: PageDriver> {
    driver: D,
    closed: bool,
}

impl<D: PageDriver> DriverSession<D> {
    /// Take ownership of a driver
    #[must_use]
    pub const fn new(driver: D) -> Self {
        Self {
            driver,
            closed: false,
        }
    }

    /// Close now, surfacing any error
    pub fn close(mut self) -> ProofResult<()> {
        self.closed = true;
        self.driver.close()
    }
}

impl<D: PageDriver> Deref for DriverSession<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.driver
    }
}

impl<D: PageDriver> DerefMut for DriverSession<D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

impl<D: PageDriver> Drop for DriverSession<D> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.driver.close() {
                tracing::warn!(error = %e, "failed to close browser session");
            }
        }
    }
}

// =============================================================================
// MOCK DRIVER
// =============================================================================

/// Element served by [`MockDriver`]
#[derive(Debug, Clone, PartialEq)]
pub struct MockElement {
    /// Locator the element answers to
    pub locator: Locator,
    /// Tag name
    pub tag_name: String,
    /// Bounding box
    pub rect: Rect,
    /// Text content
    pub text: Option<String>,
    /// Computed style values
    pub css: HashMap<String, String>,
    /// Number of lookups that miss before the element appears
    pub appear_after: usize,
}

impl MockElement {
    /// Element with an empty rect and no styles
    #[must_use]
    pub fn new(locator: Locator, tag_name: impl Into<String>) -> Self {
        Self {
            locator,
            tag_name: tag_name.into(),
            rect: Rect::default(),
            text: None,
            css: HashMap::new(),
            appear_after: 0,
        }
    }

    /// Set the rendered size
    #[must_use]
    pub const fn with_size(mut self, width: f64, height: f64) -> Self {
        self.rect.width = width;
        self.rect.height = height;
        self
    }

    /// Set a computed style value
    #[must_use]
    pub fn with_css(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.css.insert(property.into(), value.into());
        self
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Appear only after `lookups` misses
    #[must_use]
    pub const fn appearing_after(mut self, lookups: usize) -> Self {
        self.appear_after = lookups;
        self
    }
}

/// In-memory driver for tests
#[derive(Debug, Default)]
pub struct MockDriver {
    /// Current URL
    pub current_url: String,
    /// Served elements
    pub elements: Vec<MockElement>,
    /// Queued script results
    pub script_results: VecDeque<serde_json::Value>,
    /// Screenshot bytes
    pub screenshot_data: Option<Vec<u8>>,
    /// Viewport size
    pub window_size: Option<(u32, u32)>,
    /// Call history for verification
    pub call_history: Vec<String>,
    /// Whether `close` ran
    pub closed: bool,
    lookups: Cell<usize>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve an element
    pub fn add_element(&mut self, element: MockElement) {
        self.elements.push(element);
    }

    /// Builder form of [`Self::add_element`]
    #[must_use]
    pub fn with_element(mut self, element: MockElement) -> Self {
        self.add_element(element);
        self
    }

    /// Queue a script result
    pub fn push_script_result(&mut self, result: serde_json::Value) {
        self.script_results.push_back(result);
    }

    /// Set screenshot bytes
    pub fn set_screenshot(&mut self, png: Vec<u8>) {
        self.screenshot_data = Some(png);
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// Element lookups served so far
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }

    fn matching(&self, locator: &Locator) -> Vec<ElementHandle> {
        let seen = self.lookups.get();
        self.lookups.set(seen + 1);
        self.elements
            .iter()
            .filter(|e| &e.locator == locator && seen >= e.appear_after)
            .enumerate()
            .map(|(index, e)| ElementHandle {
                locator: e.locator.clone(),
                index,
                tag_name: e.tag_name.clone(),
                rect: e.rect,
                text: e.text.clone(),
            })
            .collect()
    }

    fn element_for(&self, handle: &ElementHandle) -> ProofResult<&MockElement> {
        self.elements
            .iter()
            .filter(|e| e.locator == handle.locator)
            .nth(handle.index)
            .ok_or_else(|| ProofError::ElementNotFound {
                locator: handle.locator.to_string(),
            })
    }
}

impl PageDriver for MockDriver {
    fn navigate(&mut self, url: &str) -> ProofResult<()> {
        self.call_history.push(format!("navigate:{url}"));
        self.current_url = url.to_string();
        Ok(())
    }

    fn current_url(&self) -> ProofResult<String> {
        Ok(self.current_url.clone())
    }

    fn find_element(&self, locator: &Locator) -> ProofResult<Option<ElementHandle>> {
        Ok(self.matching(locator).into_iter().next())
    }

    fn find_elements(&self, locator: &Locator) -> ProofResult<Vec<ElementHandle>> {
        Ok(self.matching(locator))
    }

    fn click(&mut self, element: &ElementHandle) -> ProofResult<()> {
        self.element_for(element)?;
        self.call_history.push(format!("click:{}", element.locator));
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> ProofResult<()> {
        self.element_for(element)?;
        self.call_history
            .push(format!("send_keys:{}:{text}", element.locator));
        Ok(())
    }

    fn css_value(&self, element: &ElementHandle, property: &str) -> ProofResult<String> {
        let found = self.element_for(element)?;
        Ok(found.css.get(property).cloned().unwrap_or_default())
    }

    fn execute_script(&mut self, script: &str) -> ProofResult<serde_json::Value> {
        self.call_history.push(format!("execute_script:{script}"));
        Ok(self
            .script_results
            .pop_front()
            .unwrap_or(serde_json::Value::Null))
    }

    fn screenshot(&mut self) -> ProofResult<Vec<u8>> {
        self.call_history.push("screenshot".to_string());
        self.screenshot_data
            .clone()
            .ok_or_else(|| ProofError::driver("No mock screenshot set"))
    }

    fn set_window_size(&mut self, width: u32, height: u32) -> ProofResult<()> {
        self.call_history
            .push(format!("set_window_size:{width}x{height}"));
        self.window_size = Some((width, height));
        Ok(())
    }

    fn close(&mut self) -> ProofResult<()> {
        self.call_history.push("close".to_string());
        self.closed = true;
        Ok(())
    }
}
