//! chatshot
//!
//! Renders a fake chat-conversation screenshot from a JSON description. The
//! conversation is turned into HTML (see [`markup`] and [`template`]) and
//! rasterized by a headless browser behind the [`Engine`] trait.
//!
//! # Features
//!
//! - **CDP Backend** (default): Uses Chrome DevTools Protocol via headless Chrome
//! - **Injectable engine**: the render driver only talks to [`Engine`], so
//!   tests and alternate backends can stand in for Chrome
//!
//! # Example
//!
//! ```no_run
//! use chatshot::config::RenderConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RenderConfig::from_json(r#"{
//!     "chatName": "Jarvis",
//!     "messages": [ { "text": "Hello!", "incoming": true, "time": "09:41" } ]
//! }"#)?;
//! let path = chatshot::generate_screenshot(&config, "screenshot.png")?;
//! println!("Saved {}", path.display());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub mod markup;
pub mod render;
pub mod template;

#[cfg(feature = "cdp")]
pub mod cdp;

pub use config::{Message, RenderConfig, Theme};
pub use render::RenderOptions;

/// Configuration for launching a rendering engine
///
/// The defaults match what the CLI uses: the Chrome sandbox is disabled so the
/// tool runs inside containers, and the network-idle wait requires 500ms
/// without new requests.
///
/// # Examples
///
/// ```
/// let cfg = chatshot::EngineConfig::default();
/// assert!(!cfg.sandbox);
/// assert_eq!(cfg.idle_quiet_ms, 500);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Viewport the browser window starts with
    pub viewport: Viewport,
    /// Timeout for page loads and the network-idle wait, in milliseconds
    pub timeout_ms: u64,
    /// Whether to keep Chrome's process sandbox enabled
    pub sandbox: bool,
    /// Quiet window with no new network activity before a load counts as idle
    pub idle_quiet_ms: u64,
    /// Interval between network-idle polls
    pub idle_poll_ms: u64,
    /// Explicit browser executable; `None` uses auto-discovery (honours `$CHROME`)
    pub chrome_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            timeout_ms: 30000,
            sandbox: false,
            idle_quiet_ms: 500,
            idle_poll_ms: 50,
            chrome_path: None,
        }
    }
}

/// Viewport dimensions in CSS pixels plus the device scale factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale: f64) -> Self {
        Self {
            width,
            height,
            scale,
        }
    }

    /// Same width and scale, different height
    pub fn with_height(self, height: u32) -> Self {
        Self { height, ..self }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: render::DEFAULT_WIDTH,
            height: render::PROVISIONAL_HEIGHT,
            scale: render::DEFAULT_SCALE,
        }
    }
}

/// Core trait for rendering backends
///
/// A backend owns one page. The render driver sets the viewport, loads a
/// document, optionally measures it and captures it, then closes the engine.
pub trait Engine {
    /// Launch a new engine instance with the given configuration
    fn new(config: EngineConfig) -> Result<Self>
    where
        Self: Sized;

    /// Resize the page viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Load an HTML document and wait until network activity has settled
    fn load_html(&mut self, html: &str) -> Result<()>;

    /// Natural height of the rendered body in CSS pixels
    fn content_height(&mut self) -> Result<u32>;

    /// Capture the viewport, or the whole scrollable page, as PNG bytes
    fn capture_png(&mut self, full_page: bool) -> Result<Vec<u8>>;

    /// Close the engine and clean up resources
    fn close(self) -> Result<()>;
}

/// Create a new engine instance with the default backend
#[cfg(feature = "cdp")]
pub fn new_engine(config: EngineConfig) -> Result<impl Engine> {
    cdp::CdpEngine::new(config)
}

/// Check that the default backend can be launched on this machine.
#[cfg(feature = "cdp")]
pub fn check_available(config: &EngineConfig) -> Result<()> {
    cdp::check_available(config)
}

#[cfg(not(feature = "cdp"))]
pub fn check_available(_config: &EngineConfig) -> Result<()> {
    Err(Error::MissingDependency(
        "no rendering backend compiled in; rebuild with the `cdp` feature".into(),
    ))
}

/// Render `config` to a PNG at `output` using the default backend.
#[cfg(feature = "cdp")]
pub fn generate_screenshot(config: &RenderConfig, output: impl AsRef<Path>) -> Result<PathBuf> {
    let options = RenderOptions::from_config(config);
    let engine = new_engine(EngineConfig {
        viewport: options.initial_viewport(),
        ..Default::default()
    })?;
    render::render_config(engine, config, &template::SystemClock, output)
}

#[cfg(not(feature = "cdp"))]
pub fn generate_screenshot(_config: &RenderConfig, _output: impl AsRef<Path>) -> Result<PathBuf> {
    check_available(&EngineConfig::default()).map(|_| PathBuf::new())
}
