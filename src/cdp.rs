//! Chrome DevTools Protocol adapter implementation

use crate::{Engine, EngineConfig, Error, Result, Viewport};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::{Emulation, Page};
use headless_chrome::{Browser, LaunchOptions};
use log::debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

// Returns -1 while the document, its images or its fonts are still loading,
// otherwise the number of resources fetched so far.
const PENDING_RESOURCES: &str = r#"(function() {
    if (document.readyState !== 'complete') return -1;
    if (document.fonts && document.fonts.status !== 'loaded') return -1;
    var images = Array.prototype.slice.call(document.images);
    if (!images.every(function(img) { return img.complete; })) return -1;
    return performance.getEntriesByType('resource').length;
})()"#;

const BODY_HEIGHT: &str = "document.body.scrollHeight";
const PAGE_HEIGHT: &str =
    "Math.max(document.body.scrollHeight, document.documentElement.scrollHeight)";

/// Verify that a Chrome executable can be found without launching it.
pub fn check_available(config: &EngineConfig) -> Result<()> {
    match &config.chrome_path {
        Some(path) if path.exists() => Ok(()),
        Some(path) => Err(Error::MissingDependency(format!(
            "Chrome not found at {}",
            path.display()
        ))),
        None => headless_chrome::browser::default_executable()
            .map(|path| debug!("Using browser at {}", path.display()))
            .map_err(|e| {
                Error::MissingDependency(format!(
                    "Chrome/Chromium not installed ({}). Install it or set CHROME to its path",
                    e
                ))
            }),
    }
}

/// CDP-based engine implementation (uses the `headless_chrome` crate)
///
/// This adapter launches a headless Chrome instance, manages a single tab,
/// and provides the `Engine` trait implementation over it.
pub struct CdpEngine {
    browser: Browser,
    tab: Arc<Tab>,
    config: EngineConfig,
    viewport: Viewport,
}

impl CdpEngine {
    fn apply_metrics(&self, viewport: Viewport) -> Result<()> {
        self.tab
            .call_method(Emulation::SetDeviceMetricsOverride {
                width: viewport.width,
                height: viewport.height,
                device_scale_factor: viewport.scale,
                mobile: false,
                scale: None,
                screen_width: None,
                screen_height: None,
                position_x: None,
                position_y: None,
                dont_set_visible_size: None,
                screen_orientation: None,
                viewport: None,
                device_posture: None,
                display_feature: None,
            })?;
        Ok(())
    }

    fn evaluate_number(&self, script: &str) -> Result<f64> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| Error::ScriptError(format!("Evaluation failed: {}", e)))?;

        result
            .value
            .as_ref()
            .and_then(|v| v.as_f64())
            .ok_or_else(|| Error::ScriptError(format!("`{}` did not return a number", script)))
    }

    /// Poll the page until nothing is loading and no new resource has been
    /// requested for `idle_quiet_ms`.
    fn wait_for_network_idle(&self) -> Result<()> {
        let quiet = Duration::from_millis(self.config.idle_quiet_ms);
        let poll = Duration::from_millis(self.config.idle_poll_ms);
        let deadline = Instant::now() + Duration::from_millis(self.config.timeout_ms);

        let mut last_count = -1.0;
        let mut settled_since = Instant::now();

        loop {
            let count = self.evaluate_number(PENDING_RESOURCES)?;
            let now = Instant::now();

            if count < 0.0 || count != last_count {
                last_count = count;
                settled_since = now;
            } else if now.duration_since(settled_since) >= quiet {
                debug!("Network idle after {} resources", count);
                return Ok(());
            }

            if now >= deadline {
                return Err(Error::Timeout(self.config.timeout_ms));
            }
            std::thread::sleep(poll);
        }
    }
}

impl Engine for CdpEngine {
    fn new(config: EngineConfig) -> Result<Self>
    where
        Self: Sized,
    {
        check_available(&config)?;

        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(config.sandbox)
            .path(config.chrome_path.clone())
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

        let viewport = config.viewport;
        Ok(Self {
            browser,
            tab,
            config,
            viewport,
        })
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.apply_metrics(viewport)?;
        self.viewport = viewport;
        Ok(())
    }

    fn load_html(&mut self, html: &str) -> Result<()> {
        self.tab
            .navigate_to("about:blank")
            .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

        // data: URLs are capped at 2MB, so swap the blank document in place.
        let frame_id = self.tab.call_method(Page::GetFrameTree(None))?.frame_tree.frame.id;
        self.tab.call_method(Page::SetDocumentContent {
            frame_id,
            html: html.to_string(),
        })?;

        self.wait_for_network_idle()
    }

    fn content_height(&mut self) -> Result<u32> {
        Ok(self.evaluate_number(BODY_HEIGHT)?.ceil() as u32)
    }

    fn capture_png(&mut self, full_page: bool) -> Result<Vec<u8>> {
        let restore = if full_page {
            let height = self.evaluate_number(PAGE_HEIGHT)?.ceil() as u32;
            debug!("Full page capture at {}px", height);
            self.apply_metrics(self.viewport.with_height(height))?;
            Some(self.viewport)
        } else {
            None
        };

        let shot = self
            .tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| Error::RenderError(format!("Screenshot failed: {}", e)));

        if let Some(viewport) = restore {
            self.apply_metrics(viewport)?;
        }
        shot
    }

    fn close(self) -> Result<()> {
        // Drop the tab before the browser so the child process exits promptly.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}
