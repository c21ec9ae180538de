//! Render driver: HTML document in, PNG file out
//!
//! The driver is generic over [`Engine`] so the viewport and auto-height
//! logic can be exercised without a browser.

use crate::config::RenderConfig;
use crate::template::{self, Clock};
use crate::{Engine, Error, Result, Viewport};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

pub const DEFAULT_WIDTH: u32 = 480;
/// Viewport height used for the first layout when no height is configured
pub const PROVISIONAL_HEIGHT: u32 = 800;
/// Upper bound for the auto-height pass
pub const MAX_AUTO_HEIGHT: u32 = 1200;
pub const DEFAULT_SCALE: f64 = 2.0;

/// Viewport and capture settings taken from a [`RenderConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub width: u32,
    /// `None` enables the auto-height pass
    pub height: Option<u32>,
    pub scale: f64,
    pub full_page: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: None,
            scale: DEFAULT_SCALE,
            full_page: false,
        }
    }
}

impl RenderOptions {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            width: config.width().unwrap_or(DEFAULT_WIDTH),
            height: config.height(),
            scale: config.scale().unwrap_or(DEFAULT_SCALE),
            full_page: config.full_page,
        }
    }

    /// Viewport for the first layout pass
    pub fn initial_viewport(&self) -> Viewport {
        Viewport::new(
            self.width,
            self.height.unwrap_or(PROVISIONAL_HEIGHT),
            self.scale,
        )
    }
}

/// Final viewport height for a measured content height.
pub fn auto_height(measured: u32) -> u32 {
    measured.min(MAX_AUTO_HEIGHT)
}

/// Compose the page for `config` and render it to `output`.
pub fn render_config<E: Engine>(
    engine: E,
    config: &RenderConfig,
    clock: &dyn Clock,
    output: impl AsRef<Path>,
) -> Result<PathBuf> {
    let html = template::compose_document(config, clock);
    render_to_file(engine, &html, &RenderOptions::from_config(config), output)
}

/// Render `html` with `engine` and write the PNG to `output`.
///
/// The engine is closed on every path. When rendering fails the render error
/// is returned and a close failure is only logged.
pub fn render_to_file<E: Engine>(
    mut engine: E,
    html: &str,
    options: &RenderOptions,
    output: impl AsRef<Path>,
) -> Result<PathBuf> {
    let output = output.as_ref();
    let rendered = drive(&mut engine, html, options, output);
    let closed = engine.close();

    match rendered {
        Ok(()) => {
            closed?;
            info!("Screenshot written to {}", output.display());
            Ok(output.to_path_buf())
        }
        Err(err) => {
            if let Err(close_err) = closed {
                warn!("Failed to close engine after render error: {}", close_err);
            }
            Err(err)
        }
    }
}

fn drive<E: Engine>(engine: &mut E, html: &str, options: &RenderOptions, output: &Path) -> Result<()> {
    let viewport = options.initial_viewport();
    debug!("Setting viewport {}x{} @{}x", viewport.width, viewport.height, viewport.scale);
    engine.set_viewport(viewport)?;

    engine.load_html(html)?;
    debug!("Document loaded ({} bytes)", html.len());

    if options.height.is_none() {
        let measured = engine.content_height()?;
        let height = auto_height(measured);
        debug!("Measured content height {}px, using {}px", measured, height);
        engine.set_viewport(viewport.with_height(height))?;
    }

    let png = engine.capture_png(options.full_page)?;
    if png.is_empty() {
        return Err(Error::RenderError("engine returned an empty image".into()));
    }
    debug!("Captured {} bytes (full page: {})", png.len(), options.full_page);

    std::fs::write(output, &png)?;
    Ok(())
}
