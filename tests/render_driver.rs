//! Render driver behaviour against a recording engine

use chatshot::render::{render_config, render_to_file, RenderOptions};
use chatshot::template::FixedClock;
use chatshot::{Engine, EngineConfig, Error, RenderConfig, Result, Viewport};
use chrono::NaiveTime;
use std::cell::RefCell;
use std::rc::Rc;

const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Viewport(Viewport),
    Load(usize),
    Measure,
    Capture(bool),
    Close,
}

#[derive(Default)]
struct FakeEngine {
    calls: Rc<RefCell<Vec<Call>>>,
    content_height: u32,
    fail_load: bool,
    fail_capture: bool,
    fail_close: bool,
}

impl FakeEngine {
    fn with_height(content_height: u32) -> (Self, Rc<RefCell<Vec<Call>>>) {
        let engine = FakeEngine {
            content_height,
            ..Default::default()
        };
        let calls = engine.calls.clone();
        (engine, calls)
    }
}

impl Engine for FakeEngine {
    fn new(_config: EngineConfig) -> Result<Self> {
        Ok(Self::default())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.calls.borrow_mut().push(Call::Viewport(viewport));
        Ok(())
    }

    fn load_html(&mut self, html: &str) -> Result<()> {
        self.calls.borrow_mut().push(Call::Load(html.len()));
        if self.fail_load {
            return Err(Error::LoadError("navigation refused".into()));
        }
        Ok(())
    }

    fn content_height(&mut self) -> Result<u32> {
        self.calls.borrow_mut().push(Call::Measure);
        Ok(self.content_height)
    }

    fn capture_png(&mut self, full_page: bool) -> Result<Vec<u8>> {
        self.calls.borrow_mut().push(Call::Capture(full_page));
        if self.fail_capture {
            return Err(Error::RenderError("screenshot refused".into()));
        }
        Ok(FAKE_PNG.to_vec())
    }

    fn close(self) -> Result<()> {
        self.calls.borrow_mut().push(Call::Close);
        if self.fail_close {
            return Err(Error::Other("close failed".into()));
        }
        Ok(())
    }
}

fn viewports(calls: &[Call]) -> Vec<Viewport> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::Viewport(v) => Some(*v),
            _ => None,
        })
        .collect()
}

#[test]
fn auto_height_is_capped() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("tall.png");
    let (engine, calls) = FakeEngine::with_height(1500);

    render_to_file(engine, "<html></html>", &RenderOptions::default(), &out).unwrap();

    let calls = calls.borrow();
    assert_eq!(
        viewports(&calls),
        vec![Viewport::new(480, 800, 2.0), Viewport::new(480, 1200, 2.0)]
    );
}

#[test]
fn auto_height_uses_measured_height_below_cap() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("short.png");
    let (engine, calls) = FakeEngine::with_height(600);

    render_to_file(engine, "<html></html>", &RenderOptions::default(), &out).unwrap();

    let calls = calls.borrow();
    assert_eq!(viewports(&calls).last(), Some(&Viewport::new(480, 600, 2.0)));
}

#[test]
fn pipeline_order_and_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("shot.png");
    let (engine, calls) = FakeEngine::with_height(700);

    let path = render_to_file(engine, "<p>hi</p>", &RenderOptions::default(), &out).unwrap();

    assert_eq!(path, out);
    assert_eq!(std::fs::read(&out).unwrap(), FAKE_PNG);
    assert_eq!(
        *calls.borrow(),
        vec![
            Call::Viewport(Viewport::new(480, 800, 2.0)),
            Call::Load(9),
            Call::Measure,
            Call::Viewport(Viewport::new(480, 700, 2.0)),
            Call::Capture(false),
            Call::Close,
        ]
    );
}

#[test]
fn explicit_height_skips_measurement() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("fixed.png");
    let (engine, calls) = FakeEngine::with_height(5000);
    let options = RenderOptions {
        width: 390,
        height: Some(844),
        scale: 3.0,
        full_page: true,
    };

    render_to_file(engine, "<html></html>", &options, &out).unwrap();

    let calls = calls.borrow();
    assert!(!calls.contains(&Call::Measure));
    assert_eq!(viewports(&calls), vec![Viewport::new(390, 844, 3.0)]);
    assert!(calls.contains(&Call::Capture(true)));
}

#[test]
fn existing_output_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("old.png");
    std::fs::write(&out, b"stale").unwrap();
    let (engine, _calls) = FakeEngine::with_height(100);

    render_to_file(engine, "<html></html>", &RenderOptions::default(), &out).unwrap();
    assert_eq!(std::fs::read(&out).unwrap(), FAKE_PNG);
}

#[test]
fn engine_closed_once_when_load_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never.png");
    let (mut engine, calls) = FakeEngine::with_height(100);
    engine.fail_load = true;
    engine.fail_close = true;

    let err = render_to_file(engine, "<html></html>", &RenderOptions::default(), &out).unwrap_err();

    // The load error wins over the close failure.
    assert!(matches!(err, Error::LoadError(_)));
    let calls = calls.borrow();
    assert_eq!(calls.iter().filter(|c| **c == Call::Close).count(), 1);
    assert!(!calls.iter().any(|c| matches!(c, Call::Capture(_))));
    assert!(!out.exists());
}

#[test]
fn engine_closed_once_when_capture_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never.png");
    let (mut engine, calls) = FakeEngine::with_height(100);
    engine.fail_capture = true;

    let err = render_to_file(engine, "<html></html>", &RenderOptions::default(), &out).unwrap_err();

    assert!(matches!(err, Error::RenderError(_)));
    let calls = calls.borrow();
    assert_eq!(calls.iter().filter(|c| **c == Call::Close).count(), 1);
    assert_eq!(calls.last(), Some(&Call::Close));
    assert!(!out.exists());
}

#[test]
fn close_failure_surfaces_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("ok.png");
    let (mut engine, _calls) = FakeEngine::with_height(100);
    engine.fail_close = true;

    let err = render_to_file(engine, "<html></html>", &RenderOptions::default(), &out).unwrap_err();
    assert!(matches!(err, Error::Other(_)));
}

#[test]
fn render_config_applies_config_options() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cfg.png");
    let (engine, calls) = FakeEngine::with_height(640);
    let config = RenderConfig {
        width: Some(360),
        scale: Some(1.0),
        ..RenderConfig::demo()
    };
    let clock = FixedClock(NaiveTime::from_hms_opt(7, 5, 0).unwrap());

    render_config(engine, &config, &clock, &out).unwrap();

    let calls = calls.borrow();
    assert_eq!(
        viewports(&calls),
        vec![Viewport::new(360, 800, 1.0), Viewport::new(360, 640, 1.0)]
    );
    assert!(out.exists());
}
