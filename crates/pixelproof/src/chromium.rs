//! Chromium over the DevTools protocol (feature `browser`).
//!
//! The driver owns a tokio runtime and blocks on each CDP call, so it
//! fits the synchronous [`PageDriver`] trait. Elements are located by
//! evaluating JavaScript in the page; handles carry their locator and
//! match index and are resolved again for every interaction.

use crate::config::RunConfig;
use crate::driver::{ElementHandle, Locator, PageDriver, Rect};
use crate::result::{ProofError, ProofResult};
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::Deserialize;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

/// Defines `__pp_lookup(by, value)`, returning the matching elements
const LOOKUP_JS: &str = r"
const __pp_lookup = (by, value) => {
  if (by === 'xpath') {
    const snap = document.evaluate(value, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
    const out = [];
    for (let i = 0; i < snap.snapshotLength; i++) out.push(snap.snapshotItem(i));
    return out;
  }
  return Array.from(document.querySelectorAll(value));
};";

#[derive(Debug, Deserialize)]
struct FoundElement {
    tag: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    text: Option<String>,
}

/// Real browser session driving one page
#[derive(Debug)]
pub struct ChromiumDriver {
    runtime: Runtime,
    browser: CdpBrowser,
    page: CdpPage,
    handler: JoinHandle<()>,
    closed: bool,
}

impl ChromiumDriver {
    /// Launch Chromium with the run's viewport and headless setting
    pub fn launch(config: &RunConfig) -> ProofResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        let mut builder = CdpConfig::builder()
            .window_size(config.window_width, config.window_height)
            .no_sandbox();
        if !config.headless {
            builder = builder.with_head();
        }
        let cdp_config = builder.build().map_err(ProofError::driver)?;

        let (browser, mut handler) = runtime
            .block_on(CdpBrowser::launch(cdp_config))
            .map_err(|e| ProofError::driver(format!("cannot launch chromium: {e}")))?;

        let handler = runtime.spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = runtime
            .block_on(browser.new_page("about:blank"))
            .map_err(|e| ProofError::driver(e.to_string()))?;

        let mut driver = Self {
            runtime,
            browser,
            page,
            handler,
            closed: false,
        };
        driver.set_window_size(config.window_width, config.window_height)?;
        tracing::info!(headless = config.headless, "launched chromium");
        Ok(driver)
    }

    fn evaluate<T: serde::de::DeserializeOwned>(&self, expr: String) -> ProofResult<T> {
        self.runtime.block_on(async {
            self.page
                .evaluate(expr)
                .await
                .map_err(|e| ProofError::driver(format!("script failed: {e}")))?
                .into_value::<T>()
                .map_err(|e| ProofError::driver(format!("unexpected script result: {e}")))
        })
    }

    /// Run `body` with `el` bound to the handle's element
    fn with_element<T: serde::de::DeserializeOwned>(&self, element: &ElementHandle, body: &str) -> ProofResult<T> {
        let lookup = lookup_call(&element.locator)?;
        let expr = format!(
            "(() => {{ {LOOKUP_JS} const el = {lookup}[{index}]; if (!el) return null; {body} }})()",
            index = element.index
        );
        let value: Option<T> = self.evaluate(expr)?;
        value.ok_or_else(|| ProofError::ElementNotFound {
            locator: element.locator.to_string(),
        })
    }
}

fn lookup_call(locator: &Locator) -> ProofResult<String> {
    let (by, value) = match locator {
        Locator::XPath(xpath) => ("xpath", xpath.clone()),
        other => ("css", other.to_css().unwrap_or_default()),
    };
    Ok(format!("__pp_lookup('{by}', {})", serde_json::to_string(&value)?))
}

fn find_script(locator: &Locator) -> ProofResult<String> {
    let lookup = lookup_call(locator)?;
    Ok(format!(
        "(() => {{ {LOOKUP_JS} return {lookup}.map(el => {{ \
         const r = el.getBoundingClientRect(); \
         return {{ tag: el.tagName.toLowerCase(), x: r.x, y: r.y, width: r.width, height: r.height, \
         text: el.textContent }}; }}); }})()"
    ))
}

impl PageDriver for ChromiumDriver {
    fn navigate(&mut self, url: &str) -> ProofResult<()> {
        self.runtime
            .block_on(async {
                self.page.goto(url).await?;
                self.page.wait_for_navigation().await?;
                Ok::<_, chromiumoxide::error::CdpError>(())
            })
            .map_err(|e| ProofError::driver(format!("navigation to {url} failed: {e}")))?;
        tracing::debug!(url, "navigated");
        Ok(())
    }

    fn current_url(&self) -> ProofResult<String> {
        let url = self
            .runtime
            .block_on(self.page.url())
            .map_err(|e| ProofError::driver(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    fn find_element(&self, locator: &Locator) -> ProofResult<Option<ElementHandle>> {
        Ok(self.find_elements(locator)?.into_iter().next())
    }

    fn find_elements(&self, locator: &Locator) -> ProofResult<Vec<ElementHandle>> {
        let found: Vec<FoundElement> = self.evaluate(find_script(locator)?)?;
        Ok(found
            .into_iter()
            .enumerate()
            .map(|(index, el)| ElementHandle {
                locator: locator.clone(),
                index,
                tag_name: el.tag,
                rect: Rect::new(el.x, el.y, el.width, el.height),
                text: el.text,
            })
            .collect())
    }

    fn click(&mut self, element: &ElementHandle) -> ProofResult<()> {
        let _: bool = self.with_element(element, "el.click(); return true;")?;
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> ProofResult<()> {
        let body = format!(
            "el.focus(); el.value = (el.value || '') + {}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); return true;",
            serde_json::to_string(text)?
        );
        let _: bool = self.with_element(element, &body)?;
        Ok(())
    }

    fn css_value(&self, element: &ElementHandle, property: &str) -> ProofResult<String> {
        let body = format!(
            "return getComputedStyle(el).getPropertyValue({});",
            serde_json::to_string(property)?
        );
        self.with_element(element, &body)
    }

    fn execute_script(&mut self, script: &str) -> ProofResult<serde_json::Value> {
        let result = self
            .runtime
            .block_on(self.page.evaluate(script))
            .map_err(|e| ProofError::driver(format!("script failed: {e}")))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    fn screenshot(&mut self) -> ProofResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let screenshot = self
            .runtime
            .block_on(self.page.execute(params))
            .map_err(|e| ProofError::driver(format!("screenshot failed: {e}")))?;

        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| ProofError::driver(format!("screenshot data: {e}")))
    }

    fn set_window_size(&mut self, width: u32, height: u32) -> ProofResult<()> {
        let params =
            SetDeviceMetricsOverrideParams::new(i64::from(width), i64::from(height), 1.0, false);
        self.runtime
            .block_on(self.page.execute(params))
            .map_err(|e| ProofError::driver(format!("cannot resize viewport: {e}")))?;
        Ok(())
    }

    fn close(&mut self) -> ProofResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let result = self.runtime.block_on(self.browser.close());
        self.handler.abort();
        result.map_err(|e| ProofError::driver(format!("cannot close chromium: {e}")))?;
        tracing::info!("closed chromium");
        Ok(())
    }
}
