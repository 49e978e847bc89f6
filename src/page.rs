use std::future::Future;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::Page as CrPage;
use chromiumoxide::page::ScreenshotParams;

use crate::element::Element;
use crate::error::{Error, Result};

/// Quote a string for safe embedding in evaluated JavaScript (and in CSS
/// attribute selectors, which accept the same double-quoted escapes).
fn js_string(value: &str) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::JsError(e.to_string()))
}

/// Wrapper around a chromiumoxide Page exposing the operations the fill
/// engine needs. Fill interactions dispatch `input`/`change` events so the
/// target form's client-side handlers fire as they would for a human.
pub struct Page {
    inner: CrPage,
    default_timeout: Duration,
}

impl Page {
    pub(crate) fn new(inner: CrPage, default_timeout: Duration) -> Self {
        Self {
            inner,
            default_timeout,
        }
    }

    /// Returns a reference to the underlying chromiumoxide Page.
    pub fn inner(&self) -> &CrPage {
        &self.inner
    }

    /// Navigate to the given URL and wait for the load to settle.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        self.inner
            .wait_for_navigation()
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(())
    }

    /// Get the current page URL.
    pub async fn url(&self) -> Result<String> {
        self.inner
            .url()
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?
            .ok_or_else(|| Error::NavigationError("No URL found".into()))
    }

    /// Find an element matching the given CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<Element> {
        let el = self
            .inner
            .find_element(selector)
            .await
            .map_err(|e| Error::ElementNotFound(e.to_string()))?;
        Ok(Element::new(el))
    }

    /// Wait for an element matching the given CSS selector to appear in the
    /// DOM. Polls every 100ms up to the configured default timeout.
    pub async fn wait_for_selector(&self, selector: &str) -> Result<Element> {
        let timeout = self.default_timeout;
        let interval = Duration::from_millis(100);
        let start = std::time::Instant::now();

        loop {
            match self.find_element(selector).await {
                Ok(el) => return Ok(el),
                Err(_) if start.elapsed() < timeout => {
                    tokio::time::sleep(interval).await;
                }
                Err(_) => {
                    return Err(Error::Timeout(format!(
                        "selector never appeared: {selector}"
                    )));
                }
            }
        }
    }

    /// Whether an element matching the selector currently exists in the DOM.
    pub async fn element_exists(&self, selector: &str) -> Result<bool> {
        let sel = js_string(selector)?;
        self.eval_value(format!("document.querySelector({sel}) !== null"))
            .await
    }

    /// Set the value of a text-like control (input, textarea) and fire the
    /// events the form's own handlers listen for.
    pub async fn fill_text(&self, selector: &str, value: &str) -> Result<()> {
        let sel = js_string(selector)?;
        let val = js_string(value)?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({sel});
                if (!el) throw new Error('Element not found: ' + {sel});
                el.focus();
                el.value = {val};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            }})()
            "#,
        );
        self.bounded(selector, self.eval_void(js)).await
    }

    /// Choose the option of a `<select>` whose value equals `value`.
    /// A value with no matching option is an error, never a silent no-op.
    pub async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        let sel = js_string(selector)?;
        let val = js_string(value)?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({sel});
                if (!el) throw new Error('Element not found: ' + {sel});
                const match = Array.from(el.options).find(o => o.value === {val});
                if (!match) throw new Error('No option with value ' + {val} + ' in ' + {sel});
                el.value = {val};
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            }})()
            "#,
        );
        self.bounded(selector, self.eval_void(js)).await
    }

    /// Drive a checkbox (or radio) to the desired checked state. Clicks the
    /// control so click handlers and visibility rules fire naturally.
    pub async fn set_checked(&self, selector: &str, checked: bool) -> Result<()> {
        let sel = js_string(selector)?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({sel});
                if (!el) throw new Error('Element not found: ' + {sel});
                if (el.checked !== {checked}) el.click();
            }})()
            "#,
        );
        self.bounded(selector, self.eval_void(js)).await
    }

    /// Within the radio group matched by `group_selector`, select the option
    /// whose value equals `value`. When no exact value match exists, falls
    /// back to an interactive click on the same composed selector.
    pub async fn pick_radio(&self, group_selector: &str, value: &str) -> Result<()> {
        let composed = format!("{group_selector}[value={}]", js_string(value)?);
        if self.element_exists(&composed).await? {
            self.set_checked(&composed, true).await
        } else {
            let el = self.find_element(&composed).await?;
            el.click().await
        }
    }

    /// Read back the current value of a control.
    pub async fn value_of(&self, selector: &str) -> Result<String> {
        let sel = js_string(selector)?;
        self.eval_value(format!(
            r#"
            (() => {{
                const el = document.querySelector({sel});
                if (!el) throw new Error('Element not found: ' + {sel});
                return el.value;
            }})()
            "#,
        ))
        .await
    }

    /// Read back the checked state of a checkbox or radio control.
    pub async fn is_checked(&self, selector: &str) -> Result<bool> {
        let sel = js_string(selector)?;
        self.eval_value(format!(
            r#"
            (() => {{
                const el = document.querySelector({sel});
                if (!el) throw new Error('Element not found: ' + {sel});
                return el.checked === true;
            }})()
            "#,
        ))
        .await
    }

    /// Take a full-page screenshot (PNG format).
    pub async fn screenshot_full_page(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.inner
            .screenshot(params)
            .await
            .map_err(|e| Error::ScreenshotError(e.to_string()))
    }

    async fn eval_void(&self, js: String) -> Result<()> {
        self.inner
            .evaluate(js)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(())
    }

    async fn eval_value<T: serde::de::DeserializeOwned>(&self, js: String) -> Result<T> {
        let result = self
            .inner
            .evaluate(js)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        result
            .into_value::<T>()
            .map_err(|e| Error::JsError(e.to_string()))
    }

    /// Bound an interaction by the default timeout so a wedged renderer
    /// downgrades to a per-field timeout instead of stalling the whole fill.
    async fn bounded<T>(&self, what: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.default_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(what.to_string())),
        }
    }
}
