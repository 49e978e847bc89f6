//! Seam between the fill pipeline and a live page.

use async_trait::async_trait;

use crate::error::Result;
use crate::page::Page;

/// The pipeline's view of the page under automation.
///
/// Implemented by [`Page`] for real Chrome sessions; tests script the trait
/// directly to exercise the pipeline without a browser.
#[async_trait]
pub trait FormDriver: Send + Sync {
    /// Whether the selector currently matches an element in the DOM.
    async fn element_exists(&self, selector: &str) -> Result<bool>;

    /// Set a text-like control's value.
    async fn fill_text(&self, selector: &str, value: &str) -> Result<()>;

    /// Choose the option of a select whose value equals `value`; error if
    /// no option matches.
    async fn select_option(&self, selector: &str, value: &str) -> Result<()>;

    /// Drive a checkbox to the desired checked state.
    async fn set_checked(&self, selector: &str, checked: bool) -> Result<()>;

    /// Select the radio in `group_selector` whose value equals `value`.
    async fn pick_radio(&self, group_selector: &str, value: &str) -> Result<()>;

    /// The page's current location, for the submission guard.
    async fn current_url(&self) -> Result<String>;

    /// Full-page image snapshot of the current DOM state.
    async fn screenshot(&self) -> Result<Vec<u8>>;
}

#[async_trait]
impl FormDriver for Page {
    async fn element_exists(&self, selector: &str) -> Result<bool> {
        Page::element_exists(self, selector).await
    }

    async fn fill_text(&self, selector: &str, value: &str) -> Result<()> {
        Page::fill_text(self, selector, value).await
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        Page::select_option(self, selector, value).await
    }

    async fn set_checked(&self, selector: &str, checked: bool) -> Result<()> {
        Page::set_checked(self, selector, checked).await
    }

    async fn pick_radio(&self, group_selector: &str, value: &str) -> Result<()> {
        Page::pick_radio(self, group_selector, value).await
    }

    async fn current_url(&self) -> Result<String> {
        self.url().await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.screenshot_full_page().await
    }
}
