use std::sync::Arc;

use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{BrowserContextId, CloseParams};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::page::Page;

/// Chrome flags applied to the shared browser process. The dev-shm and
/// sandbox flags keep Chrome alive inside containers.
const LAUNCH_ARGS: &[&str] = &[
    "disable-gpu",
    "disable-dev-shm-usage",
    "disable-setuid-sandbox",
    "disable-extensions",
    "mute-audio",
    "no-default-browser-check",
    "disable-client-side-phishing-detection",
    "disable-popup-blocking",
    "disable-prompt-on-repost",
];

struct SharedBrowser {
    browser: CrBrowser,
    handler_task: tokio::task::JoinHandle<()>,
}

/// Owns one long-lived browser process and hands out isolated execution
/// contexts per fill request.
///
/// The browser is launched lazily on the first [`acquire`](Self::acquire);
/// concurrent first callers serialize on an async lock instead of racing to
/// start two processes. [`release`](Self::release) disposes only the
/// request's context; the browser keeps running until
/// [`shutdown`](Self::shutdown), after which a later `acquire` transparently
/// re-initializes.
pub struct SessionManager {
    config: SessionConfig,
    shared: Mutex<Option<Arc<SharedBrowser>>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            shared: Mutex::new(None),
        }
    }

    /// Acquire a freshly created, isolated execution context bound to the
    /// shared browser process, with a blank page ready for navigation.
    pub async fn acquire(&self) -> Result<Session> {
        let shared = {
            let mut slot = self.shared.lock().await;
            if slot.is_none() {
                *slot = Some(Arc::new(Self::launch(&self.config).await?));
            }
            match slot.as_ref() {
                Some(shared) => Arc::clone(shared),
                None => return Err(Error::LaunchError("browser slot empty after init".into())),
            }
        };

        // Context creation happens outside the lock; only first-time browser
        // startup needs serializing.
        let context_id = shared
            .browser
            .execute(CreateBrowserContextParams::default())
            .await?
            .result
            .browser_context_id;

        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(Error::LaunchError)?;

        let cr_page = match shared.browser.new_page(params).await {
            Ok(page) => page,
            Err(e) => {
                // Don't leave an orphaned context behind the failed page.
                let _ = shared
                    .browser
                    .execute(DisposeBrowserContextParams::new(context_id))
                    .await;
                return Err(Error::LaunchError(e.to_string()));
            }
        };

        debug!(context = ?context_id, "acquired isolated browser context");
        Ok(Session {
            page: Page::new(cr_page, self.config.default_timeout),
            context_id,
            shared,
            released: false,
        })
    }

    /// Tear down the session's execution context, leaving the shared browser
    /// process running for future requests.
    pub async fn release(&self, mut session: Session) -> Result<()> {
        session.released = true;
        let shared = Arc::clone(&session.shared);
        let context_id = session.context_id.clone();
        drop(session);

        debug!(context = ?context_id, "releasing browser context");
        shared
            .browser
            .execute(DisposeBrowserContextParams::new(context_id))
            .await?;
        Ok(())
    }

    /// Close the browser process and clear initialization state. A later
    /// `acquire` re-launches from scratch.
    pub async fn shutdown(&self) {
        let Some(shared) = self.shared.lock().await.take() else {
            return;
        };
        info!("shutting down shared browser");
        match Arc::try_unwrap(shared) {
            Ok(mut owned) => {
                if let Err(e) = owned.browser.close().await {
                    warn!(error = %e, "browser close failed");
                }
                owned.handler_task.abort();
            }
            Err(shared) => {
                // Sessions are still outstanding; ask the process to exit
                // over CDP and let their contexts die with it.
                if let Err(e) = shared.browser.execute(CloseParams::default()).await {
                    debug!(error = %e, "browser close command failed during shutdown");
                }
                shared.handler_task.abort();
            }
        }
    }

    async fn launch(config: &SessionConfig) -> Result<SharedBrowser> {
        info!(headless = config.headless, "launching shared browser");

        let mut builder = CrBrowserConfig::builder();
        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        for arg in LAUNCH_ARGS {
            builder = builder.arg(*arg);
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder = builder.viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: false,
            has_touch: false,
        });

        let cr_config = builder
            .build()
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let (browser, mut handler) = CrBrowser::launch(cr_config)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        info!("shared browser ready");
        Ok(SharedBrowser {
            browser,
            handler_task,
        })
    }
}

/// An isolated execution context (independent cookies, storage, cache) with
/// one open page, sharing the browser process with other sessions.
pub struct Session {
    page: Page,
    context_id: BrowserContextId,
    shared: Arc<SharedBrowser>,
    released: bool,
}

impl Session {
    pub fn page(&self) -> &Page {
        &self.page
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // Best-effort cleanup when the owning future was dropped (caller
        // deadline, panic) before an explicit release.
        let shared = Arc::clone(&self.shared);
        let context_id = self.context_id.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = shared
                    .browser
                    .execute(DisposeBrowserContextParams::new(context_id))
                    .await;
            });
        } else {
            warn!(context = ?context_id, "browser context leaked: no runtime for cleanup");
        }
    }
}
