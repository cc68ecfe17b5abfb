//! Panels living in the remote editor.

use parking_lot::Mutex;

use crate::core::Disposable;
use crate::host::{WebviewOptions, WebviewPanel};

type CloseListener = Box<dyn FnOnce() + Send>;

/// Server-side state of a panel the editor created for a document.
pub struct RemotePanel {
    document_id: u64,
    options: Mutex<WebviewOptions>,
    html: Mutex<String>,
    // `None` once the panel is closed.
    listeners: Mutex<Option<Vec<CloseListener>>>,
}

impl RemotePanel {
    pub fn new(document_id: u64) -> Self {
        Self {
            document_id,
            options: Mutex::new(WebviewOptions::default()),
            html: Mutex::new(String::new()),
            listeners: Mutex::new(Some(Vec::new())),
        }
    }

    pub fn document_id(&self) -> u64 {
        self.document_id
    }

    pub fn options(&self) -> WebviewOptions {
        *self.options.lock()
    }

    pub fn html(&self) -> String {
        self.html.lock().clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.listeners.lock().is_none()
    }
}

impl WebviewPanel for RemotePanel {
    fn set_options(&self, options: WebviewOptions) {
        *self.options.lock() = options;
    }

    fn set_html(&self, html: String) {
        *self.html.lock() = html;
    }

    fn on_did_dispose(&self, listener: CloseListener) {
        let mut listeners = self.listeners.lock();
        match listeners.as_mut() {
            Some(pending) => pending.push(listener),
            None => {
                drop(listeners);
                listener();
            }
        }
    }
}

impl Disposable for RemotePanel {
    fn dispose(&self) {
        let listeners = self.listeners.lock().take();
        for listener in listeners.into_iter().flatten() {
            listener();
        }
    }
}
