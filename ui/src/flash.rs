use dioxus::prelude::*;

use crate::{error_message, force_logout, is_unauthorized};

/// How long a banner stays up.
pub const FLASH_MILLIS: u32 = 5_000;

#[derive(Debug, Clone, PartialEq)]
enum Message {
    Success(String),
    Error(String),
}

/// A success or error banner that clears itself after [`FLASH_MILLIS`].
#[derive(Clone, Copy, PartialEq)]
pub struct Flash {
    message: Signal<Option<Message>>,
    shown: Signal<u64>,
}

pub fn use_flash() -> Flash {
    Flash {
        message: use_signal(|| None),
        shown: use_signal(|| 0),
    }
}

impl Flash {
    pub fn success(&mut self, message: impl Into<String>) {
        self.show(Message::Success(message.into()));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(Message::Error(message.into()));
    }

    /// Show the backend's message, or `fallback`. A 401 signs the user out
    /// instead.
    pub fn server_error(&mut self, error: &ServerFnError, fallback: &str) {
        if is_unauthorized(error) {
            force_logout();
            return;
        }
        self.error(error_message(error, fallback));
    }

    pub fn clear(&mut self) {
        self.message.set(None);
    }

    fn show(&mut self, message: Message) {
        let shown = *self.shown.peek() + 1;
        self.shown.set(shown);
        self.message.set(Some(message));

        // Only the latest banner may clear itself.
        let mut flash = *self;
        spawn(async move {
            sleep(FLASH_MILLIS).await;
            if *flash.shown.peek() == shown {
                flash.clear();
            }
        });
    }
}

/// Resolve after `millis` on the browser's clock.
pub async fn sleep(millis: u32) {
    let mut timer = document::eval(&format!(
        "setTimeout(() => dioxus.send(null), {millis});"
    ));
    let _ = timer.recv::<()>().await;
}

#[component]
pub fn FlashBanner(flash: Flash) -> Element {
    let message = flash.message.read().clone();

    let (class, text) = match message {
        Some(Message::Success(text)) => ("banner banner-success", text),
        Some(Message::Error(text)) => ("banner banner-error", text),
        None => return rsx! {},
    };

    rsx! {
        div { class, role: "alert",
            span { class: "banner-message", "{text}" }
            button {
                class: "banner-close",
                onclick: move |_| {
                    let mut flash = flash;
                    flash.clear();
                },
                "×"
            }
        }
    }
}
