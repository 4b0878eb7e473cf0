use thiserror::Error;

/// Boxed error returned by host-supplied hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure raised while running the post-measuring hook.
///
/// Never surfaces to the caller of `measure()`; it is handed to the
/// configured error-recovery hook together with the class name.
#[derive(Debug, Error)]
pub enum Error {
    #[error("post-measuring hook failed: {source}")]
    Hook {
        #[source]
        source: BoxError,
    },

    #[error("post-measuring hook panicked: {message}")]
    HookPanicked { message: String },
}

impl Error {
    /// Build a `HookPanicked` from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self::HookPanicked { message }
    }
}
