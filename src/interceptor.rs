//! Interceptor Registry
//!
//! Three ordered lists of transforms applied at fixed points of the pipeline:
//! outgoing payloads, incoming fragments, and terminal errors. Each list is
//! folded left to right, so registering `f` then `g` yields `g(f(x))`; an
//! empty list is the identity. Lists are append-only.
//!
//! Readers take a snapshot of the list under a read lock and run the
//! transforms without holding it, so an interceptor may register further
//! interceptors without deadlocking (they apply from the next call on).

use std::sync::{Arc, OnceLock, RwLock};

use crate::error::EnhanceError;
use crate::prompt::ComposedPayload;

/// A registered transform.
pub type Interceptor<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

struct Chain<T> {
    interceptors: RwLock<Vec<Interceptor<T>>>,
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self {
            interceptors: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Chain<T> {
    fn push(&self, interceptor: Interceptor<T>) {
        self.interceptors
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(interceptor);
    }

    fn snapshot(&self) -> Vec<Interceptor<T>> {
        self.interceptors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn len(&self) -> usize {
        self.interceptors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn apply(&self, value: T) -> T {
        self.snapshot().iter().fold(value, |acc, f| f(acc))
    }
}

/// Registry of request, response and error interceptors.
#[derive(Default)]
pub struct InterceptorRegistry {
    requests: Chain<ComposedPayload>,
    responses: Chain<String>,
    errors: Chain<EnhanceError>,
}

static GLOBAL_REGISTRY: OnceLock<Arc<InterceptorRegistry>> = OnceLock::new();

impl InterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created on first use and never torn down.
    pub fn global() -> Arc<InterceptorRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(InterceptorRegistry::new()))
            .clone()
    }

    /// Registry preloaded with tracing-only identity hooks.
    pub fn with_logging() -> Self {
        let registry = Self::new();
        registry.add_request_interceptor(|payload: ComposedPayload| {
            tracing::debug!(
                target: "devprompt::interceptor",
                model = %payload.model,
                contents_len = payload.contents.len(),
                "outgoing request"
            );
            payload
        });
        registry.add_response_interceptor(|fragment: String| {
            tracing::trace!(target: "devprompt::interceptor", len = fragment.len(), "fragment");
            fragment
        });
        registry.add_error_interceptor(|error: EnhanceError| {
            tracing::debug!(target: "devprompt::interceptor", kind = %error.kind(), err = %error, "request failed");
            error
        });
        registry
    }

    pub fn add_request_interceptor<F>(&self, f: F)
    where
        F: Fn(ComposedPayload) -> ComposedPayload + Send + Sync + 'static,
    {
        self.requests.push(Arc::new(f));
    }

    pub fn add_response_interceptor<F>(&self, f: F)
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.responses.push(Arc::new(f));
    }

    pub fn add_error_interceptor<F>(&self, f: F)
    where
        F: Fn(EnhanceError) -> EnhanceError + Send + Sync + 'static,
    {
        self.errors.push(Arc::new(f));
    }

    pub fn apply_request(&self, payload: ComposedPayload) -> ComposedPayload {
        self.requests.apply(payload)
    }

    pub fn apply_response(&self, fragment: String) -> String {
        self.responses.apply(fragment)
    }

    pub fn apply_error(&self, error: EnhanceError) -> EnhanceError {
        self.errors.apply(error)
    }

    /// Number of registered (request, response, error) interceptors.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.requests.len(), self.responses.len(), self.errors.len())
    }
}

impl std::fmt::Debug for InterceptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (requests, responses, errors) = self.counts();
        f.debug_struct("InterceptorRegistry")
            .field("requests", &requests)
            .field("responses", &responses)
            .field("errors", &errors)
            .finish()
    }
}

/// Register a request interceptor on the global registry.
pub fn add_request_interceptor<F>(f: F)
where
    F: Fn(ComposedPayload) -> ComposedPayload + Send + Sync + 'static,
{
    InterceptorRegistry::global().add_request_interceptor(f);
}

/// Register a response interceptor on the global registry.
pub fn add_response_interceptor<F>(f: F)
where
    F: Fn(String) -> String + Send + Sync + 'static,
{
    InterceptorRegistry::global().add_response_interceptor(f);
}

/// Register an error interceptor on the global registry.
pub fn add_error_interceptor<F>(f: F)
where
    F: Fn(EnhanceError) -> EnhanceError + Send + Sync + 'static,
{
    InterceptorRegistry::global().add_error_interceptor(f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{EnhancementOptions, assemble};

    #[test]
    fn empty_registry_is_identity() {
        let registry = InterceptorRegistry::new();
        let payload = assemble("idea", &EnhancementOptions::default());
        assert_eq!(registry.apply_request(payload.clone()), payload);
        assert_eq!(registry.apply_response("a".into()), "a");
        assert_eq!(
            registry.apply_error(EnhanceError::Cancelled),
            EnhanceError::Cancelled
        );
    }

    #[test]
    fn response_interceptors_fold_left_to_right() {
        let registry = InterceptorRegistry::new();
        registry.add_response_interceptor(|s| format!("{s}-f"));
        registry.add_response_interceptor(|s| format!("{s}-g"));
        registry.add_response_interceptor(|s| s.to_uppercase());
        assert_eq!(registry.apply_response("x".into()), "X-F-G");
    }

    #[test]
    fn error_interceptors_can_replace_errors() {
        let registry = InterceptorRegistry::new();
        registry.add_error_interceptor(|e| match e {
            EnhanceError::StreamError(_) => EnhanceError::transport(503, "mapped"),
            other => other,
        });
        let out = registry.apply_error(EnhanceError::StreamError("x".into()));
        assert_eq!(out.status_code(), Some(503));
    }

    #[test]
    fn interceptor_may_register_during_apply() {
        let registry = Arc::new(InterceptorRegistry::new());
        let inner = registry.clone();
        registry.add_response_interceptor(move |s| {
            inner.add_response_interceptor(|s| s);
            s
        });
        assert_eq!(registry.apply_response("ok".into()), "ok");
        assert_eq!(registry.counts().1, 2);
    }

    #[test]
    fn global_registry_is_shared() {
        let a = InterceptorRegistry::global();
        let b = InterceptorRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
