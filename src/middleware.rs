use crate::context::RequestContext;
use crate::error::ValidationError;
use async_trait::async_trait;
use serde_json::Value;

/// Which lifecycle hooks a middleware actually needs.
///
/// Hosts must skip a phase reported as unbound instead of calling a no-op hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Phases {
    pub before: bool,
    pub after: bool,
}

impl Phases {
    pub fn is_empty(&self) -> bool {
        !self.before && !self.after
    }
}

/// Lifecycle contract between a host pipeline and a middleware.
///
/// `before` runs ahead of the handler and may rewrite the request context;
/// `after` runs only when the handler succeeded and observes its response.
/// A returned error is terminal for the invocation.
#[async_trait]
pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    fn phases(&self) -> Phases;

    async fn before(&self, _ctx: &mut RequestContext) -> Result<(), ValidationError> {
        Ok(())
    }

    async fn after(&self, _ctx: &RequestContext, _response: &Value) -> Result<(), ValidationError> {
        Ok(())
    }
}
