//! Script runner port — invoke host scripts with parameters.

use std::future::Future;

use plughub_domain::error::HubError;
use plughub_domain::id::ScriptId;

/// Named parameters passed to a script run (`{"speed": "low"}`).
pub type ScriptParams = serde_json::Map<String, serde_json::Value>;

/// Runs host-defined scripts.
pub trait ScriptRunner: Send + Sync {
    /// Run `script` with `params`, resolving once the host acknowledged the run.
    fn invoke(
        &self,
        script: &ScriptId,
        params: ScriptParams,
    ) -> impl Future<Output = Result<(), HubError>> + Send;
}

impl<T: ScriptRunner> ScriptRunner for std::sync::Arc<T> {
    fn invoke(
        &self,
        script: &ScriptId,
        params: ScriptParams,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).invoke(script, params)
    }
}
