//! Virtual script runner — records every invocation.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use plughub_app::ports::{ScriptParams, ScriptRunner};
use plughub_domain::error::HubError;
use plughub_domain::id::ScriptId;

use crate::error::VirtualError;

/// A script invocation, as received.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub script: ScriptId,
    pub params: ScriptParams,
}

/// Accepts any script and remembers the calls.
#[derive(Debug, Default)]
pub struct VirtualScriptRunner {
    invocations: Mutex<Vec<Invocation>>,
    failing: Mutex<HashSet<ScriptId>>,
}

impl VirtualScriptRunner {
    /// Make `script` fail (or succeed again) on its next invocations.
    pub fn fail_script(&self, script: ScriptId, failing: bool) {
        let mut set = self.failing.lock().unwrap_or_else(PoisonError::into_inner);
        if failing {
            set.insert(script);
        } else {
            set.remove(&script);
        }
    }

    /// Every successful invocation, oldest first.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.lock_invocations().clone()
    }

    fn lock_invocations(&self) -> MutexGuard<'_, Vec<Invocation>> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScriptRunner for VirtualScriptRunner {
    async fn invoke(&self, script: &ScriptId, params: ScriptParams) -> Result<(), HubError> {
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(script);
        if failing {
            return Err(VirtualError::ScriptFailed(script.to_string()).into());
        }

        tracing::debug!(%script, ?params, "virtual script invoked");
        self.lock_invocations().push(Invocation {
            script: script.clone(),
            params,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn script() -> ScriptId {
        "script.fan_speed".parse().unwrap()
    }

    fn params(speed: &str) -> ScriptParams {
        let mut params = ScriptParams::new();
        params.insert("speed".to_string(), json!(speed));
        params
    }

    #[tokio::test]
    async fn should_record_invocations_in_order() {
        let runner = VirtualScriptRunner::default();

        runner.invoke(&script(), params("low")).await.unwrap();
        runner.invoke(&script(), params("high")).await.unwrap();

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 2);
        assert_eq!(invocations[0].params["speed"], "low");
        assert_eq!(invocations[1].params["speed"], "high");
    }

    #[tokio::test]
    async fn should_fail_marked_script_without_recording() {
        let runner = VirtualScriptRunner::default();
        runner.fail_script(script(), true);

        let result = runner.invoke(&script(), params("low")).await;

        assert!(matches!(result, Err(HubError::Unreachable(_))));
        assert!(runner.invocations().is_empty());

        runner.fail_script(script(), false);
        runner.invoke(&script(), params("low")).await.unwrap();
        assert_eq!(runner.invocations().len(), 1);
    }
}
