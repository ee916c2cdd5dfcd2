//! Virtual host error types.

use plughub_domain::error::HubError;

/// Simulated faults of the virtual host.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// The switch was marked unreachable with
    /// [`VirtualSwitchBank::set_unreachable`](crate::VirtualSwitchBank::set_unreachable).
    #[error("switch {0} is unreachable")]
    SwitchUnreachable(String),

    /// The script was marked failing with
    /// [`VirtualScriptRunner::fail_script`](crate::VirtualScriptRunner::fail_script).
    #[error("script {0} failed")]
    ScriptFailed(String),
}

impl VirtualError {
    /// Convert into a [`HubError::Unreachable`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> HubError {
        HubError::Unreachable(Box::new(self))
    }
}

impl From<VirtualError> for HubError {
    fn from(err: VirtualError) -> Self {
        err.into_domain()
    }
}
