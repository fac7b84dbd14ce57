/// `0` on a completed run regardless of ranking outcome, `1` when the run
/// failed for a reason the operator can fix (a bad suite, a missing API
/// key), `2` for anything else.
pub const SUCCESS: i32 = 0;
pub const CONFIG_ERROR: i32 = 1;
pub const INTERNAL_ERROR: i32 = 2;

/// Whether a run failure should be reported as a configuration error
/// rather than an internal one, by walking the error's cause chain for a
/// known configuration-surface error type.
pub fn is_configuration_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.is::<agentuse_suite::SuiteLoadError>() || cause.is::<crate::provider_factory::ProviderFactoryError>()
    })
}
