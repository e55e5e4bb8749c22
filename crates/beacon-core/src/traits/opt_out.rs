/// Third-party opt-out signal, consulted on every consent check and never
/// persisted.
pub trait IOptOut: Send + Sync {
    fn is_opted_out(&self) -> bool;
}

impl<F> IOptOut for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_opted_out(&self) -> bool {
        self()
    }
}

/// Used when the host installs no opt-out probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOptedOut;

impl IOptOut for NeverOptedOut {
    fn is_opted_out(&self) -> bool {
        false
    }
}
