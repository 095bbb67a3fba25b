#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Success,
    Error,
    Warning,
    Info,
}

/// User-visible outcome channel. The engine reports what happened; how it is
/// surfaced (toast, terminal, nothing) is the collaborator's business.
pub trait Notifier {
    fn notify(&self, kind: NotifyKind, title: &str, detail: Option<&str>);
}

/// Swallows every notification. The default for tests and headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _kind: NotifyKind, _title: &str, _detail: Option<&str>) {}
}
