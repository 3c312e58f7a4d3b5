/// Fire-and-forget change delivery. The core announces status-relevant
/// mutations and moves on; nothing here may fail the calling operation.
pub trait ChangeNotifier: Send + Sync {
    fn notify(&self, entity: &'static str, id: &str);
}

/// Default sink: the change feed is an external collaborator, so in this
/// core a debug line is all delivery means.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl ChangeNotifier for LogNotifier {
    fn notify(&self, entity: &'static str, id: &str) {
        log::debug!("change: {} {}", entity, id);
    }
}
