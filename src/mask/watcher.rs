use crate::mask::host::{Host, HostError, InsertionHandler, ObserverId};

const FRAME_NODE_NAME: &str = "IFRAME";

pub fn is_frame_node_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(FRAME_NODE_NAME)
}

/// Frames among `nodes`, in insertion order.
pub fn inserted_frames<H: Host>(host: &H, nodes: &[H::Node]) -> Vec<H::Frame> {
    nodes
        .iter()
        .filter(|node| is_frame_node_name(&host.node_name(node)))
        .filter_map(|node| host.node_as_frame(node))
        .collect()
}

/// Insertion observer that is started once and stopped once per activation.
#[derive(Debug, Default)]
pub struct MutationWatcher {
    observer: Option<ObserverId>,
}

impl MutationWatcher {
    pub fn is_running(&self) -> bool {
        self.observer.is_some()
    }

    pub fn start<H: Host>(
        &mut self,
        host: &H,
        handler: InsertionHandler<H::Node>,
    ) -> Result<(), HostError> {
        if self.observer.is_some() {
            tracing::debug!("mutation watcher already running");
            return Ok(());
        }
        self.observer = Some(host.observe_insertions(handler)?);
        Ok(())
    }

    pub fn stop<H: Host>(&mut self, host: &H) {
        if let Some(observer) = self.observer.take() {
            host.disconnect_observer(observer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::is_frame_node_name;

    #[test]
    fn frame_node_names_match_case_insensitively() {
        assert!(is_frame_node_name("IFRAME"));
        assert!(is_frame_node_name("iframe"));
        assert!(!is_frame_node_name("DIV"));
        assert!(!is_frame_node_name("FRAMESET"));
    }
}
