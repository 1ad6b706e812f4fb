use crate::batch::{Batch, BatchReport};
use crate::error::HostError;
use crate::reconciler::NodeTree;
use crossbeam::channel::{self, Receiver, SendError, Sender, TryRecvError};
use tracing::{error, trace};

/// Hands batches to a [`Host`]. Can be cloned and sent to other threads.
#[derive(Debug, Clone)]
pub struct BatchSender(Sender<Batch>);

impl BatchSender {
    pub fn send(&self, batch: Batch) -> Result<(), HostError> {
        self.0.send(batch).map_err(|SendError(_)| HostError::Disconnected)
    }

    /// Decodes a batch from its JSON wire format and sends it.
    pub fn send_json(&self, json: &str) -> Result<(), HostError> {
        self.send(Batch::from_json(json)?)
    }
}

/// Connects a node tree to a batch transport.
pub struct Host {
    pub tree: NodeTree,
    batch_recv: Receiver<Batch>,
}

impl Host {
    /// Creates a new Host.
    ///
    /// Batches sent through the returned sender won’t be applied until you call `poll`.
    pub fn new(tree: NodeTree) -> (Host, BatchSender) {
        let (batch_sender, batch_recv) = channel::unbounded();
        (Host { tree, batch_recv }, BatchSender(batch_sender))
    }

    /// Applies all queued batches, in order.
    ///
    /// Stops at the first batch that fails; batches after it stay queued. Returns an error if
    /// every sender has been dropped and the queue is empty.
    pub fn poll(&mut self) -> Result<Vec<BatchReport>, HostError> {
        let mut reports = Vec::new();
        loop {
            match self.batch_recv.try_recv() {
                Ok(batch) => {
                    trace!(queued = self.batch_recv.len(), "applying queued batch");
                    match self.tree.apply_batch(batch) {
                        Ok(report) => reports.push(report),
                        Err(err) => {
                            error!(%err, "failed to apply batch");
                            return Err(err.into());
                        }
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) if reports.is_empty() => {
                    return Err(HostError::Disconnected)
                }
                Err(TryRecvError::Disconnected) => break,
            }
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::id::NodeId;
    use crate::registry::Registry;
    use std::thread;

    #[test]
    fn applies_batches_from_other_threads() {
        let tree = NodeTree::new(Config::default(), Registry::with_builtins());
        let (mut host, sender) = Host::new(tree);

        let remote = sender.clone();
        thread::spawn(move || {
            remote
                .send_json(r#"{ "updates": { "1": { "type": "Stack" } }, "newRootId": 1 }"#)
                .unwrap();
        })
        .join()
        .unwrap();
        sender
            .send_json(r#"{ "updates": { "2": { "type": "Text", "text": "hi" }, "1": { "children": [2] } } }"#)
            .unwrap();

        let reports = host.poll().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(host.tree.children(&"1".into()), [NodeId::from("2")]);

        assert!(matches!(sender.send_json("not json"), Err(HostError::Decode(_))));

        drop(sender);
        assert!(matches!(host.poll(), Err(HostError::Disconnected)));
    }

    #[test]
    fn stops_at_failing_batch() {
        let tree = NodeTree::new(Config::default(), Registry::with_builtins());
        let (mut host, sender) = Host::new(tree);
        sender
            .send_json(r#"{ "updates": { "1": { "type": "Marquee" } } }"#)
            .unwrap();
        sender
            .send_json(r#"{ "updates": { "1": { "type": "Stack" } }, "newRootId": 1 }"#)
            .unwrap();

        assert!(matches!(host.poll(), Err(HostError::Batch(_))));
        assert_eq!(host.poll().unwrap().len(), 1);
        assert!(host.tree.root().is_some());
    }
}
