mod handlers;
pub mod router;
pub mod types;

use crate::core::types::AppliedOperation;
use crate::core::types::Block;
use crate::core::types::BlockNum;
use crate::store::Sink;

pub use handlers::indexed_placeholder;
pub use handlers::placeholder;
pub use types::Write;

/// Outcome of projecting a block.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Summary {
    pub block_num: BlockNum,
    /// Writes executed successfully
    pub written: usize,
    /// Writes that failed and were skipped
    pub failed: usize,
    /// Operations of a kind that isn't projected
    pub skipped: usize,
}

impl Summary {
    fn new(block_num: BlockNum) -> Self {
        Self {
            block_num,
            ..Default::default()
        }
    }
}

/// Projects finalized blocks into a sink.
///
/// Operations are applied strictly in order, one write at a time. Failed
/// writes are logged and do not stop the block.
pub struct Projector<S: Sink> {
    sink: S,
    start_block: BlockNum,
}

impl<S: Sink> Projector<S> {
    pub fn new(sink: S, start_block: BlockNum) -> Self {
        tracing::debug!("projecting blocks from {start_block}");
        Self { sink, start_block }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Handle a "block applied" event.
    ///
    /// `applied` holds the block's applied operations in execution order.
    /// Void entries are skipped.
    pub async fn on_block(
        &mut self,
        block: &Block,
        applied: &[Option<AppliedOperation>],
    ) -> Summary {
        let mut summary = Summary::new(block.number);

        if !self.sink.is_connected() {
            return summary;
        }
        if block.number < self.start_block {
            tracing::trace!("skipping block {} (before start block)", block.number);
            return summary;
        }

        for applied_op in applied.iter().flatten() {
            let Some(writes) = router::route(block, applied_op) else {
                summary.skipped += 1;
                continue;
            };
            for write in &writes {
                match self.sink.execute(write).await {
                    Ok(_) => {
                        tracing::info!(
                            "indexed {} at block {}, id {}",
                            write.label(),
                            block.number,
                            write.entity_id()
                        );
                        summary.written += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            "failed to index {} at block {}, id {}: {e}",
                            write.label(),
                            block.number,
                            write.entity_id()
                        );
                        summary.failed += 1;
                    }
                }
            }
        }

        tracing::debug!("projected block {}: {summary:?}", block.number);
        summary
    }
}
