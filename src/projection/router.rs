use super::handlers;
use super::types::Context;
use super::types::Write;
use crate::core::results::new_object_ids;
use crate::core::types::AppliedOperation;
use crate::core::types::Block;
use crate::core::types::Operation;

/// Translate an applied operation into the writes projecting it.
///
/// Returns None for operation kinds that are not projected.
pub fn route(block: &Block, applied: &AppliedOperation) -> Option<Vec<Write>> {
    let ctx = Context::new(
        block.number,
        block.timestamp,
        block.transaction_id(applied.trx_in_block),
    );
    let new_ids = new_object_ids(&applied.result);

    let writes = match &applied.op {
        Operation::ContentCardCreate(op) => {
            vec![handlers::content_card_create(op, &ctx, &new_ids)]
        }
        Operation::ContentCardUpdate(op) => {
            vec![handlers::content_card_update(op, &ctx, &new_ids)]
        }
        Operation::ContentCardRemove(op) => vec![handlers::content_card_remove(op, &ctx)],
        Operation::PermissionCreate(op) => {
            vec![handlers::permission_create(op, &ctx, &new_ids)]
        }
        Operation::PermissionCreateMany(op) => {
            handlers::permission_create_many(op, &ctx, &new_ids)
        }
        Operation::PermissionRemove(op) => vec![handlers::permission_remove(op, &ctx)],
        Operation::Unhandled(kind) => {
            tracing::trace!("skipping operation kind {kind}");
            return None;
        }
    };
    Some(writes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::testutils::oid;
    use crate::core::types::ContentCardCreate;
    use crate::core::types::OperationResult;
    use crate::core::types::PermissionCreateMany;
    use crate::core::types::PermissionItem;

    #[test]
    fn resolves_transaction_id_by_position() {
        let block = Block::dummy()
            .number(12)
            .add_transaction("aaaa")
            .add_transaction("bbbb");
        let applied = AppliedOperation::new(
            Operation::ContentCardCreate(ContentCardCreate::dummy()),
            OperationResult::Void,
            1,
        );
        let writes = route(&block, &applied).unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].entity_id(), "pending-bbbb");
        assert_eq!(writes[0].lifecycle().trx_id, "bbbb");
        assert_eq!(writes[0].lifecycle().block_num, 12);
    }

    #[test]
    fn out_of_range_transaction_gives_empty_id() {
        let block = Block::dummy().add_transaction("aaaa");
        let applied = AppliedOperation::new(
            Operation::ContentCardCreate(ContentCardCreate::dummy()),
            OperationResult::Void,
            5,
        );
        let writes = route(&block, &applied).unwrap();
        assert_eq!(writes[0].lifecycle().trx_id, "");
        assert_eq!(writes[0].entity_id(), "pending-");
    }

    #[test]
    fn resolves_object_id_from_result() {
        let block = Block::dummy().add_transaction("aaaa");
        let applied = AppliedOperation::new(
            Operation::ContentCardCreate(ContentCardCreate::dummy()),
            OperationResult::ObjectID(oid("1.7.3")),
            0,
        );
        let writes = route(&block, &applied).unwrap();
        assert_eq!(writes[0].entity_id(), "1.7.3");
    }

    #[test]
    fn bulk_create_takes_generic_result_ids() {
        let block = Block::dummy().add_transaction("aaaa");
        let applied = AppliedOperation::new(
            Operation::PermissionCreateMany(PermissionCreateMany {
                subject_account: oid("1.2.5"),
                permissions: vec![PermissionItem::dummy(), PermissionItem::dummy()],
            }),
            OperationResult::new_objects(&["1.8.2", "1.8.1"]),
            0,
        );
        let writes = route(&block, &applied).unwrap();
        let ids: Vec<&str> = writes.iter().map(|w| w.entity_id()).collect();
        assert_eq!(ids, vec!["1.8.1", "1.8.2"]);
    }

    #[test]
    fn unhandled_kind_gives_nothing() {
        let block = Block::dummy().add_transaction("aaaa");
        let applied = AppliedOperation::new(Operation::Unhandled(0), OperationResult::Void, 0);
        assert!(route(&block, &applied).is_none());
    }
}
