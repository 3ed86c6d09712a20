use itertools::EitherOrBoth;
use itertools::Itertools;

use super::types::ContentCardConflict;
use super::types::ContentCardRecord;
use super::types::Context;
use super::types::PermissionRecord;
use super::types::Write;
use crate::constants::operation_kinds;
use crate::constants::PENDING_PREFIX;
use crate::core::types::ContentCardCreate;
use crate::core::types::ContentCardRemove;
use crate::core::types::ContentCardUpdate;
use crate::core::types::ObjectID;
use crate::core::types::OperationKind;
use crate::core::types::PermissionCreate;
use crate::core::types::PermissionCreateMany;
use crate::core::types::PermissionItem;
use crate::core::types::PermissionRemove;

/// Placeholder id for an object created by transaction `trx_id`.
pub fn placeholder(trx_id: &str) -> String {
    format!("{PENDING_PREFIX}-{trx_id}")
}

/// Placeholder id for the `index`-th object of a bulk create.
pub fn indexed_placeholder(trx_id: &str, index: usize) -> String {
    format!("{PENDING_PREFIX}-{trx_id}-{index}")
}

/// First resolved id, or the transaction's placeholder.
fn created_id(new_ids: &[ObjectID], ctx: &Context) -> String {
    new_ids
        .first()
        .map_or_else(|| placeholder(&ctx.trx_id), |id| id.to_string())
}

pub(super) fn content_card_create(
    op: &ContentCardCreate,
    ctx: &Context,
    new_ids: &[ObjectID],
) -> Write {
    Write::UpsertContentCard {
        record: content_card_record(
            op,
            ctx,
            new_ids,
            operation_kinds::CONTENT_CARD_CREATE,
        ),
        on_conflict: ContentCardConflict::MutableFields,
    }
}

pub(super) fn content_card_update(
    op: &ContentCardUpdate,
    ctx: &Context,
    new_ids: &[ObjectID],
) -> Write {
    Write::UpsertContentCard {
        record: content_card_record(
            op,
            ctx,
            new_ids,
            operation_kinds::CONTENT_CARD_UPDATE,
        ),
        on_conflict: ContentCardConflict::MutableFieldsAndLifecycle,
    }
}

fn content_card_record(
    op: &ContentCardCreate,
    ctx: &Context,
    new_ids: &[ObjectID],
    kind: OperationKind,
) -> ContentCardRecord {
    ContentCardRecord {
        content_card_id: created_id(new_ids, ctx),
        subject_account: op.subject_account.to_string(),
        hash: op.hash.clone(),
        url: op.url.clone(),
        content_type: op.content_type.clone(),
        description: op.description.clone(),
        content_key: op.content_key.clone(),
        storage_data: op.storage_data.clone(),
        lifecycle: ctx.lifecycle(kind),
    }
}

pub(super) fn content_card_remove(op: &ContentCardRemove, ctx: &Context) -> Write {
    Write::RemoveContentCard {
        content_card_id: op.content_id.to_string(),
        lifecycle: ctx.lifecycle(operation_kinds::CONTENT_CARD_REMOVE),
    }
}

pub(super) fn permission_create(
    op: &PermissionCreate,
    ctx: &Context,
    new_ids: &[ObjectID],
) -> Write {
    Write::UpsertPermission {
        record: PermissionRecord {
            permission_id: created_id(new_ids, ctx),
            subject_account: op.subject_account.to_string(),
            operator_account: op.operator_account.to_string(),
            permission_type: op.permission_type.clone(),
            object_id: render_optional(&op.object_id),
            content_key: op.content_key.clone(),
            lifecycle: ctx.lifecycle(operation_kinds::PERMISSION_CREATE),
        },
    }
}

/// One upsert per grant, in array order.
///
/// Grants are paired positionally with the resolved ids, which come in
/// ascending id order. Grants left over once ids run out get indexed
/// placeholders.
pub(super) fn permission_create_many(
    op: &PermissionCreateMany,
    ctx: &Context,
    new_ids: &[ObjectID],
) -> Vec<Write> {
    let subject_account = op.subject_account.to_string();
    op.permissions
        .iter()
        .zip_longest(new_ids)
        .enumerate()
        .filter_map(|(index, pair)| match pair {
            EitherOrBoth::Both(item, id) => Some((item, id.to_string())),
            EitherOrBoth::Left(item) => Some((item, indexed_placeholder(&ctx.trx_id, index))),
            EitherOrBoth::Right(_) => None,
        })
        .map(|(item, permission_id)| Write::UpsertPermission {
            record: permission_item_record(item, &subject_account, permission_id, ctx),
        })
        .collect()
}

fn permission_item_record(
    item: &PermissionItem,
    subject_account: &str,
    permission_id: String,
    ctx: &Context,
) -> PermissionRecord {
    PermissionRecord {
        permission_id,
        subject_account: subject_account.to_owned(),
        operator_account: item.operator_account.to_string(),
        permission_type: item.permission_type.clone(),
        object_id: render_optional(&item.object_id),
        content_key: item.content_key.clone(),
        lifecycle: ctx.lifecycle(operation_kinds::PERMISSION_CREATE_MANY),
    }
}

pub(super) fn permission_remove(op: &PermissionRemove, ctx: &Context) -> Write {
    Write::RemovePermission {
        permission_id: op.permission_id.to_string(),
        lifecycle: ctx.lifecycle(operation_kinds::PERMISSION_REMOVE),
    }
}

fn render_optional(id: &Option<ObjectID>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::testutils::oid;
    use pretty_assertions::assert_eq;

    fn ctx() -> Context {
        Context::new(100, 1_700_000_000, "f00d".to_owned())
    }

    #[test]
    fn content_card_create_uses_resolved_id() {
        let op = ContentCardCreate::dummy();
        let write = content_card_create(&op, &ctx(), &[oid("1.7.3")]);
        match write {
            Write::UpsertContentCard {
                record,
                on_conflict,
            } => {
                assert_eq!(record.content_card_id, "1.7.3");
                assert_eq!(record.subject_account, "1.2.5");
                assert_eq!(record.hash, "abcd");
                assert_eq!(record.lifecycle, ctx().lifecycle(41));
                assert_eq!(on_conflict, ContentCardConflict::MutableFields);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn content_card_create_falls_back_to_placeholder() {
        let op = ContentCardCreate::dummy();
        let write = content_card_create(&op, &ctx(), &[]);
        assert_eq!(write.entity_id(), "pending-f00d");
    }

    #[test]
    fn content_card_update_overwrites_lifecycle() {
        let op = ContentCardCreate::dummy();
        let write = content_card_update(&op, &ctx(), &[oid("1.7.3")]);
        match write {
            Write::UpsertContentCard {
                record,
                on_conflict,
            } => {
                assert_eq!(record.lifecycle.operation_type, 42);
                assert_eq!(on_conflict, ContentCardConflict::MutableFieldsAndLifecycle);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn content_card_remove_targets_content_id() {
        let op = ContentCardRemove {
            subject_account: oid("1.2.5"),
            content_id: oid("1.7.3"),
        };
        let write = content_card_remove(&op, &ctx());
        assert_eq!(
            write,
            Write::RemoveContentCard {
                content_card_id: "1.7.3".to_owned(),
                lifecycle: ctx().lifecycle(43),
            }
        );
    }

    #[test]
    fn permission_create_without_object_id() {
        let mut op = PermissionCreate::dummy();
        op.object_id = None;
        match permission_create(&op, &ctx(), &[]) {
            Write::UpsertPermission { record } => {
                assert_eq!(record.permission_id, "pending-f00d");
                assert_eq!(record.object_id, "");
                assert_eq!(record.operator_account, "1.2.9");
                assert_eq!(record.lifecycle.operation_type, 44);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn permission_create_many_pairs_ids_positionally() {
        let op = PermissionCreateMany {
            subject_account: oid("1.2.5"),
            permissions: vec![
                PermissionItem::dummy().operator("1.2.10"),
                PermissionItem::dummy().operator("1.2.11"),
                PermissionItem::dummy().operator("1.2.12"),
                PermissionItem::dummy().operator("1.2.13"),
            ],
        };
        let writes = permission_create_many(&op, &ctx(), &[oid("1.8.4"), oid("1.8.5")]);
        let ids: Vec<&str> = writes.iter().map(|w| w.entity_id()).collect();
        assert_eq!(ids, vec!["1.8.4", "1.8.5", "pending-f00d-2", "pending-f00d-3"]);
        match &writes[3] {
            Write::UpsertPermission { record } => {
                assert_eq!(record.operator_account, "1.2.13");
                assert_eq!(record.subject_account, "1.2.5");
                assert_eq!(record.lifecycle.operation_type, 64);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn permission_create_many_ignores_surplus_ids() {
        let op = PermissionCreateMany {
            subject_account: oid("1.2.5"),
            permissions: vec![PermissionItem::dummy()],
        };
        let writes = permission_create_many(&op, &ctx(), &[oid("1.8.4"), oid("1.8.5")]);
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].entity_id(), "1.8.4");
    }

    #[test]
    fn permission_create_many_empty() {
        let op = PermissionCreateMany {
            subject_account: oid("1.2.5"),
            permissions: vec![],
        };
        assert!(permission_create_many(&op, &ctx(), &[oid("1.8.4")]).is_empty());
    }

    #[test]
    fn permission_remove_targets_permission_id() {
        let op = PermissionRemove {
            subject_account: oid("1.2.5"),
            permission_id: oid("1.8.4"),
        };
        let write = permission_remove(&op, &ctx());
        assert_eq!(write.entity_id(), "1.8.4");
        assert_eq!(write.label(), "permission_remove");
    }
}
