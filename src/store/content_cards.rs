use super::Param;
use super::Statement;
use crate::projection::types::ContentCardConflict;
use crate::projection::types::ContentCardRecord;
use crate::projection::types::Lifecycle;

/// Creates keep the lifecycle of an existing card.
const UPSERT_MUTABLE_FIELDS: &str = "
    insert into content_cards (
        content_card_id
        , subject_account
        , hash
        , url
        , type
        , description
        , content_key
        , storage_data
        , block_num
        , block_time
        , trx_id
        , operation_type
        , is_removed
    )
    values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, false)
    on conflict (content_card_id) do update
    set hash = excluded.hash
        , url = excluded.url
        , type = excluded.type
        , description = excluded.description
        , content_key = excluded.content_key
        , storage_data = excluded.storage_data;";

/// Updates also refresh the lifecycle of an existing card.
const UPSERT_MUTABLE_FIELDS_AND_LIFECYCLE: &str = "
    insert into content_cards (
        content_card_id
        , subject_account
        , hash
        , url
        , type
        , description
        , content_key
        , storage_data
        , block_num
        , block_time
        , trx_id
        , operation_type
        , is_removed
    )
    values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, false)
    on conflict (content_card_id) do update
    set hash = excluded.hash
        , url = excluded.url
        , type = excluded.type
        , description = excluded.description
        , content_key = excluded.content_key
        , storage_data = excluded.storage_data
        , block_num = excluded.block_num
        , block_time = excluded.block_time
        , trx_id = excluded.trx_id
        , operation_type = excluded.operation_type;";

const REMOVE: &str = "
    update content_cards
    set is_removed = true
        , block_num = $2
        , block_time = $3
        , trx_id = $4
        , operation_type = $5
    where content_card_id = $1;";

pub(super) fn upsert(record: &ContentCardRecord, on_conflict: ContentCardConflict) -> Statement {
    tracing::trace!("upsert {} ({on_conflict:?})", record.content_card_id);
    let sql = match on_conflict {
        ContentCardConflict::MutableFields => UPSERT_MUTABLE_FIELDS,
        ContentCardConflict::MutableFieldsAndLifecycle => UPSERT_MUTABLE_FIELDS_AND_LIFECYCLE,
    };
    Statement {
        sql,
        params: vec![
            Param::text(&record.content_card_id),
            Param::text(&record.subject_account),
            Param::text(&record.hash),
            Param::text(&record.url),
            Param::text(&record.content_type),
            Param::text(&record.description),
            Param::text(&record.content_key),
            Param::text(&record.storage_data),
            Param::block_num(record.lifecycle.block_num),
            Param::block_time(record.lifecycle.block_time),
            Param::text(&record.lifecycle.trx_id),
            Param::SmallInt(record.lifecycle.operation_type),
        ],
    }
}

pub(super) fn remove(content_card_id: &str, lifecycle: &Lifecycle) -> Statement {
    tracing::trace!("remove {content_card_id}");
    Statement {
        sql: REMOVE,
        params: vec![
            Param::text(content_card_id),
            Param::block_num(lifecycle.block_num),
            Param::block_time(lifecycle.block_time),
            Param::text(&lifecycle.trx_id),
            Param::SmallInt(lifecycle.operation_type),
        ],
    }
}
