use super::Param;
use super::Statement;
use crate::projection::types::Lifecycle;
use crate::projection::types::PermissionRecord;

/// Existing permissions only get their type and content key refreshed.
const UPSERT: &str = "
    insert into permissions (
        permission_id
        , subject_account
        , operator_account
        , permission_type
        , object_id
        , content_key
        , block_num
        , block_time
        , trx_id
        , operation_type
        , is_removed
    )
    values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, false)
    on conflict (permission_id) do update
    set permission_type = excluded.permission_type
        , content_key = excluded.content_key;";

const REMOVE: &str = "
    update permissions
    set is_removed = true
        , block_num = $2
        , block_time = $3
        , trx_id = $4
        , operation_type = $5
    where permission_id = $1;";

pub(super) fn upsert(record: &PermissionRecord) -> Statement {
    tracing::trace!("upsert {}", record.permission_id);
    Statement {
        sql: UPSERT,
        params: vec![
            Param::text(&record.permission_id),
            Param::text(&record.subject_account),
            Param::text(&record.operator_account),
            Param::text(&record.permission_type),
            Param::text(&record.object_id),
            Param::text(&record.content_key),
            Param::block_num(record.lifecycle.block_num),
            Param::block_time(record.lifecycle.block_time),
            Param::text(&record.lifecycle.trx_id),
            Param::SmallInt(record.lifecycle.operation_type),
        ],
    }
}

pub(super) fn remove(permission_id: &str, lifecycle: &Lifecycle) -> Statement {
    tracing::trace!("remove {permission_id}");
    Statement {
        sql: REMOVE,
        params: vec![
            Param::text(permission_id),
            Param::block_num(lifecycle.block_num),
            Param::block_time(lifecycle.block_time),
            Param::text(&lifecycle.trx_id),
            Param::SmallInt(lifecycle.operation_type),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_binds_every_placeholder() {
        let record = PermissionRecord {
            permission_id: "1.8.1".to_owned(),
            subject_account: "1.2.5".to_owned(),
            operator_account: "1.2.9".to_owned(),
            permission_type: "content_card".to_owned(),
            object_id: String::new(),
            content_key: "key".to_owned(),
            lifecycle: Lifecycle {
                block_num: 3,
                block_time: 0,
                trx_id: "ab".to_owned(),
                operation_type: 44,
            },
        };
        let statement = upsert(&record);
        assert_eq!(statement.params.len(), 10);
        assert!(statement.sql.contains("$10"));
        assert!(!statement.sql.contains("$11"));
        assert_eq!(statement.params[4], Param::text(""));
    }
}
