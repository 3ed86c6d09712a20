use crate::constants::operation_kinds;
use crate::core::types::BlockNum;
use crate::core::types::OperationKind;
use crate::core::types::Timestamp;
use crate::core::types::TransactionID;

/// Block data shared by all operations of a block, plus the owning transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub block_num: BlockNum,
    pub block_time: Timestamp,
    pub trx_id: TransactionID,
}

impl Context {
    pub fn new(block_num: BlockNum, block_time: Timestamp, trx_id: TransactionID) -> Self {
        Self {
            block_num,
            block_time,
            trx_id,
        }
    }

    /// Lifecycle stamp for a write produced by an operation of given `kind`.
    pub fn lifecycle(&self, kind: OperationKind) -> Lifecycle {
        Lifecycle {
            block_num: self.block_num,
            block_time: self.block_time,
            trx_id: self.trx_id.clone(),
            operation_type: kind,
        }
    }
}

/// When and by what a row was last written.
#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle {
    pub block_num: BlockNum,
    pub block_time: Timestamp,
    pub trx_id: TransactionID,
    pub operation_type: OperationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentCardRecord {
    pub content_card_id: String,
    pub subject_account: String,
    pub hash: String,
    pub url: String,
    pub content_type: String,
    pub description: String,
    pub content_key: String,
    pub storage_data: String,
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermissionRecord {
    pub permission_id: String,
    pub subject_account: String,
    pub operator_account: String,
    pub permission_type: String,
    /// Referenced object, empty when the grant targets none.
    pub object_id: String,
    pub content_key: String,
    pub lifecycle: Lifecycle,
}

/// Columns overwritten when a content card upsert hits an existing id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentCardConflict {
    /// Card attributes only (creates)
    MutableFields,
    /// Card attributes and lifecycle (updates)
    MutableFieldsAndLifecycle,
}

/// A single idempotent statement against the projected tables.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    UpsertContentCard {
        record: ContentCardRecord,
        on_conflict: ContentCardConflict,
    },
    /// Soft-delete, no-op if the card was never indexed.
    RemoveContentCard {
        content_card_id: String,
        lifecycle: Lifecycle,
    },
    /// Permission upserts only ever overwrite type and content key.
    UpsertPermission { record: PermissionRecord },
    /// Soft-delete, no-op if the permission was never indexed.
    RemovePermission {
        permission_id: String,
        lifecycle: Lifecycle,
    },
}

impl Write {
    /// Id of the row targeted by this write.
    pub fn entity_id(&self) -> &str {
        match self {
            Self::UpsertContentCard { record, .. } => &record.content_card_id,
            Self::RemoveContentCard {
                content_card_id, ..
            } => content_card_id,
            Self::UpsertPermission { record } => &record.permission_id,
            Self::RemovePermission { permission_id, .. } => permission_id,
        }
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        match self {
            Self::UpsertContentCard { record, .. } => &record.lifecycle,
            Self::RemoveContentCard { lifecycle, .. } => lifecycle,
            Self::UpsertPermission { record } => &record.lifecycle,
            Self::RemovePermission { lifecycle, .. } => lifecycle,
        }
    }

    /// Name of the operation that produced this write, for logs.
    pub fn label(&self) -> &'static str {
        operation_label(self.lifecycle().operation_type)
    }
}

pub fn operation_label(kind: OperationKind) -> &'static str {
    match kind {
        operation_kinds::CONTENT_CARD_CREATE => "content_card_create",
        operation_kinds::CONTENT_CARD_UPDATE => "content_card_update",
        operation_kinds::CONTENT_CARD_REMOVE => "content_card_remove",
        operation_kinds::PERMISSION_CREATE => "permission_create",
        operation_kinds::PERMISSION_CREATE_MANY => "permission_create_many",
        operation_kinds::PERMISSION_REMOVE => "permission_remove",
        _ => "unhandled",
    }
}
