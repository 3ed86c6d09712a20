use crate::core::types::BlockNum;
use crate::core::types::OperationKind;

/// Default start block, index everything since genesis.
pub const GENESIS_BLOCK: BlockNum = 0;

/// Prefix of placeholder ids given to rows whose object id is not known yet.
pub const PENDING_PREFIX: &str = "pending";

/// Operation discriminants, as persisted in the `operation_type` columns.
///
/// These follow the chain's operation numbering and must never be renumbered:
/// indexed rows carry them.
pub mod operation_kinds {
    use super::OperationKind;

    pub const CONTENT_CARD_CREATE: OperationKind = 41;
    pub const CONTENT_CARD_UPDATE: OperationKind = 42;
    pub const CONTENT_CARD_REMOVE: OperationKind = 43;
    pub const PERMISSION_CREATE: OperationKind = 44;
    pub const PERMISSION_REMOVE: OperationKind = 45;
    pub const PERMISSION_CREATE_MANY: OperationKind = 64;
}

/// Operation result discriminants.
pub mod result_kinds {
    pub const VOID: u8 = 0;
    pub const OBJECT_ID: u8 = 1;
    pub const ASSET: u8 = 2;
    pub const GENERIC: u8 = 3;
}
