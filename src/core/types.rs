use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::constants::operation_kinds;
use crate::constants::result_kinds;

pub type BlockNum = u32;
pub type OperationKind = i16;
/// Seconds since unix epoch
pub type Timestamp = u32;
pub type TransactionID = String;

/// Chain object identifier, `space.type.instance`.
///
/// Ordering follows (space, type, instance), as in the chain's own id sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct ObjectID {
    pub space: u8,
    pub type_id: u8,
    pub instance: u64,
}

impl ObjectID {
    pub fn new(space: u8, type_id: u8, instance: u64) -> Self {
        Self {
            space,
            type_id,
            instance,
        }
    }
}

impl fmt::Display for ObjectID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.space, self.type_id, self.instance)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("invalid object id {0:?}")]
pub struct ParseObjectIDError(pub String);

impl FromStr for ObjectID {
    type Err = ParseObjectIDError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseObjectIDError(s.to_owned());
        let mut parts = s.split('.');
        let (Some(space), Some(type_id), Some(instance), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        Ok(Self {
            space: space.parse().map_err(|_| err())?,
            type_id: type_id.parse().map_err(|_| err())?,
            instance: instance.parse().map_err(|_| err())?,
        })
    }
}

impl TryFrom<String> for ObjectID {
    type Error = ParseObjectIDError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A finalized block, as delivered by the "block applied" event.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub number: BlockNum,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Returns id of transaction at position `trx_in_block`.
    ///
    /// Out of range positions (virtual operations) give an empty id.
    pub fn transaction_id(&self, trx_in_block: u32) -> TransactionID {
        self.transactions
            .get(trx_in_block as usize)
            .map(|trx| trx.id.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub id: TransactionID,
}

/// An operation applied by the execution engine, paired with its result.
#[derive(Debug, Clone, Deserialize)]
pub struct AppliedOperation {
    pub op: Operation,
    pub result: OperationResult,
    pub trx_in_block: u32,
}

/// A block along with the engine's ordered applied operations.
///
/// Void entries are kept in place, the projector skips them.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockEvent {
    pub block: Block,
    #[serde(default)]
    pub applied_operations: Vec<Option<AppliedOperation>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawOperation")]
pub enum Operation {
    ContentCardCreate(ContentCardCreate),
    ContentCardUpdate(ContentCardUpdate),
    ContentCardRemove(ContentCardRemove),
    PermissionCreate(PermissionCreate),
    PermissionCreateMany(PermissionCreateMany),
    PermissionRemove(PermissionRemove),
    /// Any operation kind not projected here.
    Unhandled(OperationKind),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::ContentCardCreate(_) => operation_kinds::CONTENT_CARD_CREATE,
            Self::ContentCardUpdate(_) => operation_kinds::CONTENT_CARD_UPDATE,
            Self::ContentCardRemove(_) => operation_kinds::CONTENT_CARD_REMOVE,
            Self::PermissionCreate(_) => operation_kinds::PERMISSION_CREATE,
            Self::PermissionCreateMany(_) => operation_kinds::PERMISSION_CREATE_MANY,
            Self::PermissionRemove(_) => operation_kinds::PERMISSION_REMOVE,
            Self::Unhandled(kind) => *kind,
        }
    }
}

/// Chain wire form of an operation: `[kind, payload]`.
#[derive(Deserialize)]
struct RawOperation(OperationKind, serde_json::Value);

impl TryFrom<RawOperation> for Operation {
    type Error = serde_json::Error;

    fn try_from(raw: RawOperation) -> Result<Self, Self::Error> {
        let RawOperation(kind, payload) = raw;
        let op = match kind {
            operation_kinds::CONTENT_CARD_CREATE => {
                Self::ContentCardCreate(serde_json::from_value(payload)?)
            }
            operation_kinds::CONTENT_CARD_UPDATE => {
                Self::ContentCardUpdate(serde_json::from_value(payload)?)
            }
            operation_kinds::CONTENT_CARD_REMOVE => {
                Self::ContentCardRemove(serde_json::from_value(payload)?)
            }
            operation_kinds::PERMISSION_CREATE => {
                Self::PermissionCreate(serde_json::from_value(payload)?)
            }
            operation_kinds::PERMISSION_CREATE_MANY => {
                Self::PermissionCreateMany(serde_json::from_value(payload)?)
            }
            operation_kinds::PERMISSION_REMOVE => {
                Self::PermissionRemove(serde_json::from_value(payload)?)
            }
            other => Self::Unhandled(other),
        };
        Ok(op)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentCardCreate {
    pub subject_account: ObjectID,
    pub hash: String,
    pub url: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub description: String,
    pub content_key: String,
    pub storage_data: String,
}

/// Updates carry the full card, same shape as a create.
pub type ContentCardUpdate = ContentCardCreate;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentCardRemove {
    pub subject_account: ObjectID,
    pub content_id: ObjectID,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PermissionCreate {
    pub subject_account: ObjectID,
    pub operator_account: ObjectID,
    pub permission_type: String,
    #[serde(default)]
    pub object_id: Option<ObjectID>,
    pub content_key: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PermissionCreateMany {
    pub subject_account: ObjectID,
    pub permissions: Vec<PermissionItem>,
}

/// Single grant of a bulk permission create.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PermissionItem {
    pub operator_account: ObjectID,
    pub permission_type: String,
    #[serde(default)]
    pub object_id: Option<ObjectID>,
    pub content_key: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PermissionRemove {
    pub subject_account: ObjectID,
    pub permission_id: ObjectID,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawOperationResult")]
pub enum OperationResult {
    Void,
    ObjectID(ObjectID),
    Asset(Asset),
    Generic(GenericResult),
    /// Result kind introduced after this indexer was written.
    Unhandled(u8),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Asset {
    pub amount: i64,
    pub asset_id: ObjectID,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GenericResult {
    #[serde(default)]
    pub new_objects: BTreeSet<ObjectID>,
    #[serde(default)]
    pub updated_objects: BTreeSet<ObjectID>,
    #[serde(default)]
    pub removed_objects: BTreeSet<ObjectID>,
}

/// Chain wire form of an operation result: `[kind, payload]`.
#[derive(Deserialize)]
struct RawOperationResult(u8, serde_json::Value);

impl TryFrom<RawOperationResult> for OperationResult {
    type Error = serde_json::Error;

    fn try_from(raw: RawOperationResult) -> Result<Self, Self::Error> {
        let RawOperationResult(kind, payload) = raw;
        let res = match kind {
            result_kinds::VOID => Self::Void,
            result_kinds::OBJECT_ID => Self::ObjectID(serde_json::from_value(payload)?),
            result_kinds::ASSET => Self::Asset(serde_json::from_value(payload)?),
            result_kinds::GENERIC => Self::Generic(serde_json::from_value(payload)?),
            other => Self::Unhandled(other),
        };
        Ok(res)
    }
}

#[cfg(feature = "test-utilities")]
pub mod testutils {
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    use super::*;

    /// Random 40-char hex string, shaped like a transaction id.
    pub fn random_trx_id() -> TransactionID {
        const HEX: &[u8] = b"0123456789abcdef";
        let mut rng = rand::thread_rng();
        (0..40)
            .map(|_| HEX[rng.gen_range(0..HEX.len())] as char)
            .collect()
    }

    /// Random alphanumeric string of given `len`.
    pub fn random_string(len: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }

    /// Shorthand for `ObjectID` literals in tests, panics on bad input.
    pub fn oid(s: &str) -> ObjectID {
        s.parse().unwrap()
    }

    impl Block {
        pub fn dummy() -> Self {
            Self {
                number: 1,
                timestamp: 1_700_000_000,
                transactions: vec![],
            }
        }

        /// Return clone with modified block number
        pub fn number(&self, number: BlockNum) -> Self {
            let mut new = self.clone();
            new.number = number;
            new
        }

        /// Return clone with modified timestamp
        pub fn timestamp(&self, timestamp: Timestamp) -> Self {
            let mut new = self.clone();
            new.timestamp = timestamp;
            new
        }

        /// Return clone with an extra transaction having given `id`
        pub fn add_transaction(&self, id: &str) -> Self {
            let mut new = self.clone();
            new.transactions.push(Transaction { id: id.to_owned() });
            new
        }

        /// Return clone with `n` extra transactions with random ids
        pub fn add_random_transactions(&self, n: usize) -> Self {
            let mut new = self.clone();
            for _ in 0..n {
                new.transactions.push(Transaction {
                    id: random_trx_id(),
                });
            }
            new
        }
    }

    impl AppliedOperation {
        pub fn new(op: Operation, result: OperationResult, trx_in_block: u32) -> Self {
            Self {
                op,
                result,
                trx_in_block,
            }
        }
    }

    impl OperationResult {
        pub fn new_objects(ids: &[&str]) -> Self {
            Self::Generic(GenericResult {
                new_objects: ids.iter().map(|s| oid(s)).collect(),
                ..Default::default()
            })
        }
    }

    impl ContentCardCreate {
        pub fn dummy() -> Self {
            Self {
                subject_account: oid("1.2.5"),
                hash: "abcd".to_owned(),
                url: "https://example.com/content/abcd".to_owned(),
                content_type: "image/png".to_owned(),
                description: "dummy content".to_owned(),
                content_key: random_string(32),
                storage_data: r#"{"storage":"ipfs"}"#.to_owned(),
            }
        }

        /// Return clone with modified hash
        pub fn hash(&self, hash: &str) -> Self {
            let mut new = self.clone();
            new.hash = hash.to_owned();
            new
        }

        /// Return clone with modified description
        pub fn description(&self, description: &str) -> Self {
            let mut new = self.clone();
            new.description = description.to_owned();
            new
        }
    }

    impl PermissionItem {
        pub fn dummy() -> Self {
            Self {
                operator_account: oid("1.2.9"),
                permission_type: "content_card".to_owned(),
                object_id: Some(oid("1.7.3")),
                content_key: random_string(32),
            }
        }

        /// Return clone with modified operator account
        pub fn operator(&self, operator: &str) -> Self {
            let mut new = self.clone();
            new.operator_account = oid(operator);
            new
        }
    }

    impl PermissionCreate {
        pub fn dummy() -> Self {
            let item = PermissionItem::dummy();
            Self {
                subject_account: oid("1.2.5"),
                operator_account: item.operator_account,
                permission_type: item.permission_type,
                object_id: item.object_id,
                content_key: item.content_key,
            }
        }
    }
}
