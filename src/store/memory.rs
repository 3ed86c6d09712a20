use async_trait::async_trait;
use std::collections::BTreeMap;
use std::collections::HashSet;

use super::Sink;
use crate::projection::types::ContentCardConflict;
use crate::projection::types::ContentCardRecord;
use crate::projection::types::Lifecycle;
use crate::projection::types::PermissionRecord;
use crate::projection::Write;
use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct ContentCardRow {
    pub card: ContentCardRecord,
    pub is_removed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermissionRow {
    pub permission: PermissionRecord,
    pub is_removed: bool,
}

/// In-memory stand-in for the postgres tables.
///
/// Follows the same conflict rules as the sql statements. Writes targeting a
/// rejected id fail, to exercise failure handling.
#[derive(Debug)]
pub struct MemorySink {
    connected: bool,
    content_cards: BTreeMap<String, ContentCardRow>,
    permissions: BTreeMap<String, PermissionRow>,
    rejected: HashSet<String>,
    executed: usize,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            connected: true,
            content_cards: BTreeMap::new(),
            permissions: BTreeMap::new(),
            rejected: HashSet::new(),
            executed: 0,
        }
    }

    /// A sink without live connection.
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::new()
        }
    }

    /// Make any write to `entity_id` fail.
    pub fn reject(mut self, entity_id: &str) -> Self {
        self.rejected.insert(entity_id.to_owned());
        self
    }

    pub fn content_card(&self, id: &str) -> Option<&ContentCardRow> {
        self.content_cards.get(id)
    }

    pub fn content_cards(&self) -> Vec<&ContentCardRow> {
        self.content_cards.values().collect()
    }

    pub fn permission(&self, id: &str) -> Option<&PermissionRow> {
        self.permissions.get(id)
    }

    pub fn permissions(&self) -> Vec<&PermissionRow> {
        self.permissions.values().collect()
    }

    /// Number of writes executed, rejected ones excluded.
    pub fn executed(&self) -> usize {
        self.executed
    }

    fn upsert_content_card(
        &mut self,
        record: &ContentCardRecord,
        on_conflict: ContentCardConflict,
    ) -> u64 {
        match self.content_cards.get_mut(&record.content_card_id) {
            Some(row) => {
                let card = &mut row.card;
                card.hash = record.hash.clone();
                card.url = record.url.clone();
                card.content_type = record.content_type.clone();
                card.description = record.description.clone();
                card.content_key = record.content_key.clone();
                card.storage_data = record.storage_data.clone();
                if on_conflict == ContentCardConflict::MutableFieldsAndLifecycle {
                    card.lifecycle = record.lifecycle.clone();
                }
            }
            None => {
                self.content_cards.insert(
                    record.content_card_id.clone(),
                    ContentCardRow {
                        card: record.clone(),
                        is_removed: false,
                    },
                );
            }
        }
        1
    }

    fn remove_content_card(&mut self, id: &str, lifecycle: &Lifecycle) -> u64 {
        match self.content_cards.get_mut(id) {
            Some(row) => {
                row.is_removed = true;
                row.card.lifecycle = lifecycle.clone();
                1
            }
            None => 0,
        }
    }

    fn upsert_permission(&mut self, record: &PermissionRecord) -> u64 {
        match self.permissions.get_mut(&record.permission_id) {
            Some(row) => {
                row.permission.permission_type = record.permission_type.clone();
                row.permission.content_key = record.content_key.clone();
            }
            None => {
                self.permissions.insert(
                    record.permission_id.clone(),
                    PermissionRow {
                        permission: record.clone(),
                        is_removed: false,
                    },
                );
            }
        }
        1
    }

    fn remove_permission(&mut self, id: &str, lifecycle: &Lifecycle) -> u64 {
        match self.permissions.get_mut(id) {
            Some(row) => {
                row.is_removed = true;
                row.permission.lifecycle = lifecycle.clone();
                1
            }
            None => 0,
        }
    }
}

#[async_trait]
impl Sink for MemorySink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn execute(&mut self, write: &Write) -> Result<u64, Error> {
        if !self.connected {
            return Ok(0);
        }
        if self.rejected.contains(write.entity_id()) {
            return Err(Error::Rejected(write.entity_id().to_owned()));
        }
        self.executed += 1;
        let n = match write {
            Write::UpsertContentCard {
                record,
                on_conflict,
            } => self.upsert_content_card(record, *on_conflict),
            Write::RemoveContentCard {
                content_card_id,
                lifecycle,
            } => self.remove_content_card(content_card_id, lifecycle),
            Write::UpsertPermission { record } => self.upsert_permission(record),
            Write::RemovePermission {
                permission_id,
                lifecycle,
            } => self.remove_permission(permission_id, lifecycle),
        };
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lifecycle(block_num: u32, operation_type: i16) -> Lifecycle {
        Lifecycle {
            block_num,
            block_time: 1_700_000_000 + block_num,
            trx_id: format!("trx{block_num}"),
            operation_type,
        }
    }

    fn card(id: &str, hash: &str, lc: Lifecycle) -> ContentCardRecord {
        ContentCardRecord {
            content_card_id: id.to_owned(),
            subject_account: "1.2.5".to_owned(),
            hash: hash.to_owned(),
            url: "url".to_owned(),
            content_type: "type".to_owned(),
            description: "description".to_owned(),
            content_key: "key".to_owned(),
            storage_data: "data".to_owned(),
            lifecycle: lc,
        }
    }

    #[tokio::test]
    async fn create_conflict_keeps_lifecycle() {
        let mut sink = MemorySink::new();
        let first = Write::UpsertContentCard {
            record: card("1.7.3", "aa", lifecycle(1, 41)),
            on_conflict: ContentCardConflict::MutableFields,
        };
        let second = Write::UpsertContentCard {
            record: card("1.7.3", "bb", lifecycle(2, 41)),
            on_conflict: ContentCardConflict::MutableFields,
        };
        sink.execute(&first).await.unwrap();
        sink.execute(&second).await.unwrap();
        let row = sink.content_card("1.7.3").unwrap();
        assert_eq!(row.card.hash, "bb");
        assert_eq!(row.card.lifecycle, lifecycle(1, 41));
    }

    #[tokio::test]
    async fn remove_of_absent_row_affects_nothing() {
        let mut sink = MemorySink::new();
        let write = Write::RemovePermission {
            permission_id: "1.8.1".to_owned(),
            lifecycle: lifecycle(1, 45),
        };
        assert_eq!(sink.execute(&write).await.unwrap(), 0);
        assert!(sink.permissions().is_empty());
    }

    #[tokio::test]
    async fn rejected_writes_fail() {
        let mut sink = MemorySink::new().reject("1.7.3");
        let write = Write::UpsertContentCard {
            record: card("1.7.3", "aa", lifecycle(1, 41)),
            on_conflict: ContentCardConflict::MutableFields,
        };
        assert!(matches!(
            sink.execute(&write).await,
            Err(Error::Rejected(id)) if id == "1.7.3"
        ));
        assert_eq!(sink.executed(), 0);
    }
}
