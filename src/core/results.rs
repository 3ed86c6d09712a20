use super::types::ObjectID;
use super::types::OperationResult;

/// Returns the object ids newly assigned by an operation, in order.
///
/// Single id results give that id, generic results give their set of new
/// objects in the set's own (ascending) order. Anything else gives nothing,
/// leaving it to callers to fall back on placeholder ids.
pub fn new_object_ids(result: &OperationResult) -> Vec<ObjectID> {
    match result {
        OperationResult::ObjectID(id) => vec![*id],
        OperationResult::Generic(generic) => generic.new_objects.iter().copied().collect(),
        OperationResult::Void | OperationResult::Asset(_) | OperationResult::Unhandled(_) => {
            vec![]
        }
    }
}
