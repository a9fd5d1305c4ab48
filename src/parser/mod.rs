pub mod extract;
pub mod labels;
pub mod schema;
pub mod tree;

use crate::document::Form;
use crate::record::Record;

/// Parsed form → schema-driven extraction → fully keyed record.
pub fn process_document(form: &Form) -> Record {
    extract::extract_all(form)
}
