//! passbook-core: statement data model, page fragments and field classifiers.

pub mod family;
pub mod fields;
pub mod fragment;
pub mod transaction;

pub use family::{BankFamily, Mode, UnknownFamily};
pub use fields::{Direction, FieldClassifier, ZERO};
pub use fragment::{Page, PageSet, SourceError, StatementDocument, Table, TableStrategy, Word};
pub use transaction::Transaction;
