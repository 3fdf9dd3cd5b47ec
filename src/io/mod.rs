//! I/O layer: subject-list parsing, BIDS/derivatives path conventions, and
//! the external-tool process wrappers.
pub mod subjects;
pub use subjects::{Subject, SubjectListError, read_subject_list};

pub mod layout;
pub use layout::{BidsLayout, RawInputs, SubjectDirs};

pub mod tools;
pub use tools::{Tool, ToolCommand, ToolError, verify_toolchain};
