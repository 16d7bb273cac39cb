//! Typed endpoint functions, one per backend operation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each function builds the path, query and body for one endpoint, calls the
//! owning client instance and returns its result untouched. `patient` covers
//! login/registration and questionnaires; `doctor` covers the queue and
//! patient records. `types` holds the declared response shapes.

pub mod doctor;
pub mod patient;
pub mod types;
