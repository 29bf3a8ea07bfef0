//! Turn query results into the answer shown to the user.

pub mod generation;
