//! Filesystem primitives for job-lock.
//!
//! The filesystem is the only synchronization channel between cooperating
//! processes. Everything here is built on exclusive create (`O_CREAT|O_EXCL`)
//! and on deletes that tolerate a file already being gone.

mod claim;

pub use claim::{
    all_exist, create_exclusive, modified_age, remove_best_effort, remove_missing_ok,
    write_best_effort,
};
