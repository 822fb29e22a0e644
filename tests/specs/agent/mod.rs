//! Agent protocol specs

mod details;
mod enroll;
mod labels;
