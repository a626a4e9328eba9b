pub(crate) mod answer_key;
pub(crate) mod errors;
pub(crate) mod grading;
pub(crate) mod report;
