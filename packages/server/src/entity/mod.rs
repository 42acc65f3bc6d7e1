pub mod participant_progress;
pub mod problem;
pub mod round;
pub mod similarity_flag;
pub mod submission;
