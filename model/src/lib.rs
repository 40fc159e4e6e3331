pub mod change_event;
pub mod worker;
