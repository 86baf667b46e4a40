pub mod board;
pub mod calendar;
pub mod layout;
pub mod logging;
pub mod model;
pub mod reposition;
pub mod status;
pub mod storage;
