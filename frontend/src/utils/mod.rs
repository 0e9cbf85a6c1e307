pub mod nav;
pub mod storage;
pub mod time;
