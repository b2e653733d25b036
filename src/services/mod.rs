pub mod orchestrator;
pub mod preparer;
pub mod storage;
