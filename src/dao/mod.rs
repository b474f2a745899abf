/// Database model definitions.
pub mod models;
/// Pool and score snapshot storage operations.
pub mod pool_store;
/// Storage abstraction layer for backend operations.
pub mod storage;
