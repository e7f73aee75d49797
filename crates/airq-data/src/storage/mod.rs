//! 저장소 모듈.

pub mod readings;

pub use readings::{ReadingRecord, ReadingStore};
