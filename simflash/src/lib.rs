//! Simulated flash.
//!
//! The NOR-type flashes used in microcontrollers differ quite a bit in terms
//! of capabilities provided. [`fake::FakeArea`] captures the diversity of
//! these devices behind `storage::Flash` -- an erase size, a write size, and
//! NOR write-into-erased-cells-only semantics -- plus deterministic crash
//! injection for the swap engine's resume/crash-safety tests. [`styles`]
//! carries the same device-family presets the teacher's simulator shipped;
//! [`gen`] builds synthetic signed images for the end-to-end scenarios.

pub mod fake;
pub mod gen;
pub mod styles;

pub use fake::FakeArea;
