// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe the poker side of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums, and traits

// Betting rounds and the hand-class count
pub mod street;

// The prediction capability the bot consumes
pub mod traits;
