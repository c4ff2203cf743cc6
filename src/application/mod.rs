// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal
// (training a network, or answering with trained ones).
//
// Rules for this layer:
//   - No tensor math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - Only workflow coordination

/// The training workflow
pub mod train_use_case;

/// Loading trained networks and answering with them
pub mod predict_use_case;
