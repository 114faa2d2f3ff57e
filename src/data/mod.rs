//! Stream records, decoding and projections.
//!
//! ## Submodules
//!
//! - [`records`]: Wire record types ([`ScoreRecord`], [`AlertRecord`]) and [`StreamKind`]
//! - [`decode`]: Turns one message payload into a typed [`Batch`]
//! - [`projection`]: Derives the render-ready view of a batch
//! - [`duration`]: Parsing of duration strings used in settings (e.g., "1s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! message payload (JSON)
//!        │
//!        ▼
//! decode(kind, payload) ──▶ DecodeError (batch dropped)
//!        │
//!        ▼
//!      Batch
//!        │
//!        ▼
//! ScoreView | AlertView | HitRateView
//! ```

pub mod decode;
pub mod duration;
pub mod projection;
pub mod records;

pub use decode::decode;
pub use projection::{AlertEntry, AlertStatus, AlertView, HitRateView, ScoreView};
pub use records::{AlertRecord, Batch, ScoreRecord, StreamKind};
