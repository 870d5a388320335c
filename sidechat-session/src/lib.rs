//! Conversation orchestration over a detected site adapter.
//!
//! [`ChatSession`] owns one boxed provider for its lifetime and drives the
//! send / wait / extract cycle: single prompts, chunked file transfers with
//! part envelopes, and strictly sequential batches with a cooperative stop
//! checked between sends. The chunking and prompt-replay pieces are pure
//! functions so they can be tested without any page at all.

pub mod chunk;
pub mod replay;
mod session;

pub use chunk::{envelope_parts, split_into_parts};
pub use replay::{format_transcript, parse_prompts, TranscriptMode};
pub use session::{BatchOutcome, BatchReport, ChatSession};
