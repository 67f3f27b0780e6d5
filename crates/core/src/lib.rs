//! Domain logic for the Promptory site.
//!
//! Everything here is free of I/O so it can be exercised directly from
//! unit tests:
//!
//! - [`catalog`]: static prompt gallery, pricing, testimonial and FAQ tables.
//! - [`views`]: view state for the interactive landing sections.
//! - [`model_choice`]: the `male` / `female` model selection.
//! - [`sniff`]: MIME detection from magic numbers and base64 prefixes.
//! - [`interpret`]: turns an arbitrary webhook response into a result image.
//! - [`session`]: Try-On upload session state and the result store.

pub mod catalog;
pub mod error;
pub mod interpret;
pub mod model_choice;
pub mod session;
pub mod sniff;
pub mod types;
pub mod views;
