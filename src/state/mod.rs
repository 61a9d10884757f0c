//! Client-side state derived from API responses.
//!
//! DESIGN
//! ======
//! Nothing here talks to the network. `cart` re-derives bill totals for
//! display from numbers the backend already returned; `scan` keeps the last
//! QR-scan result across runs, filtered to the fields that are safe to keep.

pub mod cart;
pub mod scan;
