//! End-to-end tests driving the bridge through its transport surface.
//!
//! Every scenario builds a real bridge, registers a view, and exchanges
//! full request/response pairs through `handle_request` - the same path a
//! production transport handler takes.

mod helpers;

mod events;
mod invoke;
mod streaming;
