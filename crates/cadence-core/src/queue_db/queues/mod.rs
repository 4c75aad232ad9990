//! Queue and item CRUD on top of `QueueDb`.

mod read;
mod write;
