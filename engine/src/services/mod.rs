// External collaborators the core pipeline never depends on.
pub mod inflation;
