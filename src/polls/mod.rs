pub mod visibility;
pub mod vote;

pub use visibility::{Viewer, is_visible, list_visible, load_visible, resolve};
pub use vote::{NO_CHOICE_SELECTED, VoteOutcome, cast_vote};
