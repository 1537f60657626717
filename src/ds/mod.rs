pub mod intrusive_list;
pub mod slot_arena;
pub mod staging_queue;

pub use intrusive_list::IntrusiveList;
pub use slot_arena::{SlotArena, SlotId};
pub use staging_queue::{Claim, StagingQueue};
