pub mod saving;

pub use saving::{RepeatInterval, Saving, SavingChanges};
