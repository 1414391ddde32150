pub mod savings;

pub use savings::{
    CreateSavingRequest, DateIntervalParams, SavingResponse, UpdateSavingRequest,
};
