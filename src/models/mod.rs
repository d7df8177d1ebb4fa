pub mod attempt;
pub mod claim;
pub mod order;
