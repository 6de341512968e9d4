pub mod coefficient;
pub mod quote;
pub mod section;
