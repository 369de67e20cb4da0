pub mod admission;
pub mod attempt;
pub mod dispatcher;
