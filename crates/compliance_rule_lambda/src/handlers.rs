pub mod evaluate;
pub mod normalize;
pub mod report;
