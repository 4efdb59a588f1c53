mod valuer;

pub use valuer::{
    AccessoryImpact, ConditionPoint, PriceRange, Valuation, Valuer, YearPoint,
};
