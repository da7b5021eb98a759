pub mod easing;
pub mod interp;
pub mod rect;
pub mod transform;
