pub mod breakpoint;
pub mod control;
pub mod eval;
pub mod inspect;
pub mod launch;
pub mod lifecycle;
pub mod wait;
