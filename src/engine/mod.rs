pub mod dispatch;
pub mod lifecycle;
pub mod motion;
pub mod pricing;
pub mod session;
pub mod status;
pub mod ticker;
pub mod transition;
