pub mod coordinate;
pub mod driver;
pub mod marker;
pub mod ride;
pub mod trip;
