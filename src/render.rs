pub mod blend;
pub mod curve;
pub mod draw;
pub mod gradient;
pub mod noise;
pub mod pixel;
