pub mod face_bounds;
pub mod pixel;
pub mod region;
pub mod region_clusterer;
pub mod region_scanner;
pub mod skin_tone;
pub mod utils;
