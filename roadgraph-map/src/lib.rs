mod map_reader;

pub use map_reader::*;
