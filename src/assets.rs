pub mod decode;

pub use decode::{ImageSource, PreparedImage, decode_image, load_image};
