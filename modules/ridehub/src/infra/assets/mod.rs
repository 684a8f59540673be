//! Image hosting and brand metadata clients.

mod brand_lookup;
mod cloudinary;

pub use brand_lookup::BrandLookupClient;
pub use cloudinary::CloudinaryClient;
