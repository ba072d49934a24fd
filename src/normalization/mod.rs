pub mod platform;
pub mod rating;

pub use platform::Platform;
pub use rating::ContentRating;
