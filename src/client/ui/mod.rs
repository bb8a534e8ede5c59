mod home;
mod render;
mod session;

pub use render::render;
