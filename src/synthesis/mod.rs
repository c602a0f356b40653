pub(crate) mod config;
pub(crate) mod params;
pub(crate) mod smoother;
