pub(crate) mod document;
pub(crate) mod resolve;
pub(crate) mod schema;
