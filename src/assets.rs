pub(crate) mod cache;
pub(crate) mod decode;
pub(crate) mod probe;
