pub(crate) mod collection;
pub(crate) mod page;
pub(crate) mod project;
pub(crate) mod timeline;
