//! Request handlers, grouped like the admin panel sections.

pub(crate) mod content;
pub(crate) mod files;
pub(crate) mod site;
pub(crate) mod sports;
