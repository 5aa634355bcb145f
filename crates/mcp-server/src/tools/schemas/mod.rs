pub(crate) mod code;
pub(crate) mod data;
pub(crate) mod entities;
pub(crate) mod servers;
