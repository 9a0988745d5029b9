//! Yew components mounted next to the server-rendered page.
pub(crate) mod toast;
