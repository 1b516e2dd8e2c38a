//! Server-rendered view of the widget.
//!
//! - [`chat_page`]: full page with the question form and the client glue
//! - [`render_widget`]: history list and session footer fragment

mod page;
mod view;

pub use page::{PAGE_TITLE, chat_page};
pub use view::{LOADING, render_widget};
