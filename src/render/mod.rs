pub mod html;
pub mod palette;
pub use html::HtmlRenderer;
