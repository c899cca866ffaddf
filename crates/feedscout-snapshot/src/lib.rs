mod element;
mod manifest;
mod page;
mod session;

pub use element::HtmlElement;
pub use manifest::{PageEntry, SnapshotManifest};
pub use page::posts_in_document;
pub use session::SnapshotSession;
