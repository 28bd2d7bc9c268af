pub mod phrases;
pub mod remote;
pub mod render;
pub mod session;

pub use phrases::{Locale, Phrasebook};
pub use remote::{HttpRemoteService, RemoteService};
pub use render::{GalleryCard, GalleryRenderer, TranscriptLine, TranscriptRenderer};
pub use session::{Outcome, SessionController, SessionOptions, SessionSnapshot};
