pub mod analysis;
pub mod history;
pub mod metadata;
pub mod notice;
pub mod tender;

pub use analysis::*;
pub use history::*;
pub use metadata::*;
pub use notice::*;
pub use tender::*;
