//! In-memory Typst world: embedded fonts, mounted sources, `sys.inputs`

pub mod fonts;
pub mod virtual_fs;
pub mod virtual_world;

pub use fonts::FontCache;
pub use virtual_fs::VirtualFilesystem;
pub use virtual_world::VirtualWorld;
