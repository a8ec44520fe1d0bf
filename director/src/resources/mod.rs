//! One parser per known chunk kind.

pub mod cast;
pub mod cast_list;
pub mod clut;
pub mod config;
pub mod key_table;
pub mod score;
pub mod script;
pub mod script_context;
pub mod script_names;
pub mod sound;
pub mod stxt;

pub use cast::{Cast, CastMember, CastMemberType};
pub use cast_list::CastList;
pub use clut::Clut;
pub use config::Config;
pub use key_table::KeyTable;
pub use score::Score;
pub use script::{Handler, Script};
pub use script_context::ScriptContext;
pub use script_names::ScriptNames;

libcommon::newtype_index! {
    /// A cast member's 1-based slot number within its cast library.
    pub struct MemberNum(i32);
}
