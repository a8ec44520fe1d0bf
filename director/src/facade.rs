//! The crate's public surface: load a movie, enumerate its scripts and
//! assets, and read its top-level properties. Everything under
//! [`crate::resources`], [`crate::bytecode`], [`crate::ast`], and
//! [`crate::media`] is reachable directly for callers that need more
//! control, but most consumers only need what's exposed here.

use std::rc::Rc;

use libcommon::OsType;

use crate::ast::{decompile_script, DecompiledHandler, Writer};
use crate::collections::riff::{ChunkId, ChunkIndex};
use crate::detection::Kind;
use crate::error::{Error, Result};
use crate::name::NameContext;
use crate::resources::{Cast, CastList, Config, KeyTable, Script};
pub use crate::detection::Version;

#[derive(Clone, Copy, Debug)]
pub struct LoadOptions {
    /// Run [`crate::resources::config::Config::unprotect`] on the loaded
    /// config before anything reads it.
    pub unprotect: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { unprotect: false }
    }
}

/// A parsed Director movie or standalone cast file.
pub struct Movie {
    index: ChunkIndex,
    config: Config,
    kind: Kind,
    cast_list: Option<Rc<CastList>>,
    key_table: Rc<KeyTable>,
    casts: Vec<Rc<Cast>>,
    names: Option<Rc<NameContext>>,
}

impl Movie {
    pub fn load(bytes: Vec<u8>) -> Result<Self> {
        Self::load_with_options(bytes, LoadOptions::default())
    }

    pub fn load_with_options(bytes: Vec<u8>, options: LoadOptions) -> Result<Self> {
        let index = ChunkIndex::new(Rc::from(bytes))?;

        let config_id = index.first(*b"VWCF").or_else(|| index.first(*b"DRCF")).ok_or_else(|| Error::ChunkMissing(OsType::from(*b"VWCF")))?;
        let mut config = *index.load(config_id, Config::parse)?;
        if options.unprotect {
            config.unprotect();
        }

        let kind = if index.first(*b"VWSC").is_some() { Kind::Movie } else { Kind::Cast };

        let cast_list = match index.first(*b"MCsL") {
            Some(id) => Some(index.load(id, CastList::parse)?),
            None => {
                log::debug!("no MCsL chunk; treating as a single unnamed cast");
                None
            },
        };

        let key_table_id = index.first(*b"KEY*").ok_or_else(|| Error::ChunkMissing(OsType::from(*b"KEY*")))?;
        let key_table = index.load(key_table_id, KeyTable::parse)?;

        let casts: Vec<_> = index.iter_fourcc(*b"CAS*").map(|id| index.load(id, Cast::parse)).collect::<Result<_>>()?;

        let names = match index.first(*b"LctX").or_else(|| index.first(*b"Lctx")) {
            Some(id) => Some(Rc::new(NameContext::load(&index, id)?)),
            None => {
                log::debug!("no LctX/Lctx chunk; scripts() will be empty");
                None
            },
        };

        Ok(Self { index, config, kind, cast_list, key_table, casts, names })
    }

    #[must_use]
    pub fn version(&self) -> Version {
        self.config.director_version()
    }

    #[must_use]
    pub fn is_cast_file(&self) -> bool {
        self.kind == Kind::Cast
    }

    #[must_use]
    pub fn stage_size(&self) -> (i32, i32) {
        (self.config.stage_width(), self.config.stage_height())
    }

    #[must_use]
    pub fn frame_rate(&self) -> u16 {
        self.config.frame_rate
    }

    #[must_use]
    pub fn cast_list(&self) -> Option<&CastList> {
        self.cast_list.as_deref()
    }

    /// Every script this movie can decompile, in name-context order.
    #[must_use]
    pub fn scripts(&self) -> Vec<ScriptHandle<'_>> {
        let Some(names) = &self.names else { return Vec::new() };
        names
            .script_context()
            .entries
            .iter()
            .filter_map(|entry| entry.section.map(|section| ScriptHandle { movie: self, section }))
            .collect()
    }

    /// Every cast member across every cast library in this file.
    #[must_use]
    pub fn assets(&self) -> Vec<AssetHandle<'_>> {
        self.casts
            .iter()
            .flat_map(|cast| cast.slots.iter())
            .filter_map(|slot| *slot)
            .map(|member| AssetHandle { movie: self, member })
            .collect()
    }

    #[must_use]
    pub fn chunk_index(&self) -> &ChunkIndex {
        &self.index
    }

    #[must_use]
    pub fn key_table(&self) -> &KeyTable {
        &self.key_table
    }
}

pub struct ScriptHandle<'a> {
    movie: &'a Movie,
    section: ChunkId,
}

impl<'a> ScriptHandle<'a> {
    pub fn handlers(&self) -> Result<Vec<DecompiledHandler>> {
        let Some(names) = &self.movie.names else {
            return Ok(Vec::new());
        };
        let script = self.movie.index.load(self.section, Script::parse)?;
        Ok(decompile_script(&script, names, self.movie.version()))
    }

    /// Renders every handler in this script as Lingo source text.
    pub fn source(&self) -> Result<String> {
        let writer = Writer::new(self.movie.version().dot_syntax_default());
        let handlers = self.handlers()?;
        let mut out = String::new();
        for handler in handlers {
            out.push_str(&writer.write_handler(&handler.name, &handler.parameters, &handler.body));
            out.push('\n');
        }
        Ok(out)
    }
}

pub struct AssetHandle<'a> {
    movie: &'a Movie,
    member: ChunkId,
}

impl<'a> AssetHandle<'a> {
    #[must_use]
    pub fn chunk_id(&self) -> ChunkId {
        self.member
    }

    pub fn load(&self) -> Result<Rc<crate::resources::CastMember>> {
        self.movie.index.load(self.member, crate::resources::CastMember::parse)
    }
}
