//! [`World`] implementation over the virtual filesystem

use chrono::{Datelike, Utc};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Array, Bytes, Datetime, Dict, Value};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, World};

use super::fonts::{global_font_cache, FontCache};
use super::virtual_fs::VirtualFilesystem;
use crate::compiler::errors::RenderError;

pub struct VirtualWorld {
    filesystem: VirtualFilesystem,
    main: FileId,
    font_cache: &'static FontCache,
    library: LazyHash<Library>,
    today: chrono::NaiveDate,
}

impl VirtualWorld {
    /// A world whose entry point is `main`, with extra files mounted
    /// alongside it and `inputs` exposed as `sys.inputs`
    pub fn new(
        main: &str,
        files: &[(&str, &str)],
        inputs: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, RenderError> {
        let mut filesystem = VirtualFilesystem::new();
        let main = filesystem.mount_main(main);
        for (path, content) in files {
            filesystem.mount_file(path, Bytes::from(content.as_bytes().to_vec()))?;
        }

        let mut dict = Dict::new();
        for (key, value) in inputs {
            dict.insert(key.as_str().into(), json_to_value(value)?);
        }

        Ok(Self {
            filesystem,
            main,
            font_cache: global_font_cache(),
            library: LazyHash::new(Library::builder().with_inputs(dict).build()),
            today: Utc::now().date_naive(),
        })
    }
}

fn json_to_value(json: &serde_json::Value) -> Result<Value, RenderError> {
    Ok(match json {
        serde_json::Value::Null => Value::None,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Value::Int(i),
            (None, Some(f)) => Value::Float(f),
            (None, None) => return Err(RenderError::Input(format!("Invalid number: {}", n))),
        },
        serde_json::Value::String(s) => Value::Str(s.as_str().into()),
        serde_json::Value::Array(items) => {
            let values = items
                .iter()
                .map(json_to_value)
                .collect::<Result<Vec<_>, _>>()?;
            Value::Array(Array::from(values.as_slice()))
        }
        serde_json::Value::Object(obj) => {
            let mut dict = Dict::new();
            for (k, v) in obj {
                dict.insert(k.as_str().into(), json_to_value(v)?);
            }
            Value::Dict(dict)
        }
    })
}

impl World for VirtualWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        self.font_cache.book()
    }

    fn main(&self) -> FileId {
        self.main
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        self.filesystem
            .source(id)
            .ok_or_else(|| FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        self.filesystem
            .file(id)
            .ok_or_else(|| FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.font_cache.font(index)
    }

    fn today(&self, offset: Option<i64>) -> Option<Datetime> {
        let date = match offset {
            Some(hours) => (Utc::now() + chrono::Duration::hours(hours)).date_naive(),
            None => self.today,
        };
        Datetime::from_ymd(date.year(), date.month() as u8, date.day() as u8)
    }
}
