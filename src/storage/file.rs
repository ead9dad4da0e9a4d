//! File-backed storage
//!
//! Persists the registry state as a single JSON document mapping integer
//! parameter paths to base64-encoded value bytes:
//!
//! ```json
//! { "records": { "0/0/0/2": "CA==" } }
//! ```
//!
//! A save traversal stages its records over the previously persisted
//! document (so that a rooted save does not drop unrelated records) and
//! atomically replaces the file on `save_end` via a temporary file and
//! rename.

use std::{collections::BTreeMap, fs, path::PathBuf};

use base64::Engine as _;

use crate::{
	error::{keep_first_error, Error},
	path::ParameterPath,
	storage::{LoadCallback, Storage},
	value::Value,
};

#[derive(serde_derive::Serialize, serde_derive::Deserialize, Default)]
struct Document {
	records: BTreeMap<String, String>,
}

pub struct FileStorage {
	path: PathBuf,
	staged: Option<Document>,
}

impl FileStorage {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			staged: None,
		}
	}

	/// The file this storage reads and writes
	pub fn path(&self) -> &std::path::Path {
		&self.path
	}

	fn read_document(&self) -> Result<Option<Document>, Error> {
		let contents = match fs::read_to_string(&self.path) {
			Ok(contents) => contents,
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(error) => return Err(error.into()),
		};
		serde_json::from_str(&contents)
			.map(Some)
			.map_err(|_| Error::Invalid)
	}
}

impl Storage for FileStorage {
	fn load(&mut self, load_cb: &mut LoadCallback<'_>) -> Result<(), Error> {
		let Some(document) = self.read_document()? else {
			// no file yet means nothing was ever saved
			return Ok(());
		};
		let mut result = Ok(());
		for (key, encoded) in &document.records {
			let Ok(path) = key.parse::<ParameterPath>() else {
				tracing::warn!(%key, "skipping record with malformed path");
				continue;
			};
			let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(encoded) else {
				tracing::warn!(%key, "skipping record with malformed value");
				continue;
			};
			keep_first_error(&mut result, load_cb(path, &bytes));
		}
		result
	}

	fn save_start(&mut self) -> Result<(), Error> {
		// stage on top of what is already persisted; a corrupt document is
		// started over from scratch
		self.staged = Some(match self.read_document() {
			Ok(Some(document)) => document,
			Ok(None) | Err(Error::Invalid) => Document::default(),
			Err(error) => return Err(error),
		});
		Ok(())
	}

	fn save(&mut self, parameter: ParameterPath, value: &Value<'_>) -> Result<(), Error> {
		let staged = self.staged.as_mut().ok_or(Error::Invalid)?;
		staged.records.insert(
			parameter.to_string(),
			base64::engine::general_purpose::STANDARD.encode(value.bytes),
		);
		Ok(())
	}

	fn save_end(&mut self) -> Result<(), Error> {
		let staged = self.staged.take().ok_or(Error::Invalid)?;
		let rendered = serde_json::to_string_pretty(&staged).map_err(|_| Error::Invalid)?;
		let temporary = self.path.with_extension("tmp");
		fs::write(&temporary, rendered)?;
		fs::rename(&temporary, &self.path)?;
		Ok(())
	}
}
