use std::borrow::Cow;

/// Any error that may be returned by a registry operation
///
/// The registry never panics on bad user input: every failure surfaces as a
/// value of this type. Traversals (commit, export, save) remember the first
/// error they encounter and keep going, so one broken subtree does not
/// silently skip later work.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Bad argument, constraint violation, type mismatch, oversized input or
	/// unparseable string
	#[error("invalid argument or value")]
	Invalid,
	/// An id or name does not resolve in the registry graph
	#[error("no such object in the registry")]
	NotFound,
	/// A save operation ran with no destination storage registered
	#[error("no destination storage registered")]
	NoDestinationStorage,
	/// A get or set was attempted on a group node
	#[error("expected a parameter but found a group")]
	GroupIsNotAParameter,
	/// I/O failure inside a storage backend
	#[error("storage backend i/o error: {0}")]
	Io(#[from] std::io::Error),
	/// Failure surfaced verbatim from a commit handler or an export callback
	#[error("{0}")]
	Custom(Cow<'static, str>),
}

impl Error {
	/// Build a [`Error::Custom`] from anything displayable
	///
	/// For a static string prefer `Error::Custom("...".into())`.
	pub fn custom(msg: impl std::fmt::Display) -> Self {
		Error::Custom(Cow::Owned(msg.to_string()))
	}
}

/// Remember the first error of a traversal while letting later siblings run
pub(crate) fn keep_first_error(acc: &mut Result<(), Error>, next: Result<(), Error>) {
	if acc.is_ok() && next.is_err() {
		*acc = next;
	}
}
