//! Text interchange format for annotated sentences.
//!
//! A record is one `S` line holding the space-joined source tokens followed
//! by one `A` line per edit:
//!
//! ```text
//! S 这 部 电 影 不 仅 是 国 内
//! A 7 7|||M:OTHER|||在|||REQUIRED|||-NONE-|||0
//! A -1 -1|||noop|||-NONE-|||REQUIRED|||-NONE-|||1
//! ```
//!
//! Records in a corpus are separated by blank lines.

mod decode;
mod encode;

pub use decode::{decode_corpus, decode_record};
pub use encode::{encode_block_lines, encode_corpus, encode_record};

pub(crate) const SOURCE_PREFIX: &str = "S";
pub(crate) const EDIT_PREFIX: &str = "A";
pub(crate) const FIELD_SEPARATOR: &str = "|||";
pub(crate) const REQUIRED_FIELD: &str = "REQUIRED";
pub(crate) const NONE_FIELD: &str = "-NONE-";
pub(crate) const NOOP_OFFSET: i64 = -1;
/// Fields in an `A` line after the leading `A `.
pub(crate) const EDIT_FIELD_COUNT: usize = 6;
