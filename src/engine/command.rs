//! engine::command
//!
//! Typed commands and the line parser that produces them.
//!
//! # Grammar
//!
//! One command per line, whitespace-separated tokens. The first token names
//! the command; the rest are its arguments. Blank lines and lines whose
//! first non-blank character is `#` carry no command.
//!
//! # Invariants
//!
//! - Parsing is pure: it never touches the registry.
//! - A line either parses completely or is rejected with a [`ParseError`];
//!   trailing tokens are an error, not ignored.
//! - Booleans are the literal tokens `true` and `false` only.
//!
//! # Example
//!
//! ```
//! use slotwise::engine::command::{parse, Command, ListOp};
//!
//! let cmd = parse("list_push_back list0 7").unwrap().unwrap();
//! assert!(matches!(cmd, Command::List { op: ListOp::PushBack(7), .. }));
//! assert_eq!(parse("   ").unwrap(), None);
//! assert!(parse("list_push_back list0 seven").is_err());
//! ```

use std::str::SplitWhitespace;

use thiserror::Error;

use crate::core::registry::Value;
use crate::core::types::{InstanceName, Kind, TypeError};

/// Errors from parsing a command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("{command}: missing {what}")]
    MissingArgument { command: String, what: &'static str },

    #[error("{command}: invalid {what} '{token}'")]
    InvalidNumber {
        command: String,
        what: &'static str,
        token: String,
    },

    #[error("{command}: expected 'true' or 'false', got '{token}'")]
    InvalidBool { command: String, token: String },

    #[error("{command}: unknown transform '{token}', expected square or triple")]
    UnknownTransform { command: String, token: String },

    #[error("{command}: unexpected argument '{token}'")]
    UnexpectedArgument { command: String, token: String },

    #[error("{command}: {source}")]
    Name {
        command: String,
        #[source]
        source: TypeError,
    },
}

/// Bulk transform for `hash_apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Square,
    Triple,
}

impl Transform {
    /// Applies the transform, wrapping on overflow.
    pub fn apply(self, value: Value) -> Value {
        match self {
            Transform::Square => value.wrapping_mul(value),
            Transform::Triple => value.wrapping_mul(value).wrapping_mul(value),
        }
    }
}

/// Half-open bit range `[start, start + cnt)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSpan {
    pub start: usize,
    pub cnt: usize,
}

/// Operations on a single list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOp {
    PushBack(Value),
    PushFront(Value),
    PopBack,
    PopFront,
    Front,
    Back,
    Insert { pos: usize, value: Value },
    InsertOrdered(Value),
    Remove(usize),
    Max,
    Min,
    Size,
    Empty,
    Reverse,
    Shuffle,
    Sort,
    /// Moves `[first, last)` of `src` before position `before` of this list.
    Splice {
        before: usize,
        src: InstanceName,
        first: usize,
        last: usize,
    },
    Swap(usize, usize),
    Unique { duplicates: Option<InstanceName> },
}

/// Operations on a single hash table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashOp {
    Insert(Value),
    Replace(Value),
    Find(Value),
    Delete(Value),
    Apply(Transform),
    Clear,
    Size,
    Empty,
}

/// Operations on a single bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapOp {
    Set { idx: usize, value: bool },
    Mark(usize),
    Reset(usize),
    Flip(usize),
    Test(usize),
    SetAll(bool),
    SetMultiple { span: BitSpan, value: bool },
    Count { span: BitSpan, value: bool },
    Contains { span: BitSpan, value: bool },
    Any(BitSpan),
    None(BitSpan),
    All(BitSpan),
    Scan { span: BitSpan, value: bool },
    ScanAndFlip { span: BitSpan, value: bool },
    Size,
    Expand(usize),
    Dump,
    HexDump,
}

/// A fully parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `create list|hashtable|bitmap <name> [<bits>]`
    Create { name: InstanceName, bits: Option<usize> },
    Delete(InstanceName),
    DumpData(InstanceName),
    List { list: InstanceName, op: ListOp },
    Hash { table: InstanceName, op: HashOp },
    Bitmap { bitmap: InstanceName, op: BitmapOp },
    Help,
    Quit,
}

/// One-line summary of every command, printed by `help`.
pub const HELP: &[&str] = &[
    "create list <list> | create hashtable <hash> | create bitmap <bm> <bits>",
    "delete <name> | dumpdata <name>",
    "list_push_back|list_push_front <list> <v> | list_pop_back|list_pop_front <list>",
    "list_front|list_back|list_max|list_min|list_size|list_empty <list>",
    "list_insert <list> <pos> <v> | list_insert_ordered <list> <v> | list_remove <list> <pos>",
    "list_reverse|list_shuffle|list_sort <list> | list_swap <list> <i> <j>",
    "list_splice <dst> <before> <src> <first> <last> | list_unique <list> [<dups>]",
    "hash_insert|hash_replace|hash_find|hash_delete <hash> <v>",
    "hash_apply <hash> square|triple | hash_clear|hash_size|hash_empty <hash>",
    "bitmap_set <bm> <idx> true|false | bitmap_mark|bitmap_reset|bitmap_flip|bitmap_test <bm> <idx>",
    "bitmap_set_all <bm> true|false | bitmap_set_multiple|bitmap_count|bitmap_contains <bm> <start> <cnt> true|false",
    "bitmap_any|bitmap_none|bitmap_all <bm> <start> <cnt>",
    "bitmap_scan|bitmap_scan_and_flip <bm> <start> <cnt> true|false",
    "bitmap_size|bitmap_dump|bitmap_hexdump <bm> | bitmap_expand <bm> <delta>",
    "help | quit",
];

/// Argument cursor over one line.
struct Args<'a> {
    command: &'a str,
    tokens: SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn next(&mut self, what: &'static str) -> Result<&'a str, ParseError> {
        self.tokens.next().ok_or_else(|| ParseError::MissingArgument {
            command: self.command.to_string(),
            what,
        })
    }

    fn name_error(&self, source: TypeError) -> ParseError {
        ParseError::Name {
            command: self.command.to_string(),
            source,
        }
    }

    fn instance(&mut self, kind: Kind) -> Result<InstanceName, ParseError> {
        let token = self.next("instance name")?;
        InstanceName::parse_as(kind, token).map_err(|e| self.name_error(e))
    }

    fn any_instance(&mut self) -> Result<InstanceName, ParseError> {
        let token = self.next("instance name")?;
        InstanceName::parse(token).map_err(|e| self.name_error(e))
    }

    fn index(&mut self, what: &'static str) -> Result<usize, ParseError> {
        let token = self.next(what)?;
        token.parse().map_err(|_| ParseError::InvalidNumber {
            command: self.command.to_string(),
            what,
            token: token.to_string(),
        })
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        let token = self.next("value")?;
        token.parse().map_err(|_| ParseError::InvalidNumber {
            command: self.command.to_string(),
            what: "value",
            token: token.to_string(),
        })
    }

    fn flag(&mut self) -> Result<bool, ParseError> {
        match self.next("true|false")? {
            "true" => Ok(true),
            "false" => Ok(false),
            token => Err(ParseError::InvalidBool {
                command: self.command.to_string(),
                token: token.to_string(),
            }),
        }
    }

    fn span(&mut self) -> Result<BitSpan, ParseError> {
        Ok(BitSpan {
            start: self.index("start")?,
            cnt: self.index("count")?,
        })
    }

    fn transform(&mut self) -> Result<Transform, ParseError> {
        match self.next("transform")? {
            "square" => Ok(Transform::Square),
            "triple" => Ok(Transform::Triple),
            token => Err(ParseError::UnknownTransform {
                command: self.command.to_string(),
                token: token.to_string(),
            }),
        }
    }

    fn finish(mut self) -> Result<(), ParseError> {
        match self.tokens.next() {
            Some(token) => Err(ParseError::UnexpectedArgument {
                command: self.command.to_string(),
                token: token.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Parses one input line.
///
/// Returns `Ok(None)` for blank and comment lines.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let mut tokens = line.split_whitespace();
    let command = match tokens.next() {
        None => return Ok(None),
        Some(first) if first.starts_with('#') => return Ok(None),
        Some(first) => first,
    };
    let mut args = Args { command, tokens };

    let cmd = if let Some(suffix) = command.strip_prefix("list_") {
        let list = args.instance(Kind::List)?;
        Command::List {
            list,
            op: parse_list_op(suffix, &mut args)?,
        }
    } else if let Some(suffix) = command.strip_prefix("hash_") {
        let table = args.instance(Kind::Hash)?;
        Command::Hash {
            table,
            op: parse_hash_op(suffix, &mut args)?,
        }
    } else if let Some(suffix) = command.strip_prefix("bitmap_") {
        let bitmap = args.instance(Kind::Bitmap)?;
        Command::Bitmap {
            bitmap,
            op: parse_bitmap_op(suffix, &mut args)?,
        }
    } else {
        match command {
            "create" => {
                let token = args.next("container type")?;
                let kind = Kind::from_type_token(token).map_err(|e| args.name_error(e))?;
                let name = args.instance(kind)?;
                let bits = match kind {
                    Kind::Bitmap => Some(args.index("bit count")?),
                    Kind::List | Kind::Hash => None,
                };
                Command::Create { name, bits }
            }
            "delete" => Command::Delete(args.any_instance()?),
            "dumpdata" => Command::DumpData(args.any_instance()?),
            "help" => Command::Help,
            "quit" => Command::Quit,
            _ => return Err(ParseError::UnknownCommand(command.to_string())),
        }
    };

    args.finish()?;
    Ok(Some(cmd))
}

fn unknown(args: &Args<'_>) -> ParseError {
    ParseError::UnknownCommand(args.command.to_string())
}

fn parse_list_op(suffix: &str, args: &mut Args<'_>) -> Result<ListOp, ParseError> {
    Ok(match suffix {
        "push_back" => ListOp::PushBack(args.value()?),
        "push_front" => ListOp::PushFront(args.value()?),
        "pop_back" => ListOp::PopBack,
        "pop_front" => ListOp::PopFront,
        "front" => ListOp::Front,
        "back" => ListOp::Back,
        "insert" => ListOp::Insert {
            pos: args.index("position")?,
            value: args.value()?,
        },
        "insert_ordered" => ListOp::InsertOrdered(args.value()?),
        "remove" => ListOp::Remove(args.index("position")?),
        "max" => ListOp::Max,
        "min" => ListOp::Min,
        "size" => ListOp::Size,
        "empty" => ListOp::Empty,
        "reverse" => ListOp::Reverse,
        "shuffle" => ListOp::Shuffle,
        "sort" => ListOp::Sort,
        "splice" => ListOp::Splice {
            before: args.index("position")?,
            src: args.instance(Kind::List)?,
            first: args.index("first position")?,
            last: args.index("last position")?,
        },
        "swap" => ListOp::Swap(args.index("position")?, args.index("position")?),
        "unique" => {
            let duplicates = match args.tokens.clone().next() {
                Some(_) => Some(args.instance(Kind::List)?),
                None => None,
            };
            ListOp::Unique { duplicates }
        }
        _ => return Err(unknown(args)),
    })
}

fn parse_hash_op(suffix: &str, args: &mut Args<'_>) -> Result<HashOp, ParseError> {
    Ok(match suffix {
        "insert" => HashOp::Insert(args.value()?),
        "replace" => HashOp::Replace(args.value()?),
        "find" => HashOp::Find(args.value()?),
        "delete" => HashOp::Delete(args.value()?),
        "apply" => HashOp::Apply(args.transform()?),
        "clear" => HashOp::Clear,
        "size" => HashOp::Size,
        "empty" => HashOp::Empty,
        _ => return Err(unknown(args)),
    })
}

fn parse_bitmap_op(suffix: &str, args: &mut Args<'_>) -> Result<BitmapOp, ParseError> {
    Ok(match suffix {
        "set" => BitmapOp::Set {
            idx: args.index("bit index")?,
            value: args.flag()?,
        },
        "mark" => BitmapOp::Mark(args.index("bit index")?),
        "reset" => BitmapOp::Reset(args.index("bit index")?),
        "flip" => BitmapOp::Flip(args.index("bit index")?),
        "test" => BitmapOp::Test(args.index("bit index")?),
        "set_all" => BitmapOp::SetAll(args.flag()?),
        "set_multiple" => BitmapOp::SetMultiple {
            span: args.span()?,
            value: args.flag()?,
        },
        "count" => BitmapOp::Count {
            span: args.span()?,
            value: args.flag()?,
        },
        "contains" => BitmapOp::Contains {
            span: args.span()?,
            value: args.flag()?,
        },
        "any" => BitmapOp::Any(args.span()?),
        "none" => BitmapOp::None(args.span()?),
        "all" => BitmapOp::All(args.span()?),
        "scan" => BitmapOp::Scan {
            span: args.span()?,
            value: args.flag()?,
        },
        "scan_and_flip" => BitmapOp::ScanAndFlip {
            span: args.span()?,
            value: args.flag()?,
        },
        "size" => BitmapOp::Size,
        "expand" => BitmapOp::Expand(args.index("delta")?),
        "dump" => BitmapOp::Dump,
        "hexdump" => BitmapOp::HexDump,
        _ => return Err(unknown(args)),
    })
}
