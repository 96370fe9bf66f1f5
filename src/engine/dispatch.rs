//! engine::dispatch
//!
//! Routes a parsed [`Command`] to the registry and renders its result.
//!
//! # Invariants
//!
//! - Every instance reference is resolved before any container is touched.
//! - Container operations validate before they mutate, so an `Err` here
//!   means no state changed.
//! - Nodes leave a container only to be released or relinked elsewhere.

use rand::Rng;

use super::command::{BitmapOp, Command, HashOp, ListOp, HELP};
use super::ExecError;
use crate::containers::{list, ContainerError};
use crate::core::registry::{Registry, Value};
use crate::core::types::{InstanceName, Kind};
use crate::ui::output::{self, format_bool, format_values, Verbosity};

/// Sentinel printed when a bitmap scan finds no run.
pub const SCAN_NOT_FOUND: usize = usize::MAX;

/// What a command produced for stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing to print.
    Silent,
    /// One result line.
    Line(String),
    /// Several result lines.
    Lines(Vec<String>),
    /// Stop reading input.
    Quit,
}

impl Reply {
    fn line(value: impl ToString) -> Self {
        Reply::Line(value.to_string())
    }

    fn flag(value: bool) -> Self {
        Reply::line(format_bool(value))
    }

    /// Result lines in print order.
    pub fn lines(&self) -> &[String] {
        match self {
            Reply::Line(line) => std::slice::from_ref(line),
            Reply::Lines(lines) => lines,
            Reply::Silent | Reply::Quit => &[],
        }
    }
}

fn less(a: &Value, b: &Value) -> bool {
    a < b
}

/// Attaches the instance name to a container failure.
fn on(name: InstanceName) -> impl FnOnce(ContainerError) -> ExecError {
    move |source| ExecError::Container { name, source }
}

/// Executes one command.
pub fn dispatch<R>(
    registry: &mut Registry,
    rng: &mut R,
    command: Command,
    verbosity: Verbosity,
) -> Result<Reply, ExecError>
where
    R: Rng + ?Sized,
{
    match command {
        Command::Create { name, bits } => {
            match name.kind() {
                Kind::List => registry.create_list(&name)?,
                Kind::Hash => registry.create_hash(&name)?,
                Kind::Bitmap => registry.create_bitmap(&name, bits.unwrap_or(0))?,
            }
            output::debug(format!("created {}", name), verbosity);
            Ok(Reply::Silent)
        }
        Command::Delete(name) => {
            let released = registry.destroy(&name)?;
            output::debug(
                format!("deleted {} ({} node(s) released)", name, released),
                verbosity,
            );
            Ok(Reply::Silent)
        }
        Command::DumpData(name) => dump(registry, &name),
        Command::List { list, op } => list_op(registry, rng, list, op, verbosity),
        Command::Hash { table, op } => hash_op(registry, table, op, verbosity),
        Command::Bitmap { bitmap, op } => bitmap_op(registry, bitmap, op),
        Command::Help => Ok(Reply::Lines(HELP.iter().map(|s| s.to_string()).collect())),
        Command::Quit => Ok(Reply::Quit),
    }
}

/// Renders an instance's contents; empty containers print nothing.
fn dump(registry: &Registry, name: &InstanceName) -> Result<Reply, ExecError> {
    let text = match name.kind() {
        Kind::List => {
            let (list, pool) = registry.list(name)?;
            format_values(list.iter(pool))
        }
        Kind::Hash => format_values(registry.hash(name)?.iter()),
        Kind::Bitmap => registry.bitmap(name)?.to_string(),
    };
    Ok(if text.is_empty() {
        Reply::Silent
    } else {
        Reply::Line(text)
    })
}

fn list_op<R>(
    registry: &mut Registry,
    rng: &mut R,
    name: InstanceName,
    op: ListOp,
    verbosity: Verbosity,
) -> Result<Reply, ExecError>
where
    R: Rng + ?Sized,
{
    // Two-list operations borrow both slots at once.
    match op {
        ListOp::Splice {
            before,
            src,
            first,
            last,
        } => {
            let moved = if src == name {
                let (dst, pool) = registry.list_mut(&name)?;
                list::splice_within(pool, dst, before, first, last)
            } else {
                let (dst, src, pool) = registry.list_pair_mut(&name, &src)?;
                list::splice(pool, dst, before, src, first, last)
            }
            .map_err(on(name))?;
            output::debug(format!("spliced {} node(s) into {}", moved, name), verbosity);
            return Ok(Reply::Silent);
        }
        ListOp::Unique {
            duplicates: Some(dups),
        } => {
            if dups == name {
                return Err(ExecError::SameList(name));
            }
            let (list, dups, pool) = registry.list_pair_mut(&name, &dups)?;
            let moved = list.unique(pool, Some(dups), less);
            output::debug(format!("moved {} duplicate(s) out of {}", moved, name), verbosity);
            return Ok(Reply::Silent);
        }
        _ => {}
    }

    let (list, pool) = registry.list_mut(&name)?;
    let reply = match op {
        ListOp::PushBack(v) => {
            list.push_back(pool, v).map_err(on(name))?;
            Reply::Silent
        }
        ListOp::PushFront(v) => {
            list.push_front(pool, v).map_err(on(name))?;
            Reply::Silent
        }
        ListOp::PopBack => {
            list.pop_back(pool).ok_or(ExecError::Empty(name))?;
            Reply::Silent
        }
        ListOp::PopFront => {
            list.pop_front(pool).ok_or(ExecError::Empty(name))?;
            Reply::Silent
        }
        ListOp::Front => Reply::line(list.front(pool).ok_or(ExecError::Empty(name))?),
        ListOp::Back => Reply::line(list.back(pool).ok_or(ExecError::Empty(name))?),
        ListOp::Insert { pos, value } => {
            list.insert_at(pool, pos, value).map_err(on(name))?;
            Reply::Silent
        }
        ListOp::InsertOrdered(v) => {
            list.insert_ordered(pool, v, less).map_err(on(name))?;
            Reply::Silent
        }
        ListOp::Remove(pos) => {
            list.remove_at(pool, pos).map_err(on(name))?;
            Reply::Silent
        }
        ListOp::Max => Reply::line(list.max_by(pool, less).ok_or(ExecError::Empty(name))?),
        ListOp::Min => Reply::line(list.min_by(pool, less).ok_or(ExecError::Empty(name))?),
        ListOp::Size => Reply::line(list.len()),
        ListOp::Empty => Reply::flag(list.is_empty()),
        ListOp::Reverse => {
            list.reverse(pool);
            Reply::Silent
        }
        ListOp::Shuffle => {
            list.shuffle(pool, rng);
            Reply::Silent
        }
        ListOp::Sort => {
            list.sort_by(pool, less);
            Reply::Silent
        }
        ListOp::Swap(i, j) => {
            list.swap_at(pool, i, j).map_err(on(name))?;
            Reply::Silent
        }
        ListOp::Unique { duplicates: None } => {
            let removed = list.unique(pool, None, less);
            output::debug(format!("released {} duplicate(s) from {}", removed, name), verbosity);
            Reply::Silent
        }
        // Two-list forms returned above.
        ListOp::Splice { .. } | ListOp::Unique { .. } => Reply::Silent,
    };
    Ok(reply)
}

fn hash_op(
    registry: &mut Registry,
    name: InstanceName,
    op: HashOp,
    verbosity: Verbosity,
) -> Result<Reply, ExecError> {
    let table = registry.hash_mut(&name)?;
    let not_found = |value| ExecError::NotFound { name, value };
    Ok(match op {
        HashOp::Insert(v) => {
            table.insert(v).map_err(on(name))?;
            Reply::Silent
        }
        HashOp::Replace(v) => {
            if let Some(old) = table.replace(v).map_err(on(name))? {
                output::debug(format!("{}: replaced entry {}", name, old), verbosity);
            }
            Reply::Silent
        }
        HashOp::Find(v) => Reply::line(table.find(&v).ok_or_else(|| not_found(v))?),
        HashOp::Delete(v) => {
            table.delete_value(&v).ok_or_else(|| not_found(v))?;
            Reply::Silent
        }
        HashOp::Apply(transform) => {
            table.apply(|v| *v = transform.apply(*v));
            Reply::Silent
        }
        HashOp::Clear => {
            let released = table.clear();
            output::debug(format!("{}: cleared {} entr(ies)", name, released), verbosity);
            Reply::Silent
        }
        HashOp::Size => Reply::line(table.len()),
        HashOp::Empty => Reply::flag(table.is_empty()),
    })
}

fn bitmap_op(registry: &mut Registry, name: InstanceName, op: BitmapOp) -> Result<Reply, ExecError> {
    let bm = registry.bitmap_mut(&name)?;
    let err = on(name);
    let reply = match op {
        BitmapOp::Set { idx, value } => bm.set(idx, value).map(|_| Reply::Silent),
        BitmapOp::Mark(idx) => bm.mark(idx).map(|_| Reply::Silent),
        BitmapOp::Reset(idx) => bm.reset(idx).map(|_| Reply::Silent),
        BitmapOp::Flip(idx) => bm.flip(idx).map(|_| Reply::Silent),
        BitmapOp::Test(idx) => bm.test(idx).map(Reply::flag),
        BitmapOp::SetAll(value) => {
            bm.set_all(value);
            Ok(Reply::Silent)
        }
        BitmapOp::SetMultiple { span, value } => bm
            .set_multiple(span.start, span.cnt, value)
            .map(|_| Reply::Silent),
        BitmapOp::Count { span, value } => bm.count(span.start, span.cnt, value).map(Reply::line),
        BitmapOp::Contains { span, value } => {
            bm.contains(span.start, span.cnt, value).map(Reply::flag)
        }
        BitmapOp::Any(span) => bm.any(span.start, span.cnt).map(Reply::flag),
        BitmapOp::None(span) => bm.none(span.start, span.cnt).map(Reply::flag),
        BitmapOp::All(span) => bm.all(span.start, span.cnt).map(Reply::flag),
        BitmapOp::Scan { span, value } => bm
            .scan(span.start, span.cnt, value)
            .map(|found| Reply::line(found.unwrap_or(SCAN_NOT_FOUND))),
        BitmapOp::ScanAndFlip { span, value } => bm
            .scan_and_flip(span.start, span.cnt, value)
            .map(|found| Reply::line(found.unwrap_or(SCAN_NOT_FOUND))),
        BitmapOp::Size => Ok(Reply::line(bm.size())),
        BitmapOp::Expand(delta) => bm.expanded(delta).map(|grown| {
            *bm = grown;
            Reply::Silent
        }),
        BitmapOp::Dump => Ok(if bm.size() == 0 {
            Reply::Silent
        } else {
            Reply::line(&*bm)
        }),
        BitmapOp::HexDump => Ok(Reply::Lines(bm.hex_dump())),
    };
    reply.map_err(err)
}
