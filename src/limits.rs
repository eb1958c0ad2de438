//! Recursion and size limits.
//!
//! These limits keep pathological inputs from exhausting the call stack
//! in the recursive parsers and the executor.

/// Maximum nesting depth for block containers (callouts, blockquotes, lists).
pub const MAX_BLOCK_NESTING: usize = 32;

/// Maximum nesting depth for inline elements (emphasis family, link labels).
pub const MAX_INLINE_NESTING: usize = 32;

/// Maximum digits in an ordered list marker (prevents big-integer parsing).
pub const MAX_LIST_MARKER_DIGITS: usize = 9;

/// Maximum bytes scanned for the closing bracket of a link label or wiki
/// target, and for the `)` ending a link destination.
pub const MAX_LINK_SCAN: usize = 1000;

/// Maximum table columns; extra cells are dropped.
pub const MAX_TABLE_COLUMNS: usize = 128;

/// Maximum heading level for ATX headings.
pub const MAX_HEADING_LEVEL: usize = 6;
