//! Multi-level decode table ("Coding") for a canonical prefix code.
//!
//! A Coding is a tree of nodes, each holding `2^tree_shift` child slots. The
//! decoder looks up `tree_shift` bits at a time: a slot either resolves a
//! codeword (`Return`) or hands over to a deeper node (`Descend`). Slots that
//! no codeword reaches stay unassigned.
//!
//! Codings are immutable once built and can be shared by any number of
//! decoders.
//!
//! # Packed Table Format
//!
//! ```text
//! +---------------------------+
//! | Magic (4 bytes)           |  0x48 0x46 0x54 0x42 ("HFTB")
//! +---------------------------+
//! | tree_shift (1)            |  u8, 1..=8
//! +---------------------------+
//! | tree_index_start (4)      |  u32 little-endian
//! +---------------------------+
//! | node_count (4)            |  u32 little-endian
//! +---------------------------+
//! | pointers                  |  node_count * 2^tree_shift entries, 3 bytes each:
//! | (variable)                |    tag_consume (u8): kind tag in bits 6..7,
//! |                           |                      consume_bits in bits 0..5
//! |                           |    target (i16 LE):  Descend offset or Return symbol
//! +---------------------------+
//! ```
//!
//! Kind tags: `0b00` unassigned, `0b01` Descend, `0b10` Return. Tag `0b11` is
//! rejected on load.

use log::debug;

use crate::codebook::Codebook;
use crate::error::{CodingError, Result};

/// Bits consumed per lookup when no shift is configured.
pub const DEFAULT_TREE_SHIFT: u8 = 4;

/// Widest supported lookup step.
pub const MAX_TREE_SHIFT: u8 = 8;

/// Magic number for packed tables: "HFTB" (Huffman Table)
const MAGIC: [u8; 4] = [0x48, 0x46, 0x54, 0x42];

/// Size of the packed table header in bytes
const HEADER_SIZE: usize = 13;

/// Size of one packed pointer in bytes
const POINTER_SIZE: usize = 3;

const TAG_SHIFT: u8 = 6;
const CONSUME_MASK: u8 = 0x3F;
const TAG_UNASSIGNED: u8 = 0b00;
const TAG_DESCEND: u8 = 0b01;
const TAG_RETURN: u8 = 0b10;

/// Table construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodingConfig {
    /// Bits consumed per lookup step. Larger shifts mean wider nodes and
    /// fewer lookups per symbol.
    pub tree_shift: u8,
}

impl CodingConfig {
    /// Config with an explicit lookup width.
    pub fn with_tree_shift(tree_shift: u8) -> Self {
        Self { tree_shift }
    }

    /// Check that the shift is within `1..=MAX_TREE_SHIFT`.
    pub fn validate(&self) -> Result<()> {
        if self.tree_shift == 0 || self.tree_shift > MAX_TREE_SHIFT {
            return Err(CodingError::InvalidTreeShift {
                shift: self.tree_shift,
                max: MAX_TREE_SHIFT,
            }
            .into());
        }
        Ok(())
    }
}

impl Default for CodingConfig {
    fn default() -> Self {
        Self::with_tree_shift(DEFAULT_TREE_SHIFT)
    }
}

/// What a resolved lookup step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Codeword continues: add the offset to the current node index
    Descend(i32),
    /// Codeword complete: emit the symbol and restart at the root
    Return(u8),
}

/// One child slot of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    /// Input bits this step accounts for, at most `tree_shift`
    pub consume_bits: u8,
    pub step: Step,
}

/// A node with `2^tree_shift` child slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    children: Box<[Option<Pointer>]>,
}

impl TreeNode {
    fn empty(width: usize) -> Self {
        Self {
            children: vec![None; width].into_boxed_slice(),
        }
    }

    /// Slot for `selector`; `None` if no codeword reaches it.
    #[inline]
    pub fn child(&self, selector: u32) -> Option<Pointer> {
        self.children[selector as usize]
    }

    /// All `2^tree_shift` slots, indexed by selector.
    pub fn children(&self) -> &[Option<Pointer>] {
        &self.children
    }
}

/// Index reached by applying a `Descend` offset.
#[inline]
pub(crate) fn descend(index: usize, offset: i32) -> usize {
    index.wrapping_add_signed(offset as isize)
}

/// Immutable decode table for one canonical code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coding {
    tree_nodes: Vec<TreeNode>,
    tree_shift: u8,
    tree_index_start: usize,
}

impl Coding {
    /// Build the decode table for `codebook`.
    ///
    /// The root is node 0. Each codeword longer than `tree_shift` bits walks
    /// (and creates) `Descend` slots for every full `tree_shift`-bit group,
    /// then fills every slot that shares its final group as a prefix.
    ///
    /// A [`Codebook`] only holds prefix-free codes, so every slot is claimed
    /// by at most one codeword.
    ///
    /// # Errors
    /// `CodingError::InvalidTreeShift` for a shift outside `1..=8`
    pub fn new(codebook: &Codebook, config: CodingConfig) -> Result<Self> {
        config.validate()?;

        let shift = config.tree_shift as u32;
        let mask = (1u32 << shift) - 1;
        let width = 1usize << shift;
        let mut tree_nodes = vec![TreeNode::empty(width)];

        for (symbol, code) in codebook.codewords() {
            let mut node = 0usize;
            let mut remaining = code.len as u32;

            while remaining > shift {
                remaining -= shift;
                let selector = (code.bits >> remaining) & mask;
                let existing = tree_nodes[node].children[selector as usize];
                node = match existing {
                    Some(Pointer {
                        step: Step::Descend(offset),
                        ..
                    }) => descend(node, offset),
                    _ => {
                        // Codebook codes are prefix-free: no Return sits on
                        // the path of a longer codeword.
                        debug_assert!(existing.is_none(), "symbol {symbol} under a Return");
                        let child = tree_nodes.len();
                        tree_nodes.push(TreeNode::empty(width));
                        // Children are always appended after their parent
                        tree_nodes[node].children[selector as usize] = Some(Pointer {
                            consume_bits: shift as u8,
                            step: Step::Descend((child - node) as i32),
                        });
                        child
                    }
                };
            }

            let pad = shift - remaining;
            let tail = code.bits & ((1u32 << remaining) - 1);
            let first = (tail << pad) as usize;
            let pointer = Pointer {
                consume_bits: remaining as u8,
                step: Step::Return(symbol),
            };
            for child in &mut tree_nodes[node].children[first..first + (1usize << pad)] {
                debug_assert!(child.is_none(), "symbol {symbol} overlaps slot at node {node}");
                *child = Some(pointer);
            }
        }

        debug!(
            "built coding: {} symbols, {} nodes, tree_shift {}",
            codebook.symbol_count(),
            tree_nodes.len(),
            shift
        );

        Ok(Self {
            tree_nodes,
            tree_shift: config.tree_shift,
            tree_index_start: 0,
        })
    }

    pub fn tree_nodes(&self) -> &[TreeNode] {
        &self.tree_nodes
    }

    /// Bits consumed per lookup step.
    pub fn tree_shift(&self) -> u8 {
        self.tree_shift
    }

    /// Root node index, where every codeword starts.
    pub fn tree_index_start(&self) -> usize {
        self.tree_index_start
    }

    /// Mask selecting the low `tree_shift` bits.
    #[inline]
    pub fn selector_mask(&self) -> u32 {
        (1u32 << self.tree_shift) - 1
    }

    /// Serialize the table into the packed layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let width = 1usize << self.tree_shift;
        let mut bytes =
            Vec::with_capacity(HEADER_SIZE + self.tree_nodes.len() * width * POINTER_SIZE);

        bytes.extend_from_slice(&MAGIC);
        bytes.push(self.tree_shift);
        bytes.extend_from_slice(&(self.tree_index_start as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.tree_nodes.len() as u32).to_le_bytes());

        for node in &self.tree_nodes {
            for child in node.children.iter() {
                // Offsets are node index differences; with at most 256 codewords
                // of at most 32 bits the table never approaches i16::MAX nodes.
                let (tag, consume, target) = match child {
                    None => (TAG_UNASSIGNED, 0, 0i16),
                    Some(Pointer {
                        consume_bits,
                        step: Step::Descend(offset),
                    }) => (TAG_DESCEND, *consume_bits, *offset as i16),
                    Some(Pointer {
                        consume_bits,
                        step: Step::Return(symbol),
                    }) => (TAG_RETURN, *consume_bits, i16::from(*symbol)),
                };
                bytes.push(tag << TAG_SHIFT | consume);
                bytes.extend_from_slice(&target.to_le_bytes());
            }
        }

        bytes
    }

    /// Load a table from the packed layout, validating every pointer.
    ///
    /// # Errors
    /// - `CodingError::InvalidMagic` if the magic number doesn't match
    /// - `CodingError::LengthMismatch` if the buffer size disagrees with the header
    /// - `CodingError::InvalidTreeShift` for a shift outside `1..=8`
    /// - `CodingError::UnknownPointerKind` for a kind tag outside Descend/Return/unassigned
    /// - `CodingError::InvalidPointer` for out-of-range consume counts, symbols or targets
    /// - `CodingError::InvalidStart` if the root index is outside the table
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(CodingError::LengthMismatch {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            }
            .into());
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != MAGIC {
            return Err(CodingError::InvalidMagic {
                expected: MAGIC,
                actual: magic,
            }
            .into());
        }

        let tree_shift = bytes[4];
        CodingConfig::with_tree_shift(tree_shift).validate()?;
        let tree_index_start = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) as usize;
        let node_count = u32::from_le_bytes([bytes[9], bytes[10], bytes[11], bytes[12]]) as usize;

        let width = 1usize << tree_shift;
        let expected = node_count
            .checked_mul(width * POINTER_SIZE)
            .and_then(|body| body.checked_add(HEADER_SIZE))
            .unwrap_or(usize::MAX);
        if bytes.len() != expected {
            return Err(CodingError::LengthMismatch {
                expected,
                actual: bytes.len(),
            }
            .into());
        }

        if tree_index_start >= node_count {
            return Err(CodingError::InvalidStart {
                start: tree_index_start,
                node_count,
            }
            .into());
        }

        let mut tree_nodes = Vec::with_capacity(node_count);
        for (node, packed) in bytes[HEADER_SIZE..]
            .chunks_exact(width * POINTER_SIZE)
            .enumerate()
        {
            let children = packed
                .chunks_exact(POINTER_SIZE)
                .enumerate()
                .map(|(slot, raw)| {
                    let target = i16::from_le_bytes([raw[1], raw[2]]);
                    unpack_pointer(raw[0], target, tree_shift, node, slot, node_count)
                })
                .collect::<Result<Vec<_>>>()?;
            tree_nodes.push(TreeNode {
                children: children.into_boxed_slice(),
            });
        }

        debug!(
            "loaded coding: {} nodes, tree_shift {}, root {}",
            node_count, tree_shift, tree_index_start
        );

        Ok(Self {
            tree_nodes,
            tree_shift,
            tree_index_start,
        })
    }
}

/// Decode and check one packed pointer.
fn unpack_pointer(
    tag_consume: u8,
    target: i16,
    tree_shift: u8,
    node: usize,
    slot: usize,
    node_count: usize,
) -> Result<Option<Pointer>> {
    let tag = tag_consume >> TAG_SHIFT;
    let consume_bits = tag_consume & CONSUME_MASK;
    let invalid = |reason| CodingError::InvalidPointer { node, slot, reason };

    let step = match tag {
        TAG_UNASSIGNED => return Ok(None),
        TAG_DESCEND => {
            let child = node as i64 + i64::from(target);
            if child < 0 || child >= node_count as i64 {
                return Err(invalid("descend target outside the node table").into());
            }
            if consume_bits == 0 {
                return Err(invalid("descend consumes no bits").into());
            }
            Step::Descend(i32::from(target))
        }
        TAG_RETURN => {
            let symbol =
                u8::try_from(target).map_err(|_| invalid("return symbol outside byte range"))?;
            Step::Return(symbol)
        }
        _ => {
            return Err(CodingError::UnknownPointerKind { tag, node, slot }.into());
        }
    };

    if consume_bits > tree_shift {
        return Err(invalid("consume_bits exceeds tree shift").into());
    }

    Ok(Some(Pointer { consume_bits, step }))
}
