use std::collections::HashMap;
use std::io::{self, Read};

use log::{debug, trace};

use crate::bitstream::{CHUNK, read_chunk};
use crate::code::Code;
use crate::error::{Error, Result};
use crate::heap::PriorityHeap;

/// Occurrence count for every byte value.
#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable { counts: [0; 256] }
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let mut freq = FrequencyTable::new();
        for &byte in data {
            freq.add(byte);
        }
        freq
    }

    /// Counts every byte `reader` yields, in one pass.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut freq = FrequencyTable::new();
        let mut buf = [0u8; CHUNK];
        loop {
            let n = read_chunk(&mut reader, &mut buf)?;
            if n == 0 {
                break;
            }
            for &byte in &buf[..n] {
                freq.add(byte);
            }
        }
        Ok(freq)
    }

    /// Sums caller-supplied counts; repeated symbols accumulate.
    pub fn from_counts<I: IntoIterator<Item = (u8, u64)>>(counts: I) -> Result<Self> {
        let mut freq = FrequencyTable::new();
        for (symbol, count) in counts {
            let slot = &mut freq.counts[symbol as usize];
            *slot = slot.checked_add(count).ok_or(Error::WeightOverflow)?;
        }
        Ok(freq)
    }

    pub fn add(&mut self, byte: u8) {
        self.counts[byte as usize] += 1;
    }

    pub fn get(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    /// Nonzero `(symbol, count)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }

    pub fn distinct(&self) -> usize {
        self.iter().count()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Shannon entropy in bits per symbol.
    pub fn entropy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let total_f = total as f64;
        self.iter()
            .map(|(_, count)| {
                let p = count as f64 / total_f;
                -p * p.log2()
            })
            .sum()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Index of a node in its tree's arena.
pub type NodeRef = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        left: NodeRef,
        right: NodeRef,
        weight: u64,
    },
}

impl Node {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } => *weight,
            Node::Internal { weight, .. } => *weight,
        }
    }
}

/// Owns every node of one tree; nodes refer to each other by index.
#[derive(Debug, Default)]
struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    fn alloc(&mut self, node: Node) -> NodeRef {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

/// Heap entry used while merging: ties on weight go to whichever node
/// arrived first.
struct Pending {
    weight: u64,
    order: usize,
    node: NodeRef,
}

fn lighter(a: &Pending, b: &Pending) -> bool {
    (a.weight, a.order) < (b.weight, b.order)
}

#[derive(Debug)]
pub struct HuffmanTree {
    arena: Arena,
    root: NodeRef,
}

impl HuffmanTree {
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        let mut arena = Arena::default();
        let leaves: Vec<Pending> = frequencies
            .iter()
            .enumerate()
            .map(|(order, (symbol, weight))| Pending {
                weight,
                order,
                node: arena.alloc(Node::Leaf { symbol, weight }),
            })
            .collect();
        if leaves.is_empty() {
            return Err(Error::EmptyAlphabet);
        }
        debug!("Building Huffman tree from {} unique symbols", leaves.len());

        let mut order = leaves.len();
        let mut heap = PriorityHeap::build(leaves, lighter);
        while heap.len() > 1 {
            let a = heap.pop()?;
            let b = heap.pop()?;
            let weight = a.weight.checked_add(b.weight).ok_or(Error::WeightOverflow)?;
            let node = arena.alloc(Node::Internal {
                left: a.node,
                right: b.node,
                weight,
            });
            heap.push(Pending {
                weight,
                order,
                node,
            });
            order += 1;
        }
        let root = heap.pop()?.node;

        debug!("Tree construction complete: {} nodes", arena.nodes.len());
        Ok(HuffmanTree { arena, root })
    }

    pub fn root(&self) -> NodeRef {
        self.root
    }

    pub fn node(&self, node: NodeRef) -> &Node {
        &self.arena.nodes[node]
    }

    pub fn weight(&self) -> u64 {
        self.node(self.root).weight()
    }

    /// Number of nodes, leaves and internal.
    pub fn len(&self) -> usize {
        self.arena.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.nodes.is_empty()
    }

    /// Depth of the deepest leaf; a lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            match self.node(node) {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Internal { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        deepest
    }

    /// Sum of `weight * code length` over all leaves, i.e. the payload size
    /// in bits. A lone leaf is charged one bit per occurrence.
    pub fn weighted_path_length(&self) -> u64 {
        let mut total = 0u64;
        let mut stack = vec![(self.root, 0u64)];
        while let Some((node, depth)) = stack.pop() {
            match self.node(node) {
                Node::Leaf { weight, .. } => total += weight * depth.max(1),
                Node::Internal { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        total
    }
}

/// Code assigned to each byte value.
#[derive(Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<Code>>,
}

impl CodeTable {
    pub fn new() -> Self {
        CodeTable {
            codes: vec![None; 256],
        }
    }

    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        let tree = HuffmanTree::from_frequencies(frequencies)?;
        Self::from_tree(&tree)
    }

    /// Walks the tree appending 0 on the left and 1 on the right.
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut table = CodeTable::new();
        match tree.node(tree.root()) {
            Node::Leaf { symbol, .. } => {
                // A zero-length code could never be recognized by the decoder.
                let mut code = Code::new();
                code.push(false);
                trace!("Assigning code to byte {:#04x}: '{}'", symbol, code);
                table.insert(*symbol, code);
            }
            Node::Internal { .. } => {
                let mut prefix = Code::new();
                table.fill(tree, tree.root(), &mut prefix);
            }
        }
        // Surfaces a builder defect before any bits are written.
        table.reverse()?;
        debug!(
            "Code table built: {} codes, longest {} bits",
            table.len(),
            table.max_code_len()
        );
        Ok(table)
    }

    fn fill(&mut self, tree: &HuffmanTree, node: NodeRef, prefix: &mut Code) {
        match tree.node(node) {
            Node::Leaf { symbol, .. } => {
                trace!(
                    "Assigning code to byte {:#04x} ('{}'): '{}'",
                    symbol,
                    (*symbol as char).escape_default(),
                    prefix
                );
                self.insert(*symbol, prefix.clone());
            }
            Node::Internal { left, right, .. } => {
                prefix.push(false);
                self.fill(tree, *left, prefix);
                prefix.pop();
                prefix.push(true);
                self.fill(tree, *right, prefix);
                prefix.pop();
            }
        }
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes[symbol as usize].as_ref()
    }

    /// Sets the code for `symbol`, returning the one it replaced.
    pub fn insert(&mut self, symbol: u8, code: Code) -> Option<Code> {
        self.codes[symbol as usize].replace(code)
    }

    /// `(symbol, code)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|c| (symbol as u8, c)))
    }

    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.iter().all(Option::is_none)
    }

    pub fn max_code_len(&self) -> usize {
        self.iter().map(|(_, c)| c.len()).max().unwrap_or(0)
    }

    /// Exact number of payload bits needed to encode input with these counts.
    /// Symbols missing from the table are ignored.
    pub fn encoded_bits(&self, frequencies: &FrequencyTable) -> u64 {
        frequencies
            .iter()
            .filter_map(|(symbol, count)| self.get(symbol).map(|c| count * c.len() as u64))
            .sum()
    }

    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<&Code> = self.iter().map(|(_, c)| c).collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !a.is_prefix_of(b))
        })
    }

    pub fn reverse(&self) -> Result<ReverseTable> {
        let mut symbols: HashMap<Code, u8> = HashMap::with_capacity(self.len());
        let mut max_code_len = 0;
        for (symbol, code) in self.iter() {
            if let Some(&first) = symbols.get(code) {
                return Err(Error::DuplicateCode {
                    first,
                    second: symbol,
                });
            }
            max_code_len = max_code_len.max(code.len());
            symbols.insert(code.clone(), symbol);
        }
        Ok(ReverseTable {
            symbols,
            max_code_len,
        })
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CodeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(s, c)| (s, c.to_string())))
            .finish()
    }
}

/// Code to symbol lookup used by the decoder.
#[derive(Debug, Clone)]
pub struct ReverseTable {
    symbols: HashMap<Code, u8>,
    max_code_len: usize,
}

impl ReverseTable {
    pub fn get(&self, code: &Code) -> Option<u8> {
        self.symbols.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn max_code_len(&self) -> usize {
        self.max_code_len
    }
}
