use std::hash::Hash;

use crate::bitvec::BitVec;
use crate::frequency::FrequencyTable;
use crate::table::CodeTable;


/// Smallest alphabet a tree is built for.
pub const MIN_DISTINCT_SYMBOLS: usize = 3;


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<T> {

    Internal { weight: usize, left: Box<Node<T>>, right: Box<Node<T>> },
    Leaf { weight: usize, symbol: T },

}

impl<T> Node<T> {

    pub const fn weight(&self) -> usize {
        match self {
            Node::Internal { weight, .. } |
            Node::Leaf { weight, .. }
                => *weight
        }
    }


    /// Joins two subtrees. `left` is expected to be the lighter one.
    pub fn merge(left: Node<T>, right: Node<T>) -> Self {
        Node::Internal {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right)
        }
    }


    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
            Node::Leaf { .. } => 1
        }
    }

}


/// Huffman tree built by always merging the two lightest subtrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree<T> {

    root: Node<T>

}

impl<T> HuffmanTree<T>
where
    T: Eq + Hash + Clone
{

    /// Builds the tree for `frequencies`.
    ///
    /// Returns `None` when there are fewer than [`MIN_DISTINCT_SYMBOLS`]
    /// distinct symbols: no tree and no codes are produced for such inputs.
    ///
    /// Leaves start out sorted ascending by weight, ties kept in the table's
    /// order. Each merged node is reinserted after any node of equal weight,
    /// which makes the resulting codes reproducible.
    pub fn build(frequencies: &FrequencyTable<T>) -> Option<Self> {

        if frequencies.len() < MIN_DISTINCT_SYMBOLS {
            log::debug!("Not building a tree for {} distinct symbols", frequencies.len());
            return None;
        }

        let mut subtrees: Vec<Node<T>> = frequencies.sorted_by_frequency()
            .into_iter()
            .map(|(symbol, weight)| Node::Leaf { weight, symbol })
            .collect();

        while subtrees.len() > 2 {

            let left = subtrees.remove(0);
            let right = subtrees.remove(0);

            let node = Node::merge(left, right);

            let pos = subtrees.partition_point(|n| n.weight() <= node.weight());
            subtrees.insert(pos, node);
        }

        let right = subtrees.pop()?;
        let left = subtrees.pop()?;

        Some(Self {
            root: Node::merge(left, right)
        })
    }


    pub fn from_text(data: impl IntoIterator<Item = T>) -> Option<Self> {
        Self::build(&FrequencyTable::count(data))
    }


    pub const fn root(&self) -> &Node<T> {
        &self.root
    }

}

impl<T> HuffmanTree<T>
where
    T: Eq + Hash + Clone + Ord
{

    pub fn codes(&self) -> CodeTable<T> {
        derive_codes(&self.root)
    }

}


/// Assigns a code to every leaf under `root`: '0' for each step into a left
/// child, '1' for each step into a right child.
pub fn derive_codes<T>(root: &Node<T>) -> CodeTable<T>
where
    T: Ord + Clone
{

    fn assign<T: Ord + Clone>(node: &Node<T>, code: BitVec, table: &mut CodeTable<T>) {
        match node {

            Node::Internal { left, right, .. } => {
                assign(left, code.with_bit(false), table);
                assign(right, code.with_bit(true), table);
            },

            Node::Leaf { symbol, .. } => {
                table.insert(symbol.clone(), code);
            },
        }
    }

    let mut table = CodeTable::new();

    assign(root, BitVec::new(), &mut table);

    table
}
